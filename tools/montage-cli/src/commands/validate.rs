//! Validate a Montage project bundle.

use std::path::PathBuf;

use montage_timeline_model::LoadedProject;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("  Name: {}", project.project.name);
    println!("  Version: {}", project.project.version);
    println!("  Tracks: {}", project.composition.tracks().len());
    println!("  Overlays: {}", project.composition.overlays().len());

    let mut issues: Vec<String> = vec![];

    // Structural invariants: overlap, trim windows, track capabilities.
    if let Err(e) = project.composition.validate() {
        issues.push(format!("composition invariant violated: {e}"));
    }

    // Referenced media must exist on disk.
    issues.extend(project.validate_sources());

    if issues.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Project may not be fully usable.",
            issues.len()
        );
    }

    Ok(())
}
