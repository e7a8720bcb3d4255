//! Initialize a new Montage project.

use std::path::PathBuf;

use montage_timeline_model::LoadedProject;

pub fn run(name: String, output: PathBuf, width: u32, height: u32, fps: u32) -> anyhow::Result<()> {
    let project_dir = output.join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let project = LoadedProject::create(&project_dir, &name, width, height, fps)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  Directory: {}", project.root.display());
    println!("  Resolution: {}x{}", width, height);
    println!("  FPS: {fps}");
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── media/       (source media files)");
    println!("  ├── meta/        (project.json, composition.json)");
    println!("  ├── cache/       (waveforms, proxies)");
    println!("  └── renders/     (rendered output)");

    Ok(())
}
