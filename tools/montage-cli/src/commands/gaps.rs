//! List unoccupied intervals per track.

use std::path::PathBuf;

use montage_timeline_model::time::frame_to_seconds;
use montage_timeline_model::LoadedProject;

pub fn run(path: PathBuf, track_filter: Option<u64>) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let comp = &project.composition;

    for track in comp.tracks() {
        if track_filter.is_some_and(|id| id != track.id) {
            continue;
        }
        println!("Track [{}] {}:", track.id, track.name);

        let gaps: Vec<_> = comp
            .find_gaps(track.id)
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .collect();
        if gaps.is_empty() {
            println!("  (fully occupied)");
            continue;
        }
        for gap in gaps {
            println!(
                "  [{}, {}): {} frames ({:.2}s)",
                gap.start,
                gap.end,
                gap.len(),
                frame_to_seconds(gap.len(), comp.fps)
            );
        }
    }

    Ok(())
}
