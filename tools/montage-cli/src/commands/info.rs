//! Show project information.

use std::path::PathBuf;

use montage_timeline_model::time::frame_to_seconds;
use montage_timeline_model::LoadedProject;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let p = &project.project;
    let comp = &project.composition;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    let total = comp.total_duration_frames();
    println!("Composition:");
    println!("  FPS: {}", comp.fps);
    println!(
        "  Duration: {} frames ({:.2}s)",
        total,
        frame_to_seconds(total, comp.fps)
    );
    println!("  Tracks: {}", comp.tracks().len());
    println!("  Overlays: {}", comp.overlays().len());
    println!();

    for track in comp.tracks() {
        let overlays = comp.track_overlays(track.id);
        println!(
            "  [{}] {} ({:?}, {:?}{}{})",
            track.id,
            track.name,
            track.kind,
            track.mixing,
            if track.visible { "" } else { ", hidden" },
            if track.muted { ", muted" } else { "" },
        );
        for overlay in overlays {
            println!(
                "    #{} {} [{}, {}){}",
                overlay.id,
                overlay.kind.name(),
                overlay.start_frame,
                overlay.end_frame(),
                overlay
                    .label
                    .as_deref()
                    .map(|l| format!(" \"{l}\""))
                    .unwrap_or_default(),
            );
        }
    }
    println!();

    println!("Output settings:");
    println!("  Format: {:?}", p.output.format);
    println!(
        "  Output: {}x{} @ {}fps",
        p.output.width, p.output.height, p.output.fps
    );

    Ok(())
}
