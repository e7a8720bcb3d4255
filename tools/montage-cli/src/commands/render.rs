//! Render a project with the in-process renderer.

use std::path::PathBuf;
use std::time::Duration;

use montage_render_orchestrator::{JobStatus, LocalRenderService, RenderOrchestrator};
use montage_timeline_model::LoadedProject;

pub async fn run(
    path: PathBuf,
    name: String,
    output: Option<PathBuf>,
    poll_ms: u64,
) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    if let Err(e) = project.composition.validate() {
        anyhow::bail!("Refusing to render an invalid composition: {e}");
    }

    let out_dir = output.unwrap_or_else(|| project.root.join("renders"));
    println!("Rendering '{}' to {}", name, out_dir.display());

    let mut orchestrator = RenderOrchestrator::new(LocalRenderService::new(&out_dir));
    let job_id = orchestrator
        .submit(&name, &project.composition, project.project.output.clone())
        .await?;

    let mut last_reported = -1.0;
    loop {
        let (status, progress) = orchestrator.poll_once(&job_id).await?;
        if progress != last_reported {
            println!("  {:>3.0}%", progress * 100.0);
            last_reported = progress;
        }
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(poll_ms)).await;
    }

    let job = orchestrator
        .job(&job_id)
        .ok_or_else(|| anyhow::anyhow!("job vanished after completion"))?;
    match job.status {
        JobStatus::Done => {
            println!(
                "Render complete: {} ({} bytes)",
                job.result_url.as_deref().unwrap_or("<unknown>"),
                job.size_bytes.unwrap_or(0)
            );
            Ok(())
        }
        JobStatus::Error => anyhow::bail!(
            "Render failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        ),
        JobStatus::Cancelled => anyhow::bail!("Render was cancelled"),
        _ => unreachable!("terminal loop exited on a non-terminal status"),
    }
}
