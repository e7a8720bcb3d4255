//! Job orchestration over a render service.
//!
//! Owns every [`RenderJob`] and drives its state machine from poll
//! answers. The orchestrator never mutates the composition store; it
//! works only on the deep snapshot taken at submission.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use montage_timeline_model::{Composition, OutputSettings};

use crate::download::{read_file_range, DownloadResponse};
use crate::error::{RenderError, RenderResult};
use crate::job::{JobId, JobStatus, RenderJob};
use crate::service::{RenderProgress, RenderRequest, RenderService};

/// Delay before the single retry on a transient "job id unknown" poll.
const NOT_FOUND_RETRY_DELAY: Duration = Duration::from_millis(250);

pub struct RenderOrchestrator<S: RenderService> {
    service: S,
    jobs: HashMap<JobId, RenderJob>,
}

impl<S: RenderService> RenderOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            jobs: HashMap::new(),
        }
    }

    pub fn job(&self, job_id: &str) -> Option<&RenderJob> {
        self.jobs.get(job_id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &RenderJob> {
        self.jobs.values()
    }

    /// Submit a render. The composition is snapshotted before any await
    /// point, so edits made while the submission is in flight cannot
    /// leak into the job.
    pub async fn submit(
        &mut self,
        name: impl Into<String>,
        composition: &Composition,
        output: OutputSettings,
    ) -> RenderResult<JobId> {
        let name = name.into();
        let snapshot = composition.snapshot();

        let id = self
            .service
            .submit(RenderRequest {
                name: name.clone(),
                snapshot: snapshot.clone(),
                output: output.clone(),
            })
            .await?;

        info!(job = %id, name, "render job submitted");
        self.jobs
            .insert(id.clone(), RenderJob::new(id.clone(), name, snapshot, output));
        Ok(id)
    }

    /// Poll a job once and fold the answer into its state machine.
    /// Returns the job's status and progress after the poll.
    ///
    /// A single "job id unknown" answer is treated as transient (the
    /// renderer may lag behind its own submission acknowledgment): the
    /// poll is retried once after a short delay before `JobNotFound` is
    /// reported.
    pub async fn poll_once(&mut self, job_id: &str) -> RenderResult<(JobStatus, f64)> {
        let job = self
            .jobs
            .get(job_id)
            .ok_or_else(|| RenderError::JobNotFound(job_id.to_string()))?;
        if job.status.is_terminal() {
            return Ok((job.status, job.progress));
        }

        let answer = match self.service.poll(job_id).await {
            Err(RenderError::JobNotFound(_)) => {
                warn!(job = %job_id, "poll missed, retrying once");
                tokio::time::sleep(NOT_FOUND_RETRY_DELAY).await;
                self.service.poll(job_id).await?
            }
            other => other?,
        };

        let job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| RenderError::JobNotFound(job_id.to_string()))?;
        match answer {
            RenderProgress::Progress { progress } => job.record_progress(progress),
            RenderProgress::Done { url, size } => job.complete(url, size),
            RenderProgress::Error { message } => job.fail(message),
        }
        Ok((job.status, job.progress))
    }

    /// Poll at a fixed interval until the job reaches a terminal state.
    pub async fn drive_to_completion(
        &mut self,
        job_id: &str,
        poll_interval: Duration,
    ) -> RenderResult<&RenderJob> {
        loop {
            let (status, _) = self.poll_once(job_id).await?;
            if status.is_terminal() {
                return self
                    .jobs
                    .get(job_id)
                    .ok_or_else(|| RenderError::JobNotFound(job_id.to_string()));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Cancel a queued or rendering job. Idempotent; does not touch
    /// other jobs. Terminal jobs are left as they are.
    pub async fn cancel(&mut self, job_id: &str) -> RenderResult<()> {
        let job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| RenderError::JobNotFound(job_id.to_string()))?;
        if job.status.is_terminal() {
            return Ok(());
        }
        job.cancel();
        // Fire-and-forget toward the renderer; the server side is
        // idempotent, and a transport failure does not resurrect the job.
        if let Err(e) = self.service.cancel(job_id).await {
            warn!(job = %job_id, error = %e, "cancel request failed");
        }
        Ok(())
    }

    /// Serve the finished artifact of a job, honoring an HTTP `Range`
    /// header. `404` for unknown ids or jobs not in `Done`; `206`/`416`
    /// per range validity.
    pub fn download(&self, job_id: &str, range_header: Option<&str>) -> DownloadResponse {
        let Some(job) = self.jobs.get(job_id) else {
            return DownloadResponse::not_found();
        };
        if job.status != JobStatus::Done {
            return DownloadResponse::not_found();
        }
        let Some(url) = job.result_url.as_deref() else {
            return DownloadResponse::not_found();
        };
        match read_file_range(std::path::Path::new(url), range_header) {
            Ok(response) => response,
            Err(RenderError::RangeNotSatisfiable { size }) => {
                DownloadResponse::not_satisfiable(size)
            }
            Err(_) => DownloadResponse::not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalRenderService;
    use montage_timeline_model::{OutputFormat, OverlayDraft, OverlayKind, TrackKind};

    fn output() -> OutputSettings {
        OutputSettings {
            format: OutputFormat::Mp4H264,
            width: 1920,
            height: 1080,
            fps: 30,
            video_bitrate_kbps: 8000,
            audio_bitrate_kbps: 192,
        }
    }

    fn composition() -> Composition {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Video, "V1");
        comp.add_overlay(
            track,
            OverlayDraft::new(
                OverlayKind::Video {
                    src: "media/a.mp4".to_string(),
                    source_in_frame: 0,
                    source_out_frame: 90,
                    source_duration_frames: 300,
                },
                0,
                90,
            ),
        )
        .unwrap();
        comp
    }

    fn temp_out_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_render_lifecycle_with_staged_progress() {
        let dir = temp_out_dir("montage_test_orchestrator_lifecycle");
        let service = LocalRenderService::new(&dir);
        let mut orch = RenderOrchestrator::new(service);

        let id = orch.submit("teaser", &composition(), output()).await.unwrap();
        assert_eq!(orch.job(&id).unwrap().status, JobStatus::Queued);

        // Staged polls: 0.2, 0.6, 1.0, then done with a result url.
        let mut seen = vec![];
        loop {
            let (status, progress) = orch.poll_once(&id).await.unwrap();
            if status == JobStatus::Done {
                break;
            }
            seen.push(progress);
        }
        assert_eq!(seen, vec![0.2, 0.6, 1.0]);

        let job = orch.job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.progress, 1.0);
        assert!(job.result_url.is_some());
        assert!(job.size_bytes.unwrap() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_progress_non_decreasing_until_terminal() {
        let dir = temp_out_dir("montage_test_orchestrator_monotonic");
        let service = LocalRenderService::new(&dir);
        let mut orch = RenderOrchestrator::new(service);
        let id = orch.submit("out", &composition(), output()).await.unwrap();

        let mut prev = 0.0;
        loop {
            let (status, progress) = orch.poll_once(&id).await.unwrap();
            assert!(progress >= prev);
            prev = progress;
            if status.is_terminal() {
                break;
            }
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_snapshot_isolated_from_later_edits() {
        let dir = temp_out_dir("montage_test_orchestrator_snapshot");
        let service = LocalRenderService::new(&dir);
        let mut orch = RenderOrchestrator::new(service);

        let mut comp = composition();
        let id = orch.submit("out", &comp, output()).await.unwrap();

        // Mutate the live composition after submission.
        let overlay_id = comp.overlays()[0].id;
        comp.remove_overlay(overlay_id);

        assert_eq!(orch.job(&id).unwrap().snapshot.overlays().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_transient_poll_miss_is_retried_once() {
        let dir = temp_out_dir("montage_test_orchestrator_retry");
        let service = LocalRenderService::new(&dir).with_ack_misses(1);
        let mut orch = RenderOrchestrator::new(service);
        let id = orch.submit("out", &composition(), output()).await.unwrap();

        // First service answer is a miss; the retry succeeds.
        let (status, progress) = orch.poll_once(&id).await.unwrap();
        assert_eq!(status, JobStatus::Rendering);
        assert_eq!(progress, 0.2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_two_consecutive_misses_report_not_found() {
        let dir = temp_out_dir("montage_test_orchestrator_notfound");
        let service = LocalRenderService::new(&dir).with_ack_misses(2);
        let mut orch = RenderOrchestrator::new(service);
        let id = orch.submit("out", &composition(), output()).await.unwrap();

        let err = orch.poll_once(&id).await.unwrap_err();
        assert!(matches!(err, RenderError::JobNotFound(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_scoped() {
        let dir = temp_out_dir("montage_test_orchestrator_cancel");
        let service = LocalRenderService::new(&dir);
        let mut orch = RenderOrchestrator::new(service);

        let a = orch.submit("a", &composition(), output()).await.unwrap();
        let b = orch.submit("b", &composition(), output()).await.unwrap();

        orch.cancel(&a).await.unwrap();
        orch.cancel(&a).await.unwrap();
        assert_eq!(orch.job(&a).unwrap().status, JobStatus::Cancelled);
        // The other job is unaffected.
        assert_eq!(orch.job(&b).unwrap().status, JobStatus::Queued);

        // A cancelled job stays cancelled through further polls.
        let (status, _) = orch.poll_once(&a).await.unwrap();
        assert_eq!(status, JobStatus::Cancelled);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_download_with_byte_ranges() {
        let dir = temp_out_dir("montage_test_orchestrator_download");
        let service = LocalRenderService::new(&dir).with_artifact_size(1000);
        let mut orch = RenderOrchestrator::new(service);
        let id = orch.submit("out", &composition(), output()).await.unwrap();

        // Not yet done: download is a 404.
        assert_eq!(orch.download(&id, None).status, 404);

        orch.drive_to_completion(&id, Duration::from_millis(1))
            .await
            .unwrap();

        let full = orch.download(&id, None);
        assert_eq!(full.status, 200);
        assert_eq!(full.body.len(), 1000);

        let partial = orch.download(&id, Some("bytes=0-99"));
        assert_eq!(partial.status, 206);
        assert_eq!(partial.body.len(), 100);
        assert_eq!(
            partial.content_range.as_deref(),
            Some("bytes 0-99/1000")
        );

        let invalid = orch.download(&id, Some("bytes=2000-3000"));
        assert_eq!(invalid.status, 416);
        assert_eq!(
            invalid.content_range.as_deref(),
            Some("bytes */1000")
        );

        assert_eq!(orch.download("missing", None).status, 404);

        std::fs::remove_dir_all(&dir).ok();
    }
}
