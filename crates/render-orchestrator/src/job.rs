//! Render job state machine.
//!
//! `queued → rendering → {done | error | cancelled}`. Terminal states
//! are immutable: once a job is done, errored, or cancelled, further
//! transitions and progress updates are ignored. Progress is monotonic
//! non-decreasing while the job is live.

use serde::{Deserialize, Serialize};
use tracing::debug;

use montage_timeline_model::{Composition, OutputSettings};

/// Job identifier assigned at submission.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Rendering,
    Done,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error | JobStatus::Cancelled)
    }
}

/// One render job owned by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    pub id: JobId,

    /// User-facing output name.
    pub name: String,

    pub status: JobStatus,

    /// Render progress in `[0, 1]`, non-decreasing.
    pub progress: f64,

    /// Download location, set when status reaches `Done`.
    pub result_url: Option<String>,

    /// Artifact size in bytes, set when status reaches `Done`.
    pub size_bytes: Option<u64>,

    /// Renderer error message, set when status reaches `Error`.
    pub error: Option<String>,

    /// Deep, independent copy of the composition at submission time.
    /// Edits made after submission are never observed by this job.
    pub snapshot: Composition,

    pub output: OutputSettings,

    /// Submission timestamp (ISO 8601).
    pub created_at: String,
}

impl RenderJob {
    pub fn new(
        id: JobId,
        name: impl Into<String>,
        snapshot: Composition,
        output: OutputSettings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status: JobStatus::Queued,
            progress: 0.0,
            result_url: None,
            size_bytes: None,
            error: None,
            snapshot,
            output,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Record a progress report. The first report acknowledges that the
    /// renderer has started and moves `queued → rendering`. Progress
    /// never decreases; stale reports are absorbed.
    pub fn record_progress(&mut self, progress: f64) {
        if self.status.is_terminal() {
            return;
        }
        if self.status == JobStatus::Queued {
            self.status = JobStatus::Rendering;
        }
        self.progress = self.progress.max(progress.clamp(0.0, 1.0));
    }

    /// Transition to `Done` with the artifact location.
    pub fn complete(&mut self, url: impl Into<String>, size_bytes: u64) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Done;
        self.progress = 1.0;
        self.result_url = Some(url.into());
        self.size_bytes = Some(size_bytes);
        debug!(job = %self.id, size_bytes, "render job completed");
    }

    /// Transition to `Error` with the renderer's message.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Error;
        self.error = Some(message.into());
    }

    /// Transition to `Cancelled`. Idempotent; a no-op on terminal jobs.
    pub fn cancel(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Cancelled;
    }
}
