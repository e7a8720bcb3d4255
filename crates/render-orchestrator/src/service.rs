//! The external renderer contract.
//!
//! The renderer is an opaque long-running job runner behind a
//! submit/poll/cancel interface. Progress is pull-based: the renderer
//! process may restart independently of the editor session, so the
//! orchestrator polls rather than relying on push callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use montage_timeline_model::{Composition, OutputSettings};

use crate::error::RenderResult;
use crate::job::JobId;

/// Submission payload: the frozen composition plus output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub name: String,
    pub snapshot: Composition,
    pub output: OutputSettings,
}

/// One poll answer from the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderProgress {
    Progress { progress: f64 },
    Done { url: String, size: u64 },
    Error { message: String },
}

/// A render backend: remote service or in-process stand-in.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a job; returns the renderer-assigned job id.
    async fn submit(&self, request: RenderRequest) -> RenderResult<JobId>;

    /// Poll job status without blocking on the render itself.
    ///
    /// Returns [`crate::RenderError::JobNotFound`] for unknown ids; a
    /// freshly submitted id may be transiently unknown due to eventual
    /// consistency, which the orchestrator absorbs with a single retry.
    async fn poll(&self, job_id: &str) -> RenderResult<RenderProgress>;

    /// Request cancellation. Fire-and-forget from the caller's view;
    /// must be idempotent on the receiving side.
    async fn cancel(&self, job_id: &str) -> RenderResult<()>;
}
