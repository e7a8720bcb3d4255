//! Error types for the render pipeline.

/// Errors surfaced by job orchestration, download, and media serving.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Unknown job id after the transient-miss retry.
    #[error("render job {0} not found")]
    JobNotFound(String),

    /// The external renderer reported a failure. Terminal for the job;
    /// the message is shown to the user verbatim and the job is not
    /// retried automatically.
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// Requested byte range lies outside `[0, size)`.
    #[error("range not satisfiable for {size}-byte resource")]
    RangeNotSatisfiable { size: u64 },

    /// Path rejected before any filesystem access.
    #[error("access to {path} is forbidden")]
    Forbidden { path: String },

    /// Render service transport or protocol error.
    #[error("render service error: {0}")]
    Service(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }
}
