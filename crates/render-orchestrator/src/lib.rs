//! Montage Render Orchestrator
//!
//! Turns an edited composition into a downloadable video file: snapshots
//! the composition into an immutable job description, submits it to a
//! render service, polls progress, and serves the finished artifact with
//! byte-range support.
//!
//! The renderer itself is an external collaborator behind the
//! [`RenderService`] trait; this crate owns the job state machine and the
//! submit/poll/cancel/download contract, not the pixel math.

pub mod download;
pub mod error;
pub mod job;
pub mod local;
pub mod media;
pub mod orchestrator;
pub mod service;

pub use download::DownloadResponse;
pub use error::{RenderError, RenderResult};
pub use job::{JobId, JobStatus, RenderJob};
pub use local::LocalRenderService;
pub use media::MediaStore;
pub use orchestrator::RenderOrchestrator;
pub use service::{RenderProgress, RenderRequest, RenderService};
