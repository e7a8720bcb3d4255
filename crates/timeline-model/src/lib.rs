//! Montage Timeline Model
//!
//! The authoritative data model for compositions: tracks, overlays,
//! frame-accurate time arithmetic, zoom state, and project persistence.
//!
//! All mutation operations are validate-then-apply: a failed operation
//! returns a typed [`TimelineError`] and leaves the composition untouched.

pub mod composition;
pub mod error;
pub mod overlay;
pub mod project;
pub mod time;
pub mod track;
pub mod zoom;

pub use composition::{Composition, FrameRange, GapIter, OverlayDraft};
pub use error::TimelineError;
pub use overlay::{Overlay, OverlayId, OverlayKind, ResizeEdge};
pub use project::{LoadedProject, OutputFormat, OutputSettings, Project, ProjectError};
pub use track::{MixingPolicy, Track, TrackId, TrackKind};
pub use zoom::{ZoomConstraints, ZoomState};
