//! Error types for composition mutations.

use crate::overlay::OverlayId;
use crate::track::TrackId;

/// Errors returned by composition store operations.
///
/// Every variant is recoverable from the caller's point of view: the
/// composition is never mutated when an operation fails, so a gesture
/// loop can keep running and re-attempt on the next pointer move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    /// The candidate interval intersects an existing overlay on an
    /// exclusive-mixing track.
    #[error(
        "placement conflict on track {track_id}: [{start_frame}, {start_frame}+{duration_frames}) overlaps an existing overlay"
    )]
    PlacementConflict {
        track_id: TrackId,
        start_frame: u64,
        duration_frames: u64,
    },

    /// Split point is not strictly inside the overlay's interval.
    #[error("invalid split point {at_frame} for overlay {overlay_id}")]
    InvalidSplitPoint { overlay_id: OverlayId, at_frame: u64 },

    /// Resize would violate minimum duration or frame bounds.
    #[error("invalid resize of overlay {overlay_id}: {reason}")]
    InvalidResize { overlay_id: OverlayId, reason: String },

    /// Malformed overlay draft (zero duration, inconsistent trim window).
    #[error("invalid overlay: {message}")]
    InvalidOverlay { message: String },

    /// Unknown overlay id.
    #[error("overlay {0} not found")]
    OverlayNotFound(OverlayId),

    /// Unknown track id.
    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    /// The track's type capability does not accept this overlay kind.
    #[error("track {track_id} does not accept {kind} overlays")]
    IncompatibleKind { track_id: TrackId, kind: &'static str },
}
