//! Overlay entities: the elements placed on the timeline.
//!
//! An overlay is polymorphic over its payload via a tagged union rather
//! than a trait object: the `type` discriminant plus a kind-specific
//! payload keeps serialization trivial and lets the store treat timing
//! uniformly while payloads stay opaque.

use serde::{Deserialize, Serialize};

use crate::track::TrackId;

/// Stable overlay identifier, assigned by the composition.
pub type OverlayId = u64;

/// Which edge of an overlay a trim operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeEdge {
    Start,
    End,
}

/// Kind-specific payload.
///
/// Media kinds (video/audio) carry a trim window into the underlying
/// asset: at playback speed 1.0,
/// `source_out_frame - source_in_frame == duration_frames`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayKind {
    Video {
        /// Media source reference (opaque per-user path).
        src: String,
        /// First asset frame played.
        source_in_frame: u64,
        /// One past the last asset frame played.
        source_out_frame: u64,
        /// Total length of the underlying asset.
        source_duration_frames: u64,
    },

    Audio {
        src: String,
        source_in_frame: u64,
        source_out_frame: u64,
        source_duration_frames: u64,
    },

    Caption {
        text: String,
        /// Styling template identifier, opaque to the engine.
        template: Option<String>,
    },

    Sticker {
        /// Sticker content reference.
        content_id: String,
    },

    Text {
        text: String,
    },

    Shape {
        shape: String,
    },
}

impl OverlayKind {
    /// Discriminant name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            OverlayKind::Video { .. } => "video",
            OverlayKind::Audio { .. } => "audio",
            OverlayKind::Caption { .. } => "caption",
            OverlayKind::Sticker { .. } => "sticker",
            OverlayKind::Text { .. } => "text",
            OverlayKind::Shape { .. } => "shape",
        }
    }

    /// Whether this kind carries a media trim window.
    pub fn is_media(&self) -> bool {
        matches!(self, OverlayKind::Video { .. } | OverlayKind::Audio { .. })
    }

    /// Whether this kind produces audible content.
    pub fn has_audio(&self) -> bool {
        matches!(self, OverlayKind::Video { .. } | OverlayKind::Audio { .. })
    }

    /// Whether this kind produces visible content.
    pub fn has_visual(&self) -> bool {
        !matches!(self, OverlayKind::Audio { .. })
    }

    /// Trim window `(source_in, source_out, source_duration)` for media kinds.
    pub fn media_window(&self) -> Option<(u64, u64, u64)> {
        match self {
            OverlayKind::Video {
                source_in_frame,
                source_out_frame,
                source_duration_frames,
                ..
            }
            | OverlayKind::Audio {
                source_in_frame,
                source_out_frame,
                source_duration_frames,
                ..
            } => Some((*source_in_frame, *source_out_frame, *source_duration_frames)),
            _ => None,
        }
    }

    /// Replace the trim window on media kinds; no-op for other kinds.
    pub(crate) fn set_media_window(&mut self, new_in: u64, new_out: u64) {
        match self {
            OverlayKind::Video {
                source_in_frame,
                source_out_frame,
                ..
            }
            | OverlayKind::Audio {
                source_in_frame,
                source_out_frame,
                ..
            } => {
                *source_in_frame = new_in;
                *source_out_frame = new_out;
            }
            _ => {}
        }
    }
}

/// A single placed element on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Unique, stable for the lifetime of the composition.
    pub id: OverlayId,

    /// Owning track. Exactly one track owns each overlay at any time.
    pub track_id: TrackId,

    /// Timeline position, fps-relative.
    pub start_frame: u64,

    /// Length in frames, always >= 1.
    pub duration_frames: u64,

    /// Paint order among overlays sharing a time range; ties broken by
    /// track order.
    #[serde(default)]
    pub z_index: i32,

    /// Optional display label.
    #[serde(default)]
    pub label: Option<String>,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: OverlayKind,

    /// Type-specific styling, opaque to the engine.
    #[serde(default)]
    pub styles: serde_json::Value,
}

impl Overlay {
    /// One past the last occupied frame.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.duration_frames
    }

    /// Whether this overlay occupies the given frame.
    pub fn contains_frame(&self, frame: u64) -> bool {
        frame >= self.start_frame && frame < self.end_frame()
    }

    /// Whether two half-open intervals intersect.
    pub fn overlaps(&self, start_frame: u64, duration_frames: u64) -> bool {
        let end = start_frame + duration_frames;
        self.start_frame < end && start_frame < self.end_frame()
    }
}
