//! Track lanes and their type capabilities.

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayKind;

/// Stable track identifier, assigned by the composition.
pub type TrackId = u64;

/// What a lane is allowed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
    Caption,
    Sticker,
    /// Generic overlay lane: accepts any visual overlay kind.
    Overlay,
}

impl TrackKind {
    /// Whether an overlay of the given kind may live on this track.
    pub fn accepts(&self, kind: &OverlayKind) -> bool {
        match self {
            TrackKind::Video => matches!(kind, OverlayKind::Video { .. }),
            TrackKind::Audio => matches!(kind, OverlayKind::Audio { .. }),
            TrackKind::Caption => matches!(kind, OverlayKind::Caption { .. }),
            TrackKind::Sticker => matches!(kind, OverlayKind::Sticker { .. }),
            TrackKind::Overlay => !matches!(kind, OverlayKind::Audio { .. }),
        }
    }
}

/// Temporal mixing policy for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MixingPolicy {
    /// Overlays on this track are pairwise non-overlapping in time.
    #[default]
    Exclusive,
    /// Overlays may overlap freely (e.g., layered stickers).
    Free,
}

/// An ordered lane holding overlays of compatible types.
///
/// Track order breaks paint-order ties between overlays that share a
/// `z_index` in the same time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier.
    pub id: TrackId,

    /// Human-readable name.
    pub name: String,

    /// Type capability of this lane.
    pub kind: TrackKind,

    /// Whether overlays here may overlap in time.
    #[serde(default)]
    pub mixing: MixingPolicy,

    /// Whether the track contributes to the preview.
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Whether the track's audio is muted.
    #[serde(default)]
    pub muted: bool,
}

fn default_true() -> bool {
    true
}

impl Track {
    pub fn new(id: TrackId, kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            mixing: MixingPolicy::default(),
            visible: true,
            muted: false,
        }
    }

    /// Whether this track forbids temporal overlap.
    pub fn is_exclusive(&self) -> bool {
        self.mixing == MixingPolicy::Exclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_kind() -> OverlayKind {
        OverlayKind::Video {
            src: "clips/a.mp4".to_string(),
            source_in_frame: 0,
            source_out_frame: 90,
            source_duration_frames: 300,
        }
    }

    #[test]
    fn test_track_kind_capabilities() {
        assert!(TrackKind::Video.accepts(&video_kind()));
        assert!(!TrackKind::Audio.accepts(&video_kind()));
        assert!(TrackKind::Caption.accepts(&OverlayKind::Caption {
            text: "hi".into(),
            template: None,
        }));
        // Generic overlay lanes take anything visual but not audio.
        assert!(TrackKind::Overlay.accepts(&video_kind()));
        assert!(!TrackKind::Overlay.accepts(&OverlayKind::Audio {
            src: "a.wav".into(),
            source_in_frame: 0,
            source_out_frame: 30,
            source_duration_frames: 30,
        }));
    }

    #[test]
    fn test_track_defaults_exclusive_and_visible() {
        let track = Track::new(1, TrackKind::Video, "V1");
        assert!(track.is_exclusive());
        assert!(track.visible);
        assert!(!track.muted);
    }

    #[test]
    fn test_track_deserialization_defaults_legacy_fields() {
        let raw = r#"{"id":3,"name":"V1","kind":"video"}"#;
        let track: Track = serde_json::from_str(raw).unwrap();
        assert_eq!(track.mixing, MixingPolicy::Exclusive);
        assert!(track.visible);
        assert!(!track.muted);
    }
}
