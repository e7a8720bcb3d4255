//! Pointer gesture handling.
//!
//! One gesture is active at a time per pointer. High-frequency pointer
//! moves are coalesced into a latest-value slot and applied once per
//! animation frame, so the store sees at most one mutation per paint.
//!
//! A store operation that fails mid-gesture (placement conflict, clamp)
//! leaves the overlay at its last valid position and does not abort the
//! gesture; validation is re-attempted on every subsequent frame. The
//! ghost marker always tracks the raw pointer so the UI can show where
//! the user is aiming even while the store refuses the position.

use tracing::{debug, trace};

use montage_common::Coalesced;
use montage_timeline_model::{
    Composition, OverlayId, ResizeEdge, TimelineError, TrackId,
};

use crate::viewport::ViewportController;

/// What the pointer went down on, as resolved by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Body of an overlay.
    Overlay(OverlayId),
    /// Trim handle on an overlay edge.
    OverlayEdge(OverlayId, ResizeEdge),
    /// Time ruler / playhead marker area.
    Ruler,
    /// Empty timeline area.
    Background,
}

/// One pointer position, in viewport-local pixels plus the track lane
/// currently under the cursor (if any).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x_px: f64,
    pub track: Option<TrackId>,
}

/// Current gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Pointer is down but has not crossed the drag threshold; release
    /// here is a click (selection).
    Selecting { hit: HitTarget, origin_px: f64 },
    Dragging {
        overlay: OverlayId,
        /// Frames between the grab point and the overlay start; keeps
        /// the overlay from jumping to the cursor on the first move.
        grab_offset_frames: u64,
    },
    Trimming { overlay: OverlayId, edge: ResizeEdge },
    ScrubbingPlayhead,
}

/// What an engine step produced, for the caller to route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    None,
    /// Click resolved to a selection change.
    Selected(Option<OverlayId>),
    /// Drag applied a move; `snapped` marks a conflict resolved by
    /// snapping to the nearest valid start.
    Moved { overlay: OverlayId, snapped: bool },
    /// Trim applied a resize.
    Trimmed { overlay: OverlayId },
    /// Scrub produced a new playhead frame for the playback layer.
    Scrubbed { frame: u64 },
}

/// The per-pointer gesture state machine.
#[derive(Debug)]
pub struct InteractionEngine {
    gesture: Gesture,
    pending: Coalesced<PointerSample>,
    selected: Option<OverlayId>,

    /// Ghost marker: raw pointer target during a drag, shown by the UI
    /// even when the store refuses the position.
    ghost: Option<(TrackId, u64)>,

    drag_threshold_px: f64,
}

impl InteractionEngine {
    pub fn new(drag_threshold_px: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            pending: Coalesced::new(),
            selected: None,
            ghost: None,
            drag_threshold_px,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    /// Raw drag target for UI hints; `None` outside a drag.
    pub fn ghost_marker(&self) -> Option<(TrackId, u64)> {
        self.ghost
    }

    /// Begin a gesture. Ruler presses scrub immediately; everything else
    /// starts as a potential click until the threshold is crossed.
    pub fn pointer_down(&mut self, hit: HitTarget, sample: PointerSample) -> GestureOutcome {
        self.pending.clear();
        match hit {
            HitTarget::Ruler => {
                self.gesture = Gesture::ScrubbingPlayhead;
                self.pending.submit(sample);
                GestureOutcome::None
            }
            _ => {
                self.gesture = Gesture::Selecting {
                    hit,
                    origin_px: sample.x_px,
                };
                GestureOutcome::None
            }
        }
    }

    /// Record a pointer move. Only promotes the gesture; position is
    /// applied on the next animation frame.
    pub fn pointer_move(
        &mut self,
        comp: &Composition,
        viewport: &ViewportController,
        sample: PointerSample,
    ) {
        if let Gesture::Selecting { hit, origin_px } = self.gesture {
            if (sample.x_px - origin_px).abs() >= self.drag_threshold_px {
                self.gesture = match hit {
                    HitTarget::Overlay(id) => match comp.overlay(id) {
                        Some(overlay) => {
                            let pointer_frame = viewport.pixel_to_frame(origin_px, comp.fps);
                            Gesture::Dragging {
                                overlay: id,
                                grab_offset_frames: pointer_frame
                                    .saturating_sub(overlay.start_frame),
                            }
                        }
                        None => Gesture::Idle,
                    },
                    HitTarget::OverlayEdge(id, edge) => Gesture::Trimming { overlay: id, edge },
                    HitTarget::Background => Gesture::ScrubbingPlayhead,
                    HitTarget::Ruler => Gesture::ScrubbingPlayhead,
                };
                debug!(gesture = ?self.gesture, "gesture promoted");
            }
        }
        self.pending.submit(sample);
    }

    /// Apply the latest coalesced pointer position. Called once per
    /// animation frame by the paint loop.
    pub fn on_animation_frame(
        &mut self,
        comp: &mut Composition,
        viewport: &ViewportController,
    ) -> GestureOutcome {
        let Some(sample) = self.pending.take() else {
            return GestureOutcome::None;
        };

        match self.gesture {
            Gesture::Dragging {
                overlay,
                grab_offset_frames,
            } => self.apply_drag(comp, viewport, overlay, grab_offset_frames, sample),
            Gesture::Trimming { overlay, edge } => {
                let frame = viewport.pixel_to_frame(sample.x_px, comp.fps);
                match comp.resize_overlay(overlay, edge, frame) {
                    Ok(()) => GestureOutcome::Trimmed { overlay },
                    // Stay at the last valid size; re-attempt next frame.
                    Err(e) => {
                        trace!(%e, "trim rejected");
                        GestureOutcome::None
                    }
                }
            }
            Gesture::ScrubbingPlayhead => GestureOutcome::Scrubbed {
                frame: viewport.pixel_to_frame(sample.x_px, comp.fps),
            },
            Gesture::Idle | Gesture::Selecting { .. } => GestureOutcome::None,
        }
    }

    /// End the gesture. Drags and trims keep whatever the last
    /// successful store operation produced; there is no extra snap on
    /// release. Clicks commit selection.
    pub fn pointer_up(
        &mut self,
        comp: &mut Composition,
        viewport: &ViewportController,
    ) -> GestureOutcome {
        // Apply any move still waiting for a paint.
        let last = self.on_animation_frame(comp, viewport);

        let outcome = match self.gesture {
            Gesture::Selecting { hit, .. } => {
                self.selected = match hit {
                    HitTarget::Overlay(id) | HitTarget::OverlayEdge(id, _) => Some(id),
                    _ => None,
                };
                GestureOutcome::Selected(self.selected)
            }
            _ => last,
        };

        self.gesture = Gesture::Idle;
        self.ghost = None;
        self.pending.clear();
        outcome
    }

    /// Abort the gesture without applying the pending position. Already
    /// committed moves stay; the store was never left mid-mutation.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.ghost = None;
        self.pending.clear();
    }

    fn apply_drag(
        &mut self,
        comp: &mut Composition,
        viewport: &ViewportController,
        overlay: OverlayId,
        grab_offset_frames: u64,
        sample: PointerSample,
    ) -> GestureOutcome {
        let Some(current) = comp.overlay(overlay) else {
            self.gesture = Gesture::Idle;
            return GestureOutcome::None;
        };
        let duration = current.duration_frames;
        let target_track = sample.track.unwrap_or(current.track_id);
        let pointer_frame = viewport.pixel_to_frame(sample.x_px, comp.fps);
        let candidate = pointer_frame.saturating_sub(grab_offset_frames);

        self.ghost = Some((target_track, candidate));

        match comp.move_overlay(overlay, target_track, candidate) {
            Ok(()) => GestureOutcome::Moved {
                overlay,
                snapped: false,
            },
            Err(TimelineError::PlacementConflict { .. }) => {
                // Deterministic resolution: snap to the nearest valid
                // start on the destination track and re-attempt.
                let snapped =
                    comp.nearest_valid_start(target_track, duration, candidate, Some(overlay));
                match snapped {
                    Some(start) if comp.move_overlay(overlay, target_track, start).is_ok() => {
                        GestureOutcome::Moved {
                            overlay,
                            snapped: true,
                        }
                    }
                    _ => GestureOutcome::None,
                }
            }
            // Unknown track or incompatible kind: stay at last valid
            // position and keep the gesture alive.
            Err(e) => {
                trace!(%e, "drag rejected");
                GestureOutcome::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_timeline_model::{OverlayDraft, OverlayKind, TrackKind};
    use montage_timeline_model::zoom::ZoomConstraints;

    // 50 px/s at scale 1.0 and 30 fps: one frame is 5/3 px.
    fn viewport() -> ViewportController {
        let mut vc = ViewportController::new(ZoomConstraints::default(), 50.0);
        vc.set_viewport_width_px(1000.0);
        vc.set_content_secs(60.0);
        vc
    }

    fn text_draft(start: u64, duration: u64) -> OverlayDraft {
        OverlayDraft::new(
            OverlayKind::Text {
                text: "block".to_string(),
            },
            start,
            duration,
        )
    }

    fn px_of_frame(vc: &ViewportController, frame: u64) -> f64 {
        vc.frame_to_pixel(frame, 30)
    }

    #[test]
    fn test_click_without_motion_selects() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        engine.pointer_down(
            HitTarget::Overlay(id),
            PointerSample {
                x_px: 10.0,
                track: Some(track),
            },
        );
        let outcome = engine.pointer_up(&mut comp, &vc);
        assert_eq!(outcome, GestureOutcome::Selected(Some(id)));
        assert_eq!(engine.selected(), Some(id));
        // Nothing moved.
        assert_eq!(comp.overlay(id).unwrap().start_frame, 0);
    }

    #[test]
    fn test_sub_threshold_motion_is_still_a_click() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        engine.pointer_down(HitTarget::Overlay(id), sample(10.0));
        engine.pointer_move(&comp, &vc, sample(12.0));
        assert!(matches!(engine.gesture(), Gesture::Selecting { .. }));
        let outcome = engine.pointer_up(&mut comp, &vc);
        assert_eq!(outcome, GestureOutcome::Selected(Some(id)));
    }

    #[test]
    fn test_drag_moves_overlay_per_animation_frame() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        // Grab the overlay body at frame 6 (10 px).
        engine.pointer_down(HitTarget::Overlay(id), sample(10.0));
        // Coalesced: only the last position before the paint applies.
        engine.pointer_move(&comp, &vc, sample(40.0));
        engine.pointer_move(&comp, &vc, sample(80.0));
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 106)));

        let outcome = engine.on_animation_frame(&mut comp, &vc);
        assert_eq!(
            outcome,
            GestureOutcome::Moved {
                overlay: id,
                snapped: false
            }
        );
        // Pointer at frame 106 minus grab offset 6.
        assert_eq!(comp.overlay(id).unwrap().start_frame, 100);

        // No pending input: the next paint is a no-op.
        assert_eq!(
            engine.on_animation_frame(&mut comp, &vc),
            GestureOutcome::None
        );
    }

    #[test]
    fn test_drag_conflict_snaps_to_nearest_valid_start() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        comp.add_overlay(track, text_draft(0, 60)).unwrap();
        let id = comp.add_overlay(track, text_draft(120, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        // Grab at the overlay start, then aim into the occupied region.
        engine.pointer_down(HitTarget::Overlay(id), sample(px_of_frame(&vc, 120)));
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 40)));

        let outcome = engine.on_animation_frame(&mut comp, &vc);
        assert_eq!(
            outcome,
            GestureOutcome::Moved {
                overlay: id,
                snapped: true
            }
        );
        // Snapped out of [0, 60) to the nearest valid start.
        assert_eq!(comp.overlay(id).unwrap().start_frame, 60);
        // The ghost still shows the raw pointer target.
        assert_eq!(engine.ghost_marker(), Some((track, 40)));
        comp.validate().unwrap();
    }

    #[test]
    fn test_release_keeps_last_successful_position() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        engine.pointer_down(HitTarget::Overlay(id), sample(0.0));
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 90)));
        engine.on_animation_frame(&mut comp, &vc);
        // A final move arrives after the last paint; release applies it.
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 45)));
        let outcome = engine.pointer_up(&mut comp, &vc);
        assert_eq!(
            outcome,
            GestureOutcome::Moved {
                overlay: id,
                snapped: false
            }
        );
        assert_eq!(comp.overlay(id).unwrap().start_frame, 45);
        assert_eq!(engine.gesture(), Gesture::Idle);
        assert_eq!(engine.ghost_marker(), None);
    }

    #[test]
    fn test_trim_gesture_resizes_and_survives_rejection() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 90)).unwrap();
        comp.add_overlay(track, text_draft(90, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        engine.pointer_down(
            HitTarget::OverlayEdge(id, ResizeEdge::End),
            sample(px_of_frame(&vc, 90)),
        );
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 60)));
        assert_eq!(
            engine.on_animation_frame(&mut comp, &vc),
            GestureOutcome::Trimmed { overlay: id }
        );
        assert_eq!(comp.overlay(id).unwrap().duration_frames, 60);

        // Dragging into the neighbor is rejected; size stays at the last
        // valid value and the gesture keeps going.
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 100)));
        assert_eq!(
            engine.on_animation_frame(&mut comp, &vc),
            GestureOutcome::None
        );
        assert_eq!(comp.overlay(id).unwrap().duration_frames, 60);

        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 75)));
        engine.pointer_up(&mut comp, &vc);
        assert_eq!(comp.overlay(id).unwrap().duration_frames, 75);
    }

    #[test]
    fn test_ruler_press_scrubs_immediately() {
        let mut comp = Composition::new(30);
        comp.add_track(TrackKind::Overlay, "A");
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        engine.pointer_down(
            HitTarget::Ruler,
            PointerSample {
                x_px: px_of_frame(&vc, 150),
                track: None,
            },
        );
        assert_eq!(engine.gesture(), Gesture::ScrubbingPlayhead);
        assert_eq!(
            engine.on_animation_frame(&mut comp, &vc),
            GestureOutcome::Scrubbed { frame: 150 }
        );
    }

    #[test]
    fn test_cancel_discards_pending_input() {
        let mut comp = Composition::new(30);
        let track = comp.add_track(TrackKind::Overlay, "A");
        let id = comp.add_overlay(track, text_draft(0, 30)).unwrap();
        let vc = viewport();

        let mut engine = InteractionEngine::new(4.0);
        let sample = |x| PointerSample {
            x_px: x,
            track: Some(track),
        };
        engine.pointer_down(HitTarget::Overlay(id), sample(0.0));
        engine.pointer_move(&comp, &vc, sample(px_of_frame(&vc, 200)));
        engine.cancel();

        assert_eq!(
            engine.on_animation_frame(&mut comp, &vc),
            GestureOutcome::None
        );
        assert_eq!(comp.overlay(id).unwrap().start_frame, 0);
        assert_eq!(engine.gesture(), Gesture::Idle);
    }
}
