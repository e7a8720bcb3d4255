//! The authoritative composition store.
//!
//! Holds the ordered set of tracks plus every overlay, and owns the
//! mutation protocol: every operation validates against placement
//! invariants first and only then applies, so a failed call never leaves
//! the store partially mutated. Invariants held after every mutation:
//!
//! - on any exclusive-mixing track, overlays are pairwise non-overlapping;
//! - every overlay interval lies within `[0, total_duration_frames()]`
//!   (the total is derived, so this holds by construction);
//! - `duration_frames >= 1` and media trim windows satisfy
//!   `source_out - source_in == duration` within source bounds.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::overlay::{Overlay, OverlayId, OverlayKind, ResizeEdge};
use crate::track::{Track, TrackId, TrackKind};

/// A half-open `[start, end)` interval in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: u64,
    pub end: u64,
}

impl FrameRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Payload for creating an overlay; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayDraft {
    pub start_frame: u64,
    pub duration_frames: u64,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: OverlayKind,
    #[serde(default)]
    pub styles: serde_json::Value,
}

impl OverlayDraft {
    pub fn new(kind: OverlayKind, start_frame: u64, duration_frames: u64) -> Self {
        Self {
            start_frame,
            duration_frames,
            z_index: 0,
            label: None,
            kind,
            styles: serde_json::Value::Null,
        }
    }

    fn validate(&self) -> Result<(), TimelineError> {
        if self.duration_frames == 0 {
            return Err(TimelineError::InvalidOverlay {
                message: "duration must be at least one frame".to_string(),
            });
        }
        if let Some((source_in, source_out, source_duration)) = self.kind.media_window() {
            if source_out <= source_in || source_out > source_duration {
                return Err(TimelineError::InvalidOverlay {
                    message: format!(
                        "trim window [{source_in}, {source_out}) exceeds source bounds (len {source_duration})"
                    ),
                });
            }
            if source_out - source_in != self.duration_frames {
                return Err(TimelineError::InvalidOverlay {
                    message: format!(
                        "trim window length {} does not match duration {}",
                        source_out - source_in,
                        self.duration_frames
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Ordered tracks + all overlays + global fps.
///
/// `Clone` is a deep copy: snapshots handed to the render orchestrator
/// are fully independent of later edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    /// Global frame rate; every frame value in the model is relative to it.
    pub fps: u32,

    tracks: Vec<Track>,
    overlays: Vec<Overlay>,

    #[serde(default = "one")]
    next_overlay_id: u64,
    #[serde(default = "one")]
    next_track_id: u64,
}

fn one() -> u64 {
    1
}

impl Composition {
    /// Create an empty composition. `fps` must be non-zero.
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            tracks: Vec::new(),
            overlays: Vec::new(),
            next_overlay_id: 1,
            next_track_id: 1,
        }
    }

    // ---- queries ------------------------------------------------------

    /// Tracks in lane order (top to bottom).
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Lane index of a track; breaks z-index ties in paint order.
    pub fn track_order(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// All overlays, unordered.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Overlays on one track, sorted by start frame.
    pub fn track_overlays(&self, track_id: TrackId) -> Vec<&Overlay> {
        let mut items: Vec<&Overlay> = self
            .overlays
            .iter()
            .filter(|o| o.track_id == track_id)
            .collect();
        items.sort_by_key(|o| (o.start_frame, o.id));
        items
    }

    /// Derived composition length: max overlay end time, never < 1 frame.
    pub fn total_duration_frames(&self) -> u64 {
        self.overlays
            .iter()
            .map(Overlay::end_frame)
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Overlays visible at `frame` in paint order: ascending z-index,
    /// ties broken by track order.
    pub fn paint_order_at(&self, frame: u64) -> Vec<&Overlay> {
        let mut items: Vec<&Overlay> = self
            .overlays
            .iter()
            .filter(|o| o.contains_frame(frame))
            .collect();
        items.sort_by_key(|o| (o.z_index, self.track_order(o.track_id).unwrap_or(usize::MAX)));
        items
    }

    /// Deep, independent copy for render submission.
    pub fn snapshot(&self) -> Composition {
        self.clone()
    }

    // ---- track mutations ---------------------------------------------

    /// Append a new track lane; returns its id.
    pub fn add_track(&mut self, kind: TrackKind, name: impl Into<String>) -> TrackId {
        let id = self.next_track_id;
        self.next_track_id += 1;
        self.tracks.push(Track::new(id, kind, name));
        id
    }

    /// Remove a track and destroy every overlay it owns.
    /// Removing an unknown track is a no-op.
    pub fn remove_track(&mut self, id: TrackId) {
        self.tracks.retain(|t| t.id != id);
        self.overlays.retain(|o| o.track_id != id);
    }

    /// Reorder a track to a new lane index (clamped). Affects paint
    /// order tie-breaking, never overlay timing.
    pub fn move_track(&mut self, id: TrackId, new_index: usize) -> Result<(), TimelineError> {
        let from = self
            .track_order(id)
            .ok_or(TimelineError::TrackNotFound(id))?;
        let track = self.tracks.remove(from);
        self.tracks.insert(new_index.min(self.tracks.len()), track);
        Ok(())
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    // ---- overlay mutations -------------------------------------------

    /// Add an overlay at the draft's exact position.
    ///
    /// Fails with `PlacementConflict` if the track's mixing policy forbids
    /// overlap and the candidate interval intersects an existing overlay.
    pub fn add_overlay(
        &mut self,
        track_id: TrackId,
        draft: OverlayDraft,
    ) -> Result<OverlayId, TimelineError> {
        draft.validate()?;
        self.check_placement(track_id, &draft.kind, draft.start_frame, draft.duration_frames, None)?;

        let id = self.next_overlay_id;
        self.next_overlay_id += 1;
        self.overlays.push(Overlay {
            id,
            track_id,
            start_frame: draft.start_frame,
            duration_frames: draft.duration_frames,
            z_index: draft.z_index,
            label: draft.label,
            kind: draft.kind,
            styles: draft.styles,
        });
        Ok(id)
    }

    /// Drop/insert lifecycle: place the draft at the first non-colliding
    /// position at or after `preferred_start`, ignoring the draft's own
    /// `start_frame`.
    pub fn insert_overlay(
        &mut self,
        track_id: TrackId,
        mut draft: OverlayDraft,
        preferred_start: u64,
    ) -> Result<OverlayId, TimelineError> {
        draft.validate()?;
        let track = self
            .track(track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;

        let start = if track.is_exclusive() {
            self.first_fit(track_id, draft.duration_frames, preferred_start)
        } else {
            preferred_start
        };
        draft.start_frame = start;
        self.add_overlay(track_id, draft)
    }

    /// Move an overlay to a new track and/or start frame.
    ///
    /// Placement is re-validated on the destination; on conflict the call
    /// rejects and the overlay keeps its prior position. Use
    /// [`Composition::nearest_valid_start`] to compute the deterministic
    /// snap target and re-attempt.
    pub fn move_overlay(
        &mut self,
        id: OverlayId,
        new_track_id: TrackId,
        new_start_frame: u64,
    ) -> Result<(), TimelineError> {
        let overlay = self
            .overlay(id)
            .ok_or(TimelineError::OverlayNotFound(id))?;
        let duration = overlay.duration_frames;
        let kind = overlay.kind.clone();

        self.check_placement(new_track_id, &kind, new_start_frame, duration, Some(id))?;

        let overlay = self.overlay_mut_unchecked(id);
        overlay.track_id = new_track_id;
        overlay.start_frame = new_start_frame;
        Ok(())
    }

    /// Trim one edge of an overlay to a new frame.
    ///
    /// Enforces `duration >= 1`; media overlays keep their trim window in
    /// sync and clamped to source bounds, so trimming can never play
    /// frames the asset does not have.
    pub fn resize_overlay(
        &mut self,
        id: OverlayId,
        edge: ResizeEdge,
        new_frame: u64,
    ) -> Result<(), TimelineError> {
        let overlay = self
            .overlay(id)
            .ok_or(TimelineError::OverlayNotFound(id))?;
        let old_start = overlay.start_frame;
        let old_end = overlay.end_frame();
        let window = overlay.kind.media_window();
        let kind = overlay.kind.clone();
        let track_id = overlay.track_id;

        let (new_start, new_end, new_window) = match edge {
            ResizeEdge::Start => {
                if new_frame >= old_end {
                    return Err(TimelineError::InvalidResize {
                        overlay_id: id,
                        reason: format!("start {new_frame} would not leave a single frame before end {old_end}"),
                    });
                }
                let mut start = new_frame;
                let new_window = window.map(|(source_in, source_out, _)| {
                    // Extending left is limited by available lead-in.
                    start = start.max(old_start.saturating_sub(source_in));
                    let new_in = if start >= old_start {
                        source_in + (start - old_start)
                    } else {
                        source_in - (old_start - start)
                    };
                    (new_in, source_out)
                });
                (start, old_end, new_window)
            }
            ResizeEdge::End => {
                if new_frame <= old_start {
                    return Err(TimelineError::InvalidResize {
                        overlay_id: id,
                        reason: format!("end {new_frame} would not leave a single frame after start {old_start}"),
                    });
                }
                let mut end = new_frame;
                let new_window = window.map(|(source_in, _, source_duration)| {
                    // Extending right is limited by remaining source material.
                    let longest = source_duration - source_in;
                    end = end.min(old_start + longest);
                    (source_in, source_in + (end - old_start))
                });
                (old_start, end, new_window)
            }
        };

        let duration = new_end - new_start;
        self.check_placement(track_id, &kind, new_start, duration, Some(id))?;

        let overlay = self.overlay_mut_unchecked(id);
        overlay.start_frame = new_start;
        overlay.duration_frames = duration;
        if let Some((new_in, new_out)) = new_window {
            overlay.kind.set_media_window(new_in, new_out);
        }
        Ok(())
    }

    /// Split an overlay in two at `at_frame`.
    ///
    /// The left half keeps the original id; the right half gets the next
    /// free id. Both inherit styling, label, and z-index; media trim
    /// windows partition exactly, so a conceptual re-merge recovers the
    /// original interval and content.
    pub fn split_overlay(
        &mut self,
        id: OverlayId,
        at_frame: u64,
    ) -> Result<(OverlayId, OverlayId), TimelineError> {
        let overlay = self
            .overlay(id)
            .ok_or(TimelineError::OverlayNotFound(id))?;
        if at_frame <= overlay.start_frame || at_frame >= overlay.end_frame() {
            return Err(TimelineError::InvalidSplitPoint {
                overlay_id: id,
                at_frame,
            });
        }

        let left_duration = at_frame - overlay.start_frame;
        let mut right = overlay.clone();
        right.start_frame = at_frame;
        right.duration_frames = overlay.end_frame() - at_frame;
        if let Some((source_in, source_out, _)) = overlay.kind.media_window() {
            right
                .kind
                .set_media_window(source_in + left_duration, source_out);
        }

        let right_id = self.next_overlay_id;
        self.next_overlay_id += 1;
        right.id = right_id;

        let left = self.overlay_mut_unchecked(id);
        left.duration_frames = left_duration;
        if let Some((source_in, _, _)) = left.kind.media_window() {
            let new_out = source_in + left_duration;
            left.kind.set_media_window(source_in, new_out);
        }
        self.overlays.push(right);
        Ok((id, right_id))
    }

    /// Remove an overlay. Idempotent: removing a nonexistent id is a
    /// no-op success, so undo/redo replay stays simple.
    pub fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.retain(|o| o.id != id);
    }

    // ---- placement ----------------------------------------------------

    /// Lazy sequence of unoccupied intervals on a track, ascending,
    /// including the trailing gap up to the composition end. Finite and
    /// restartable on each call.
    pub fn find_gaps(&self, track_id: TrackId) -> Result<GapIter, TimelineError> {
        if self.track(track_id).is_none() {
            return Err(TimelineError::TrackNotFound(track_id));
        }
        Ok(GapIter::new(
            self.occupied_intervals(track_id, None),
            self.total_duration_frames(),
        ))
    }

    /// Deterministic snap target: the valid start frame for an interval of
    /// `duration` frames on `track_id` nearest to `desired`. `exclude`
    /// ignores one overlay (the one being moved). Returns `None` only for
    /// unknown tracks; past the content end there is always room.
    pub fn nearest_valid_start(
        &self,
        track_id: TrackId,
        duration: u64,
        desired: u64,
        exclude: Option<OverlayId>,
    ) -> Option<u64> {
        let track = self.track(track_id)?;
        if !track.is_exclusive() {
            return Some(desired);
        }

        let occupied = self.occupied_intervals(track_id, exclude);
        let track_end = occupied.last().map(|r| r.end).unwrap_or(0);
        let total = self.total_duration_frames();

        let mut best: Option<u64> = None;
        let mut consider = |candidate: u64| {
            let better = match best {
                None => true,
                Some(current) => {
                    let d_new = candidate.abs_diff(desired);
                    let d_cur = current.abs_diff(desired);
                    d_new < d_cur || (d_new == d_cur && candidate < current)
                }
            };
            if better {
                best = Some(candidate);
            }
        };

        for gap in GapIter::new(occupied, total.max(track_end)) {
            if gap.len() < duration {
                continue;
            }
            consider(desired.clamp(gap.start, gap.end - duration));
        }
        // The open span after the last occupied frame always fits.
        consider(desired.max(track_end));
        best
    }

    /// Full invariant scan; used by validation tooling and tests.
    pub fn validate(&self) -> Result<(), TimelineError> {
        for overlay in &self.overlays {
            let track = self
                .track(overlay.track_id)
                .ok_or(TimelineError::TrackNotFound(overlay.track_id))?;
            if overlay.duration_frames == 0 {
                return Err(TimelineError::InvalidOverlay {
                    message: format!("overlay {} has zero duration", overlay.id),
                });
            }
            if !track.kind.accepts(&overlay.kind) {
                return Err(TimelineError::IncompatibleKind {
                    track_id: track.id,
                    kind: overlay.kind.name(),
                });
            }
            if let Some((source_in, source_out, source_duration)) = overlay.kind.media_window() {
                if source_out <= source_in
                    || source_out > source_duration
                    || source_out - source_in != overlay.duration_frames
                {
                    return Err(TimelineError::InvalidOverlay {
                        message: format!("overlay {} has an inconsistent trim window", overlay.id),
                    });
                }
            }
            if track.is_exclusive() {
                for other in &self.overlays {
                    if other.id != overlay.id
                        && other.track_id == overlay.track_id
                        && other.overlaps(overlay.start_frame, overlay.duration_frames)
                    {
                        return Err(TimelineError::PlacementConflict {
                            track_id: track.id,
                            start_frame: overlay.start_frame,
                            duration_frames: overlay.duration_frames,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // ---- internals ----------------------------------------------------

    fn overlay_mut_unchecked(&mut self, id: OverlayId) -> &mut Overlay {
        self.overlays
            .iter_mut()
            .find(|o| o.id == id)
            .expect("overlay id validated by caller")
    }

    fn check_placement(
        &self,
        track_id: TrackId,
        kind: &OverlayKind,
        start_frame: u64,
        duration_frames: u64,
        exclude: Option<OverlayId>,
    ) -> Result<(), TimelineError> {
        let track = self
            .track(track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;
        if !track.kind.accepts(kind) {
            return Err(TimelineError::IncompatibleKind {
                track_id,
                kind: kind.name(),
            });
        }
        if track.is_exclusive() {
            let collision = self.overlays.iter().any(|o| {
                o.track_id == track_id
                    && Some(o.id) != exclude
                    && o.overlaps(start_frame, duration_frames)
            });
            if collision {
                return Err(TimelineError::PlacementConflict {
                    track_id,
                    start_frame,
                    duration_frames,
                });
            }
        }
        Ok(())
    }

    /// Sorted, merged occupied intervals of a track.
    fn occupied_intervals(&self, track_id: TrackId, exclude: Option<OverlayId>) -> Vec<FrameRange> {
        let mut intervals: Vec<FrameRange> = self
            .overlays
            .iter()
            .filter(|o| o.track_id == track_id && Some(o.id) != exclude)
            .map(|o| FrameRange {
                start: o.start_frame,
                end: o.end_frame(),
            })
            .collect();
        intervals.sort_by_key(|r| r.start);

        let mut merged: Vec<FrameRange> = Vec::with_capacity(intervals.len());
        for range in intervals {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }

    /// First start >= `preferred` where `duration` frames fit.
    fn first_fit(&self, track_id: TrackId, duration: u64, preferred: u64) -> u64 {
        let occupied = self.occupied_intervals(track_id, None);
        let track_end = occupied.last().map(|r| r.end).unwrap_or(0);
        for gap in GapIter::new(occupied, self.total_duration_frames()) {
            let candidate = gap.start.max(preferred);
            if candidate + duration <= gap.end {
                return candidate;
            }
        }
        preferred.max(track_end)
    }
}

/// Iterator over unoccupied intervals of a track, ascending in time.
///
/// Produced by [`Composition::find_gaps`]; each call builds a fresh
/// iterator, so the sequence is restartable.
#[derive(Debug)]
pub struct GapIter {
    occupied: std::vec::IntoIter<FrameRange>,
    cursor: u64,
    end: u64,
    done: bool,
}

impl GapIter {
    fn new(occupied: Vec<FrameRange>, end: u64) -> Self {
        Self {
            occupied: occupied.into_iter(),
            cursor: 0,
            end,
            done: false,
        }
    }
}

impl Iterator for GapIter {
    type Item = FrameRange;

    fn next(&mut self) -> Option<FrameRange> {
        while !self.done {
            match self.occupied.next() {
                Some(range) => {
                    let gap = FrameRange {
                        start: self.cursor,
                        end: range.start,
                    };
                    self.cursor = self.cursor.max(range.end);
                    if !gap.is_empty() {
                        return Some(gap);
                    }
                }
                None => {
                    self.done = true;
                    let tail = FrameRange {
                        start: self.cursor,
                        end: self.end,
                    };
                    if !tail.is_empty() {
                        return Some(tail);
                    }
                }
            }
        }
        None
    }
}
