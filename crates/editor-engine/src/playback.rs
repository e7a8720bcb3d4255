//! Playback synchronization.
//!
//! A single shared `current_frame` cursor consumed by the preview
//! player and timeline markers. Writers are the internal clock tick,
//! explicit seeks, and scrub gestures; the latest write wins. A scrub
//! in progress suspends the clock-tick writer until the gesture ends,
//! so the tick and the gesture never both apply in the same frame.

use montage_common::tick::{SessionClock, TickTimer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// End-of-composition behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Stop on the last frame.
    #[default]
    Stop,
    /// Wrap to frame 0 and keep playing.
    Wrap,
}

/// Shared playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_frame: u64,
}

/// Drives the shared playhead from clock ticks, seeks, and scrubs.
#[derive(Debug)]
pub struct PlaybackSynchronizer {
    state: PlaybackState,
    loop_mode: LoopMode,
    fps: u32,

    /// Session time and frame at the moment playback last (re)started.
    /// Frames are derived from the anchor rather than accumulated per
    /// tick, so uneven tick intervals cannot drift the playhead.
    anchor: Option<PlayAnchor>,

    /// Paces clock ticks at the frame rate; the animation-frame loop may
    /// run faster than `fps`.
    timer: TickTimer,

    clock: SessionClock,
    scrubbing: bool,
}

#[derive(Debug, Clone, Copy)]
struct PlayAnchor {
    started_ns: u64,
    start_frame: u64,
}

impl PlaybackSynchronizer {
    pub fn new(fps: u32, loop_mode: LoopMode) -> Self {
        Self {
            state: PlaybackState {
                is_playing: false,
                current_frame: 0,
            },
            loop_mode,
            fps: fps.max(1),
            anchor: None,
            timer: TickTimer::new(fps.max(1)),
            clock: SessionClock::start(),
            scrubbing: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_frame(&self) -> u64 {
        self.state.current_frame
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Start playback from the current frame. Does not reset the cursor.
    pub fn play(&mut self, now_ns: u64) {
        if !self.state.is_playing {
            self.state.is_playing = true;
            self.anchor = Some(PlayAnchor {
                started_ns: now_ns,
                start_frame: self.state.current_frame,
            });
            self.timer.reset();
            debug!(frame = self.state.current_frame, "playback started");
        }
    }

    /// [`PlaybackSynchronizer::play`] timed off the internal session clock.
    pub fn play_now(&mut self) {
        self.play(self.clock.elapsed_ns());
    }

    /// Pause playback. Does not reset the cursor.
    pub fn pause(&mut self) {
        self.state.is_playing = false;
        self.anchor = None;
    }

    pub fn toggle(&mut self, now_ns: u64) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play(now_ns);
        }
    }

    /// Explicit seek (ruler click, jump-to-overlay). Latest write wins;
    /// a seek during playback re-anchors the clock at the new frame.
    pub fn seek(&mut self, frame: u64, now_ns: u64) {
        self.state.current_frame = frame;
        if self.state.is_playing {
            self.anchor = Some(PlayAnchor {
                started_ns: now_ns,
                start_frame: frame,
            });
            self.timer.reset();
        }
    }

    /// Enter scrub mode: the clock-tick writer is suspended until
    /// [`PlaybackSynchronizer::end_scrub`].
    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    /// Scrub update from the gesture loop. Ignored outside scrub mode.
    pub fn scrub(&mut self, frame: u64) {
        if self.scrubbing {
            self.state.current_frame = frame;
        }
    }

    /// Leave scrub mode; playback (if active) resumes from the scrubbed
    /// frame.
    pub fn end_scrub(&mut self, now_ns: u64) {
        self.scrubbing = false;
        if self.state.is_playing {
            self.anchor = Some(PlayAnchor {
                started_ns: now_ns,
                start_frame: self.state.current_frame,
            });
            self.timer.reset();
        }
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Clock tick from the animation-frame loop. Advances the playhead
    /// to the frame implied by elapsed session time, honoring the loop
    /// mode at the composition end. Returns the frame after the tick.
    ///
    /// Ticks arriving faster than the frame rate are paced down: between
    /// frame boundaries the cursor is returned unchanged.
    pub fn tick(&mut self, now_ns: u64, total_duration_frames: u64) -> u64 {
        if !self.state.is_playing || self.scrubbing {
            return self.state.current_frame;
        }
        let Some(anchor) = self.anchor else {
            return self.state.current_frame;
        };
        if !self.timer.should_tick(now_ns) {
            return self.state.current_frame;
        }

        let elapsed_ns = now_ns.saturating_sub(anchor.started_ns);
        let advanced =
            (elapsed_ns as u128 * self.fps as u128 / 1_000_000_000u128) as u64;
        let raw = anchor.start_frame + advanced;
        let last = total_duration_frames.saturating_sub(1);

        self.state.current_frame = if raw <= last {
            raw
        } else {
            match self.loop_mode {
                LoopMode::Stop => {
                    self.pause();
                    last
                }
                LoopMode::Wrap => {
                    let wrapped = raw % total_duration_frames.max(1);
                    // Re-anchor so the next lap times from the wrap point.
                    self.anchor = Some(PlayAnchor {
                        started_ns: now_ns,
                        start_frame: wrapped,
                    });
                    wrapped
                }
            }
        };
        self.state.current_frame
    }

    /// [`PlaybackSynchronizer::tick`] timed off the internal session clock.
    pub fn tick_now(&mut self, total_duration_frames: u64) -> u64 {
        self.tick(self.clock.elapsed_ns(), total_duration_frames)
    }
}
