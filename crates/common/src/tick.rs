//! Tick and pacing utilities.
//!
//! The editing surface is driven by an animation-frame loop: playback
//! advances once per tick, and high-frequency pointer input is coalesced
//! so the store sees at most one mutation per paint. This module provides
//! the monotonic pacing primitives both loops share.

use std::time::Instant;

/// A monotonic clock anchored to a fixed epoch (editor session start).
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

/// Fixed-rate tick controller for playback and polling loops.
#[derive(Debug)]
pub struct TickTimer {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl TickTimer {
    /// Create a timer targeting the given Hz rate. A rate of zero is
    /// treated as 1 Hz.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Nanoseconds elapsed since the last accepted tick, at `current_ns`.
    /// Zero before the first tick.
    pub fn since_last_tick_ns(&self, current_ns: u64) -> u64 {
        match self.last_tick_ns {
            Some(last) => current_ns.saturating_sub(last),
            None => 0,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }

    /// Forget pacing history; the next `should_tick` fires immediately.
    pub fn reset(&mut self) {
        self.last_tick_ns = None;
    }
}

/// Latest-value slot for coalescing high-frequency input.
///
/// Writers overwrite freely between paints; the paint handler takes the
/// single surviving value. Intermediate values are dropped: the last
/// computed position before each paint is authoritative.
#[derive(Debug, Default)]
pub struct Coalesced<T> {
    pending: Option<T>,
}

impl<T> Coalesced<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Replace any pending value with a newer one.
    pub fn submit(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// Take the pending value, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Whether a value is waiting for the next paint.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Discard any pending value.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
