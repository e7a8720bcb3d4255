//! Viewport zoom and scroll control.
//!
//! Maps between screen pixels and timeline time under a zoom scale, and
//! keeps scale and scroll inside their legal ranges. The controller
//! never touches overlay data; zooming is purely a view transform.

use montage_timeline_model::time::{pixels_per_second, viewport_duration_secs};
use montage_timeline_model::zoom::{ZoomConstraints, ZoomState};

/// Controls one timeline view's zoom scale and horizontal scroll.
#[derive(Debug, Clone)]
pub struct ViewportController {
    constraints: ZoomConstraints,
    state: ZoomState,

    /// Pixel density at scale 1.0.
    base_px_per_sec: f64,

    /// Visible widget width in pixels.
    viewport_width_px: f64,

    /// Content duration in seconds, fed from the composition.
    content_secs: f64,
}

impl ViewportController {
    pub fn new(constraints: ZoomConstraints, base_px_per_sec: f64) -> Self {
        let state = ZoomState {
            scale: constraints.default,
            scroll_offset_secs: 0.0,
        };
        Self {
            constraints,
            state,
            base_px_per_sec,
            viewport_width_px: 0.0,
            content_secs: 0.0,
        }
    }

    /// Restore a persisted view state; the scale is re-clamped in case
    /// the constraints changed since it was saved.
    pub fn with_state(mut self, state: ZoomState) -> Self {
        self.state = ZoomState {
            scale: self.constraints.clamp(state.scale),
            scroll_offset_secs: state.scroll_offset_secs.max(0.0),
        };
        self.clamp_scroll();
        self
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn scroll_offset_secs(&self) -> f64 {
        self.state.scroll_offset_secs
    }

    /// Update the visible widget width (on layout change).
    pub fn set_viewport_width_px(&mut self, width_px: f64) {
        self.viewport_width_px = width_px.max(0.0);
        self.clamp_scroll();
    }

    /// Update the content duration (after any composition edit).
    pub fn set_content_secs(&mut self, content_secs: f64) {
        self.content_secs = content_secs.max(0.0);
        self.clamp_scroll();
    }

    /// Current pixel density. Monotonic in scale.
    pub fn pixels_per_second(&self) -> f64 {
        pixels_per_second(self.state.scale, self.base_px_per_sec)
    }

    /// Total scrollable timeline span in seconds at the current scale.
    pub fn timeline_duration_secs(&self) -> f64 {
        viewport_duration_secs(self.content_secs, self.state.scale)
    }

    /// Span of time visible in the widget, in seconds.
    pub fn visible_secs(&self) -> f64 {
        let pps = self.pixels_per_second();
        if pps <= 0.0 {
            0.0
        } else {
            self.viewport_width_px / pps
        }
    }

    // ---- coordinate mapping ------------------------------------------

    /// Timeline time under a viewport-local x pixel.
    pub fn pixel_to_seconds(&self, x_px: f64) -> f64 {
        (self.state.scroll_offset_secs + x_px / self.pixels_per_second()).max(0.0)
    }

    /// Nearest frame under a viewport-local x pixel.
    pub fn pixel_to_frame(&self, x_px: f64, fps: u32) -> u64 {
        montage_timeline_model::time::seconds_to_frame(self.pixel_to_seconds(x_px), fps)
    }

    /// Viewport-local x pixel of a frame (may be off-screen).
    pub fn frame_to_pixel(&self, frame: u64, fps: u32) -> f64 {
        let secs = montage_timeline_model::time::frame_to_seconds(frame, fps);
        (secs - self.state.scroll_offset_secs) * self.pixels_per_second()
    }

    // ---- zoom ---------------------------------------------------------

    /// One discrete zoom-in step (button/keyboard).
    pub fn zoom_in(&mut self) {
        self.set_scale(self.state.scale + self.constraints.step);
    }

    /// One discrete zoom-out step.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.state.scale - self.constraints.step);
    }

    /// Wheel/trackpad zoom: positive notches zoom in.
    pub fn wheel_zoom(&mut self, notches: f64) {
        self.set_scale(self.state.scale + notches * self.constraints.wheel_step);
    }

    /// Set the scale directly, clamped to the constraints.
    pub fn set_scale(&mut self, scale: f64) {
        self.state.scale = self.constraints.clamp(scale);
        self.clamp_scroll();
    }

    /// Explicit user reset: default scale, scroll back to the start.
    pub fn reset(&mut self) {
        self.state.scale = self.constraints.default;
        self.state.scroll_offset_secs = 0.0;
    }

    /// Zoom keeping the time under `anchor_px` fixed on screen, so the
    /// content does not slide out from under the cursor.
    pub fn zoom_at(&mut self, anchor_px: f64, new_scale: f64) {
        let anchor_secs = self.pixel_to_seconds(anchor_px);
        self.state.scale = self.constraints.clamp(new_scale);
        let pps = self.pixels_per_second();
        if pps > 0.0 {
            self.state.scroll_offset_secs = (anchor_secs - anchor_px / pps).max(0.0);
        }
        self.clamp_scroll();
    }

    // ---- scroll -------------------------------------------------------

    /// Scroll to an absolute offset in seconds, clamped to the timeline.
    pub fn scroll_to(&mut self, offset_secs: f64) {
        self.state.scroll_offset_secs = offset_secs.max(0.0);
        self.clamp_scroll();
    }

    /// Scroll by a pixel delta (positive scrolls toward later time).
    pub fn scroll_by_px(&mut self, delta_px: f64) {
        let pps = self.pixels_per_second();
        if pps > 0.0 {
            self.scroll_to(self.state.scroll_offset_secs + delta_px / pps);
        }
    }

    /// Scroll so a frame is visible, centering it when possible.
    pub fn reveal_frame(&mut self, frame: u64, fps: u32) {
        let secs = montage_timeline_model::time::frame_to_seconds(frame, fps);
        let visible = self.visible_secs();
        if secs < self.state.scroll_offset_secs
            || secs > self.state.scroll_offset_secs + visible
        {
            self.scroll_to(secs - visible / 2.0);
        }
    }

    fn clamp_scroll(&mut self) {
        let max_scroll = (self.timeline_duration_secs() - self.visible_secs()).max(0.0);
        self.state.scroll_offset_secs = self.state.scroll_offset_secs.clamp(0.0, max_scroll);
    }
}
