//! Frame/second conversion and zoom-aware duration arithmetic.
//!
//! Frames are the atomic time unit (`1/fps` seconds). All comparisons
//! downstream operate on integer frames; floating point only appears at
//! the conversion boundary, so repeated edits cannot accumulate drift.

/// Convert a frame index to seconds.
pub fn frame_to_seconds(frame: u64, fps: u32) -> f64 {
    frame as f64 / fps as f64
}

/// Convert seconds to the nearest frame (round-half-to-nearest).
///
/// Negative inputs clamp to frame 0.
pub fn seconds_to_frame(seconds: f64, fps: u32) -> u64 {
    let frame = (seconds * fps as f64).round();
    if frame <= 0.0 {
        0
    } else {
        frame as u64
    }
}

/// Visible timeline span in seconds for a given zoom scale.
///
/// Zooming in (`scale >= 1`) never shrinks the visible span below the
/// content duration; zooming out expands it by `1/scale` with no upper
/// cap, revealing time beyond the content end.
pub fn viewport_duration_secs(content_secs: f64, scale: f64) -> f64 {
    if scale >= 1.0 {
        content_secs
    } else {
        content_secs / scale
    }
}

/// Horizontal pixel density of the timeline under a zoom scale.
///
/// Monotonic in `scale`: higher scale means more pixels per second.
pub fn pixels_per_second(scale: f64, base_px_per_sec: f64) -> f64 {
    base_px_per_sec * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_seconds_roundtrip() {
        for fps in [24, 25, 30, 60] {
            for frame in [0u64, 1, 29, 30, 89, 90, 1799, 100_000] {
                let secs = frame_to_seconds(frame, fps);
                assert_eq!(seconds_to_frame(secs, fps), frame);
            }
        }
    }

    #[test]
    fn test_seconds_to_frame_rounds_half_to_nearest() {
        // 0.05s at 30fps is 1.5 frames; round gives 2.
        assert_eq!(seconds_to_frame(0.05, 30), 2);
        // 0.04s at 30fps is 1.2 frames.
        assert_eq!(seconds_to_frame(0.04, 30), 1);
    }

    #[test]
    fn test_seconds_to_frame_clamps_negative() {
        assert_eq!(seconds_to_frame(-1.0, 30), 0);
        assert_eq!(seconds_to_frame(-0.001, 60), 0);
    }

    #[test]
    fn test_viewport_duration_zoomed_in_equals_content() {
        assert_eq!(viewport_duration_secs(10.0, 1.0), 10.0);
        assert_eq!(viewport_duration_secs(10.0, 2.5), 10.0);
        assert_eq!(viewport_duration_secs(10.0, 5.0), 10.0);
    }

    #[test]
    fn test_viewport_duration_expands_when_zoomed_out() {
        assert!((viewport_duration_secs(10.0, 0.5) - 20.0).abs() < 1e-9);
        assert!((viewport_duration_secs(10.0, 0.1) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_viewport_duration_monotonic_in_scale() {
        let content = 42.0;
        let mut prev = f64::INFINITY;
        for step in 1..=50 {
            let scale = step as f64 * 0.1;
            let duration = viewport_duration_secs(content, scale);
            assert!(duration <= prev + 1e-9);
            prev = duration;
        }
    }

    #[test]
    fn test_pixels_per_second_monotonic() {
        assert!(pixels_per_second(2.0, 50.0) > pixels_per_second(1.0, 50.0));
        assert!(pixels_per_second(1.0, 50.0) > pixels_per_second(0.5, 50.0));
    }
}
