//! # Frame Rate Tracking
//!
//! The debug panel shows a frame rate that refreshes once per second rather
//! than a jittery per-frame value. [`FrameRateCounter`] counts frames over a
//! window and reports the rounded rate each time the window closes.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use memory_palace::performance::FrameRateCounter;
//!
//! let start = Instant::now();
//! let mut counter = FrameRateCounter::new();
//! assert_eq!(counter.tick(start), None);
//! for i in 1..=59 {
//!     if let Some(fps) = counter.tick(start + Duration::from_millis(i * 17)) {
//!         // 60 frames over 1003 ms
//!         assert_eq!(fps, 60);
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_millis(1000);

/// Frames-per-second over one-second windows
#[derive(Debug, Clone, Default)]
pub struct FrameRateCounter {
    window_start: Option<Instant>,
    frames: u32,
}

impl FrameRateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a frame presented at `now`
    ///
    /// Returns the new rate when more than a second has passed since the
    /// window opened. The very first frame opens the window and counts
    /// towards it; the frame that closes a window belongs to that window.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed <= WINDOW {
            return None;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let fps = (f64::from(self.frames) * 1000.0 / elapsed_ms).round() as u32;
        self.frames = 0;
        self.window_start = Some(now);
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_after_window() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new();
        assert_eq!(counter.tick(start), None);

        // 30 more frames inside the first second do not report
        for i in 1..=30 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 33)), None);
        }
        // Exactly one second is still inside the window
        assert_eq!(counter.tick(start + WINDOW), None);

        // 33 frames over 1.1 s
        assert_eq!(counter.tick(start + Duration::from_millis(1100)), Some(30));
    }

    #[test]
    fn test_first_frame_counts_towards_window() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new();

        // Frames at 0, 17, ..., 1003 ms: sixty frames in total
        let reports: Vec<u32> = (0..60)
            .filter_map(|i| counter.tick(start + Duration::from_millis(i * 17)))
            .collect();
        assert_eq!(reports, vec![60]);
    }

    #[test]
    fn test_window_restarts() {
        let start = Instant::now();
        let mut counter = FrameRateCounter::new();
        counter.tick(start);
        assert_eq!(counter.tick(start + Duration::from_millis(1500)), Some(1));

        // A new window opens at the report time and starts empty
        assert_eq!(counter.tick(start + Duration::from_millis(2000)), None);
        assert_eq!(counter.tick(start + Duration::from_millis(2600)), Some(2));
    }
}
