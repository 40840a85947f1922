#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use crate::consts::FPS_WINDOW_MS;

/// Counts frames and publishes a frame rate once per measurement window.
#[derive(Debug, Clone, Default)]
pub struct FrameMeter {
    frames: u32,
    window_start: Option<f64>,
    fps: f64,
}

impl FrameMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`. Returns the new rate when a window closes.
    pub fn record(&mut self, now_ms: f64) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            self.frames = 0;
            return None;
        };
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed < FPS_WINDOW_MS {
            return None;
        }
        self.fps = (f64::from(self.frames) * 1000.0 / elapsed).round();
        self.frames = 0;
        self.window_start = Some(now_ms);
        Some(self.fps)
    }

    /// Last published rate; 0 until the first window closes.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
