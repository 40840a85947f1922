#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use protocol::ViewportPatch;

/// The visible region entities move in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: 1920.0, height: 1080.0, scale: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Merge the fields present in `patch`. Non-finite values are ignored.
    pub fn apply(&mut self, patch: &ViewportPatch) {
        let merge = |slot: &mut f64, value: Option<f64>| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                *slot = v;
            }
        };
        merge(&mut self.x, patch.x);
        merge(&mut self.y, patch.y);
        merge(&mut self.width, patch.width);
        merge(&mut self.height, patch.height);
        merge(&mut self.scale, patch.scale);
    }
}
