//! A surface that draws nothing and counts what it was asked to draw.
//!
//! The headless node renders every frame through it so the full draw path
//! runs, and reports the counts in its stats line.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::convert::Infallible;

use stage::asset::ImageHandle;
use stage::color::Hsl;
use stage::render::{Blend, Surface};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub frames: u64,
    pub images: u64,
    pub placeholders: u64,
    pub tints: u64,
    pub circles: u64,
    pub texts: u64,
}

#[derive(Debug, Default)]
pub struct TallySurface {
    pub tally: Tally,
    depth: usize,
    max_depth: usize,
}

impl TallySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts since the last call.
    pub fn take(&mut self) -> Tally {
        std::mem::take(&mut self.tally)
    }

    /// Deepest save stack seen; stays at 1 when every save is restored.
    #[cfg(test)]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[cfg(test)]
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }
}

impl Surface for TallySurface {
    type Error = Infallible;

    fn clear(&mut self, _width: f64, _height: f64) -> Result<(), Infallible> {
        self.tally.frames += 1;
        Ok(())
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn translate(&mut self, _x: f64, _y: f64) -> Result<(), Infallible> {
        Ok(())
    }

    fn rotate(&mut self, _angle: f64) -> Result<(), Infallible> {
        Ok(())
    }

    fn scale(&mut self, _sx: f64, _sy: f64) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_blend(&mut self, _blend: Blend) -> Result<(), Infallible> {
        Ok(())
    }

    fn fill_rect(&mut self, _color: &Hsl, _x: f64, _y: f64, _w: f64, _h: f64) -> Result<(), Infallible> {
        self.tally.tints += 1;
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageHandle, _x: f64, _y: f64, _w: f64, _h: f64) -> Result<(), Infallible> {
        self.tally.images += 1;
        if image.placeholder {
            self.tally.placeholders += 1;
        }
        Ok(())
    }

    fn fill_circle(&mut self, _x: f64, _y: f64, _r: f64, _color: &Hsl, _alpha: f64) -> Result<(), Infallible> {
        self.tally.circles += 1;
        Ok(())
    }

    fn fill_text(&mut self, _text: &str, _x: f64, _y: f64) -> Result<(), Infallible> {
        self.tally.texts += 1;
        Ok(())
    }
}
