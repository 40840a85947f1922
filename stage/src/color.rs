#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// An HSL color. Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub const WHITE: Self = Self { hue: 0.0, saturation: 0.0, lightness: 100.0 };

    #[must_use]
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self { hue, saturation, lightness }
    }

    /// CSS color string, e.g. `hsl(200, 70%, 60%)`. Hue is normalized to `[0, 360)`.
    #[must_use]
    pub fn css(&self) -> String {
        let hue = self.hue.rem_euclid(360.0);
        format!("hsl({hue:.0}, {:.0}%, {:.0}%)", self.saturation, self.lightness)
    }
}
