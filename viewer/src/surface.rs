//! `Surface` over a `CanvasRenderingContext2d`.

use std::f64::consts::TAU;

use stage::asset::ImageHandle;
use stage::color::Hsl;
use stage::render::{Blend, Surface};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::assets::{AssetCache, Bitmap};

const OVERLAY_STYLE: &str = "rgba(255, 255, 255, 0.8)";
const OVERLAY_FONT: &str = "12px monospace";

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas call failed: {0}")]
    Js(String),
    #[error("no bitmap cached for image {0}")]
    MissingBitmap(u64),
}

impl From<JsValue> for CanvasError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Borrowed view of the page canvas and the bitmaps it can draw.
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    assets: &'a AssetCache,
}

impl<'a> CanvasSurface<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, assets: &'a AssetCache) -> Self {
        Self { ctx, assets }
    }
}

impl Surface for CanvasSurface<'_> {
    type Error = CanvasError;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(0.0, 0.0, width, height);
        Ok(())
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), CanvasError> {
        Ok(self.ctx.translate(x, y)?)
    }

    fn rotate(&mut self, angle: f64) -> Result<(), CanvasError> {
        Ok(self.ctx.rotate(angle)?)
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), CanvasError> {
        Ok(self.ctx.scale(sx, sy)?)
    }

    fn set_blend(&mut self, blend: Blend) -> Result<(), CanvasError> {
        let op = match blend {
            Blend::Normal => "source-over",
            Blend::Multiply => "multiply",
        };
        Ok(self.ctx.set_global_composite_operation(op)?)
    }

    fn fill_rect(&mut self, color: &Hsl, x: f64, y: f64, width: f64, height: f64) -> Result<(), CanvasError> {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(x, y, width, height);
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) -> Result<(), CanvasError> {
        match self.assets.bitmap(image.key) {
            Some(Bitmap::Image(img)) => {
                Ok(self.ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, width, height)?)
            }
            Some(Bitmap::Canvas(canvas)) => {
                Ok(self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(canvas, x, y, width, height)?)
            }
            None => Err(CanvasError::MissingBitmap(image.key)),
        }
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &Hsl, alpha: f64) -> Result<(), CanvasError> {
        self.ctx.save();
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        let arc = self.ctx.arc(x, y, radius, 0.0, TAU);
        if arc.is_ok() {
            self.ctx.fill();
        }
        self.ctx.restore();
        Ok(arc?)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), CanvasError> {
        self.ctx.set_fill_style_str(OVERLAY_STYLE);
        self.ctx.set_font(OVERLAY_FONT);
        Ok(self.ctx.fill_text(text, x, y)?)
    }
}
