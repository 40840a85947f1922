//! Rendering: draws entities, particles, and the debug overlay to a [`Surface`].
//!
//! The renderer reads the store and particle batches and never mutates them.
//! Hosts implement [`Surface`] over whatever they draw on (a 2D canvas
//! context in the browser, a counting sink natively), so this module stays
//! free of platform types.
//!
//! Surface errors abort only the entity being drawn: its transform is
//! restored, it is counted as skipped, and the frame goes on.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Display;

use crate::asset::ImageHandle;
use crate::color::Hsl;
use crate::consts::{DEBUG_LINE_HEIGHT, DEBUG_TEXT_LEFT, DEBUG_TEXT_TOP};
use crate::entity::{Entity, EntityStore};
use crate::particles::ParticleSystem;
use crate::viewport::Viewport;

/// Compositing mode for fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Normal,
    Multiply,
}

/// The drawing operations the renderer needs.
pub trait Surface {
    type Error: Display;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), Self::Error>;
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    /// Radians.
    fn rotate(&mut self, angle: f64) -> Result<(), Self::Error>;
    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), Self::Error>;
    fn set_blend(&mut self, blend: Blend) -> Result<(), Self::Error>;
    fn fill_rect(&mut self, color: &Hsl, x: f64, y: f64, width: f64, height: f64) -> Result<(), Self::Error>;
    fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) -> Result<(), Self::Error>;
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &Hsl, alpha: f64) -> Result<(), Self::Error>;
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

/// What one frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub entities_drawn: usize,
    /// Entities without an image, with non-finite values, or whose draw failed.
    pub entities_skipped: usize,
    pub particles_drawn: usize,
}

/// Draw one full frame.
///
/// # Errors
///
/// Returns `Err` only if clearing the surface fails. Per-entity failures are
/// logged and counted in [`RenderStats::entities_skipped`].
pub fn draw<S: Surface>(
    surface: &mut S,
    store: &EntityStore,
    particles: &ParticleSystem,
    viewport: &Viewport,
    debug: bool,
) -> Result<RenderStats, S::Error> {
    let mut stats = RenderStats::default();
    surface.clear(viewport.width, viewport.height)?;

    // Layer 1: entities in store order.
    for entity in store.iter() {
        let Some(image) = entity.image else {
            stats.entities_skipped += 1;
            continue;
        };
        if !entity.is_drawable() {
            stats.entities_skipped += 1;
            continue;
        }
        surface.save();
        let result = draw_entity(surface, entity, &image);
        surface.restore();
        match result {
            Ok(()) => stats.entities_drawn += 1,
            Err(e) => {
                log::warn!("draw failed for entity {}: {e}", entity.id);
                stats.entities_skipped += 1;
            }
        }
    }

    // Layer 2: particles above entities.
    for p in particles.iter().filter(|p| p.is_alive()) {
        if surface.fill_circle(p.x, p.y, p.size, &p.color, p.alpha).is_ok() {
            stats.particles_drawn += 1;
        }
    }

    // Layer 3: debug overlay.
    if debug {
        draw_overlay(surface, store);
    }

    Ok(stats)
}

fn draw_entity<S: Surface>(surface: &mut S, entity: &Entity, image: &ImageHandle) -> Result<(), S::Error> {
    let (w, h) = (entity.width, entity.height);
    surface.translate(entity.x, entity.y)?;
    surface.rotate(entity.angle)?;
    surface.scale(entity.scale, entity.scale)?;
    if let Some(tint) = &entity.tint {
        surface.set_blend(Blend::Multiply)?;
        surface.fill_rect(tint, -w / 2.0, -h / 2.0, w, h)?;
        surface.set_blend(Blend::Normal)?;
    }
    surface.draw_image(image, -w / 2.0, -h / 2.0, w, h)
}

/// One overlay line per entity.
#[must_use]
pub fn debug_line(entity: &Entity) -> String {
    format!(
        "Entity {}: ({:.0}, {:.0}) v({:.2}, {:.2})",
        entity.id, entity.x, entity.y, entity.vx, entity.vy
    )
}

fn draw_overlay<S: Surface>(surface: &mut S, store: &EntityStore) {
    let mut y = DEBUG_TEXT_TOP;
    for entity in store.iter() {
        if let Err(e) = surface.fill_text(&debug_line(entity), DEBUG_TEXT_LEFT, y) {
            log::warn!("debug overlay failed: {e}");
            return;
        }
        y += DEBUG_LINE_HEIGHT;
    }
}
