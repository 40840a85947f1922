//! Per-tick kinematics: integrate, bounce off the margins, damp, jitter.

#[cfg(test)]
#[path = "physics_test.rs"]
mod physics_test;

use rand::Rng;

use crate::consts::{BOUNDARY_MARGIN, DAMPING, JITTER, NOMINAL_DT, RESTITUTION};
use crate::entity::Entity;
use crate::viewport::Viewport;

/// Advance one entity by `dt` milliseconds.
///
/// After this returns, `x` lies in `[margin, width - margin]` and `y` in
/// `[margin, height - margin]`. A viewport narrower than two margins pins the
/// entity to the margin.
pub fn integrate(entity: &mut Entity, viewport: &Viewport, dt: f64, rng: &mut impl Rng) {
    let step = dt / NOMINAL_DT;
    entity.x += entity.vx * step;
    entity.y += entity.vy * step;

    reflect(&mut entity.x, &mut entity.vx, viewport.width);
    reflect(&mut entity.y, &mut entity.vy, viewport.height);

    entity.vx *= DAMPING;
    entity.vy *= DAMPING;

    entity.vx += rng.random_range(-JITTER..=JITTER);
    entity.vy += rng.random_range(-JITTER..=JITTER);
}

fn reflect(pos: &mut f64, vel: &mut f64, extent: f64) {
    let lo = BOUNDARY_MARGIN;
    let hi = (extent - BOUNDARY_MARGIN).max(lo);
    // NaN fails both comparisons below; pin it so the entity stays finite.
    if pos.is_nan() {
        *pos = lo;
    }
    if *pos < lo || *pos > hi {
        *vel *= -RESTITUTION;
        *pos = pos.clamp(lo, hi);
    }
}
