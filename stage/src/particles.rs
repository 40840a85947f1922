//! Short-lived effect particles, grouped in one batch per emitting entity.

#[cfg(test)]
#[path = "particles_test.rs"]
mod particles_test;

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use protocol::EntityId;
use rand::Rng;

use crate::color::Hsl;
use crate::consts::{MAX_BATCH_PARTICLES, NOMINAL_DT, PARTICLE_GRAVITY};
use crate::entity::Point;

/// Emission pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Even ring of colorful, slow, long-lived particles.
    Disperse,
    /// Random burst of warm, fast, short-lived particles.
    Explode,
    /// Small white specks.
    Spark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life in milliseconds.
    pub life: f64,
    pub max_life: f64,
    pub color: Hsl,
    pub size: f64,
    /// `life / max_life`, refreshed every tick.
    pub alpha: f64,
}

impl Particle {
    fn new(x: f64, y: f64, vx: f64, vy: f64, life: f64, color: Hsl, size: f64) -> Self {
        Self { x, y, vx, vy, life, max_life: life, color, size, alpha: 1.0 }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Particle batches keyed by the entity that emitted them.
#[derive(Debug, Default)]
pub struct ParticleSystem {
    batches: BTreeMap<EntityId, Vec<Particle>>,
}

impl ParticleSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` particles to `owner`'s batch, spawned within the owner's
    /// footprint around `origin`.
    pub fn emit(
        &mut self,
        owner: &EntityId,
        origin: Point,
        footprint: (f64, f64),
        count: usize,
        effect: Effect,
        rng: &mut impl Rng,
    ) {
        if count == 0 {
            return;
        }
        let batch = self.batches.entry(owner.clone()).or_default();
        for i in 0..count {
            let x = origin.x + (rng.random::<f64>() - 0.5) * footprint.0;
            let y = origin.y + (rng.random::<f64>() - 0.5) * footprint.1;
            batch.push(spawn(effect, x, y, i, count, rng));
        }
        if batch.len() > MAX_BATCH_PARTICLES {
            let excess = batch.len() - MAX_BATCH_PARTICLES;
            batch.drain(..excess);
        }
    }

    /// Advance every particle by `dt` milliseconds and drop the dead ones.
    /// Empty batches are removed.
    ///
    /// Velocity is in units per nominal frame, so position moves by
    /// `v * dt / NOMINAL_DT`. Gravity adds `PARTICLE_GRAVITY * dt` to `vy`.
    pub fn tick(&mut self, dt: f64) {
        let step = dt / NOMINAL_DT;
        for batch in self.batches.values_mut() {
            for p in batch.iter_mut() {
                p.x += p.vx * step;
                p.y += p.vy * step;
                p.life -= dt;
                p.alpha = (p.life / p.max_life).max(0.0);
                p.vy += PARTICLE_GRAVITY * dt;
            }
            batch.retain(Particle::is_alive);
        }
        self.batches.retain(|_, batch| !batch.is_empty());
    }

    /// Drop every batch.
    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.batches.clear();
        count
    }

    /// Total live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn batch(&self, owner: &EntityId) -> Option<&[Particle]> {
        self.batches.get(owner).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.batches.values().flatten()
    }
}

fn spawn(effect: Effect, x: f64, y: f64, index: usize, count: usize, rng: &mut impl Rng) -> Particle {
    match effect {
        Effect::Disperse => {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * index as f64 / count as f64;
            let speed = rng.random_range(2.0..5.0);
            Particle::new(
                x,
                y,
                angle.cos() * speed,
                angle.sin() * speed,
                rng.random_range(2000.0..3000.0),
                Hsl::new(rng.random_range(0.0..360.0), 70.0, 60.0),
                rng.random_range(2.0..6.0),
            )
        }
        Effect::Explode => {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(3.0..8.0);
            Particle::new(
                x,
                y,
                angle.cos() * speed,
                angle.sin() * speed,
                rng.random_range(1000.0..1500.0),
                Hsl::new(rng.random_range(20.0..60.0), 90.0, 60.0),
                rng.random_range(3.0..9.0),
            )
        }
        Effect::Spark => Particle::new(
            x,
            y,
            (rng.random::<f64>() - 0.5) * 2.0,
            (rng.random::<f64>() - 0.5) * 2.0,
            1000.0,
            Hsl::WHITE,
            2.0,
        ),
    }
}
