//! Per-kind animation applied after physics each tick.
//!
//! Behaviors read the frame clock in seconds and the nominal step in
//! milliseconds. Phase and timing bookkeeping lives in [`BehaviorState`] on
//! the entity; particles go to the shared [`ParticleSystem`].

#[cfg(test)]
#[path = "behavior_test.rs"]
mod behavior_test;

use protocol::AnimationKind;
use rand::Rng;

use crate::color::Hsl;
use crate::consts::{
    DISPERSE_COUNT, DISPERSE_INTERVAL, EXPLODE_COUNT, EXPLODE_CYCLE, EXPLODE_SHAKE, FIGHT_ATTRACT_DISTANCE,
    FIGHT_CONTACT_DISTANCE, FIGHT_PULL, NOMINAL_DT, SPARK_COUNT, SPARK_INTERVAL, STREAM_FINISH_FRACTION,
    STREAM_SPEED,
};
use crate::entity::{BehaviorState, Entity, Point};
use crate::particles::{Effect, ParticleSystem};
use crate::viewport::Viewport;

/// Clock and geometry shared by every behavior in one tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Wall clock in seconds.
    pub now: f64,
    /// Step in milliseconds.
    pub dt: f64,
    pub viewport: Viewport,
}

/// Where a spin-fight entity's opponent is, resolved before the entity is borrowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Opponent {
    Unpaired,
    /// The pairing names an entity that no longer exists.
    Missing,
    At(Point),
}

/// Advance one entity's animation by one tick.
pub fn advance(
    entity: &mut Entity,
    frame: &Frame,
    opponent: Opponent,
    particles: &mut ParticleSystem,
    rng: &mut impl Rng,
) {
    if entity.kind != AnimationKind::Pulsate {
        entity.tint = None;
    }
    match entity.kind {
        AnimationKind::Pulsate => pulsate(entity, frame),
        AnimationKind::Disperse => disperse(entity, frame, particles, rng),
        AnimationKind::Explode => explode(entity, frame, particles, rng),
        AnimationKind::SpinFight => spin_fight(entity, frame, opponent, particles, rng),
        AnimationKind::StreamIn => stream_in(entity, frame),
        AnimationKind::Other => {}
    }
}

fn due(state: &BehaviorState, now: f64, interval: f64) -> bool {
    state.last_emit.is_none_or(|last| now - last >= interval)
}

fn burst(entity: &Entity, count: usize, effect: Effect, particles: &mut ParticleSystem, rng: &mut impl Rng) {
    particles.emit(&entity.id, entity.position(), entity.footprint(), count, effect, rng);
}

// =============================================================
// Kinds
// =============================================================

fn pulsate(entity: &mut Entity, frame: &Frame) {
    let t = frame.now;
    entity.scale = entity.initial_scale * (1.0 + 0.3 + (t * 1.5).sin() * 0.2);
    entity.tint = Some(Hsl::new(200.0 + (t * 2.0).sin() * 30.0, 70.0, 60.0));
}

fn disperse(entity: &mut Entity, frame: &Frame, particles: &mut ParticleSystem, rng: &mut impl Rng) {
    let t = frame.now;
    if due(&entity.state, t, DISPERSE_INTERVAL) {
        burst(entity, DISPERSE_COUNT, Effect::Disperse, particles, rng);
        entity.state.last_emit = Some(t);
    }
    entity.angle += frame.dt * 0.05;
    entity.x += (t * 0.5).sin() * 0.5;
    entity.y += (t * 0.7).cos() * 0.3;
}

fn explode(entity: &mut Entity, frame: &Frame, particles: &mut ParticleSystem, rng: &mut impl Rng) {
    let t = frame.now;
    if entity.state.phase == 0 {
        burst(entity, EXPLODE_COUNT, Effect::Explode, particles, rng);
        entity.state.phase = 1;
        entity.state.last_emit = Some(t);
    }
    // The burst tick already shakes at full intensity.
    if entity.state.phase == 1 {
        let elapsed = entity.state.last_emit.map_or(EXPLODE_CYCLE, |last| t - last);
        let intensity = (1.0 - elapsed / EXPLODE_CYCLE).clamp(0.0, 1.0);
        entity.x += (rng.random::<f64>() - 0.5) * intensity * EXPLODE_SHAKE;
        entity.y += (rng.random::<f64>() - 0.5) * intensity * EXPLODE_SHAKE;
        if elapsed > EXPLODE_CYCLE {
            entity.state.phase = 0;
        }
    }
    entity.scale = entity.initial_scale * (1.0 + (t * 8.0).sin() * 0.2);
}

fn spin_fight(
    entity: &mut Entity,
    frame: &Frame,
    opponent: Opponent,
    particles: &mut ParticleSystem,
    rng: &mut impl Rng,
) {
    let target = match opponent {
        Opponent::At(target) => target,
        Opponent::Missing => {
            entity.state.opponent = None;
            entity.angle += frame.dt * 1.5;
            return;
        }
        Opponent::Unpaired => {
            entity.angle += frame.dt * 1.5;
            return;
        }
    };

    let dx = target.x - entity.x;
    let dy = target.y - entity.y;
    let d = dx.hypot(dy);
    if d > FIGHT_ATTRACT_DISTANCE {
        entity.vx += dx / d * FIGHT_PULL;
        entity.vy += dy / d * FIGHT_PULL;
    }
    entity.angle += frame.dt * 2.0;

    if d < FIGHT_CONTACT_DISTANCE && due(&entity.state, frame.now, SPARK_INTERVAL) {
        burst(entity, SPARK_COUNT, Effect::Explode, particles, rng);
        entity.state.last_emit = Some(frame.now);
    }
}

fn stream_in(entity: &mut Entity, frame: &Frame) {
    let t = frame.now;
    let started = *entity.state.started_at.get_or_insert(t);
    let progress = (t - started) * 0.5;
    if entity.state.phase == 0 {
        entity.x = -entity.width;
        entity.y = frame.viewport.height * 0.3 + progress.sin() * 100.0;
        entity.state.phase = 1;
    }
    if entity.state.phase == 1 {
        entity.x += STREAM_SPEED * frame.dt / NOMINAL_DT;
        entity.y += (progress * 2.0).sin() * 2.0;
        if entity.x > frame.viewport.width * STREAM_FINISH_FRACTION {
            entity.state.phase = 2;
        }
    }
    if entity.state.phase < 2 {
        entity.scale = entity.initial_scale * (0.5 + progress * 0.5).min(1.0);
    }
}
