#![allow(clippy::float_cmp)]

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

fn owner(id: &str) -> EntityId {
    EntityId::from(id)
}

fn system_with(effect: Effect, count: usize) -> (ParticleSystem, SmallRng) {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut system = ParticleSystem::new();
    system.emit(&owner("a"), Point::new(100.0, 100.0), (40.0, 20.0), count, effect, &mut rng);
    (system, rng)
}

#[test]
fn emit_spawns_within_footprint() {
    let (system, _) = system_with(Effect::Explode, 20);
    assert_eq!(system.len(), 20);
    assert_eq!(system.batch_count(), 1);
    for p in system.iter() {
        assert!((80.0..=120.0).contains(&p.x));
        assert!((90.0..=110.0).contains(&p.y));
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.life, p.max_life);
    }
}

#[test]
fn disperse_ranges() {
    let (system, _) = system_with(Effect::Disperse, 3);
    for p in system.iter() {
        let speed = p.vx.hypot(p.vy);
        assert!((2.0 - 1e-9..5.0 + 1e-9).contains(&speed), "speed {speed}");
        assert!((2000.0..3000.0).contains(&p.life));
        assert!((2.0..6.0).contains(&p.size));
        assert_eq!(p.color.saturation, 70.0);
    }
}

#[test]
fn explode_ranges() {
    let (system, _) = system_with(Effect::Explode, 50);
    for p in system.iter() {
        let speed = p.vx.hypot(p.vy);
        assert!((3.0 - 1e-9..8.0 + 1e-9).contains(&speed), "speed {speed}");
        assert!((1000.0..1500.0).contains(&p.life));
        assert!((20.0..60.0).contains(&p.color.hue));
        assert!((3.0..9.0).contains(&p.size));
    }
}

#[test]
fn spark_is_white_and_small() {
    let (system, _) = system_with(Effect::Spark, 4);
    for p in system.iter() {
        assert_eq!(p.color, Hsl::WHITE);
        assert_eq!(p.size, 2.0);
        assert_eq!(p.max_life, 1000.0);
        assert!(p.vx.abs() <= 1.0 && p.vy.abs() <= 1.0);
    }
}

#[test]
fn emissions_append_to_batch() {
    let (mut system, mut rng) = system_with(Effect::Spark, 5);
    system.emit(&owner("a"), Point::new(0.0, 0.0), (10.0, 10.0), 5, Effect::Spark, &mut rng);
    assert_eq!(system.batch(&owner("a")).map(<[Particle]>::len), Some(10));
}

#[test]
fn batch_is_capped() {
    let (mut system, mut rng) = system_with(Effect::Spark, MAX_BATCH_PARTICLES);
    system.emit(&owner("a"), Point::new(0.0, 0.0), (0.0, 0.0), 10, Effect::Spark, &mut rng);
    assert_eq!(system.len(), MAX_BATCH_PARTICLES);
    let last = system.batch(&owner("a")).and_then(<[Particle]>::last).expect("particle");
    assert_eq!((last.x, last.y), (0.0, 0.0));
}

#[test]
fn alpha_strictly_decreases_until_removal() {
    let (mut system, _) = system_with(Effect::Explode, 10);
    let mut previous: Vec<f64> = system.iter().map(|p| p.alpha).collect();
    for _ in 0..200 {
        system.tick(NOMINAL_DT);
        if system.is_empty() {
            break;
        }
        let current: Vec<f64> = system.iter().map(|p| p.alpha).collect();
        assert!(current.len() <= previous.len());
        if current.len() == previous.len() {
            for (now, before) in current.iter().zip(&previous) {
                assert!(now < before);
            }
        }
        previous = current;
    }
    assert!(system.is_empty());
    assert_eq!(system.batch_count(), 0);
}

#[test]
fn tick_never_keeps_dead_particles() {
    let (mut system, _) = system_with(Effect::Spark, 3);
    for _ in 0..62 {
        system.tick(NOMINAL_DT);
        assert!(system.iter().all(Particle::is_alive));
    }
    system.tick(NOMINAL_DT * 2.0);
    assert!(system.is_empty());
}

fn only(system: &ParticleSystem) -> Particle {
    system.iter().next().cloned().expect("particle")
}

#[test]
fn gravity_adds_a_tenth_per_millisecond() {
    let (mut system, _) = system_with(Effect::Spark, 1);
    let before = only(&system);
    system.tick(NOMINAL_DT);
    let after = only(&system);
    assert!((after.vy - before.vy - 0.1 * NOMINAL_DT).abs() < 1e-12);
    // Position moves with the velocity held before gravity applied.
    assert!((after.y - before.y - before.vy).abs() < 1e-12);
    assert!((after.x - before.x - before.vx).abs() < 1e-12);
}

#[test]
fn gravity_scales_with_step() {
    let (mut system, _) = system_with(Effect::Spark, 1);
    let before = only(&system);
    system.tick(NOMINAL_DT * 2.0);
    let after = only(&system);
    assert!((after.vy - before.vy - PARTICLE_GRAVITY * NOMINAL_DT * 2.0).abs() < 1e-12);
    assert!((after.y - before.y - before.vy * 2.0).abs() < 1e-12);
}

#[test]
fn clear_drops_every_batch() {
    let (mut system, mut rng) = system_with(Effect::Spark, 3);
    system.emit(&owner("b"), Point::new(0.0, 0.0), (1.0, 1.0), 2, Effect::Spark, &mut rng);
    assert_eq!(system.batch_count(), 2);
    assert_eq!(system.clear(), 5);
    assert!(system.is_empty());
}
