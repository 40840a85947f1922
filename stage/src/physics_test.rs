#![allow(clippy::float_cmp)]

use protocol::{AnimationKind, EntityId, EntitySpawn, InitPose};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

fn entity_at(x: f64, y: f64, vx: f64, vy: f64) -> Entity {
    Entity::from_spawn(
        EntitySpawn {
            entity_id: EntityId::from("p"),
            artwork_id: None,
            artwork_url: String::new(),
            init: InitPose { x, y, vx, vy, angle: 0.0, scale: 1.0 },
            animation_kind: AnimationKind::Other,
            seed: 0,
        },
        1,
    )
}

fn in_bounds(e: &Entity, viewport: &Viewport) -> bool {
    e.x >= BOUNDARY_MARGIN
        && e.x <= viewport.width - BOUNDARY_MARGIN
        && e.y >= BOUNDARY_MARGIN
        && e.y <= viewport.height - BOUNDARY_MARGIN
}

#[test]
fn moves_by_velocity_per_nominal_frame() {
    let mut rng = SmallRng::seed_from_u64(1);
    let viewport = Viewport::sized(1000.0, 1000.0);
    let mut e = entity_at(500.0, 500.0, 3.0, -2.0);
    integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
    assert_eq!(e.x, 503.0);
    assert_eq!(e.y, 498.0);
}

#[test]
fn damping_and_jitter_stay_small() {
    let mut rng = SmallRng::seed_from_u64(2);
    let viewport = Viewport::sized(1000.0, 1000.0);
    let mut e = entity_at(500.0, 500.0, 2.0, 0.0);
    integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
    assert!((e.vx - 2.0 * DAMPING).abs() <= JITTER);
    assert!(e.vy.abs() <= JITTER);
}

#[test]
fn bounce_reverses_and_damps_velocity() {
    let mut rng = SmallRng::seed_from_u64(3);
    let viewport = Viewport::sized(1000.0, 1000.0);
    let mut e = entity_at(940.0, 500.0, 20.0, 0.0);
    integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
    assert_eq!(e.x, 950.0);
    assert!(e.vx < 0.0);
    assert!((e.vx + 20.0 * RESTITUTION * DAMPING).abs() <= JITTER);
}

#[test]
fn containment_holds_for_wild_velocities() {
    let mut rng = SmallRng::seed_from_u64(4);
    let viewport = Viewport::sized(800.0, 600.0);
    let velocities = [(0.0, 0.0), (1e6, -1e6), (-3.5, 1e3), (1e12, 1e12), (-1e-9, 55.0)];
    for (vx, vy) in velocities {
        let mut e = entity_at(400.0, 300.0, vx, vy);
        for _ in 0..200 {
            integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
            assert!(in_bounds(&e, &viewport), "escaped with v=({vx}, {vy}): ({}, {})", e.x, e.y);
        }
    }
}

#[test]
fn narrow_viewport_pins_to_margin() {
    let mut rng = SmallRng::seed_from_u64(5);
    let viewport = Viewport::sized(60.0, 60.0);
    let mut e = entity_at(30.0, 30.0, 5.0, 5.0);
    integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
    assert_eq!(e.x, BOUNDARY_MARGIN);
    assert_eq!(e.y, BOUNDARY_MARGIN);
}

#[test]
fn nan_position_is_pinned() {
    let mut rng = SmallRng::seed_from_u64(6);
    let viewport = Viewport::sized(500.0, 500.0);
    let mut e = entity_at(f64::NAN, 100.0, 0.0, 0.0);
    integrate(&mut e, &viewport, NOMINAL_DT, &mut rng);
    assert!(e.x.is_finite());
}
