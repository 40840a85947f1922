#![allow(clippy::float_cmp)]

use protocol::{AnimationKind, EntityId, EntitySpawn, InitPose};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;
use crate::asset::AssetOutcome;
use crate::entity::Point;
use crate::particles::Effect;

// =============================================================
// Recording surface
// =============================================================

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear,
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64),
    Blend(Blend),
    Rect(f64, f64, f64, f64),
    Image(u64),
    Circle(f64),
    Text(String, f64),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    fail_images: bool,
}

impl Recorder {
    fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for Recorder {
    type Error = String;

    fn clear(&mut self, _: f64, _: f64) -> Result<(), String> {
        self.ops.push(Op::Clear);
        Ok(())
    }
    fn save(&mut self) {
        self.ops.push(Op::Save);
    }
    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }
    fn translate(&mut self, x: f64, y: f64) -> Result<(), String> {
        self.ops.push(Op::Translate(x, y));
        Ok(())
    }
    fn rotate(&mut self, angle: f64) -> Result<(), String> {
        self.ops.push(Op::Rotate(angle));
        Ok(())
    }
    fn scale(&mut self, sx: f64, _: f64) -> Result<(), String> {
        self.ops.push(Op::Scale(sx));
        Ok(())
    }
    fn set_blend(&mut self, blend: Blend) -> Result<(), String> {
        self.ops.push(Op::Blend(blend));
        Ok(())
    }
    fn fill_rect(&mut self, _: &Hsl, x: f64, y: f64, w: f64, h: f64) -> Result<(), String> {
        self.ops.push(Op::Rect(x, y, w, h));
        Ok(())
    }
    fn draw_image(&mut self, image: &ImageHandle, _: f64, _: f64, _: f64, _: f64) -> Result<(), String> {
        if self.fail_images {
            return Err("broken image".to_owned());
        }
        self.ops.push(Op::Image(image.key));
        Ok(())
    }
    fn fill_circle(&mut self, _: f64, _: f64, radius: f64, _: &Hsl, _: f64) -> Result<(), String> {
        self.ops.push(Op::Circle(radius));
        Ok(())
    }
    fn fill_text(&mut self, text: &str, _: f64, y: f64) -> Result<(), String> {
        self.ops.push(Op::Text(text.to_owned(), y));
        Ok(())
    }
}

// =============================================================
// Helpers
// =============================================================

fn entity(id: &str, x: f64, y: f64, with_image: bool) -> Entity {
    let mut e = Entity::from_spawn(
        EntitySpawn {
            entity_id: EntityId::from(id),
            artwork_id: None,
            artwork_url: String::new(),
            init: InitPose { x, y, vx: 1.5, vy: -0.25, angle: 0.5, scale: 2.0 },
            animation_kind: AnimationKind::Other,
            seed: 0,
        },
        4,
    );
    if with_image {
        e.image = Some(ImageHandle::for_outcome(4, AssetOutcome::Loaded { width: 100.0, height: 100.0 }));
    }
    e
}

fn render(store: &EntityStore, particles: &ParticleSystem, debug: bool) -> (Recorder, RenderStats) {
    let mut surface = Recorder::default();
    let stats = draw(&mut surface, store, particles, &Viewport::default(), debug).expect("draw");
    (surface, stats)
}

// =============================================================
// Entities
// =============================================================

#[test]
fn entity_draw_sequence() {
    let mut store = EntityStore::new();
    store.insert(entity("a", 10.0, 20.0, true));
    let (surface, stats) = render(&store, &ParticleSystem::new(), false);
    assert_eq!(
        surface.ops,
        vec![
            Op::Clear,
            Op::Save,
            Op::Translate(10.0, 20.0),
            Op::Rotate(0.5),
            Op::Scale(2.0),
            Op::Image(4),
            Op::Restore,
        ]
    );
    assert_eq!(stats, RenderStats { entities_drawn: 1, entities_skipped: 0, particles_drawn: 0 });
}

#[test]
fn tint_is_multiplied_over_the_footprint() {
    let mut store = EntityStore::new();
    let mut e = entity("a", 0.0, 0.0, true);
    e.tint = Some(Hsl::new(200.0, 70.0, 60.0));
    store.insert(e);
    let (surface, _) = render(&store, &ParticleSystem::new(), false);
    let rect = surface.ops.iter().position(|op| *op == Op::Rect(-50.0, -50.0, 100.0, 100.0));
    let multiply = surface.ops.iter().position(|op| *op == Op::Blend(Blend::Multiply));
    let image = surface.ops.iter().position(|op| *op == Op::Image(4));
    assert!(multiply < rect && rect < image);
    assert!(surface.ops.contains(&Op::Blend(Blend::Normal)));
}

#[test]
fn unresolved_and_non_finite_entities_are_skipped() {
    let mut store = EntityStore::new();
    store.insert(entity("pending", 10.0, 10.0, false));
    let mut broken = entity("nan", 10.0, 10.0, true);
    broken.scale = f64::NAN;
    store.insert(broken);
    store.insert(entity("ok", 10.0, 10.0, true));
    let (surface, stats) = render(&store, &ParticleSystem::new(), false);
    assert_eq!(stats.entities_drawn, 1);
    assert_eq!(stats.entities_skipped, 2);
    assert_eq!(surface.count(|op| matches!(op, Op::Image(_))), 1);
}

#[test]
fn failed_draw_restores_and_continues() {
    let mut store = EntityStore::new();
    store.insert(entity("a", 0.0, 0.0, true));
    store.insert(entity("b", 0.0, 0.0, true));
    let mut surface = Recorder { fail_images: true, ..Recorder::default() };
    let stats = draw(&mut surface, &store, &ParticleSystem::new(), &Viewport::default(), false).expect("draw");
    assert_eq!(stats.entities_skipped, 2);
    assert_eq!(surface.count(|op| *op == Op::Save), 2);
    assert_eq!(surface.count(|op| *op == Op::Restore), 2);
}

// =============================================================
// Particles and overlay
// =============================================================

#[test]
fn live_particles_are_drawn_as_circles() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut particles = ParticleSystem::new();
    particles.emit(&EntityId::from("a"), Point::new(0.0, 0.0), (10.0, 10.0), 4, Effect::Spark, &mut rng);
    let (surface, stats) = render(&EntityStore::new(), &particles, false);
    assert_eq!(stats.particles_drawn, 4);
    assert_eq!(surface.count(|op| *op == Op::Circle(2.0)), 4);
}

#[test]
fn dead_particles_are_never_drawn() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut particles = ParticleSystem::new();
    particles.emit(&EntityId::from("a"), Point::new(0.0, 0.0), (10.0, 10.0), 4, Effect::Spark, &mut rng);
    particles.tick(1000.0);
    let (surface, stats) = render(&EntityStore::new(), &particles, false);
    assert_eq!(stats.particles_drawn, 0);
    assert_eq!(surface.count(|op| matches!(op, Op::Circle(_))), 0);
}

#[test]
fn debug_overlay_lists_every_entity() {
    let mut store = EntityStore::new();
    store.insert(entity("a", 10.4, 20.6, true));
    store.insert(entity("b", 0.0, 0.0, false));
    let (surface, _) = render(&store, &ParticleSystem::new(), true);
    let lines: Vec<(String, f64)> = surface
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text(text, y) => Some((text.clone(), *y)),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![
            ("Entity a: (10, 21) v(1.50, -0.25)".to_owned(), 20.0),
            ("Entity b: (0, 0) v(1.50, -0.25)".to_owned(), 35.0),
        ]
    );
}

#[test]
fn overlay_is_off_by_default() {
    let mut store = EntityStore::new();
    store.insert(entity("a", 0.0, 0.0, true));
    let (surface, _) = render(&store, &ParticleSystem::new(), false);
    assert_eq!(surface.count(|op| matches!(op, Op::Text(..))), 0);
}
