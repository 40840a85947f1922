//! Entity model and the in-memory store that owns every live entity.
//!
//! The store keeps entities in insertion order: the matching pass, the tick
//! loop, and the renderer all walk that order, and the matching pass breaks
//! distance ties by it.

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

use std::collections::HashMap;

use protocol::{AnimationKind, ArtworkId, EntityId, EntitySpawn};

use crate::asset::ImageHandle;
use crate::color::Hsl;
use crate::consts::DEFAULT_ENTITY_SIZE;

/// A point in viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Per-entity behavior bookkeeping. Created together with the entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BehaviorState {
    /// Behavior-specific phase counter (explode: 0/1, stream-in: 0/1/2).
    pub phase: u8,
    /// Time of the last particle emission or explode burst, in seconds.
    pub last_emit: Option<f64>,
    /// Current spin-fight opponent.
    pub opponent: Option<EntityId>,
    /// Stream-in start time, in seconds.
    pub started_at: Option<f64>,
}

/// One animated artwork on the display.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub group: Option<ArtworkId>,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Radians.
    pub angle: f64,
    pub scale: f64,
    pub initial_scale: f64,
    pub asset_url: String,
    pub image: Option<ImageHandle>,
    pub width: f64,
    pub height: f64,
    pub kind: AnimationKind,
    /// Advisory; behaviors draw from the stage's generator.
    pub seed: i64,
    pub state: BehaviorState,
    pub tint: Option<Hsl>,
    /// Distinguishes this incarnation from earlier entities with the same id.
    pub generation: u64,
}

impl Entity {
    /// Build an entity from a spawn message. The image is unresolved until
    /// the asset loader reports back.
    #[must_use]
    pub fn from_spawn(spawn: EntitySpawn, generation: u64) -> Self {
        let init = spawn.init;
        Self {
            id: spawn.entity_id,
            group: spawn.artwork_id,
            x: init.x,
            y: init.y,
            vx: init.vx,
            vy: init.vy,
            angle: init.angle,
            scale: init.scale,
            initial_scale: init.scale,
            asset_url: spawn.artwork_url,
            image: None,
            width: DEFAULT_ENTITY_SIZE,
            height: DEFAULT_ENTITY_SIZE,
            kind: spawn.animation_kind,
            seed: spawn.seed,
            state: BehaviorState::default(),
            tint: None,
            generation,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// On-screen footprint after scaling.
    #[must_use]
    pub fn footprint(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }

    /// True when every value the renderer feeds into a transform is finite.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        [self.x, self.y, self.scale, self.angle, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Insertion-ordered store of live entities, at most one per id.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. An existing entity with the same id is replaced in
    /// place (keeping its position in iteration order) and returned.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        let id = entity.id.clone();
        let previous = self.entities.insert(id.clone(), entity);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Remove an entity by id. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Remove every entity spawned from `group`, in iteration order.
    pub fn remove_group(&mut self, group: &ArtworkId) -> Vec<Entity> {
        let ids: Vec<EntityId> = self
            .iter()
            .filter(|e| e.group.as_ref() == Some(group))
            .map(|e| e.id.clone())
            .collect();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Remove everything, returning the removed entities in iteration order.
    pub fn clear(&mut self) -> Vec<Entity> {
        let order = std::mem::take(&mut self.order);
        let mut entities = std::mem::take(&mut self.entities);
        order.iter().filter_map(|id| entities.remove(id)).collect()
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Snapshot of ids in insertion order, for passes that mutate the store
    /// while walking it.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }
}
