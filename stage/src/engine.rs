//! The stage context: every piece of simulation state, owned in one place.
//!
//! Hosts own a [`StageCore`], feed it socket messages and asset outcomes, and
//! call [`StageCore::tick`] then [`StageCore::render`] once per frame. Nothing
//! here touches the network, the clock, or a real drawing surface, so the
//! whole simulation is testable natively.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use protocol::{AnimationKind, ArtworkId, EntityId, EntitySpawn, Inbound, SceneSnapshot, StateReport, ViewportPatch};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::asset::{AssetOutcome, AssetRequest, AssetTicket, ImageHandle};
use crate::behavior::{self, Frame, Opponent};
use crate::clock::FrameMeter;
use crate::consts::NOMINAL_DT;
use crate::entity::{Entity, EntityStore};
use crate::matching;
use crate::particles::ParticleSystem;
use crate::physics;
use crate::render::{self, RenderStats, Surface};
use crate::viewport::Viewport;

/// What applying one inbound message did.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Spawned(EntityId),
    /// An entity with the same id existed and was replaced wholesale.
    Replaced(EntityId),
    Removed(usize),
    Reset { entities: usize, particles: usize },
    ViewportChanged,
    ClockSync,
    Ignored(String),
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub pairs_formed: usize,
    /// Set when the frame meter closed a window on this tick.
    pub fps: Option<f64>,
}

pub struct StageCore {
    pub store: EntityStore,
    pub particles: ParticleSystem,
    pub viewport: Viewport,
    pub meter: FrameMeter,
    pub debug: bool,
    rng: SmallRng,
    asset_requests: Vec<AssetRequest>,
    released: Vec<u64>,
    generation: u64,
}

impl StageCore {
    #[must_use]
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self {
            store: EntityStore::new(),
            particles: ParticleSystem::new(),
            viewport,
            meter: FrameMeter::new(),
            debug: false,
            rng: SmallRng::seed_from_u64(seed),
            asset_requests: Vec::new(),
            released: Vec::new(),
            generation: 0,
        }
    }

    // --- Messages ---

    /// Apply one decoded message.
    pub fn apply(&mut self, message: Inbound) -> Applied {
        match message {
            Inbound::EntityAdd(spawn) => self.spawn(spawn),
            Inbound::EntityRemove(id) => Applied::Removed(usize::from(self.remove(&id))),
            Inbound::EntityDelete(group) => Applied::Removed(self.remove_group(&group)),
            Inbound::SceneReset => {
                let (entities, particles) = self.reset();
                Applied::Reset { entities, particles }
            }
            Inbound::DisplayConfig(patch) => {
                self.update_viewport(&patch);
                Applied::ViewportChanged
            }
            Inbound::ClockSync(_) => {
                log::debug!("clock.sync received");
                Applied::ClockSync
            }
            Inbound::Unknown(kind) => {
                log::warn!("ignoring unknown message type {kind}");
                Applied::Ignored(kind)
            }
        }
    }

    /// Decode and apply a socket text frame, which may hold several
    /// newline-separated messages. Undecodable lines are logged and skipped.
    pub fn ingest(&mut self, text: &str) -> Vec<Applied> {
        let mut applied = Vec::new();
        for decoded in protocol::decode_batch(text) {
            match decoded {
                Ok(message) => applied.push(self.apply(message)),
                Err(e) => log::warn!("dropping message: {e}"),
            }
        }
        applied
    }

    // --- Entity lifecycle ---

    /// Insert an entity and queue its asset load. An existing entity with the
    /// same id is replaced: fresh state, fresh load, old image released.
    pub fn spawn(&mut self, spawn: EntitySpawn) -> Applied {
        self.generation += 1;
        let entity = Entity::from_spawn(spawn, self.generation);
        let id = entity.id.clone();
        self.asset_requests.push(AssetRequest {
            ticket: AssetTicket { entity: id.clone(), generation: entity.generation },
            url: entity.asset_url.clone(),
        });
        log::debug!("spawn {id} ({})", entity.kind.as_str());
        match self.store.insert(entity) {
            Some(previous) => {
                self.release(&previous);
                Applied::Replaced(id)
            }
            None => Applied::Spawned(id),
        }
    }

    /// Spawn the entities of a scene snapshot that are not live yet and have
    /// an artwork. Returns how many were spawned.
    pub fn spawn_snapshot(&mut self, snapshot: SceneSnapshot) -> usize {
        let mut spawned = 0;
        for entity in snapshot.entities {
            if self.store.contains(&entity.id) {
                continue;
            }
            if let Some(spawn) = entity.into_spawn() {
                self.spawn(spawn);
                spawned += 1;
            }
        }
        spawned
    }

    /// Remove one entity. Its particles are left to fade out.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        match self.store.remove(id) {
            Some(entity) => {
                self.release(&entity);
                true
            }
            None => false,
        }
    }

    /// Remove every entity spawned from `group`.
    pub fn remove_group(&mut self, group: &ArtworkId) -> usize {
        let removed = self.store.remove_group(group);
        for entity in &removed {
            self.release(entity);
        }
        removed.len()
    }

    /// Clear all entities and particles. Returns how many of each were dropped.
    pub fn reset(&mut self) -> (usize, usize) {
        let removed = self.store.clear();
        for entity in &removed {
            self.release(entity);
        }
        let particles = self.particles.clear();
        log::info!("scene reset: {} entities, {particles} particles", removed.len());
        (removed.len(), particles)
    }

    fn release(&mut self, entity: &Entity) {
        if let Some(image) = entity.image {
            self.released.push(image.key);
        }
    }

    // --- Viewport ---

    pub fn update_viewport(&mut self, patch: &ViewportPatch) {
        self.viewport.apply(patch);
        log::info!("viewport now {}x{}", self.viewport.width, self.viewport.height);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.update_viewport(&ViewportPatch { width: Some(width), height: Some(height), ..ViewportPatch::default() });
    }

    // --- Assets ---

    /// Loads queued since the last call, in spawn order.
    pub fn take_asset_requests(&mut self) -> Vec<AssetRequest> {
        std::mem::take(&mut self.asset_requests)
    }

    /// Image keys whose entity left the store since the last call.
    pub fn take_released(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.released)
    }

    /// Bind a finished load. Returns `false` when the entity was removed or
    /// replaced in the meantime; the host should then discard the bitmap.
    pub fn resolve_asset(&mut self, ticket: &AssetTicket, outcome: AssetOutcome) -> bool {
        let Some(entity) = self.store.get_mut(&ticket.entity) else {
            return false;
        };
        if entity.generation != ticket.generation {
            return false;
        }
        let handle = ImageHandle::for_outcome(ticket.generation, outcome);
        if handle.placeholder {
            log::warn!("asset for entity {} failed, using placeholder", entity.id);
        }
        entity.width = handle.width;
        entity.height = handle.height;
        entity.image = Some(handle);
        true
    }

    // --- Frame ---

    /// Advance the simulation by one nominal step at wall clock `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let pairs = matching::match_fighters(&mut self.store);
        for (a, b) in &pairs {
            log::debug!("spin fight: {a} vs {b}");
        }

        let frame = Frame { now: now_ms / 1000.0, dt: NOMINAL_DT, viewport: self.viewport };
        for id in self.store.ids() {
            let opponent = self.opponent(&id);
            let Some(entity) = self.store.get_mut(&id) else {
                continue;
            };
            physics::integrate(entity, &self.viewport, NOMINAL_DT, &mut self.rng);
            behavior::advance(entity, &frame, opponent, &mut self.particles, &mut self.rng);
        }
        self.particles.tick(NOMINAL_DT);

        TickReport { pairs_formed: pairs.len(), fps: self.meter.record(now_ms) }
    }

    fn opponent(&self, id: &EntityId) -> Opponent {
        let Some(entity) = self.store.get(id) else {
            return Opponent::Unpaired;
        };
        if entity.kind != AnimationKind::SpinFight {
            return Opponent::Unpaired;
        }
        match &entity.state.opponent {
            None => Opponent::Unpaired,
            Some(other) => self.store.get(other).map_or(Opponent::Missing, |o| Opponent::At(o.position())),
        }
    }

    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Propagates a failure to clear the surface.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<RenderStats, S::Error> {
        render::draw(surface, &self.store, &self.particles, &self.viewport, self.debug)
    }

    // --- Queries ---

    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }

    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.meter.fps()
    }

    /// Current kinematics of every entity, for `state.report`.
    #[must_use]
    pub fn state_reports(&self) -> Vec<StateReport> {
        self.store
            .iter()
            .map(|e| StateReport { entity_id: e.id.clone(), x: e.x, y: e.y, vx: e.vx, vy: e.vy, angle: e.angle })
            .collect()
    }
}
