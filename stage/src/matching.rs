//! Spin-fight pairing.
//!
//! ALGORITHM
//! =========
//! Runs once per tick over a snapshot of the spin-fight entities in store
//! order. Mutual live pairs are left alone. Every other fighter takes the
//! nearest fighter that is not already committed to a different live
//! opponent, and both sides are written. Distance ties go to the fighter seen
//! first. A final sweep clears references that are dangling or not
//! reciprocated, so after the pass the relation is either absent or mutual.
//!
//! Quadratic in the number of fighters. Scenes hold low hundreds of
//! entities, so no spatial index.

#[cfg(test)]
#[path = "matching_test.rs"]
mod matching_test;

use protocol::{AnimationKind, EntityId};

use crate::entity::{EntityStore, Point};

/// Pair up spin-fight entities. Returns the pairs formed by this pass.
pub fn match_fighters(store: &mut EntityStore) -> Vec<(EntityId, EntityId)> {
    let fighters: Vec<EntityId> = store
        .iter()
        .filter(|e| e.kind == AnimationKind::SpinFight)
        .map(|e| e.id.clone())
        .collect();

    let mut formed = Vec::new();
    for a in &fighters {
        if is_mutual(store, a) {
            continue;
        }
        match nearest_free(store, &fighters, a) {
            Some(c) => {
                set_opponent(store, a, Some(c.clone()));
                set_opponent(store, &c, Some(a.clone()));
                formed.push((a.clone(), c));
            }
            None => set_opponent(store, a, None),
        }
    }

    for id in &fighters {
        if opponent_of(store, id).is_some() && !is_mutual(store, id) {
            set_opponent(store, id, None);
        }
    }

    formed
}

fn opponent_of(store: &EntityStore, id: &EntityId) -> Option<EntityId> {
    store.get(id).and_then(|e| e.state.opponent.clone())
}

fn set_opponent(store: &mut EntityStore, id: &EntityId, opponent: Option<EntityId>) {
    if let Some(entity) = store.get_mut(id) {
        entity.state.opponent = opponent;
    }
}

/// `id` points at another live entity that points back.
fn is_mutual(store: &EntityStore, id: &EntityId) -> bool {
    opponent_of(store, id).is_some_and(|b| &b != id && opponent_of(store, &b).as_ref() == Some(id))
}

/// `candidate` is committed to a live opponent other than `seeker`.
fn is_taken(store: &EntityStore, candidate: &EntityId, seeker: &EntityId) -> bool {
    opponent_of(store, candidate).is_some_and(|d| &d != seeker && store.contains(&d))
}

fn nearest_free(store: &EntityStore, fighters: &[EntityId], seeker: &EntityId) -> Option<EntityId> {
    let origin: Point = store.get(seeker)?.position();
    let mut best: Option<(f64, &EntityId)> = None;
    for c in fighters {
        if c == seeker || is_taken(store, c, seeker) {
            continue;
        }
        let Some(candidate) = store.get(c) else {
            continue;
        };
        let d = origin.distance(candidate.position());
        if best.is_none_or(|(min, _)| d < min) {
            best = Some((d, c));
        }
    }
    best.map(|(_, id)| id.clone())
}
