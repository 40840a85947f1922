#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use protocol::InitPose;

use super::*;

fn spawn(id: &str, group: Option<&str>) -> EntitySpawn {
    EntitySpawn {
        entity_id: EntityId::from(id),
        artwork_id: group.map(ArtworkId::from),
        artwork_url: format!("/download/{id}"),
        init: InitPose { x: 10.0, y: 20.0, vx: 1.0, vy: 2.0, angle: 0.5, scale: 0.25 },
        animation_kind: AnimationKind::Pulsate,
        seed: 7,
    }
}

fn entity(id: &str, group: Option<&str>) -> Entity {
    Entity::from_spawn(spawn(id, group), 1)
}

fn ids(store: &EntityStore) -> Vec<String> {
    store.iter().map(|e| e.id.to_string()).collect()
}

// =============================================================
// Entity
// =============================================================

#[test]
fn from_spawn_copies_pose_and_defaults_footprint() {
    let e = entity("a", Some("g"));
    assert_eq!((e.x, e.y, e.vx, e.vy, e.angle), (10.0, 20.0, 1.0, 2.0, 0.5));
    assert_eq!(e.scale, 0.25);
    assert_eq!(e.initial_scale, 0.25);
    assert_eq!((e.width, e.height), (100.0, 100.0));
    assert!(e.image.is_none());
    assert_eq!(e.state, BehaviorState::default());
    assert_eq!(e.group, Some(ArtworkId::from("g")));
}

#[test]
fn footprint_scales_size() {
    let e = entity("a", None);
    assert_eq!(e.footprint(), (25.0, 25.0));
}

#[test]
fn non_finite_values_are_not_drawable() {
    let mut e = entity("a", None);
    assert!(e.is_drawable());
    e.angle = f64::NAN;
    assert!(!e.is_drawable());
    e.angle = 0.0;
    e.x = f64::INFINITY;
    assert!(!e.is_drawable());
}

#[test]
fn point_distance() {
    assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
}

// =============================================================
// EntityStore
// =============================================================

#[test]
fn insert_is_retrievable_immediately() {
    let mut store = EntityStore::new();
    assert!(store.insert(entity("a", None)).is_none());
    let got = store.get(&EntityId::from("a")).expect("entity");
    assert_eq!(got.state.phase, 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn iteration_follows_insertion_order() {
    let mut store = EntityStore::new();
    for id in ["c", "a", "b"] {
        store.insert(entity(id, None));
    }
    assert_eq!(ids(&store), ["c", "a", "b"]);
    assert_eq!(store.ids().len(), 3);
}

#[test]
fn insert_same_id_replaces_in_place() {
    let mut store = EntityStore::new();
    store.insert(entity("a", None));
    store.insert(entity("b", None));
    let mut replacement = entity("a", None);
    replacement.x = 999.0;
    replacement.generation = 2;
    let previous = store.insert(replacement).expect("replaced");
    assert_eq!(previous.generation, 1);
    assert_eq!(store.len(), 2);
    assert_eq!(ids(&store), ["a", "b"]);
    assert_eq!(store.get(&EntityId::from("a")).map(|e| e.x), Some(999.0));
}

#[test]
fn remove_twice_is_a_no_op() {
    let mut store = EntityStore::new();
    store.insert(entity("a", None));
    store.insert(entity("b", None));
    assert!(store.remove(&EntityId::from("a")).is_some());
    assert!(store.remove(&EntityId::from("a")).is_none());
    assert_eq!(ids(&store), ["b"]);
}

#[test]
fn remove_group_takes_every_member() {
    let mut store = EntityStore::new();
    store.insert(entity("a", Some("g1")));
    store.insert(entity("b", Some("g2")));
    store.insert(entity("c", Some("g1")));
    store.insert(entity("d", None));
    let removed = store.remove_group(&ArtworkId::from("g1"));
    assert_eq!(removed.len(), 2);
    assert_eq!(ids(&store), ["b", "d"]);
    assert!(store.remove_group(&ArtworkId::from("g1")).is_empty());
}

#[test]
fn clear_returns_everything_in_order() {
    let mut store = EntityStore::new();
    store.insert(entity("x", None));
    store.insert(entity("y", None));
    let removed: Vec<String> = store.clear().iter().map(|e| e.id.to_string()).collect();
    assert_eq!(removed, ["x", "y"]);
    assert!(store.is_empty());
    assert!(!store.contains(&EntityId::from("x")));
}
