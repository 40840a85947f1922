//! Entity animation and physics engine for the live artwork display.
//!
//! This crate is the whole simulation: it owns the live entities, advances
//! physics and per-kind animation every frame, pairs spin-fight entities,
//! runs the particle effects, and draws everything to an abstract surface.
//! It has no platform dependencies; the browser viewer and the headless
//! display node each host a [`engine::StageCore`] and supply the socket,
//! the clock, the image loader, and the drawing surface.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::StageCore`] context: message dispatch, tick, render |
//! | [`entity`] | Entity model and the insertion-ordered store |
//! | [`asset`] | Asset tickets, outcomes, and image handles shared with hosts |
//! | [`physics`] | Integration, margin bounce, damping, jitter |
//! | [`matching`] | Spin-fight pairing pass |
//! | [`behavior`] | Per-kind animation |
//! | [`particles`] | Particle batches |
//! | [`render`] | The [`render::Surface`] trait and frame drawing |
//! | [`clock`] | Frame-rate meter |
//! | [`viewport`] | Viewport geometry |
//! | [`color`] | HSL colors |
//! | [`consts`] | Shared numeric constants |

pub mod asset;
pub mod behavior;
pub mod clock;
pub mod color;
pub mod consts;
pub mod engine;
pub mod entity;
pub mod matching;
pub mod particles;
pub mod physics;
pub mod render;
pub mod viewport;

pub use engine::{Applied, StageCore, TickReport};
