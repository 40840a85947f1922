//! Wire model for the display socket and the scene snapshot endpoint.
//!
//! Every socket message is a JSON envelope `{"type": "...", "data": {...}}`.
//! The server coalesces queued messages into a single text frame separated by
//! newlines, so inbound text is decoded line by line with [`decode_batch`].
//!
//! IDS
//! ===
//! Entity and artwork ids are opaque. The server sends them as JSON numbers,
//! other producers may send strings; both decode into the same [`EntityId`] /
//! [`ArtworkId`] newtype and integer-looking ids are written back as numbers.


use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Scale applied to snapshot entities whose `init_scale` is missing.
pub const DEFAULT_SNAPSHOT_SCALE: f64 = 0.25;

/// Error returned by [`decode_message`] and [`encode`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not valid JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON value is not an object.
    #[error("message is not a json object")]
    NotAnObject,
    /// The envelope has no string `type` field.
    #[error("message has no \"type\" field")]
    MissingType,
    /// The `data` payload does not match the shape expected for `kind`.
    #[error("invalid payload for {kind}: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================
// Opaque ids
// =============================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw.to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                // Only canonical integers go back out as numbers.
                match self.0.parse::<u64>() {
                    Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
                    _ => serializer.serialize_str(&self.0),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

opaque_id!(
    /// Identifies one live entity on the display.
    EntityId
);

opaque_id!(
    /// Identifies the artwork an entity was spawned from. Several entities may
    /// share one artwork; `entity.delete` removes all of them.
    ArtworkId
);

// =============================================================
// Inbound payloads
// =============================================================

/// Behavior mode of an entity. Unknown wire values decode as [`AnimationKind::Other`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Pulsate,
    Disperse,
    Explode,
    SpinFight,
    StreamIn,
    /// Any other kind: the entity only drifts under physics.
    #[default]
    #[serde(other)]
    Other,
}

impl AnimationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pulsate => "pulsate",
            Self::Disperse => "disperse",
            Self::Explode => "explode",
            Self::SpinFight => "spin_fight",
            Self::StreamIn => "stream_in",
            Self::Other => "other",
        }
    }
}

/// Initial kinematics of a spawned entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitPose {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Radians.
    pub angle: f64,
    pub scale: f64,
}

impl Default for InitPose {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0, angle: 0.0, scale: 1.0 }
    }
}

/// Payload of `entity.add`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpawn {
    pub entity_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_id: Option<ArtworkId>,
    #[serde(default)]
    pub artwork_url: String,
    #[serde(default)]
    pub init: InitPose,
    #[serde(default)]
    pub animation_kind: AnimationKind,
    #[serde(default)]
    pub seed: i64,
}

/// Partial viewport carried by `display.config`. Absent fields keep their value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

#[derive(Deserialize)]
struct EntityRef {
    entity_id: EntityId,
}

#[derive(Deserialize)]
struct ArtworkRef {
    artwork_id: ArtworkId,
}

#[derive(Deserialize)]
struct DisplayConfig {
    #[serde(default)]
    viewport: ViewportPatch,
}

/// A decoded server-to-display message.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// `entity.add`: spawn or replace an entity.
    EntityAdd(EntitySpawn),
    /// `entity.remove`: remove one entity by id.
    EntityRemove(EntityId),
    /// `entity.delete`: remove every entity spawned from an artwork.
    EntityDelete(ArtworkId),
    /// `scene.reset`: clear entities and particles. The payload is ignored.
    SceneReset,
    /// `display.config`: merge a partial viewport.
    DisplayConfig(ViewportPatch),
    /// `clock.sync`: accepted and ignored.
    ClockSync(Value),
    /// Any other message type.
    Unknown(String),
}

impl Inbound {
    /// The wire `type` this message was decoded from.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::EntityAdd(_) => "entity.add",
            Self::EntityRemove(_) => "entity.remove",
            Self::EntityDelete(_) => "entity.delete",
            Self::SceneReset => "scene.reset",
            Self::DisplayConfig(_) => "display.config",
            Self::ClockSync(_) => "clock.sync",
            Self::Unknown(kind) => kind,
        }
    }
}

fn payload<T: for<'de> Deserialize<'de>>(kind: &str, data: Value) -> Result<T, CodecError> {
    serde_json::from_value(data).map_err(|source| CodecError::Payload { kind: kind.to_owned(), source })
}

/// Decode one envelope.
///
/// # Errors
///
/// Returns [`CodecError`] for invalid JSON, a missing `type`, or a payload
/// that does not match a known message type.
pub fn decode_message(text: &str) -> Result<Inbound, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut envelope) = value else {
        return Err(CodecError::NotAnObject);
    };
    let Some(Value::String(kind)) = envelope.remove("type") else {
        return Err(CodecError::MissingType);
    };
    let data = envelope.remove("data").unwrap_or(Value::Null);

    match kind.as_str() {
        "entity.add" => payload(&kind, data).map(Inbound::EntityAdd),
        "entity.remove" => payload::<EntityRef>(&kind, data).map(|r| Inbound::EntityRemove(r.entity_id)),
        "entity.delete" => payload::<ArtworkRef>(&kind, data).map(|r| Inbound::EntityDelete(r.artwork_id)),
        "scene.reset" => Ok(Inbound::SceneReset),
        "display.config" => {
            if data.is_null() {
                return Ok(Inbound::DisplayConfig(ViewportPatch::default()));
            }
            payload::<DisplayConfig>(&kind, data).map(|c| Inbound::DisplayConfig(c.viewport))
        }
        "clock.sync" => Ok(Inbound::ClockSync(data)),
        _ => Ok(Inbound::Unknown(kind)),
    }
}

/// Decode a text frame that may carry several newline-separated envelopes.
///
/// Blank lines are skipped. Each line decodes independently, so one bad
/// envelope does not hide its neighbours.
#[must_use]
pub fn decode_batch(text: &str) -> Vec<Result<Inbound, CodecError>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_message)
        .collect()
}

// =============================================================
// Outbound
// =============================================================

/// Display capabilities announced in the hello.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caps {
    pub w: u32,
    pub h: u32,
    pub px_ratio: f64,
}

/// Payload of `display.hello`, sent on every (re)connect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub display_key: String,
    pub scene_id: u32,
    pub caps: Caps,
}

/// Payload of `state.report`: the current kinematics of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    pub entity_id: EntityId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
}

/// A display-to-server message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Outbound {
    #[serde(rename = "display.hello")]
    Hello(Hello),
    #[serde(rename = "state.report")]
    StateReport(StateReport),
}

/// Encode a message into its JSON envelope.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails (non-string map keys
/// cannot occur here, so this is effectively infallible).
pub fn encode(message: &Outbound) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

// =============================================================
// Scene snapshot (GET /api/scenes/{id})
// =============================================================

/// Artwork summary embedded in a snapshot entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtworkSummary {
    pub qr_token: String,
}

/// One persisted entity of a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub id: EntityId,
    #[serde(default)]
    pub artwork_id: Option<ArtworkId>,
    #[serde(default)]
    pub init_x: f64,
    #[serde(default)]
    pub init_y: f64,
    #[serde(default)]
    pub init_vx: f64,
    #[serde(default)]
    pub init_vy: f64,
    #[serde(default)]
    pub init_angle: f64,
    #[serde(default)]
    pub init_scale: Option<f64>,
    #[serde(default)]
    pub animation_kind: AnimationKind,
    #[serde(default)]
    pub rng_seed: i64,
    #[serde(default)]
    pub artwork: Option<ArtworkSummary>,
}

impl SceneEntity {
    /// Convert into a spawn. Entities without an artwork cannot be drawn and
    /// yield `None`.
    #[must_use]
    pub fn into_spawn(self) -> Option<EntitySpawn> {
        let artwork = self.artwork?;
        Some(EntitySpawn {
            entity_id: self.id,
            artwork_id: self.artwork_id,
            artwork_url: download_path(&artwork.qr_token),
            init: InitPose {
                x: self.init_x,
                y: self.init_y,
                vx: self.init_vx,
                vy: self.init_vy,
                angle: self.init_angle,
                scale: self.init_scale.unwrap_or(DEFAULT_SNAPSHOT_SCALE),
            },
            animation_kind: self.animation_kind,
            seed: self.rng_seed,
        })
    }
}

/// Body of the scene snapshot endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub entities: Vec<SceneEntity>,
}

/// Server-relative path of the scene snapshot endpoint.
#[must_use]
pub fn scene_path(scene_id: u32) -> String {
    format!("/api/scenes/{scene_id}")
}

/// Server-relative download path for an artwork token.
#[must_use]
pub fn download_path(token: &str) -> String {
    format!("/download/{token}")
}
