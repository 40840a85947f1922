//! Asset state shared between the stage and the host loaders.
//!
//! DESIGN
//! ======
//! The stage never loads images itself. Inserting an entity queues an
//! [`AssetRequest`]; the host fetches the image however it can and reports an
//! [`AssetOutcome`] back with the request's [`AssetTicket`]. The ticket carries
//! the entity generation, so a load that finishes after its entity was removed
//! or replaced no longer matches anything and is dropped.
//!
//! Bitmaps stay on the host side, keyed by [`ImageHandle::key`]. When an entity
//! leaves the store the stage reports that key as released so the host can
//! free the bitmap.

#[cfg(test)]
#[path = "asset_test.rs"]
mod asset_test;

use protocol::EntityId;

use crate::consts::PLACEHOLDER_SIZE;

/// Identifies one load: the entity and the incarnation that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetTicket {
    pub entity: EntityId,
    pub generation: u64,
}

/// A load the host should start.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub ticket: AssetTicket,
    pub url: String,
}

/// Result of a load as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetOutcome {
    /// The image decoded; intrinsic size in pixels.
    Loaded { width: f64, height: f64 },
    /// Network or decode failure. A placeholder is bound instead.
    Failed,
}

/// An image bound to an entity. The pixels live with the host under `key`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageHandle {
    pub key: u64,
    pub width: f64,
    pub height: f64,
    pub placeholder: bool,
}

impl ImageHandle {
    /// Handle for a load outcome. Failed or degenerate images become a
    /// placeholder of fixed size.
    #[must_use]
    pub fn for_outcome(key: u64, outcome: AssetOutcome) -> Self {
        match outcome {
            AssetOutcome::Loaded { width, height }
                if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 =>
            {
                Self { key, width, height, placeholder: false }
            }
            AssetOutcome::Loaded { .. } | AssetOutcome::Failed => Self::placeholder(key),
        }
    }

    #[must_use]
    pub fn placeholder(key: u64) -> Self {
        Self { key, width: PLACEHOLDER_SIZE, height: PLACEHOLDER_SIZE, placeholder: true }
    }
}

/// Resolve an asset URL against the server origin. Absolute and data URLs
/// pass through unchanged.
#[must_use]
pub fn absolute_url(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
        return url.to_owned();
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}
