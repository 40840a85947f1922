//! Native asset loading: fetch the artwork and read its intrinsic size.
//!
//! Only the dimensions matter to a headless display, so the body is probed
//! with `image`'s header reader instead of being decoded.

#[cfg(test)]
#[path = "assets_test.rs"]
mod assets_test;

use std::io::Cursor;

use stage::asset::{AssetOutcome, AssetRequest, AssetTicket, absolute_url};
use tokio::sync::mpsc::UnboundedSender;

/// A finished load, sent back to the session loop.
pub type Completion = (AssetTicket, AssetOutcome);

/// Width and height of an encoded image, read from its header.
#[must_use]
pub fn dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    reader.into_dimensions().ok()
}

/// Fetch `url` and report its size, or `Failed` on any HTTP or decode error.
pub async fn probe(client: &reqwest::Client, url: &str) -> AssetOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(%url, error = %e, "asset request failed");
            return AssetOutcome::Failed;
        }
    };
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "asset request rejected");
        return AssetOutcome::Failed;
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%url, error = %e, "asset body unreadable");
            return AssetOutcome::Failed;
        }
    };
    match dimensions(&bytes) {
        Some((width, height)) => AssetOutcome::Loaded { width: f64::from(width), height: f64::from(height) },
        None => {
            tracing::warn!(%url, bytes = bytes.len(), "asset is not a decodable image");
            AssetOutcome::Failed
        }
    }
}

/// Start one load in the background. The outcome arrives on `done`.
pub fn spawn_load(client: reqwest::Client, origin: &str, request: AssetRequest, done: UnboundedSender<Completion>) {
    let url = absolute_url(origin, &request.url);
    tokio::spawn(async move {
        let outcome = probe(&client, &url).await;
        tracing::debug!(entity_id = %request.ticket.entity, %url, ?outcome, "asset settled");
        if done.send((request.ticket, outcome)).is_err() {
            tracing::debug!(%url, "session gone, asset outcome dropped");
        }
    });
}
