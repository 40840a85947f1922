//! REST helpers for the display page.
//!
//! Browser (hydrate): real HTTP calls via `gloo-net`. Native builds get a
//! stub that reports the call as unavailable, so the rest of the crate
//! compiles and tests without a browser.

#![allow(clippy::unused_async)]

use protocol::SceneSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid snapshot body: {0}")]
    Body(String),
    #[error("http is only available in the browser")]
    Unavailable,
}

/// Fetch the persisted entities of a scene from `/api/scenes/{scene_id}`.
///
/// # Errors
///
/// Returns [`ApiError`] on a transport failure, a non-2xx status or a body
/// that is not a snapshot.
pub async fn fetch_snapshot(scene_id: u32) -> Result<SceneSnapshot, ApiError> {
    #[cfg(feature = "hydrate")]
    {
        let url = protocol::scene_path(scene_id);
        let resp = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !resp.ok() {
            return Err(ApiError::Status { status: resp.status(), url });
        }
        resp.json::<SceneSnapshot>().await.map_err(|e| ApiError::Body(e.to_string()))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        log::debug!("snapshot fetch for scene {scene_id} skipped outside the browser");
        Err(ApiError::Unavailable)
    }
}
