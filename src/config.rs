//! Command-line and environment configuration of the display node.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use clap::Parser;
use stage::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),
    #[error("--tick-ms must be at least 1")]
    ZeroTick,
    #[error("viewport must be positive, got {width}x{height}")]
    Viewport { width: f64, height: f64 },
    #[error("--px-ratio must be positive, got {0}")]
    PxRatio(f64),
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "display-node", about = "Headless artwork display: runs a scene without a browser")]
pub struct NodeConfig {
    #[arg(long, env = "DISPLAY_BASE_URL", default_value = "http://127.0.0.1:8080")]
    pub base_url: String,

    #[arg(long, env = "DISPLAY_SCENE_ID", default_value_t = 1)]
    pub scene_id: u32,

    #[arg(long, env = "DISPLAY_KEY", default_value = "display_dev_key_12345")]
    pub display_key: String,

    #[arg(long, default_value_t = 1920.0)]
    pub width: f64,

    #[arg(long, default_value_t = 1080.0)]
    pub height: f64,

    #[arg(long, default_value_t = 1.0)]
    pub px_ratio: f64,

    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    #[arg(long, default_value_t = 5)]
    pub reconnect_secs: u64,

    #[arg(long, help = "Send state.report for every entity at this interval")]
    pub report_secs: Option<u64>,

    #[arg(long, default_value_t = 5)]
    pub stats_secs: u64,

    #[arg(long, help = "Seed for the simulation generator; random when absent")]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = false, help = "Draw the per-entity debug overlay")]
    pub debug: bool,
}

impl NodeConfig {
    /// # Errors
    ///
    /// Returns the first setting that cannot drive a display.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if http_rest(&self.base_url).is_none() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Viewport { width: self.width, height: self.height });
        }
        if !(self.px_ratio.is_finite() && self.px_ratio > 0.0) {
            return Err(ConfigError::PxRatio(self.px_ratio));
        }
        Ok(())
    }

    /// Server origin without a trailing slash, used for REST and asset URLs.
    #[must_use]
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for a base URL that is not
    /// http or https.
    pub fn ws_url(&self) -> Result<String, ConfigError> {
        ws_url(&self.base_url)
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::sized(self.width, self.height)
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_secs)
    }

    #[must_use]
    pub fn stats_every(&self) -> Duration {
        Duration::from_secs(self.stats_secs.max(1))
    }

    #[must_use]
    pub fn report_every(&self) -> Option<Duration> {
        self.report_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

/// Websocket endpoint for an http(s) base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for any other scheme.
pub fn ws_url(base_url: &str) -> Result<String, ConfigError> {
    match http_rest(base_url) {
        Some((secure, rest)) => {
            let scheme = if secure { "wss" } else { "ws" };
            Ok(format!("{scheme}://{}/ws", rest.trim_end_matches('/')))
        }
        None => Err(ConfigError::InvalidBaseUrl(base_url.to_owned())),
    }
}

fn http_rest(base_url: &str) -> Option<(bool, &str)> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Some((false, rest)).filter(|(_, r)| !r.is_empty());
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Some((true, rest)).filter(|(_, r)| !r.is_empty());
    }
    None
}
