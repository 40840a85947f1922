//! Display settings read from the page URL.
//!
//! `?scene=2&key=abc&debug=1&reconnect_ms=3000&report_ms=1000&seed=7`.
//! Every parameter is optional; unknown parameters are ignored.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

pub const DEFAULT_SCENE_ID: u32 = 1;
pub const DEFAULT_DISPLAY_KEY: &str = "display_dev_key_12345";
pub const DEFAULT_RECONNECT_MS: u32 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub scene_id: u32,
    pub display_key: String,
    pub reconnect_ms: u32,
    /// Send `state.report` for every entity at this interval. Off when `None`.
    pub report_ms: Option<u32>,
    pub debug: bool,
    /// Seed for the simulation's generator. The page clock is used when `None`.
    pub seed: Option<u64>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            scene_id: DEFAULT_SCENE_ID,
            display_key: DEFAULT_DISPLAY_KEY.to_owned(),
            reconnect_ms: DEFAULT_RECONNECT_MS,
            report_ms: None,
            debug: false,
            seed: None,
        }
    }
}

impl DisplaySettings {
    /// Parse a URL query string, with or without the leading `?`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a number that does not parse or
    /// a zero interval.
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for pair in query.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "scene" => settings.scene_id = parse(key, value)?,
                "key" if !value.is_empty() => settings.display_key = value.to_owned(),
                "reconnect_ms" => settings.reconnect_ms = positive(key, value)?,
                "report_ms" => settings.report_ms = Some(positive(key, value)?),
                "debug" => settings.debug = matches!(value, "" | "1" | "true"),
                "seed" => settings.seed = Some(parse(key, value)?),
                _ => {}
            }
        }
        Ok(settings)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { key: key.to_owned(), value: value.to_owned() })
}

fn positive(key: &str, value: &str) -> Result<u32, ConfigError> {
    match parse::<u32>(key, value)? {
        0 => Err(ConfigError::Invalid { key: key.to_owned(), value: value.to_owned() }),
        n => Ok(n),
    }
}

/// Websocket endpoint for a page served from `host` over `page_protocol`
/// (`"http:"` or `"https:"`, as reported by `location.protocol`).
#[must_use]
pub fn ws_url(page_protocol: &str, host: &str) -> String {
    let scheme = if page_protocol.starts_with("https") { "wss" } else { "ws" };
    format!("{scheme}://{host}/ws")
}
