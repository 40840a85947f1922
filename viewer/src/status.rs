#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

/// Websocket connection status shown in the corner indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// The socket reported an error; a reconnect is scheduled.
    Error,
    /// Connected, but the scene snapshot could not be fetched.
    SnapshotFailed,
}

impl ConnectionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
            Self::SnapshotFailed => "snapshot failed",
        }
    }

    /// CSS class for the indicator element.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Connected => "status connected",
            Self::Connecting => "status connecting",
            Self::Disconnected | Self::Error | Self::SnapshotFailed => "status disconnected",
        }
    }
}

/// Text of the entity-count and frame-rate readouts.
#[must_use]
pub fn stats_text(entities: usize, fps: f64) -> (String, String) {
    (entities.to_string(), format!("{fps:.0}"))
}
