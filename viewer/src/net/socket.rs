//! Websocket connection manager for the display page.
//!
//! DESIGN
//! ======
//! One long-lived task owns the socket. It connects, sends `display.hello`,
//! kicks off the scene snapshot fetch, then races a send loop (draining the
//! outgoing channel) against a receive loop (feeding text frames into the
//! stage). When either side ends it waits the configured delay and connects
//! again, forever. The animation loop never waits on any of this.
//!
//! The message builders are plain functions so they test natively; the
//! socket plumbing is gated behind `hydrate`.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use protocol::{Caps, CodecError, Hello, Outbound, StateReport};

use crate::config::DisplaySettings;

/// What the page asks of the connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// An encoded envelope to write to the socket.
    Text(String),
    /// Drop the current connection and connect again right away.
    Reconnect,
    /// Close the socket and stop reconnecting.
    Close,
}

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("open failed: {0}")]
    Open(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("receive failed: {0}")]
    Recv(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// How a connection ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ended {
    /// The server closed the socket.
    Dropped,
    Reconnect,
    Closed,
}

/// Map the outgoing channel item that stopped the send loop.
#[must_use]
pub fn ended_by(item: Option<&Outgoing>) -> Option<Ended> {
    match item {
        None | Some(Outgoing::Close) => Some(Ended::Closed),
        Some(Outgoing::Reconnect) => Some(Ended::Reconnect),
        Some(Outgoing::Text(_)) => None,
    }
}

/// Encoded `display.hello` for this display at its current size.
///
/// # Errors
///
/// Propagates an encoding failure.
pub fn hello_message(settings: &DisplaySettings, width: f64, height: f64, px_ratio: f64) -> Result<String, CodecError> {
    let hello = Hello {
        display_key: settings.display_key.clone(),
        scene_id: settings.scene_id,
        caps: Caps { w: pixels(width), h: pixels(height), px_ratio: if px_ratio > 0.0 { px_ratio } else { 1.0 } },
    };
    protocol::encode(&Outbound::Hello(hello))
}

/// Encoded `state.report` messages, one per entity. Entities that fail to
/// encode are logged and skipped.
#[must_use]
pub fn report_messages(reports: Vec<StateReport>) -> Vec<String> {
    reports
        .into_iter()
        .filter_map(|report| {
            let id = report.entity_id.clone();
            match protocol::encode(&Outbound::StateReport(report)) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("state.report for {id} not sent: {e}");
                    None
                }
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 { value.round().min(f64::from(u32::MAX)) as u32 } else { 0 }
}

// =============================================================
// Browser connection task
// =============================================================

/// Spawn the connection task and return the handle used to talk to it.
#[cfg(feature = "hydrate")]
pub fn spawn_connection(
    shared: std::rc::Rc<std::cell::RefCell<crate::host::Host>>,
    settings: DisplaySettings,
) -> futures::channel::mpsc::UnboundedSender<Outgoing> {
    let (tx, rx) = futures::channel::mpsc::unbounded::<Outgoing>();
    wasm_bindgen_futures::spawn_local(connection_loop(shared, settings, rx));
    tx
}

#[cfg(feature = "hydrate")]
async fn connection_loop(
    shared: std::rc::Rc<std::cell::RefCell<crate::host::Host>>,
    settings: DisplaySettings,
    mut rx: futures::channel::mpsc::UnboundedReceiver<Outgoing>,
) {
    use crate::host;
    use crate::status::ConnectionStatus;

    let delay = std::time::Duration::from_millis(u64::from(settings.reconnect_ms));
    loop {
        host::set_status(&shared, ConnectionStatus::Connecting);
        let url = host::page_ws_url();
        match connect_and_run(&url, &shared, &settings, &mut rx).await {
            Ok(Ended::Closed) => {
                log::info!("socket closed by the page");
                host::set_status(&shared, ConnectionStatus::Disconnected);
                return;
            }
            Ok(Ended::Reconnect) => {
                log::info!("reconnect requested");
                host::set_status(&shared, ConnectionStatus::Disconnected);
                continue;
            }
            Ok(Ended::Dropped) => {
                log::info!("socket closed by the server");
                host::set_status(&shared, ConnectionStatus::Disconnected);
            }
            Err(e) => {
                log::warn!("socket error: {e}");
                host::set_status(&shared, ConnectionStatus::Error);
            }
        }
        gloo_timers::future::sleep(delay).await;
    }
}

#[cfg(feature = "hydrate")]
async fn connect_and_run(
    url: &str,
    shared: &std::rc::Rc<std::cell::RefCell<crate::host::Host>>,
    settings: &DisplaySettings,
    rx: &mut futures::channel::mpsc::UnboundedReceiver<Outgoing>,
) -> Result<Ended, SocketError> {
    use futures::future::Either;
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    use crate::host;
    use crate::status::ConnectionStatus;

    let ws = WebSocket::open(url).map_err(|e| SocketError::Open(e.to_string()))?;
    let (mut ws_write, mut ws_read) = ws.split();

    let (width, height, px_ratio) = host::page_size();
    let hello = hello_message(settings, width, height, px_ratio)?;
    ws_write.send(Message::Text(hello)).await.map_err(|e| SocketError::Send(e.to_string()))?;
    host::set_status(shared, ConnectionStatus::Connected);
    log::info!("connected to {url} as scene {}", settings.scene_id);

    host::spawn_snapshot(shared, settings.scene_id);

    let send_task = async {
        loop {
            let item = rx.next().await;
            if let Some(ended) = ended_by(item.as_ref()) {
                if ended == Ended::Closed {
                    if let Err(e) = ws_write.close().await {
                        log::debug!("close handshake failed: {e}");
                    }
                }
                return Ok::<_, SocketError>(ended);
            }
            if let Some(Outgoing::Text(text)) = item {
                ws_write.send(Message::Text(text)).await.map_err(|e| SocketError::Send(e.to_string()))?;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => host::absorb(shared, &text),
                Ok(Message::Bytes(_)) => log::debug!("ignoring binary frame"),
                Err(e) => return Err(SocketError::Recv(e.to_string())),
            }
        }
        Ok::<_, SocketError>(Ended::Dropped)
    };

    match futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await {
        Either::Left((ended, _)) | Either::Right((ended, _)) => ended,
    }
}
