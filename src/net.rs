//! The display node: a [`StageCore`] on a fixed-rate ticker, attached to the
//! display socket.
//!
//! SESSION LOOP
//! ============
//! Everything runs on one task. Each `select!` round handles whichever comes
//! first: a tick, a socket frame, a finished asset load, the snapshot reply,
//! a report or stats deadline. The ticker is polled in every phase
//! (connecting, connected, waiting to reconnect), so the simulation never
//! pauses for the network.

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use protocol::{Caps, CodecError, Hello, Outbound, SceneSnapshot};
use stage::StageCore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::assets::{self, Completion};
use crate::config::{ConfigError, NodeConfig};
use crate::surface::{Tally, TallySurface};

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tungstenite::Error>),
    #[error("websocket send failed: {0}")]
    WsSend(Box<tungstenite::Error>),
    #[error("websocket receive failed: {0}")]
    WsRecv(Box<tungstenite::Error>),
    #[error("message encode failed: {0}")]
    Codec(#[from] CodecError),
    #[error("snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("snapshot request for {url} answered {status}")]
    SnapshotStatus { url: String, status: u16 },
}

/// Clocks that drive the loop besides the socket.
struct Timers {
    tick: Interval,
    stats: Interval,
    report: Option<Interval>,
}

impl Timers {
    fn new(config: &NodeConfig) -> Self {
        Self {
            tick: interval(config.tick()),
            stats: interval(config.stats_every()),
            report: config.report_every().map(interval),
        }
    }
}

fn interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Wait for the next report deadline, or forever when reports are off.
async fn next_report(report: &mut Option<Interval>) {
    match report {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

pub struct Node {
    config: NodeConfig,
    core: StageCore,
    surface: TallySurface,
    http: reqwest::Client,
    assets_tx: UnboundedSender<Completion>,
    assets_rx: UnboundedReceiver<Completion>,
    started: Instant,
    frames: u64,
}

impl Node {
    #[must_use]
    pub fn new(config: NodeConfig, seed: u64) -> Self {
        let mut core = StageCore::new(config.viewport(), seed);
        core.debug = config.debug;
        let (assets_tx, assets_rx) = unbounded_channel();
        Self {
            config,
            core,
            surface: TallySurface::new(),
            http: reqwest::Client::new(),
            assets_tx,
            assets_rx,
            started: Instant::now(),
            frames: 0,
        }
    }

    #[cfg(test)]
    pub fn core(&self) -> &StageCore {
        &self.core
    }

    /// Frames ticked since start.
    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Tick and render one frame.
    pub fn frame(&mut self) {
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let report = self.core.tick(now_ms);
        if report.pairs_formed > 0 {
            tracing::debug!(pairs = report.pairs_formed, "spin fight pairs formed");
        }
        let Ok(_) = self.core.render(&mut self.surface);
        self.frames += 1;
    }

    /// Apply one socket text frame and start the loads it queued.
    pub fn absorb(&mut self, text: &str) {
        for applied in self.core.ingest(text) {
            tracing::debug!(?applied, "message applied");
        }
        self.start_loads();
    }

    /// Spawn the entities of a snapshot and start their loads.
    pub fn absorb_snapshot(&mut self, snapshot: SceneSnapshot) -> usize {
        let spawned = self.core.spawn_snapshot(snapshot);
        self.start_loads();
        spawned
    }

    fn start_loads(&mut self) {
        // The native host keeps no bitmaps; released keys only need draining.
        let released = self.core.take_released();
        if !released.is_empty() {
            tracing::debug!(count = released.len(), "images released");
        }
        for request in self.core.take_asset_requests() {
            assets::spawn_load(self.http.clone(), self.config.origin(), request, self.assets_tx.clone());
        }
    }

    fn settle(&mut self, (ticket, outcome): Completion) {
        if !self.core.resolve_asset(&ticket, outcome) {
            tracing::debug!(entity_id = %ticket.entity, "late asset discarded");
        }
    }

    /// Log a stats line and reset the draw counts.
    pub fn log_stats(&mut self) -> Tally {
        let tally = self.surface.take();
        tracing::info!(
            fps = self.core.fps(),
            ticks = self.frames,
            entities = self.core.len(),
            particles = self.core.particle_count(),
            rendered = tally.frames,
            images = tally.images,
            placeholders = tally.placeholders,
            tints = tally.tints,
            circles = tally.circles,
            texts = tally.texts,
            "stage stats"
        );
        tally
    }

    /// Encoded `display.hello` for this node.
    ///
    /// # Errors
    ///
    /// Propagates an encoding failure.
    pub fn hello(&self) -> Result<String, CodecError> {
        protocol::encode(&Outbound::Hello(Hello {
            display_key: self.config.display_key.clone(),
            scene_id: self.config.scene_id,
            caps: Caps {
                w: dimension(self.config.width),
                h: dimension(self.config.height),
                px_ratio: self.config.px_ratio,
            },
        }))
    }

    /// Encoded `state.report` for every entity.
    ///
    /// # Errors
    ///
    /// Propagates the first encoding failure.
    pub fn reports(&self) -> Result<Vec<String>, CodecError> {
        self.core
            .state_reports()
            .into_iter()
            .map(|report| protocol::encode(&Outbound::StateReport(report)))
            .collect()
    }

    // =============================================================
    // Loop
    // =============================================================

    /// Run sessions forever, waiting the reconnect delay between them.
    pub async fn run(mut self) {
        let mut timers = Timers::new(&self.config);
        loop {
            match self.session(&mut timers).await {
                Ok(()) => tracing::info!(scene_id = self.config.scene_id, "socket closed by the server"),
                Err(e) => tracing::warn!(scene_id = self.config.scene_id, error = %e, "session ended"),
            }
            let delay = self.config.reconnect_delay();
            tracing::info!(delay_secs = delay.as_secs(), "reconnecting after delay");
            self.idle(&mut timers, tokio::time::sleep(delay)).await;
        }
    }

    /// Keep ticking until `until` completes and return its output.
    async fn idle<F: Future>(&mut self, timers: &mut Timers, until: F) -> F::Output {
        tokio::pin!(until);
        loop {
            tokio::select! {
                out = &mut until => return out,
                _ = timers.tick.tick() => self.frame(),
                _ = timers.stats.tick() => {
                    self.log_stats();
                }
                Some(done) = self.assets_rx.recv() => self.settle(done),
            }
        }
    }

    async fn session(&mut self, timers: &mut Timers) -> Result<(), NodeError> {
        let url = self.config.ws_url()?;
        tracing::info!(%url, scene_id = self.config.scene_id, "connecting");
        let (stream, _) = self
            .idle(timers, connect_async(url.as_str()))
            .await
            .map_err(|e| NodeError::WsConnect(Box::new(e)))?;
        let (mut write, mut read) = stream.split();

        write.send(Message::Text(self.hello()?.into())).await.map_err(|e| NodeError::WsSend(Box::new(e)))?;
        tracing::info!(%url, "connected, hello sent");

        let snapshot = tokio::spawn(fetch_snapshot(self.http.clone(), self.config.origin().to_owned(), self.config.scene_id));
        tokio::pin!(snapshot);
        let mut snapshot_pending = true;

        loop {
            tokio::select! {
                _ = timers.tick.tick() => self.frame(),
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.absorb(text.as_str()),
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(NodeError::WsRecv(Box::new(e))),
                },
                Some(done) = self.assets_rx.recv() => self.settle(done),
                joined = &mut snapshot, if snapshot_pending => {
                    snapshot_pending = false;
                    match joined {
                        Ok(Ok(snapshot)) => {
                            let spawned = self.absorb_snapshot(snapshot);
                            tracing::info!(scene_id = self.config.scene_id, spawned, "snapshot applied");
                        }
                        Ok(Err(e)) => tracing::warn!(scene_id = self.config.scene_id, error = %e, "snapshot failed"),
                        Err(e) => tracing::warn!(error = %e, "snapshot task failed"),
                    }
                }
                () = next_report(&mut timers.report) => {
                    for text in self.reports()? {
                        write.send(Message::Text(text.into())).await.map_err(|e| NodeError::WsSend(Box::new(e)))?;
                    }
                }
                _ = timers.stats.tick() => {
                    self.log_stats();
                }
            }
        }
    }
}

/// `GET {origin}/api/scenes/{scene_id}`.
///
/// # Errors
///
/// Returns [`NodeError::Http`] on transport or body errors and
/// [`NodeError::SnapshotStatus`] on a non-2xx reply.
pub async fn fetch_snapshot(client: reqwest::Client, origin: String, scene_id: u32) -> Result<SceneSnapshot, NodeError> {
    let url = format!("{origin}{}", protocol::scene_path(scene_id));
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NodeError::SnapshotStatus { url, status: status.as_u16() });
    }
    Ok(response.json::<SceneSnapshot>().await?)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 { value.round().min(f64::from(u32::MAX)) as u32 } else { 0 }
}
