//! The display page: one [`Host`] shared by the animation loop, the socket
//! task, image callbacks and DOM listeners.
//!
//! FRAME LOOP
//! ==========
//! `requestAnimationFrame` drives [`Host::frame`]: tick the stage with the
//! frame timestamp, free released bitmaps, render, refresh the readouts and
//! optionally queue `state.report`s. It runs whether or not a socket is up.
//!
//! Every callback borrows the host for the duration of one synchronous call;
//! nothing holds a borrow across an await.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;
use stage::StageCore;
use stage::viewport::Viewport;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::assets::{self, AssetCache};
use crate::config::{self, DisplaySettings};
use crate::net::socket::Outgoing;
use crate::net::{api, socket};
use crate::status::{self, ConnectionStatus};
use crate::surface::CanvasSurface;

const CANVAS_ID: &str = "display-canvas";
const STATUS_ID: &str = "connection-status";
const ENTITY_COUNT_ID: &str = "entity-count";
const FPS_ID: &str = "fps";
const CONNECT_BUTTON_ID: &str = "connect-btn";
const RESET_BUTTON_ID: &str = "reset-btn";
const DEBUG_BUTTON_ID: &str = "toggle-debug";

pub struct Host {
    pub core: StageCore,
    pub assets: AssetCache,
    pub status: ConnectionStatus,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    document: Document,
    origin: String,
    report_ms: Option<u32>,
    last_report_ms: f64,
    outgoing: Option<UnboundedSender<Outgoing>>,
}

impl Host {
    /// Advance and draw one frame at page time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        self.assets.drop_retired();
        let report = self.core.tick(now_ms);
        if let Some(fps) = report.fps {
            log::debug!("fps {fps:.0}, {} entities, {} particles", self.core.len(), self.core.particle_count());
        }
        for key in self.core.take_released() {
            self.assets.release(key);
        }

        let mut surface = CanvasSurface::new(&self.ctx, &self.assets);
        if let Err(e) = self.core.render(&mut surface) {
            log::warn!("frame not drawn: {e}");
        }

        let (entities, fps) = status::stats_text(self.core.len(), self.core.fps());
        set_text(&self.document, ENTITY_COUNT_ID, &entities);
        set_text(&self.document, FPS_ID, &fps);

        if let Some(interval) = self.report_ms {
            if now_ms - self.last_report_ms >= f64::from(interval) {
                self.last_report_ms = now_ms;
                self.send_reports();
            }
        }
    }

    fn send_reports(&self) {
        let Some(tx) = &self.outgoing else {
            return;
        };
        if self.status != ConnectionStatus::Connected {
            return;
        }
        for text in socket::report_messages(self.core.state_reports()) {
            if tx.unbounded_send(Outgoing::Text(text)).is_err() {
                break;
            }
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(dimension(width));
        self.canvas.set_height(dimension(height));
        self.core.resize(width, height);
        log::info!("canvas resized to {width}x{height}");
    }

    fn send(&self, message: Outgoing) {
        match &self.outgoing {
            Some(tx) if tx.unbounded_send(message.clone()).is_ok() => {}
            _ => log::warn!("connection task is gone, {message:?} not delivered"),
        }
    }
}

// =============================================================
// Entry point
// =============================================================

/// Build the host from the page, connect and start the frame loop.
///
/// # Errors
///
/// Returns the DOM error if the window, document, canvas or its 2d context
/// is missing.
pub fn mount() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let location = window.location();

    let query = location.search().unwrap_or_default();
    let settings = DisplaySettings::from_query(&query).unwrap_or_else(|e| {
        log::warn!("bad page settings, using defaults: {e}");
        DisplaySettings::default()
    });

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("display canvas missing"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let (width, height, _) = page_size();
    canvas.set_width(dimension(width));
    canvas.set_height(dimension(height));
    let seed = settings.seed.unwrap_or_else(clock_seed);
    let mut core = StageCore::new(Viewport::sized(width, height), seed);
    core.debug = settings.debug;
    log::info!("display for scene {} at {width}x{height}, seed {seed}", settings.scene_id);

    let shared = Rc::new(RefCell::new(Host {
        core,
        assets: AssetCache::default(),
        status: ConnectionStatus::default(),
        canvas,
        ctx,
        document,
        origin: location.origin().unwrap_or_default(),
        report_ms: settings.report_ms,
        last_report_ms: 0.0,
        outgoing: None,
    }));

    let tx = socket::spawn_connection(Rc::clone(&shared), settings);
    shared.borrow_mut().outgoing = Some(tx);

    listen(&window, &shared)?;
    start_frames(&window, shared)
}

fn listen(window: &Window, shared: &Rc<RefCell<Host>>) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();

    on(window, "resize", shared, |host| {
        let (width, height, _) = page_size();
        host.resize(width, height);
    })?;
    on(window, "beforeunload", shared, |host| host.send(Outgoing::Close))?;

    if let Some(button) = document.get_element_by_id(CONNECT_BUTTON_ID) {
        on(&button, "click", shared, |host| host.send(Outgoing::Reconnect))?;
    }
    if let Some(button) = document.get_element_by_id(RESET_BUTTON_ID) {
        on(&button, "click", shared, |host| {
            let (entities, particles) = host.core.reset();
            log::info!("local reset: {entities} entities, {particles} particles");
        })?;
    }
    if let Some(button) = document.get_element_by_id(DEBUG_BUTTON_ID) {
        on(&button, "click", shared, |host| {
            let enabled = host.core.toggle_debug();
            log::info!("debug overlay {}", if enabled { "on" } else { "off" });
        })?;
    }
    Ok(())
}

/// Attach a page-lifetime listener that runs `action` on the host.
fn on(
    target: &web_sys::EventTarget,
    event: &str,
    shared: &Rc<RefCell<Host>>,
    action: impl Fn(&mut Host) + 'static,
) -> Result<(), JsValue> {
    let shared = Rc::clone(shared);
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        action(&mut shared.borrow_mut());
    });
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn start_frames(window: &Window, shared: Rc<RefCell<Host>>) -> Result<(), JsValue> {
    let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let holder_for_cb = Rc::clone(&holder);
    let cb = Closure::wrap(Box::new(move |ts: f64| {
        shared.borrow_mut().frame(ts);
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(cb) = holder_for_cb.borrow().as_ref() {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::warn!("frame loop stopped: {e:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>);
    window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    *holder.borrow_mut() = Some(cb);
    Ok(())
}

// =============================================================
// Called from the socket task
// =============================================================

pub fn set_status(shared: &Rc<RefCell<Host>>, next: ConnectionStatus) {
    let mut host = shared.borrow_mut();
    host.status = next;
    if let Some(el) = host.document.get_element_by_id(STATUS_ID) {
        el.set_text_content(Some(next.label()));
        el.set_class_name(next.class());
    }
}

/// Feed one socket text frame to the stage and start any loads it queued.
pub fn absorb(shared: &Rc<RefCell<Host>>, text: &str) {
    let applied = shared.borrow_mut().core.ingest(text);
    log::debug!("applied {} message(s)", applied.len());
    start_loads(shared);
}

/// Fetch the scene snapshot in the background and spawn its entities.
pub fn spawn_snapshot(shared: &Rc<RefCell<Host>>, scene_id: u32) {
    let shared = Rc::clone(shared);
    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_snapshot(scene_id).await {
            Ok(snapshot) => {
                let spawned = shared.borrow_mut().core.spawn_snapshot(snapshot);
                log::info!("snapshot for scene {scene_id}: {spawned} entities spawned");
                start_loads(&shared);
            }
            Err(e) => {
                log::warn!("snapshot for scene {scene_id} failed: {e}");
                set_status(&shared, ConnectionStatus::SnapshotFailed);
            }
        }
    });
}

fn start_loads(shared: &Rc<RefCell<Host>>) {
    let (requests, origin) = {
        let mut host = shared.borrow_mut();
        (host.core.take_asset_requests(), host.origin.clone())
    };
    for request in requests {
        let entity = request.ticket.entity.clone();
        if let Err(e) = assets::start_load(shared, request, &origin) {
            log::warn!("image load for entity {entity} not started: {e:?}");
        }
    }
}

// =============================================================
// Page helpers
// =============================================================

#[must_use]
pub fn page_ws_url() -> String {
    let location = web_sys::window().map(|w| w.location());
    let protocol = location.as_ref().and_then(|l| l.protocol().ok()).unwrap_or_default();
    let host = location
        .as_ref()
        .and_then(|l| l.host().ok())
        .unwrap_or_else(|| "localhost:8080".to_owned());
    config::ws_url(&protocol, &host)
}

/// Inner width, inner height and device pixel ratio of the window.
#[must_use]
pub fn page_size() -> (f64, f64, f64) {
    let Some(window) = web_sys::window() else {
        let fallback = Viewport::default();
        return (fallback.width, fallback.height, 1.0);
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height, window.device_pixel_ratio())
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 { value.round() as u32 } else { 0 }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}
