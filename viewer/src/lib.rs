//! # viewer
//!
//! Browser host for the artwork display. Compiled to WebAssembly with the
//! `hydrate` feature, it owns a [`stage::StageCore`] and wires it to the page:
//!
//! | Module    | Role |
//! |-----------|------|
//! | `config`  | Display settings from the page query string |
//! | `status`  | Connection indicator and readout text |
//! | `net`     | Socket connection manager and snapshot fetch |
//! | `assets`  | `HtmlImageElement` loads, placeholder, bitmap cache |
//! | `surface` | `Surface` over the 2d canvas context |
//! | `host`    | Shared page state, frame loop, DOM listeners |
//!
//! `config`, `status` and the message builders in `net::socket` are plain
//! Rust and test natively.

pub mod config;
pub mod net;
pub mod status;

#[cfg(feature = "hydrate")]
pub mod assets;
#[cfg(feature = "hydrate")]
pub mod host;
#[cfg(feature = "hydrate")]
pub mod surface;

/// WASM entry point: install the panic hook and logger, then mount the page.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(&e.to_string()));
    }
    if let Err(e) = host::mount() {
        log::error!("display failed to start: {e:?}");
    }
}
