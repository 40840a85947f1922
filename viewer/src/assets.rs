//! Browser image loading and the bitmap cache.
//!
//! Each load is an `HtmlImageElement` with `crossOrigin = "anonymous"`.
//! Whichever of `onload`/`onerror` fires reports the outcome to the stage;
//! the bitmap is cached under the image key only when the stage accepted it.
//! A failed load is drawn with a shared grey placeholder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use stage::asset::{AssetOutcome, AssetRequest, AssetTicket, absolute_url};
use stage::consts::PLACEHOLDER_SIZE;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::host::Host;

/// Something the surface can draw.
pub enum Bitmap {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

/// The two callbacks of one in-flight load.
struct Callbacks {
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

#[derive(Default)]
pub struct AssetCache {
    bitmaps: HashMap<u64, Bitmap>,
    pending: HashMap<u64, Callbacks>,
    /// Callbacks of finished loads. Dropped on the next frame, never from
    /// inside their own invocation.
    retired: Vec<Callbacks>,
    placeholder: Option<HtmlCanvasElement>,
}

impl AssetCache {
    #[must_use]
    pub fn bitmap(&self, key: u64) -> Option<&Bitmap> {
        self.bitmaps.get(&key)
    }

    /// Forget the bitmap of an entity that left the stage.
    pub fn release(&mut self, key: u64) {
        self.bitmaps.remove(&key);
    }

    pub fn drop_retired(&mut self) {
        self.retired.clear();
    }

    fn placeholder(&mut self) -> Option<HtmlCanvasElement> {
        if self.placeholder.is_none() {
            match build_placeholder() {
                Ok(canvas) => self.placeholder = Some(canvas),
                Err(e) => log::warn!("placeholder canvas unavailable: {e:?}"),
            }
        }
        self.placeholder.clone()
    }
}

/// Start loading one image. The outcome reaches the stage from the image's
/// event callbacks.
///
/// # Errors
///
/// Returns the DOM error if the image element cannot be created.
pub fn start_load(shared: &Rc<RefCell<Host>>, request: AssetRequest, origin: &str) -> Result<(), JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_cross_origin(Some("anonymous"));
    let key = request.ticket.generation;

    let onload = {
        let shared = Rc::clone(shared);
        let ticket = request.ticket.clone();
        let img = img.clone();
        Closure::<dyn FnMut()>::new(move || finish(&shared, &ticket, Some(&img)))
    };
    let onerror = {
        let shared = Rc::clone(shared);
        let ticket = request.ticket.clone();
        Closure::<dyn FnMut()>::new(move || finish(&shared, &ticket, None))
    };
    img.set_onload(Some(onload.as_ref().unchecked_ref()));
    img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    shared.borrow_mut().assets.pending.insert(key, Callbacks { _onload: onload, _onerror: onerror });

    let url = absolute_url(origin, &request.url);
    log::debug!("loading image for entity {} from {url}", request.ticket.entity);
    img.set_src(&url);
    Ok(())
}

fn finish(shared: &Rc<RefCell<Host>>, ticket: &AssetTicket, img: Option<&HtmlImageElement>) {
    let mut guard = shared.borrow_mut();
    let host = &mut *guard;
    let key = ticket.generation;
    if let Some(callbacks) = host.assets.pending.remove(&key) {
        host.assets.retired.push(callbacks);
    }

    let loaded = img.filter(|img| img.natural_width() > 0 && img.natural_height() > 0);
    let (outcome, bitmap) = match loaded {
        Some(img) => (
            AssetOutcome::Loaded { width: f64::from(img.natural_width()), height: f64::from(img.natural_height()) },
            Some(Bitmap::Image(img.clone())),
        ),
        None => (AssetOutcome::Failed, host.assets.placeholder().map(Bitmap::Canvas)),
    };

    if host.core.resolve_asset(ticket, outcome) {
        if let Some(bitmap) = bitmap {
            host.assets.bitmaps.insert(key, bitmap);
        }
    } else {
        log::debug!("discarding late image for entity {}", ticket.entity);
    }
}

/// 100x100 grey square with a white question mark.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn build_placeholder() -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let size = PLACEHOLDER_SIZE as u32;
    canvas.set_width(size);
    canvas.set_height(size);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_fill_style_str("#666");
    ctx.fill_rect(0.0, 0.0, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE);
    ctx.set_fill_style_str("#fff");
    ctx.set_font("20px Arial");
    ctx.set_text_align("center");
    ctx.fill_text("?", PLACEHOLDER_SIZE / 2.0, PLACEHOLDER_SIZE / 2.0)?;
    Ok(canvas)
}
