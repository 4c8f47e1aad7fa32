//! DOM plumbing: the error page, the sandbox frame and asset injection.

use super::{describe, dom_error};
use crate::assets::{Asset, AssetKind, LoadCounter, SANDBOX_TOKENS};
use crate::error::HostError;
use futures::channel::oneshot;
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlIFrameElement};

/// Class of the sandbox frame.
pub const FRAME_CLASS: &str = "frametest-iframe";

/// Themes may render an element matching this selector to place the frame;
/// otherwise it goes at the end of the body.
pub const FRAME_CONTAINER: &str = ".frametest-frame";

pub const ERROR_CLASS: &str = "testError";

/// Load and error listeners; must outlive the wait for the assets.
pub type AssetListeners = Vec<Closure<dyn FnMut()>>;

/// Replaces the page with `<pre class="testError">`.
///
/// # Errors
///
/// Fails if the document has no body or the element cannot be created.
pub fn render_error(document: &Document, text: &str) -> Result<(), HostError> {
    let body = document
        .body()
        .ok_or_else(|| HostError::Dom("Document has no body".to_string()))?;
    body.set_inner_html("");

    let pre = document.create_element("pre").map_err(dom_error)?;
    pre.set_class_name(ERROR_CLASS);
    pre.set_text_content(Some(text));
    body.append_child(&pre).map_err(dom_error)?;
    Ok(())
}

/// Creates the sandboxed frame test code runs in.
///
/// # Errors
///
/// Fails if the frame cannot be created or attached.
pub fn create_sandbox_frame(document: &Document) -> Result<HtmlIFrameElement, HostError> {
    let frame: HtmlIFrameElement = document
        .create_element("iframe")
        .map_err(dom_error)?
        .dyn_into()
        .map_err(|_| HostError::Dom("Created element is not an <iframe>".to_string()))?;
    frame.set_class_name(FRAME_CLASS);
    frame
        .set_attribute("sandbox", SANDBOX_TOKENS)
        .map_err(dom_error)?;

    let container: Element = match document.query_selector(FRAME_CONTAINER).map_err(dom_error)? {
        Some(container) => container,
        None => document
            .body()
            .ok_or_else(|| HostError::Dom("Document has no body".to_string()))?
            .into(),
    };
    container.append_child(&frame).map_err(dom_error)?;
    Ok(frame)
}

/// Appends `assets` to the frame in order. The receiver settles once every
/// asset fired `load`, or with the URL of the first one that fired `error`.
///
/// Elements belong to the frame's realm, so they are handled as plain
/// [`Element`]s and configured through attributes.
///
/// # Errors
///
/// Fails if the frame document is not reachable or an element cannot be
/// created.
pub fn inject_assets(
    frame: &HtmlIFrameElement,
    assets: &[Asset],
) -> Result<(AssetListeners, oneshot::Receiver<Result<(), String>>), HostError> {
    let document = frame.content_document().ok_or_else(|| {
        HostError::Dom("Cannot find \"contentDocument\" on iframe element.".to_string())
    })?;
    let head = document
        .head()
        .ok_or_else(|| HostError::Dom("Frame document has no head".to_string()))?;
    let body = document
        .body()
        .ok_or_else(|| HostError::Dom("Frame document has no body".to_string()))?;

    let (counter, settled) = LoadCounter::new(assets.len());
    let mut listeners = AssetListeners::with_capacity(assets.len() * 2);

    for asset in assets {
        let element = match asset.kind {
            AssetKind::Script => {
                let script = document.create_element("script").map_err(dom_error)?;
                script.set_attribute("src", &asset.url).map_err(dom_error)?;
                // Dynamically inserted scripts default to async; keep order
                Reflect::set(&script, &JsValue::from_str("async"), &JsValue::FALSE)
                    .map_err(dom_error)?;
                script
            }
            AssetKind::Stylesheet => {
                let link = document.create_element("link").map_err(dom_error)?;
                for (name, value) in [
                    ("rel", "stylesheet"),
                    ("type", "text/css"),
                    ("media", "screen"),
                    ("href", asset.url.as_str()),
                ] {
                    link.set_attribute(name, value).map_err(dom_error)?;
                }
                link
            }
        };

        let on_load = {
            let counter = counter.clone();
            Closure::<dyn FnMut()>::new(move || counter.loaded())
        };
        let on_error = {
            let counter = counter.clone();
            let url = asset.url.clone();
            Closure::<dyn FnMut()>::new(move || counter.failed(&url))
        };
        element
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        element
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        listeners.push(on_load);
        listeners.push(on_error);

        let appended = match asset.kind {
            AssetKind::Script => body.append_child(&element),
            AssetKind::Stylesheet => head.append_child(&element),
        };
        appended.map_err(|e| {
            HostError::Dom(format!("Failed to inject {}: {}", asset.url, describe(&e)))
        })?;
    }

    Ok((listeners, settled))
}
