//! Push channel and hash-change handling.

use super::{describe, dom, dom_error};
use crate::error::HostError;
use crate::push::{HaltSignal, PushAction};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{console, Document, MessageEvent, WebSocket, Window};

/// Connects to the push channel on `port` of the page's host. An `error`
/// message raises `halt` before the error replaces the page.
///
/// # Errors
///
/// `Network` if the socket cannot be created.
pub fn connect(
    window: &Window,
    document: &Document,
    port: u16,
    halt: HaltSignal,
) -> Result<WebSocket, HostError> {
    let hostname = window.location().hostname().map_err(dom_error)?;
    let url = format!("ws://{hostname}:{port}");
    let socket = WebSocket::new(&url).map_err(|e| HostError::Network {
        url: url.clone(),
        message: describe(&e),
    })?;

    let location = window.location();
    let document = document.clone();
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(text) = event.data().as_string() else {
            return;
        };
        match PushAction::from_text(&text) {
            PushAction::Reload => {
                if let Err(e) = location.reload() {
                    console::error_1(&e);
                }
            }
            PushAction::Halt(error) => {
                halt.raise(&error);
                if let Err(e) = dom::render_error(&document, &error) {
                    console::error_1(&JsValue::from_str(&e.to_string()));
                }
            }
            PushAction::Ignore(reason) => console::warn_1(&JsValue::from_str(&reason)),
        }
    });
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    Ok(socket)
}

/// Reloads the page whenever `location.hash` changes.
///
/// # Errors
///
/// Fails if the listener cannot be attached.
pub fn reload_on_hash_change(window: &Window) -> Result<(), HostError> {
    let location = window.location();
    let listener = Closure::<dyn FnMut()>::new(move || {
        if let Err(e) = location.reload() {
            console::error_1(&e);
        }
    });
    window
        .add_event_listener_with_callback("hashchange", listener.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    listener.forget();
    Ok(())
}
