//! Browser host for the driver.
//!
//! The shell page loads the runtime bundle and calls
//! `window.frametestRuntime.start()`, which lands in [`start`].

pub mod bridge;
pub mod dom;
pub mod socket;

use crate::assets::Asset;
use crate::body::TestFailure;
use crate::error::HostError;
use crate::host::{ConsoleLevel, DriverHost, HttpReply};
use crate::module::TestModule;
use crate::push::HaltSignal;
use crate::render::{HomePageSettings, TestPageSettings};
use crate::runner::Driver;
use async_trait::async_trait;
use frametest_core::boot::{BOOT_GLOBAL, THEME_GLOBAL};
use frametest_core::BootData;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Document, Headers, Request, RequestInit, Response, Window};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Resumes the driver for this page load.
#[wasm_bindgen]
pub fn start() {
    wasm_bindgen_futures::spawn_local(run());
}

async fn run() {
    let host = match WebHost::new() {
        Ok(host) => host,
        Err(e) => {
            console::error_1(&JsValue::from_str(&e.to_string()));
            return;
        }
    };
    let boot = match host.boot_data() {
        Ok(boot) => boot,
        Err(e) => {
            host.render_error(&e.to_string());
            return;
        }
    };

    if let Some(port) = boot.push_port {
        if let Err(e) = socket::connect(&host.window, &host.document, port, host.halt.clone()) {
            host.console(ConsoleLevel::Warn, &e.to_string());
        }
    }
    if let Err(e) = socket::reload_on_hash_change(&host.window) {
        host.console(ConsoleLevel::Warn, &e.to_string());
    }

    // Failures are rendered in place of the page by the driver itself
    let _ = Driver::new(host, boot).start().await;
}

/// [`DriverHost`] backed by the real page.
pub struct WebHost {
    window: Window,
    document: Document,
    halt: HaltSignal,
}

impl WebHost {
    /// # Errors
    ///
    /// Fails outside a window context.
    pub fn new() -> Result<Self, HostError> {
        let window =
            web_sys::window().ok_or_else(|| HostError::Dom("No global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::Dom("No document on window".to_string()))?;
        Ok(Self {
            window,
            document,
            halt: HaltSignal::new(),
        })
    }

    /// Reads the boot data the shell page embedded.
    ///
    /// # Errors
    ///
    /// Fails if it is missing or malformed.
    pub fn boot_data(&self) -> Result<BootData, HostError> {
        let value = Reflect::get(&self.window, &JsValue::from_str(BOOT_GLOBAL)).map_err(dom_error)?;
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| HostError::Dom(format!("Invalid boot data on window.{BOOT_GLOBAL}: {e}")))
    }

    fn theme_callback(&self, callback: &'static str, settings: &impl Serialize) -> Result<(), HostError> {
        let theme = Reflect::get(&self.window, &JsValue::from_str(THEME_GLOBAL)).map_err(dom_error)?;
        if theme.is_undefined() || theme.is_null() {
            return Err(HostError::MissingTheme(THEME_GLOBAL));
        }

        let theme_error = |message: String| HostError::Theme { callback, message };
        let function: Function = Reflect::get(&theme, &JsValue::from_str(callback))
            .map_err(|e| theme_error(describe(&e)))?
            .dyn_into()
            .map_err(|_| theme_error("not a function".to_string()))?;
        let argument = settings
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| theme_error(e.to_string()))?;

        function
            .call1(&theme, &argument)
            .map_err(|e| theme_error(describe(&e)))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl DriverHost for WebHost {
    fn hash(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }

    fn search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn console(&self, level: ConsoleLevel, message: &str) {
        let message = JsValue::from_str(message);
        match level {
            ConsoleLevel::Log => console::log_1(&message),
            ConsoleLevel::Warn => console::warn_1(&message),
            ConsoleLevel::Error => console::error_1(&message),
        }
    }

    fn render_error(&self, text: &str) {
        if let Err(e) = dom::render_error(&self.document, text) {
            console::error_1(&JsValue::from_str(&e.to_string()));
        }
    }

    fn render_home(&self, settings: &HomePageSettings<'_>) -> Result<(), HostError> {
        self.halt.check()?;
        self.theme_callback("onHomePage", settings)
    }

    fn render_test(&self, settings: &TestPageSettings) -> Result<(), HostError> {
        self.halt.check()?;
        self.theme_callback("onTest", settings)
    }

    fn navigate(&self, hash: &str) -> Result<(), HostError> {
        self.halt.check()?;
        self.window.location().set_hash(hash).map_err(dom_error)
    }

    async fn load_module(&self, in_file: &str, assets: &[Asset]) -> Result<TestModule, HostError> {
        let frame = dom::create_sandbox_frame(&self.document)?;
        let (listeners, settled) = dom::inject_assets(&frame, assets)?;
        let outcome = settled.await;
        drop(listeners);

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(url)) => return Err(HostError::AssetLoad(url)),
            Err(_) => return Err(HostError::Dom("Asset loading was abandoned".to_string())),
        }

        let frame_window = frame.content_window().ok_or_else(|| {
            HostError::Dom("Cannot find \"window\" on iframe \"contentWindow\" property.".to_string())
        })?;
        let file = Reflect::get(&frame_window, &JsValue::from_str(bridge::MODULE_GLOBAL))
            .map_err(dom_error)?;
        if file.is_undefined() || file.is_null() {
            return Err(HostError::MissingModule(in_file.to_string()));
        }
        bridge::module_from_js(in_file, &file)
    }

    async fn post(&self, url: &str, body: Option<String>) -> Result<HttpReply, HostError> {
        self.halt.check()?;
        let network = |e: JsValue| HostError::Network {
            url: url.to_string(),
            message: describe(&e),
        };

        let headers = Headers::new().map_err(network)?;
        headers
            .set("Accept", "application/json, text/plain")
            .map_err(network)?;
        let init = RequestInit::new();
        init.set_method("POST");
        if let Some(body) = body {
            headers
                .set("Content-Type", "application/json")
                .map_err(network)?;
            init.set_body(&JsValue::from_str(&body));
        }
        init.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &init).map_err(network)?;
        let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;
        let status = response.status();
        let text = JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?;

        Ok(HttpReply {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }

    async fn sleep(&self, ms: u64) {
        let timeout = i32::try_from(ms).unwrap_or(i32::MAX);
        let window = self.window.clone();
        let promise = Promise::new(&mut |resolve, _reject| {
            if let Err(e) =
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout)
            {
                console::error_1(&e);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}

pub(crate) fn dom_error(value: JsValue) -> HostError {
    HostError::Dom(describe(&value))
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(message) = string_property(value, "message") {
        return message;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|json| json.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) fn failure_from_js(value: &JsValue) -> TestFailure {
    let failure = TestFailure::new(describe(value));
    match string_property(value, "stack") {
        Some(stack) => failure.with_stack(stack),
        None => failure,
    }
}

fn string_property(value: &JsValue, name: &str) -> Option<String> {
    if !value.is_object() {
        return None;
    }
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .and_then(|property| property.as_string())
}
