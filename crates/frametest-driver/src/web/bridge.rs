//! Turns the module a test file registers on its frame window into a
//! [`TestModule`].
//!
//! Expected shape:
//!
//! ```js
//! window.frametestFile = {
//!   tests: [{ name: "renders", func: () => {...}, isTestOnly: false }],
//!   beforeEach: () => {...}, // optional
//! };
//! ```
//!
//! While a test runs, `frametestFile.context` is a [`TestContext`] for it.

use super::{describe, failure_from_js};
use crate::body::{TestBody, TestFailure};
use crate::error::HostError;
use crate::module::{TestDescriptor, TestModule};
use crate::recorder::TestRecorder;
use js_sys::{Array, Function, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Global a test file registers its module on, inside the frame.
pub const MODULE_GLOBAL: &str = "frametestFile";

/// Recorder handle exposed to the running test.
#[wasm_bindgen]
pub struct TestContext {
    recorder: TestRecorder,
}

#[wasm_bindgen]
impl TestContext {
    pub fn log(&self, args: Array) {
        self.recorder.log(to_values(&args));
    }

    /// Logs at error level and fails the test.
    pub fn error(&self, args: Array) {
        self.recorder.error(to_values(&args));
    }

    pub fn fail(&self) {
        self.recorder.fail();
    }

    pub fn skip(&self) {
        self.recorder.skip();
    }
}

fn to_values(args: &Array) -> Vec<Value> {
    args.iter()
        .map(|arg| {
            serde_wasm_bindgen::from_value::<Value>(arg.clone())
                .unwrap_or_else(|_| Value::String(describe(&arg)))
        })
        .collect()
}

/// # Errors
///
/// `InvalidModule` if `tests` is missing or an entry is malformed.
pub fn module_from_js(in_file: &str, file: &JsValue) -> Result<TestModule, HostError> {
    let invalid = |message: String| HostError::InvalidModule {
        file: in_file.to_string(),
        message,
    };

    let tests: Array = Reflect::get(file, &JsValue::from_str("tests"))
        .map_err(|e| invalid(describe(&e)))?
        .dyn_into()
        .map_err(|_| invalid("\"tests\" is not an array".to_string()))?;

    let mut module = TestModule::new();
    for (index, test) in tests.iter().enumerate() {
        let name = property(&test, "name")
            .as_string()
            .ok_or_else(|| invalid(format!("test #{index} has no name")))?;
        let func: Function = property(&test, "func")
            .dyn_into()
            .map_err(|_| invalid(format!("test \"{name}\" has no function")))?;
        let is_test_only = property(&test, "isTestOnly").as_bool().unwrap_or(false);

        let body = body_from_js(file, func);
        module.push(if is_test_only {
            TestDescriptor::only(name, body)
        } else {
            TestDescriptor::new(name, body)
        });
    }

    if let Ok(hook) = property(file, "beforeEach").dyn_into::<Function>() {
        module
            .set_before_each(body_from_js(file, hook))
            .map_err(|e| invalid(e.to_string()))?;
    }

    Ok(module)
}

fn property(target: &JsValue, name: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

/// Picks the calling convention from the function's declared arity.
fn body_from_js(file: &JsValue, func: Function) -> TestBody {
    let file = file.clone();
    match func.length() {
        0 => TestBody::deferred(move |recorder| {
            let called = expose(&file, &recorder).and_then(|()| func.call0(&JsValue::UNDEFINED));
            async move { settle(called.map_err(|e| failure_from_js(&e))?).await }
        }),
        1 => TestBody::callback(move |recorder, done| {
            let done_fn = Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
                if err.is_undefined() || err.is_null() {
                    done.complete();
                } else {
                    done.fail(failure_from_js(&err));
                }
            })
            .into_js_value();
            let called =
                expose(&file, &recorder).and_then(|()| func.call1(&JsValue::UNDEFINED, &done_fn));
            async move { settle(called.map_err(|e| failure_from_js(&e))?).await }
        }),
        arity => TestBody::plain(move |_| {
            Err(TestFailure::new(format!(
                "Did not expect a test function with {arity} arguments. Only a \"done\" callback is supported."
            )))
        }),
    }
}

fn expose(file: &JsValue, recorder: &TestRecorder) -> Result<(), JsValue> {
    let context = TestContext {
        recorder: recorder.clone(),
    };
    Reflect::set(file, &JsValue::from_str("context"), &JsValue::from(context)).map(|_| ())
}

/// Awaits `value` if it is a thenable. Promises from the frame belong to
/// another realm, so they are detected by shape and adopted.
async fn settle(value: JsValue) -> Result<(), TestFailure> {
    let thenable = value.is_object() && property(&value, "then").is_function();
    if !thenable {
        return Ok(());
    }
    JsFuture::from(Promise::resolve(&value))
        .await
        .map(|_| ())
        .map_err(|e| failure_from_js(&e))
}
