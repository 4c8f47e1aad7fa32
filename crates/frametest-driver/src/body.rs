//! Test bodies and the completion adapter.
//!
//! Modules register bodies in one of three calling conventions:
//!
//! - [`TestBody::Plain`] returns when the test is over
//! - [`TestBody::Deferred`] returns a future that settles when it is over
//! - [`TestBody::Callback`] receives a [`Done`] handle and is over once the
//!   handle is completed, whatever its returned future does
//!
//! [`TestBody::invoke`] normalizes all three into one future.

use crate::recorder::TestRecorder;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use thiserror::Error;

/// Why a test body did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestFailure {
    pub message: String,
    pub stack: Option<String>,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn timeout(ms: u64) -> Self {
        Self::new(format!("Test did not complete within {ms}ms"))
    }

    /// Arguments of the `error` log entry recorded for this failure.
    pub fn log_args(&self) -> Vec<Value> {
        match &self.stack {
            Some(stack) => vec![Value::String(stack.clone())],
            None => vec![Value::String(self.message.clone())],
        }
    }
}

pub type BodyFuture = LocalBoxFuture<'static, Result<(), TestFailure>>;

type PlainFn = dyn Fn(TestRecorder) -> Result<(), TestFailure>;
type DeferredFn = dyn Fn(TestRecorder) -> BodyFuture;
type CallbackFn = dyn Fn(TestRecorder, Done) -> BodyFuture;

/// A registered test (or hook) body.
pub enum TestBody {
    Plain(Box<PlainFn>),
    Deferred(Box<DeferredFn>),
    Callback(Box<CallbackFn>),
}

impl TestBody {
    pub fn plain<F>(body: F) -> Self
    where
        F: Fn(TestRecorder) -> Result<(), TestFailure> + 'static,
    {
        Self::Plain(Box::new(body))
    }

    pub fn deferred<F, Fut>(body: F) -> Self
    where
        F: Fn(TestRecorder) -> Fut + 'static,
        Fut: Future<Output = Result<(), TestFailure>> + 'static,
    {
        Self::Deferred(Box::new(move |recorder| body(recorder).boxed_local()))
    }

    pub fn callback<F, Fut>(body: F) -> Self
    where
        F: Fn(TestRecorder, Done) -> Fut + 'static,
        Fut: Future<Output = Result<(), TestFailure>> + 'static,
    {
        Self::Callback(Box::new(move |recorder, done| {
            body(recorder, done).boxed_local()
        }))
    }

    /// Runs the body to definitive completion.
    pub async fn invoke(&self, recorder: &TestRecorder) -> Result<(), TestFailure> {
        match self {
            Self::Plain(body) => body(recorder.clone()),
            Self::Deferred(body) => body(recorder.clone()).await,
            Self::Callback(body) => {
                let (done, completion) = Done::channel();
                body(recorder.clone(), done).await?;
                completion.await.unwrap_or_else(|_| {
                    Err(TestFailure::new(
                        "Test callback finished without calling done()",
                    ))
                })
            }
        }
    }
}

impl std::fmt::Debug for TestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Plain(_) => "Plain",
            Self::Deferred(_) => "Deferred",
            Self::Callback(_) => "Callback",
        };
        f.debug_tuple(kind).finish_non_exhaustive()
    }
}

/// Completion handle passed to callback-style bodies.
///
/// Only the first call counts. Dropping every clone without calling it fails
/// the test.
#[derive(Clone)]
pub struct Done {
    sender: Rc<RefCell<Option<oneshot::Sender<Result<(), TestFailure>>>>>,
}

impl Done {
    fn channel() -> (Self, oneshot::Receiver<Result<(), TestFailure>>) {
        let (tx, rx) = oneshot::channel();
        let done = Self {
            sender: Rc::new(RefCell::new(Some(tx))),
        };
        (done, rx)
    }

    pub fn complete(&self) {
        self.settle(Ok(()));
    }

    pub fn fail(&self, failure: TestFailure) {
        self.settle(Err(failure));
    }

    fn settle(&self, outcome: Result<(), TestFailure>) {
        if let Some(tx) = self.sender.borrow_mut().take() {
            let _ = tx.send(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_and_deferred() {
        let recorder = TestRecorder::new("t");
        assert!(TestBody::plain(|_| Ok(())).invoke(&recorder).await.is_ok());

        let body = TestBody::deferred(|_| async { Err(TestFailure::new("nope")) });
        assert_eq!(
            body.invoke(&recorder).await.unwrap_err().message,
            "nope"
        );
    }

    #[tokio::test]
    async fn test_callback_waits_for_done() {
        let recorder = TestRecorder::new("t");
        let body = TestBody::callback(|_, done| async move {
            done.complete();
            Ok(())
        });
        assert!(body.invoke(&recorder).await.is_ok());

        let body = TestBody::callback(|_, done| async move {
            done.fail(TestFailure::new("assertion failed"));
            done.complete();
            Ok(())
        });
        assert_eq!(
            body.invoke(&recorder).await.unwrap_err().message,
            "assertion failed"
        );
    }

    #[tokio::test]
    async fn test_callback_dropping_done_fails() {
        let recorder = TestRecorder::new("t");
        let body = TestBody::callback(|_, _done| async { Ok(()) });
        let failure = body.invoke(&recorder).await.unwrap_err();
        assert!(failure.message.contains("done()"));
    }

    #[test]
    fn test_failure_logs_stack_when_present() {
        let failure = TestFailure::new("boom").with_stack("Error: boom\n    at t.js:1");
        assert_eq!(
            failure.log_args(),
            vec![Value::String("Error: boom\n    at t.js:1".into())]
        );
        assert_eq!(TestFailure::new("boom").with_stack("").stack, None);
    }
}
