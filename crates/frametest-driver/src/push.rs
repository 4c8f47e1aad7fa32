//! Handling of push-channel messages.

use crate::error::HostError;
use frametest_core::PushMessage;
use std::cell::RefCell;
use std::rc::Rc;

/// What a push message asks the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushAction {
    /// Full page reload, whatever the driver is doing
    Reload,
    /// Replace the page with this error text and halt
    Halt(String),
    /// Not understood; carries the reason
    Ignore(String),
}

impl PushAction {
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<PushMessage>(text) {
            Ok(PushMessage::Reload) => Self::Reload,
            Ok(PushMessage::Error { message }) => Self::Halt(message.message.display_text()),
            Err(e) => Self::Ignore(format!("Unhandled push message {text}: {e}")),
        }
    }
}

/// Shared between the push handler and the host. Once raised, every host
/// operation that would touch the page or the server fails with
/// [`HostError::Halted`], which stops the driver.
#[derive(Debug, Clone, Default)]
pub struct HaltSignal(Rc<RefCell<Option<String>>>);

impl HaltSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first halt wins.
    pub fn raise(&self, text: &str) {
        let mut slot = self.0.borrow_mut();
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }

    pub fn is_raised(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// # Errors
    ///
    /// `Halted` with the shown text once raised.
    pub fn check(&self) -> Result<(), HostError> {
        match &*self.0.borrow() {
            Some(text) => Err(HostError::Halted(text.clone())),
            None => Ok(()),
        }
    }
}
