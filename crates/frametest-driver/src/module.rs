//! Test modules: the ordered descriptors one test file registers.

use crate::body::TestBody;
use crate::error::{DriverError, Result};

/// One registered test.
#[derive(Debug)]
pub struct TestDescriptor {
    pub name: String,
    pub body: TestBody,
    /// Exclusive test; when any exist, only those run
    pub is_test_only: bool,
}

impl TestDescriptor {
    pub fn new(name: impl Into<String>, body: TestBody) -> Self {
        Self {
            name: name.into(),
            body,
            is_test_only: false,
        }
    }

    pub fn only(name: impl Into<String>, body: TestBody) -> Self {
        Self {
            is_test_only: true,
            ..Self::new(name, body)
        }
    }
}

/// Everything a loaded test file registered.
#[derive(Debug, Default)]
pub struct TestModule {
    tests: Vec<TestDescriptor>,
    before_each: Option<TestBody>,
}

impl TestModule {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_test(mut self, test: TestDescriptor) -> Self {
        self.push(test);
        self
    }

    pub fn push(&mut self, test: TestDescriptor) {
        self.tests.push(test);
    }

    /// Registers the hook run before every test.
    ///
    /// # Errors
    ///
    /// `DuplicateBeforeEach` if a hook is already registered.
    pub fn set_before_each(&mut self, hook: TestBody) -> Result<()> {
        if self.before_each.is_some() {
            return Err(DriverError::DuplicateBeforeEach);
        }
        self.before_each = Some(hook);
        Ok(())
    }

    pub fn before_each(&self) -> Option<&TestBody> {
        self.before_each.as_ref()
    }

    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    pub fn has_exclusive(&self) -> bool {
        self.tests.iter().any(|test| test.is_test_only)
    }

    /// The tests that run, in registration order.
    pub fn selected(&self) -> impl Iterator<Item = &TestDescriptor> {
        let exclusive = self.has_exclusive();
        self.tests
            .iter()
            .filter(move |test| !exclusive || test.is_test_only)
    }
}
