//! Runs the driver state machine against a [`DriverHost`].

use crate::assets::Asset;
use crate::body::{TestBody, TestFailure};
use crate::error::{DriverError, HostError, Result};
use crate::host::{ConsoleLevel, DriverHost};
use crate::module::TestModule;
use crate::recorder::TestRecorder;
use crate::render::{HomePageSettings, TestPageSettings};
use crate::state::DriverState;
use frametest_core::route::{
    has_run_all_flag, test_hash, test_result_all_url, test_result_url, FINISH_ALL_TESTS_PATH,
};
use frametest_core::{BootData, CompiledTestOutput, Route, TestResult, TestResultBatch};
use futures::future::{self, Either};
use std::cell::RefCell;
use std::pin::pin;

/// The test driver for one page load.
pub struct Driver<H> {
    host: H,
    boot: BootData,
    state: RefCell<DriverState>,
}

impl<H: DriverHost> Driver<H> {
    pub fn new(host: H, boot: BootData) -> Self {
        Self {
            host,
            boot,
            state: RefCell::new(DriverState::Home),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The state the driver is in (or stopped in).
    pub fn state(&self) -> DriverState {
        self.state.borrow().clone()
    }

    /// Resumes from the current URL and runs until the page has nothing left
    /// to do.
    ///
    /// Any error has already been rendered in place of the page when this
    /// returns.
    ///
    /// # Errors
    ///
    /// Theme, asset, module and aggregate-report failures.
    pub async fn start(&self) -> Result<DriverState> {
        let route = Route::from_hash(&self.host.hash());
        let run_all = has_run_all_flag(&self.host.search());
        let state = DriverState::resume(&self.boot, &route, run_all);
        self.enter(state.clone());

        let outcome = self.drive(state, run_all).await;
        match &outcome {
            Ok(state) => self.enter(state.clone()),
            Err(e) => {
                let text = e.to_string();
                if !e.is_halt() {
                    self.halt(&text);
                }
                self.enter(DriverState::Error(text));
            }
        }
        outcome
    }

    async fn drive(&self, state: DriverState, run_all: bool) -> Result<DriverState> {
        match state {
            DriverState::Error(text) => {
                self.halt(&text);
                Ok(DriverState::Error(text))
            }
            DriverState::Home => {
                self.host.render_home(&HomePageSettings {
                    test_cases: &self.boot.test_cases,
                })?;
                // Nothing to run, but a run-all page still owes the verdict
                if run_all && self.boot.test_cases.is_empty() {
                    self.finish().await?;
                    return Ok(DriverState::Done);
                }
                Ok(DriverState::Home)
            }
            DriverState::NavigateTest(index) => {
                let entry = self.entry(index)?;
                self.host.navigate(&test_hash(&entry.in_file))?;
                Ok(DriverState::NavigateTest(index))
            }
            DriverState::RunningModule(index) => self.run_module(index, run_all).await,
            other => Ok(other),
        }
    }

    async fn run_module(&self, index: usize, run_all: bool) -> Result<DriverState> {
        let entry = self.entry(index)?;
        let in_file = entry.in_file.as_str();

        // The theme renders the page the frame is placed into
        self.host.render_test(&TestPageSettings::new(in_file, &[]))?;
        let assets = entry
            .assets
            .iter()
            .map(|path| Asset::classify(path))
            .collect::<Result<Vec<_>>>()?;
        let module = self.host.load_module(in_file, &assets).await?;

        self.enter(DriverState::ExecutingTests(index));
        let results = self.execute(in_file, &module).await?;

        self.enter(DriverState::PostModuleComplete(index));
        self.report_all(in_file, results).await?;

        self.enter(DriverState::Advance(index));
        self.advance(index, run_all).await
    }

    async fn execute(&self, in_file: &str, module: &TestModule) -> Result<Vec<TestResult>> {
        let selected: Vec<_> = module.selected().collect();
        let recorders: Vec<_> = selected
            .iter()
            .map(|test| TestRecorder::new(test.name.clone()))
            .collect();
        let url = test_result_url(in_file);

        for (test, recorder) in selected.iter().zip(&recorders) {
            self.render_progress(in_file, &recorders)?;

            let outcome = self
                .run_test(module.before_each(), &test.body, recorder)
                .await;
            if let Err(failure) = &outcome {
                self.host.console(
                    ConsoleLevel::Error,
                    &format!("Error in test {}: {}", test.name, failure),
                );
            }
            recorder.finish(outcome);

            let result = recorder.snapshot();
            if result.has_failed {
                self.host
                    .console(ConsoleLevel::Error, &format!("Test failed: {}", result.name));
            } else {
                self.host
                    .console(ConsoleLevel::Log, &format!("Finished test: {}", result.name));
            }
            self.report_one(&url, &result).await;
        }

        self.render_progress(in_file, &recorders)?;
        Ok(recorders.iter().map(TestRecorder::snapshot).collect())
    }

    async fn run_test(
        &self,
        before_each: Option<&TestBody>,
        body: &TestBody,
        recorder: &TestRecorder,
    ) -> std::result::Result<(), TestFailure> {
        let run = async {
            if let Some(hook) = before_each {
                hook.invoke(recorder).await.map_err(|failure| TestFailure {
                    message: format!("beforeEach: {}", failure.message),
                    ..failure
                })?;
            }
            body.invoke(recorder).await
        };

        let timeout_ms = self.boot.test_timeout_ms;
        if timeout_ms == 0 {
            return run.await;
        }

        let run = pin!(run);
        let timer = pin!(self.host.sleep(timeout_ms));
        match future::select(run, timer).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => Err(TestFailure::timeout(timeout_ms)),
        }
    }

    fn render_progress(&self, in_file: &str, recorders: &[TestRecorder]) -> Result<()> {
        let results: Vec<_> = recorders.iter().map(TestRecorder::snapshot).collect();
        self.host
            .render_test(&TestPageSettings::new(in_file, &results))?;
        Ok(())
    }

    /// Single results are best effort; the aggregate is authoritative.
    async fn report_one(&self, url: &str, result: &TestResult) {
        let body = match serde_json::to_string(result) {
            Ok(body) => body,
            Err(e) => {
                self.host.console(
                    ConsoleLevel::Error,
                    &format!("Failed to encode result of {}: {}", result.name, e),
                );
                return;
            }
        };

        match self.host.post(url, Some(body)).await {
            Ok(reply) if reply.is_success() => {}
            Ok(reply) => self.host.console(
                ConsoleLevel::Warn,
                &format!(
                    "Server rejected result of {} ({}): {}",
                    result.name, reply.status, reply.body
                ),
            ),
            Err(HostError::Halted(_)) => {}
            Err(e) => self.host.console(
                ConsoleLevel::Error,
                &format!("Failed to post test result due to error: {e}"),
            ),
        }
    }

    async fn report_all(&self, in_file: &str, results: Vec<TestResult>) -> Result<()> {
        let body = serde_json::to_string(&TestResultBatch {
            test_result_list: results,
        })?;
        let reply = self
            .host
            .post(&test_result_all_url(in_file), Some(body))
            .await
            .map_err(|e| match e {
                HostError::Halted(_) => DriverError::Host(e),
                e => DriverError::Report {
                    file: in_file.to_string(),
                    message: e.to_string(),
                },
            })?;

        if !reply.is_success() {
            return Err(DriverError::Report {
                file: in_file.to_string(),
                message: format!("{} {}", reply.status, reply.body),
            });
        }
        Ok(())
    }

    async fn advance(&self, index: usize, run_all: bool) -> Result<DriverState> {
        if !run_all {
            return Ok(DriverState::Done);
        }

        if let Some(next) = self.boot.test_cases.get(index + 1) {
            self.host.navigate(&test_hash(&next.in_file))?;
            return Ok(DriverState::NavigateTest(index + 1));
        }

        self.finish().await?;
        Ok(DriverState::Done)
    }

    /// Asks the server for the verdict. Only a halt is an error here.
    async fn finish(&self) -> Result<()> {
        match self.host.post(FINISH_ALL_TESTS_PATH, None).await {
            Ok(reply) => self.host.console(
                ConsoleLevel::Log,
                &format!("All tests finished: {}", reply.body),
            ),
            Err(e @ HostError::Halted(_)) => return Err(e.into()),
            Err(e) => self
                .host
                .console(ConsoleLevel::Error, &format!("Failure with tests: {e}")),
        }
        Ok(())
    }

    fn entry(&self, index: usize) -> Result<&CompiledTestOutput> {
        self.boot
            .test_cases
            .get(index)
            .ok_or_else(|| DriverError::UnknownTestFile(format!("#{index}")))
    }

    fn halt(&self, text: &str) {
        self.host.console(ConsoleLevel::Error, text);
        self.host.render_error(text);
    }

    fn enter(&self, state: DriverState) {
        *self.state.borrow_mut() = state;
    }
}
