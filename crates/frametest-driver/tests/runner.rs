//! Driver scenarios against an in-memory host.

#![cfg(not(target_arch = "wasm32"))]

use async_trait::async_trait;
use frametest_core::{
    BootData, CompiledTestOutput, LogKind, Manifest, SerializedError, TestResult,
    TestResultBatch,
};
use frametest_driver::{
    Asset, ConsoleLevel, Driver, DriverError, DriverHost, DriverState, HaltSignal,
    HomePageSettings, HostError, HttpReply, TestBody, TestDescriptor, TestFailure, TestModule, TestPageSettings,
    TestState,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
struct MemoryHost {
    hash: String,
    search: String,
    modules: RefCell<HashMap<String, TestModule>>,
    /// URL prefixes whose posts fail at the network level
    unreachable: Vec<String>,
    /// Resolve timers immediately instead of never
    instant_timers: bool,
    halt: HaltSignal,

    posts: RefCell<Vec<(String, Option<String>)>>,
    navigations: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    homes: RefCell<usize>,
    renders: RefCell<Vec<TestPageSettings>>,
    loaded_assets: RefCell<Vec<Asset>>,
    console: RefCell<Vec<(ConsoleLevel, String)>>,
}

impl MemoryHost {
    fn at(hash: &str, run_all: bool) -> Self {
        Self {
            hash: hash.to_string(),
            search: if run_all { "?runAllTests".into() } else { String::new() },
            ..Self::default()
        }
    }

    fn with_module(self, in_file: &str, module: TestModule) -> Self {
        self.modules.borrow_mut().insert(in_file.to_string(), module);
        self
    }

    fn posts_to(&self, prefix: &str) -> Vec<Option<String>> {
        self.posts
            .borrow()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn single_results(&self) -> Vec<TestResult> {
        self.posts_to("/api/testResult/")
            .into_iter()
            .map(|body| serde_json::from_str(&body.unwrap()).unwrap())
            .collect()
    }

    fn aggregate(&self) -> TestResultBatch {
        let bodies = self.posts_to("/api/testResultAll/");
        assert_eq!(bodies.len(), 1);
        TestResultBatch::from_json(bodies[0].as_deref().unwrap().as_bytes()).unwrap()
    }
}

#[async_trait(?Send)]
impl DriverHost for MemoryHost {
    fn hash(&self) -> String {
        self.hash.clone()
    }

    fn search(&self) -> String {
        self.search.clone()
    }

    fn console(&self, level: ConsoleLevel, message: &str) {
        self.console.borrow_mut().push((level, message.to_string()));
    }

    fn render_error(&self, text: &str) {
        self.errors.borrow_mut().push(text.to_string());
    }

    fn render_home(&self, _settings: &HomePageSettings<'_>) -> Result<(), HostError> {
        self.halt.check()?;
        *self.homes.borrow_mut() += 1;
        Ok(())
    }

    fn render_test(&self, settings: &TestPageSettings) -> Result<(), HostError> {
        self.halt.check()?;
        self.renders.borrow_mut().push(settings.clone());
        Ok(())
    }

    fn navigate(&self, hash: &str) -> Result<(), HostError> {
        self.halt.check()?;
        self.navigations.borrow_mut().push(hash.to_string());
        Ok(())
    }

    async fn load_module(&self, in_file: &str, assets: &[Asset]) -> Result<TestModule, HostError> {
        self.loaded_assets.borrow_mut().extend_from_slice(assets);
        self.modules
            .borrow_mut()
            .remove(in_file)
            .ok_or_else(|| HostError::MissingModule(in_file.to_string()))
    }

    async fn post(&self, url: &str, body: Option<String>) -> Result<HttpReply, HostError> {
        self.halt.check()?;
        if self.unreachable.iter().any(|prefix| url.starts_with(prefix.as_str())) {
            return Err(HostError::Network {
                url: url.to_string(),
                message: "connection refused".into(),
            });
        }
        self.posts.borrow_mut().push((url.to_string(), body));
        Ok(HttpReply {
            status: 200,
            body: "ok".into(),
        })
    }

    async fn sleep(&self, _ms: u64) {
        if !self.instant_timers {
            futures::future::pending::<()>().await;
        }
    }
}

fn boot(files: &[&str]) -> BootData {
    BootData {
        test_cases: Manifest::new(
            files
                .iter()
                .map(|f| CompiledTestOutput {
                    in_file: (*f).to_string(),
                    assets: vec![format!("dist/{f}.css"), format!("dist/{f}.js")],
                })
                .collect(),
        ),
        compile_error: None,
        push_port: None,
        test_timeout_ms: 5_000,
    }
}

fn pass() -> TestBody {
    TestBody::plain(|_| Ok(()))
}

fn two_passing() -> TestModule {
    TestModule::new()
        .with_test(TestDescriptor::new("t1", pass()))
        .with_test(TestDescriptor::new("t2", pass()))
}

#[tokio::test]
async fn test_compile_error_renders_and_halts() {
    let mut boot = boot(&["a.test.ts"]);
    boot.compile_error = Some(
        SerializedError::new("SyntaxError", "Unexpected token")
            .with_stack("SyntaxError: Unexpected token\n  at a.test.ts:2")
            .into(),
    );

    let driver = Driver::new(MemoryHost::at("#/", true), boot);
    let state = driver.start().await.unwrap();

    assert!(matches!(state, DriverState::Error(_)));
    let host = driver.host();
    assert_eq!(
        host.errors.borrow().as_slice(),
        ["SyntaxError: Unexpected token\n  at a.test.ts:2"]
    );
    assert!(host.navigations.borrow().is_empty());
    assert!(host.posts.borrow().is_empty());
}

#[tokio::test]
async fn test_home_renders_catalogue() {
    let driver = Driver::new(MemoryHost::at("", false), boot(&["a.test.ts"]));
    assert_eq!(driver.start().await.unwrap(), DriverState::Home);
    assert_eq!(*driver.host().homes.borrow(), 1);
}

#[tokio::test]
async fn test_home_with_run_all_navigates_to_first_file() {
    let driver = Driver::new(MemoryHost::at("#/", true), boot(&["a.test.ts", "b.test.ts"]));
    assert_eq!(driver.start().await.unwrap(), DriverState::NavigateTest(0));
    assert_eq!(
        driver.host().navigations.borrow().as_slice(),
        ["#/test/a.test.ts"]
    );
}

#[tokio::test]
async fn test_unknown_file_renders_error() {
    let driver = Driver::new(MemoryHost::at("#/test/gone.test.ts", true), boot(&["a.test.ts"]));
    let state = driver.start().await.unwrap();
    assert_eq!(
        state,
        DriverState::Error("Unable to find test file: gone.test.ts".into())
    );
    assert_eq!(driver.host().errors.borrow().len(), 1);
}

#[tokio::test]
async fn test_module_assets_are_classified_in_order() {
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", two_passing());
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let assets = driver.host().loaded_assets.borrow();
    let urls: Vec<_> = assets.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "/compiled-asset/dist/a.test.ts.css",
            "/compiled-asset/dist/a.test.ts.js"
        ]
    );
}

#[tokio::test]
async fn test_exclusive_test_is_the_only_one_run() {
    let module = TestModule::new()
        .with_test(TestDescriptor::new("normal 1", pass()))
        .with_test(TestDescriptor::only("focused", pass()))
        .with_test(TestDescriptor::new("normal 2", pass()));
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", module);
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let host = driver.host();
    let singles = host.single_results();
    assert_eq!(singles.len(), 1);
    assert_eq!(singles[0].name, "focused");
    assert_eq!(host.aggregate().test_result_list.len(), 1);

    let last_render = host.renders.borrow().last().cloned().unwrap();
    assert_eq!(last_render.tests.len(), 1);
    assert_eq!(last_render.tests[0].state, TestState::Pass);
}

#[tokio::test]
async fn test_run_all_advances_to_next_file() {
    let host = MemoryHost::at("#/test/a.test.ts", true).with_module("a.test.ts", two_passing());
    let driver = Driver::new(host, boot(&["a.test.ts", "b.test.ts"]));

    assert_eq!(driver.start().await.unwrap(), DriverState::NavigateTest(1));
    let host = driver.host();
    assert_eq!(host.navigations.borrow().as_slice(), ["#/test/b.test.ts"]);
    assert!(host.posts_to("/api/finishAllTests").is_empty());
}

#[tokio::test]
async fn test_last_file_finishes_run_once() {
    let host = MemoryHost::at("#/test/b.test.ts", true).with_module("b.test.ts", two_passing());
    let driver = Driver::new(host, boot(&["a.test.ts", "b.test.ts"]));

    assert_eq!(driver.start().await.unwrap(), DriverState::Done);
    let host = driver.host();
    assert_eq!(host.posts_to("/api/finishAllTests"), vec![None]);
    assert!(host.navigations.borrow().is_empty());

    // Finish comes after the aggregate
    let urls: Vec<_> = host.posts.borrow().iter().map(|(u, _)| u.clone()).collect();
    assert_eq!(urls.last().unwrap(), "/api/finishAllTests");
    assert_eq!(urls[urls.len() - 2], "/api/testResultAll/b.test.ts");
}

#[tokio::test]
async fn test_without_run_all_flag_stays_on_page() {
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", two_passing());
    let driver = Driver::new(host, boot(&["a.test.ts", "b.test.ts"]));

    assert_eq!(driver.start().await.unwrap(), DriverState::Done);
    let host = driver.host();
    assert!(host.navigations.borrow().is_empty());
    assert!(host.posts_to("/api/finishAllTests").is_empty());
    assert_eq!(host.single_results().len(), 2);
}

#[tokio::test]
async fn test_failures_are_confined_to_their_test() {
    let module = TestModule::new()
        .with_test(TestDescriptor::new(
            "throws",
            TestBody::plain(|_| Err(TestFailure::new("TypeError: x is undefined"))),
        ))
        .with_test(TestDescriptor::new(
            "asserts",
            TestBody::plain(|recorder| {
                recorder.error(vec![json!("expected 1 to be 2")]);
                Ok(())
            }),
        ))
        .with_test(TestDescriptor::new(
            "skipped",
            TestBody::plain(|recorder| {
                recorder.skip();
                Ok(())
            }),
        ))
        .with_test(TestDescriptor::new("passes", pass()));
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", module);
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let results = driver.host().aggregate().test_result_list;
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.has_run));

    assert!(results[0].has_exceptional_error && results[0].has_failed);
    assert_eq!(results[0].log_list[0].kind, LogKind::Error);
    assert!(results[1].has_failed && !results[1].has_exceptional_error);
    assert!(results[2].is_skipped && !results[2].has_failed);
    assert!(!results[3].has_failed);

    let states: Vec<_> = driver
        .host()
        .renders
        .borrow()
        .last()
        .unwrap()
        .tests
        .iter()
        .map(|t| t.state)
        .collect();
    assert_eq!(
        states,
        [TestState::Error, TestState::Fail, TestState::Skip, TestState::Pass]
    );
}

#[tokio::test]
async fn test_progress_renders_before_each_test() {
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", two_passing());
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let renders = driver.host().renders.borrow();
    // Empty page, before t1, before t2, final
    assert_eq!(renders.len(), 4);
    assert!(renders[0].tests.is_empty());
    assert_eq!(
        renders[1].tests.iter().map(|t| t.state).collect::<Vec<_>>(),
        [TestState::Waiting, TestState::Waiting]
    );
    assert_eq!(
        renders[2].tests.iter().map(|t| t.state).collect::<Vec<_>>(),
        [TestState::Pass, TestState::Waiting]
    );
}

#[tokio::test]
async fn test_callback_and_deferred_bodies() {
    let module = TestModule::new()
        .with_test(TestDescriptor::new(
            "callback",
            TestBody::callback(|recorder, done| async move {
                recorder.log(vec![json!("before done")]);
                done.complete();
                Ok(())
            }),
        ))
        .with_test(TestDescriptor::new(
            "deferred",
            TestBody::deferred(|_| async { Err(TestFailure::new("rejected")) }),
        ));
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", module);
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let results = driver.host().aggregate().test_result_list;
    assert!(!results[0].has_failed);
    assert_eq!(results[0].log_list[0].args, vec![json!("before done")]);
    assert!(results[1].has_exceptional_error);
}

#[tokio::test]
async fn test_timeout_fails_only_the_hanging_test() {
    let module = TestModule::new()
        .with_test(TestDescriptor::new(
            "hangs",
            TestBody::deferred(|_| futures::future::pending()),
        ))
        .with_test(TestDescriptor::new("passes", pass()));
    let mut host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", module);
    host.instant_timers = true;
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let results = driver.host().aggregate().test_result_list;
    assert!(results[0].has_run && results[0].has_exceptional_error && results[0].has_failed);
    assert_eq!(
        results[0].log_list[0].args,
        vec![json!("Test did not complete within 5000ms")]
    );
    assert!(!results[1].has_failed);
}

#[tokio::test]
async fn test_failing_before_each_fails_each_test() {
    let mut module = two_passing();
    module
        .set_before_each(TestBody::plain(|_| Err(TestFailure::new("setup broke"))))
        .unwrap();
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", module);
    let driver = Driver::new(host, boot(&["a.test.ts"]));
    driver.start().await.unwrap();

    let results = driver.host().aggregate().test_result_list;
    assert_eq!(results.len(), 2);
    for result in results {
        assert!(result.has_exceptional_error);
        assert_eq!(result.log_list[0].args, vec![json!("beforeEach: setup broke")]);
    }
}

#[tokio::test]
async fn test_single_post_failure_is_swallowed() {
    let mut host = MemoryHost::at("#/test/a.test.ts", true).with_module("a.test.ts", two_passing());
    host.unreachable = vec!["/api/testResult/".into()];
    let driver = Driver::new(host, boot(&["a.test.ts"]));

    assert_eq!(driver.start().await.unwrap(), DriverState::Done);
    let host = driver.host();
    assert_eq!(host.aggregate().test_result_list.len(), 2);
    assert_eq!(host.posts_to("/api/finishAllTests").len(), 1);
    assert!(host
        .console
        .borrow()
        .iter()
        .any(|(level, msg)| *level == ConsoleLevel::Error && msg.contains("connection refused")));
}

#[tokio::test]
async fn test_aggregate_post_failure_aborts() {
    let mut host = MemoryHost::at("#/test/a.test.ts", true).with_module("a.test.ts", two_passing());
    host.unreachable = vec!["/api/testResultAll/".into()];
    let driver = Driver::new(host, boot(&["a.test.ts", "b.test.ts"]));

    let err = driver.start().await.unwrap_err();
    assert!(matches!(err, DriverError::Report { .. }));
    assert!(matches!(driver.state(), DriverState::Error(_)));

    let host = driver.host();
    assert!(host.navigations.borrow().is_empty());
    assert_eq!(host.errors.borrow().len(), 1);
}

#[tokio::test]
async fn test_missing_module_is_fatal_for_the_file() {
    let host = MemoryHost::at("#/test/a.test.ts", true);
    let driver = Driver::new(host, boot(&["a.test.ts"]));

    let err = driver.start().await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Host(HostError::MissingModule(ref file)) if file == "a.test.ts"
    ));
    let host = driver.host();
    assert!(host.posts.borrow().is_empty());
    assert!(host.errors.borrow()[0].starts_with("Cannot find the test module for a.test.ts"));
}

#[tokio::test]
async fn test_unsupported_asset_is_fatal() {
    let mut boot = boot(&["a.test.ts"]);
    boot.test_cases = Manifest::new(vec![CompiledTestOutput {
        in_file: "a.test.ts".into(),
        assets: vec!["dist/logo.png".into()],
    }]);
    let host = MemoryHost::at("#/test/a.test.ts", false).with_module("a.test.ts", two_passing());
    let driver = Driver::new(host, boot);

    let err = driver.start().await.unwrap_err();
    assert!(matches!(err, DriverError::UnsupportedAsset(ref p) if p == "dist/logo.png"));
    assert!(driver.host().loaded_assets.borrow().is_empty());
}

#[tokio::test]
async fn test_push_error_mid_module_stops_the_driver() {
    let host = MemoryHost::at("#/test/a.test.ts", true);
    let signal = host.halt.clone();
    let module = TestModule::new()
        .with_test(TestDescriptor::new(
            "t1",
            TestBody::plain(move |_| {
                signal.raise("SyntaxError: Unexpected token");
                Ok(())
            }),
        ))
        .with_test(TestDescriptor::new("t2", pass()));
    let host = host.with_module("a.test.ts", module);

    let driver = Driver::new(host, boot(&["a.test.ts", "b.test.ts"]));
    let err = driver.start().await.unwrap_err();

    assert!(err.is_halt());
    assert_eq!(
        driver.state(),
        DriverState::Error("SyntaxError: Unexpected token".into())
    );
    let host = driver.host();
    // The pushed error stays on the page
    assert!(host.errors.borrow().is_empty());
    // Page render plus progress before t1; nothing after the halt
    assert_eq!(host.renders.borrow().len(), 2);
    assert!(host.posts.borrow().is_empty());
    assert!(host.navigations.borrow().is_empty());
}

#[tokio::test]
async fn test_halted_page_neither_renders_nor_reports() {
    let host = MemoryHost::at("#/", true).with_module("a.test.ts", two_passing());
    host.halt.raise("SyntaxError: Unexpected token");
    let driver = Driver::new(host, boot(&["a.test.ts"]));

    let err = driver.start().await.unwrap_err();

    assert!(err.is_halt());
    let host = driver.host();
    assert!(host.navigations.borrow().is_empty());
    assert!(host.posts.borrow().is_empty());
    assert!(host.errors.borrow().is_empty());
}

#[tokio::test]
async fn test_run_all_without_test_files_still_finishes() {
    let driver = Driver::new(MemoryHost::at("#/", true), boot(&[]));

    assert_eq!(driver.start().await.unwrap(), DriverState::Done);
    let host = driver.host();
    assert_eq!(host.posts_to("/api/finishAllTests"), vec![None]);
    assert!(host.navigations.borrow().is_empty());
}
