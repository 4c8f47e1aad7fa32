//! These tests need Chrome/Chromium installed and are ignored by default.
//! Run with: cargo test -p frametest-browser -- --ignored

use frametest_browser::{ChromeConfig, ChromeLauncher};
use frametest_server::BrowserLauncher;
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_open_and_close() {
    let launcher = ChromeLauncher::new(ChromeConfig::default());
    let browser = launcher
        .open("about:blank")
        .await
        .expect("failed to launch browser");

    browser.close().await.expect("failed to close browser");
}

#[tokio::test]
#[ignore]
async fn test_launch_through_trait_closes_once() {
    let launcher = ChromeLauncher::new(ChromeConfig::default());
    let page = "data:text/html,<script>console.error('boom')</script>";

    let browser = launcher.launch(page).await.expect("failed to launch");
    tokio::time::sleep(Duration::from_millis(200)).await;
    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore]
async fn test_bad_executable_fails_to_launch() {
    let launcher = ChromeLauncher::new(
        ChromeConfig::default().with_chrome_path("/nonexistent/chrome"),
    );
    assert!(launcher.open("about:blank").await.is_err());
}
