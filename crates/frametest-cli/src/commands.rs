//! `frametest run` and `frametest watch`.
//!
//! 1. Load and validate the configuration
//! 2. Discover test files under the working directory
//! 3. Read the driver bundle
//! 4. Hand everything to the orchestrator with the prebuilt-manifest compiler
//!    and, unless disabled, a managed Chrome

use crate::cli::{Cli, Command};
use crate::config::FrametestConfig;
use crate::error::Result;
use frametest_browser::ChromeLauncher;
use frametest_core::ExitStatus;
use frametest_server::{
    discover, load_runtime_script, Orchestrator, PrebuiltManifestCompiler, RunMode,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs the selected command and returns the process exit status.
///
/// # Errors
///
/// Configuration, discovery and startup failures. Failed tests are not an
/// error; they are reported through the returned status.
pub async fn execute(cli: Cli) -> Result<ExitStatus> {
    let mode = match cli.command {
        Command::Run(_) => RunMode::OneShot,
        Command::Watch(_) => RunMode::Watch,
    };

    let cwd = std::env::current_dir()?;
    let config = FrametestConfig::load(
        &cwd,
        cli.config.as_deref(),
        cli.command.args(),
        cli.no_browser,
    )?;
    debug!("Configuration: {:?}", config);

    let test_files = discover(&cwd, &config.discovery_options()?)?;
    info!("Found {} test file(s)", test_files.len());
    for file in &test_files {
        debug!("  {}", file);
    }

    let runtime_script = load_runtime_script(&cwd.join(&config.runtime_script)).await?;
    let compiler = Arc::new(PrebuiltManifestCompiler::new(cwd.join(&config.manifest)));

    let mut orchestrator =
        Orchestrator::new(config.server_settings(mode), runtime_script, compiler);
    if config.browser.enabled {
        orchestrator =
            orchestrator.with_browser(Arc::new(ChromeLauncher::new(config.chrome_config())));
    }

    let status = orchestrator.run(test_files).await?;
    report(status);
    Ok(status)
}

fn report(status: ExitStatus) {
    match status {
        ExitStatus::Success => info!("All tests passed"),
        ExitStatus::TestsFailed => error!("Tests failed"),
        ExitStatus::Interrupted => info!("Run interrupted"),
    }
}
