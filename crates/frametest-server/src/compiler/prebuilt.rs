use super::{CompileFailure, CompileOutcome, CompileRequest, CompileSink, Compiler, ManifestWatcher};
use async_trait::async_trait;
use frametest_core::CompileOutput;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Reads a manifest (`{ "testFileOutput": [...] }`) written by an external
/// bundler. In watch mode the file is re-read whenever it changes.
#[derive(Debug, Clone)]
pub struct PrebuiltManifestCompiler {
    manifest_path: PathBuf,
}

impl PrebuiltManifestCompiler {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    async fn load(&self, test_files: &[String]) -> CompileOutcome {
        let bytes = tokio::fs::read(&self.manifest_path).await.map_err(|e| {
            CompileFailure::new(format!(
                "Failed to read manifest {}: {e}",
                self.manifest_path.display()
            ))
        })?;

        let output = CompileOutput::from_json(&bytes).map_err(|e| {
            CompileFailure::new(format!(
                "Invalid manifest {}: {e}",
                self.manifest_path.display()
            ))
        })?;

        warn_missing(test_files, &output);
        Ok(output)
    }
}

fn warn_missing(test_files: &[String], output: &CompileOutput) {
    let compiled: HashSet<&str> = output
        .test_file_output
        .iter()
        .map(|entry| entry.in_file.as_str())
        .collect();
    for file in test_files {
        if !compiled.contains(file.as_str()) {
            warn!("Discovered test file {} is missing from the manifest", file);
        }
    }
}

#[async_trait]
impl Compiler for PrebuiltManifestCompiler {
    async fn start(&self, request: CompileRequest, sink: CompileSink) -> Result<(), CompileFailure> {
        let first = self.load(&request.test_files).await;
        if let Ok(output) = &first {
            info!(
                "Loaded {} compiled test file(s) from {}",
                output.test_file_output.len(),
                self.manifest_path.display()
            );
        }
        sink.report(first);

        if !request.watch {
            return Ok(());
        }

        let (watcher, mut changes) = ManifestWatcher::new(self.manifest_path.clone(), DEBOUNCE)
            .map_err(|e| CompileFailure::new(format!("Failed to watch manifest: {e}")))?;

        let compiler = self.clone();
        let test_files = request.test_files;
        tokio::spawn(async move {
            let _watcher = watcher;
            while changes.next().await.is_some() {
                debug!("Manifest changed, reloading");
                if !sink.report(compiler.load(&test_files).await) {
                    break;
                }
            }
            debug!("Manifest watcher stopped");
        });

        Ok(())
    }
}
