//! Test file discovery.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Which files count as tests.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub test_regex: Regex,
    /// Extensions without the leading dot
    pub file_extensions: Vec<String>,
    /// Directory names skipped at any depth
    pub ignore_directories: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("No test files found under {} matching {pattern}", .root.display())]
    NoTestFiles { root: PathBuf, pattern: String },

    #[error("Failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Finds test files under `root`, returned as sorted `/`-separated paths
/// relative to `root`.
///
/// # Errors
///
/// `NoTestFiles` if nothing matched; `Walk` if the root cannot be read.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Vec<String>, DiscoveryError> {
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !options
                .ignore_directories
                .iter()
                .any(|ignored| entry.file_name().to_str() == Some(ignored.as_str()))
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if has_extension(&relative, &options.file_extensions)
            && options.test_regex.is_match(&relative)
        {
            files.push(relative);
        }
    }

    if files.is_empty() {
        return Err(DiscoveryError::NoTestFiles {
            root: root.to_path_buf(),
            pattern: options.test_regex.as_str().to_string(),
        });
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &str, extensions: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options() -> DiscoveryOptions {
        DiscoveryOptions {
            test_regex: Regex::new(r"\.test\.tsx?$").unwrap(),
            file_extensions: vec!["ts".into(), "tsx".into()],
            ignore_directories: vec!["node_modules".into()],
        }
    }

    fn touch(root: &Path, path: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, "").unwrap();
    }

    #[test]
    fn test_finds_matching_files_and_skips_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/Button/Button.test.tsx");
        touch(dir.path(), "src/util.test.ts");
        touch(dir.path(), "src/util.ts");
        touch(dir.path(), "src/legacy.test.js");
        touch(dir.path(), "node_modules/pkg/index.test.ts");

        let files = discover(dir.path(), &options()).unwrap();
        assert_eq!(files, vec!["src/Button/Button.test.tsx", "src/util.test.ts"]);
    }

    #[test]
    fn test_zero_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/util.ts");

        let err = discover(dir.path(), &options()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoTestFiles { .. }));
    }
}
