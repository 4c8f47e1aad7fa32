//! Page routes and HTTP endpoint paths.
//!
//! The driver keeps no state across navigations; everything it needs to
//! resume lives in the URL. The hash selects the page, the query carries the
//! run-all flag:
//!
//! ```text
//! http://127.0.0.1:9615/?runAllTests#/test/src/button.test.ts
//! ```

/// Query parameter marking a one-shot run over every test file.
pub const RUN_ALL_PARAM: &str = "runAllTests";

/// Hash prefix of a test page.
pub const TEST_ROUTE_PREFIX: &str = "#/test/";

pub const RUNTIME_SCRIPT_PATH: &str = "/runtime-script";
pub const THEME_PREFIX: &str = "/theme/";
pub const COMPILED_ASSET_PREFIX: &str = "/compiled-asset/";
pub const TEST_RESULT_PREFIX: &str = "/api/testResult/";
pub const TEST_RESULT_ALL_PREFIX: &str = "/api/testResultAll/";
pub const FINISH_ALL_TESTS_PATH: &str = "/api/finishAllTests";

/// Which page the driver is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Empty hash, `#` or `#/`
    Home,
    /// `#/test/<inFile>`
    Test { in_file: String },
    /// Anything else
    Unknown(String),
}

impl Route {
    /// Parses `window.location.hash`. Anything after a `?` inside the hash is
    /// ignored.
    pub fn from_hash(hash: &str) -> Self {
        let route = hash.split('?').next().unwrap_or_default();
        match route {
            "" | "#" | "#/" => Self::Home,
            _ => match route.strip_prefix(TEST_ROUTE_PREFIX) {
                Some(in_file) => Self::Test {
                    in_file: in_file.to_string(),
                },
                None => Self::Unknown(route.to_string()),
            },
        }
    }

    /// The hash that navigates to this route.
    pub fn to_hash(&self) -> String {
        match self {
            Self::Home => "#/".to_string(),
            Self::Test { in_file } => test_hash(in_file),
            Self::Unknown(raw) => raw.clone(),
        }
    }
}

/// Hash for a test file page.
pub fn test_hash(in_file: &str) -> String {
    format!("{TEST_ROUTE_PREFIX}{in_file}")
}

/// True if `search` (with or without the leading `?`) carries the run-all flag.
pub fn has_run_all_flag(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .any(|pair| pair.split('=').next() == Some(RUN_ALL_PARAM))
}

/// Entry URL the browser is pointed at.
pub fn entry_url(host: &str, port: u16, run_all: bool) -> String {
    if run_all {
        format!("http://{host}:{port}/?{RUN_ALL_PARAM}#/")
    } else {
        format!("http://{host}:{port}/#/")
    }
}

pub fn compiled_asset_url(asset: &str) -> String {
    format!("{COMPILED_ASSET_PREFIX}{asset}")
}

pub fn test_result_url(in_file: &str) -> String {
    format!("{TEST_RESULT_PREFIX}{in_file}")
}

pub fn test_result_all_url(in_file: &str) -> String {
    format!("{TEST_RESULT_ALL_PREFIX}{in_file}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_variants() {
        assert_eq!(Route::from_hash(""), Route::Home);
        assert_eq!(Route::from_hash("#"), Route::Home);
        assert_eq!(Route::from_hash("#/"), Route::Home);
        assert_eq!(Route::from_hash("#/?x=1"), Route::Home);
    }

    #[test]
    fn test_test_route_keeps_nested_path() {
        assert_eq!(
            Route::from_hash("#/test/src/Button/Button.test.tsx"),
            Route::Test {
                in_file: "src/Button/Button.test.tsx".into()
            }
        );
        let route = Route::Test {
            in_file: "a.test.ts".into(),
        };
        assert_eq!(Route::from_hash(&route.to_hash()), route);
    }

    #[test]
    fn test_unknown_route() {
        assert_eq!(
            Route::from_hash("#/settings"),
            Route::Unknown("#/settings".into())
        );
    }

    #[test]
    fn test_run_all_flag() {
        assert!(has_run_all_flag("?runAllTests"));
        assert!(has_run_all_flag("?a=1&runAllTests="));
        assert!(!has_run_all_flag(""));
        assert!(!has_run_all_flag("?runAll"));
    }

    #[test]
    fn test_entry_url() {
        assert_eq!(
            entry_url("127.0.0.1", 9615, true),
            "http://127.0.0.1:9615/?runAllTests#/"
        );
        assert_eq!(entry_url("localhost", 80, false), "http://localhost:80/#/");
    }
}
