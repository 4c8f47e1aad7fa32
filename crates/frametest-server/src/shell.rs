//! The HTML shell every driver page boots from.

use crate::registry::CompileState;
use crate::state::ServerSettings;
use frametest_core::boot::{BOOT_GLOBAL, RUNTIME_GLOBAL};
use frametest_core::route::{RUNTIME_SCRIPT_PATH, THEME_PREFIX};
use frametest_core::{BootData, ErrorEnvelope};

/// Renders the shell page for the current compile state.
///
/// A pending compile error is embedded in place of the catalogue; the driver
/// renders it and halts.
pub fn render(state: &CompileState, settings: &ServerSettings) -> serde_json::Result<String> {
    let boot = BootData {
        test_cases: if state.last_error.is_some() {
            Default::default()
        } else {
            state.manifest.clone().unwrap_or_default()
        },
        compile_error: state.last_error.clone().map(ErrorEnvelope::from),
        push_port: settings.mode.is_watch().then_some(settings.push_port),
        test_timeout_ms: settings.test_timeout_ms,
    };
    let boot_script = boot.to_inline_script()?;

    let mut head = String::new();
    let mut body = String::new();

    if !settings.theme.style.is_empty() {
        head.push_str(&format!(
            r#"<link rel="stylesheet" type="text/css" href="{}">"#,
            theme_href(&settings.theme.style)
        ));
    }
    body.push_str(&format!("<script>window.{BOOT_GLOBAL} = {boot_script};</script>\n"));
    if !settings.theme.script.is_empty() {
        body.push_str(&format!(
            r#"<script type="text/javascript" src="{}"></script>"#,
            theme_href(&settings.theme.script)
        ));
        body.push('\n');
    }
    body.push_str(&format!(
        r#"<script type="text/javascript" src="{RUNTIME_SCRIPT_PATH}"></script>"#
    ));
    body.push('\n');
    body.push_str(&format!("<script>window.{RUNTIME_GLOBAL}.start();</script>\n"));

    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>frametest</title>\n{head}\n</head>\n<body>\n{body}</body>\n</html>\n"
    ))
}

fn theme_href(path: &str) -> String {
    let path = path.trim_start_matches('/').replace('"', "%22");
    format!("{THEME_PREFIX}{path}")
}
