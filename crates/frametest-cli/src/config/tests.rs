#[cfg(test)]
mod tests {
    use crate::cli::RunArgs;
    use crate::config::loading::env_key;
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use frametest_server::RunMode;
    use serial_test::serial;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const THEMED: &str = r#"
        [theme]
        script = "theme/theme.js"
        style = "theme/theme.css"
    "#;

    fn themed() -> FrametestConfig {
        FrametestConfig {
            theme: ThemeConfig {
                script: "theme/theme.js".into(),
                style: "theme/theme.css".into(),
            },
            ..FrametestConfig::default()
        }
    }

    fn load(dir: &Path, args: &RunArgs) -> crate::error::Result<FrametestConfig> {
        FrametestConfig::load(dir, None, args, false)
    }

    #[test]
    fn test_env_keys_become_camel_case() {
        assert_eq!(env_key("PORT"), "port");
        assert_eq!(env_key("PUSH_PORT"), "pushPort");
        assert_eq!(env_key("TEST_TIMEOUT_MS"), "testTimeoutMs");
        assert_eq!(env_key("BROWSER__CHROME_PATH"), "browser.chromePath");
        assert_eq!(env_key("THEME__SCRIPT"), "theme.script");
    }

    #[test]
    fn test_defaults_need_a_theme() {
        let err = FrametestConfig::default().validate().unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::MissingField { ref field, .. }) if field == "theme.script"
        ));
        assert!(themed().validate().is_ok());
    }

    #[test]
    fn test_extension_rules() {
        assert!(validate_extension("ts").is_ok());
        assert!(validate_extension(".ts").is_err());
        assert!(validate_extension("*.ts").is_err());
        assert!(validate_extension("").is_err());

        let config = FrametestConfig {
            file_extensions: vec![],
            ..themed()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let config = FrametestConfig {
            test_regex: r"\.test\.(ts".into(),
            ..themed()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("testRegex"));
    }

    #[test]
    fn test_port_clash_is_rejected() {
        let config = FrametestConfig {
            push_port: 9615,
            ..themed()
        };
        assert!(matches!(
            config.validate(),
            Err(CliError::Config(ConfigError::ConflictingOptions(_)))
        ));
    }

    #[test]
    fn test_camel_case_serialization() {
        let value = serde_json::to_value(themed()).unwrap();
        assert!(value.get("pushPort").is_some());
        assert!(value.get("testTimeoutMs").is_some());
        assert_eq!(value["sessionIdentity"], "cookie");
        assert!(value["browser"].get("chromePath").is_none());
    }

    #[test]
    #[serial]
    fn test_file_then_flags() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            format!(
                "port = 9000\npushPort = 9001\nmanifest = \"build/m.json\"\n{THEMED}\n[browser]\nheadless = false\n"
            ),
        )
        .unwrap();

        let from_file = load(temp.path(), &RunArgs::default()).unwrap();
        assert_eq!(from_file.port, 9000);
        assert_eq!(from_file.manifest, PathBuf::from("build/m.json"));
        assert!(!from_file.browser.headless);
        assert!(from_file.browser.enabled);
        assert_eq!(from_file.host, "127.0.0.1");

        let args = RunArgs {
            port: Some(9100),
            ..RunArgs::default()
        };
        let config = FrametestConfig::load(temp.path(), None, &args, true).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.push_port, 9001);
        assert!(!config.browser.enabled);
    }

    #[test]
    #[serial]
    fn test_environment_beats_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), format!("port = 9000\n{THEMED}")).unwrap();

        unsafe {
            std::env::set_var("FRAMETEST_PORT", "9200");
            std::env::set_var("FRAMETEST_BROWSER__CHROME_PATH", "/usr/bin/chromium");
        }
        let result = load(temp.path(), &RunArgs::default());
        unsafe {
            std::env::remove_var("FRAMETEST_PORT");
            std::env::remove_var("FRAMETEST_BROWSER__CHROME_PATH");
        }

        let config = result.unwrap();
        assert_eq!(config.port, 9200);
        assert_eq!(
            config.browser.chrome_path,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    #[serial]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = FrametestConfig::load(
            temp.path(),
            Some(Path::new("ci.toml")),
            &RunArgs::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), format!("prot = 1\n{THEMED}")).unwrap();

        let err = load(temp.path(), &RunArgs::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_conversions() {
        let config = FrametestConfig {
            test_timeout_ms: 0,
            ..themed()
        };
        let settings = config.server_settings(RunMode::Watch);
        assert_eq!(settings.mode, RunMode::Watch);
        assert_eq!(settings.theme.script, "theme/theme.js");
        assert_eq!(settings.test_timeout_ms, 0);

        let options = config.discovery_options().unwrap();
        assert!(options.test_regex.is_match("src/button.test.tsx"));
        assert!(!options.test_regex.is_match("src/button.tsx"));

        assert!(config.chrome_config().headless);
    }
}
