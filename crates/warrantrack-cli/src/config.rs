// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use warrantrack_app::{ExpiryFormat, ExpiryPolicy, ScreenKind};

pub const APP_NAME: &str = "warrantrack";
pub const CONFIG_PATH_ENV: &str = "WARRANTRACK_CONFIG_PATH";
pub const API_URL_ENV: &str = "WARRANTRACK_API_URL";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_NOTICE_TIMEOUT: &str = "3s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub expiry: Expiry,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            expiry: Expiry::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_screen: Option<String>,
    pub notice_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expiry {
    pub lookup: Option<ExpiryFormatOverride>,
    pub inventory: Option<ExpiryFormatOverride>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExpiryFormatOverride {
    pub warning_glyph: Option<bool>,
    pub show_distant: Option<bool>,
}

impl ExpiryFormatOverride {
    fn apply(self, base: ExpiryFormat) -> ExpiryFormat {
        ExpiryFormat {
            warning_glyph: self.warning_glyph.unwrap_or(base.warning_glyph),
            show_distant: self.show_distant.unwrap_or(base.show_distant),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` at the top; sections are [api], [ui], [expiry.*], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        for (key, value) in [
            ("api.timeout", &self.api.timeout),
            ("ui.notice_timeout", &self.ui.notice_timeout),
        ] {
            if let Some(raw) = value {
                let parsed = parse_duration(raw)
                    .with_context(|| format!("{key} in {}", path.display()))?;
                if parsed <= Duration::ZERO {
                    bail!(
                        "{key} in {} must be positive, got {}",
                        path.display(),
                        raw
                    );
                }
            }
        }

        if let Some(screen) = &self.ui.start_screen
            && ScreenKind::parse(screen).is_none()
        {
            bail!(
                "ui.start_screen in {} must be one of add, search, inventory; got {:?}",
                path.display(),
                screen
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!("log.level in {} is not a valid filter", path.display())
            })?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> String {
        if let Ok(value) = env::var(API_URL_ENV)
            && !value.trim().is_empty()
        {
            return value.trim().to_owned();
        }
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
            .to_owned()
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn notice_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .notice_timeout
                .as_deref()
                .unwrap_or(DEFAULT_NOTICE_TIMEOUT),
        )
    }

    pub fn start_screen(&self) -> ScreenKind {
        self.ui
            .start_screen
            .as_deref()
            .and_then(ScreenKind::parse)
            .unwrap_or(ScreenKind::Inventory)
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        let defaults = ExpiryPolicy::default();
        ExpiryPolicy {
            lookup: self
                .expiry
                .lookup
                .unwrap_or_default()
                .apply(defaults.lookup),
            inventory: self
                .expiry
                .inventory
                .unwrap_or_default()
                .apply(defaults.inventory),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let cache_root = dirs::cache_dir()
            .ok_or_else(|| anyhow!("cannot resolve cache directory; set [log].path"))?;
        Ok(cache_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# warrantrack config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# Root of the warranty API; endpoints live under /warrantyapi.\n# {API_URL_ENV} overrides this value.\nbase_url = \"{DEFAULT_API_BASE_URL}\"\ntimeout = \"{DEFAULT_API_TIMEOUT}\"\n\n[ui]\n# add | search | inventory\nstart_screen = \"inventory\"\nnotice_timeout = \"{DEFAULT_NOTICE_TIMEOUT}\"\n\n[expiry.lookup]\nwarning_glyph = true\nshow_distant = true\n\n[expiry.inventory]\nwarning_glyph = false\nshow_distant = false\n\n[log]\n# Optional. Default is the platform cache dir (for example ~/.cache/warrantrack/warrantrack.log)\n# path = \"/absolute/path/to/warrantrack.log\"\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n",
            path.display(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 3s)")
}

#[cfg(test)]
mod tests {
    use super::{API_URL_ENV, CONFIG_PATH_ENV, Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use warrantrack_app::{ExpiryFormat, ScreenKind};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.start_screen(), ScreenKind::Inventory);
        assert_eq!(config.api_timeout()?, Duration::from_secs(10));
        assert_eq!(config.notice_timeout()?, Duration::from_secs(3));
        assert_eq!(config.expiry_policy().lookup, ExpiryFormat::LOOKUP);
        assert_eq!(config.expiry_policy().inventory, ExpiryFormat::INVENTORY);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url=\"http://api\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(API_URL_ENV);
        }
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"https://warranties.example.com/\"\ntimeout = \"500ms\"\n[ui]\nstart_screen = \"search\"\nnotice_timeout = \"5s\"\n[expiry.inventory]\nshow_distant = true\n[log]\npath = \"/tmp/wt.log\"\nlevel = \"debug\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), "https://warranties.example.com/");
        assert_eq!(config.api_timeout()?, Duration::from_millis(500));
        assert_eq!(config.start_screen(), ScreenKind::Lookup);
        assert_eq!(config.notice_timeout()?, Duration::from_secs(5));
        let policy = config.expiry_policy();
        assert_eq!(policy.lookup, ExpiryFormat::LOOKUP);
        assert_eq!(
            policy.inventory,
            ExpiryFormat {
                warning_glyph: false,
                show_distant: true,
            }
        );
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/wt.log"));
        assert_eq!(config.log_level(), "debug");
        Ok(())
    }

    #[test]
    fn api_url_env_overrides_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[api]\nbase_url = \"http://from-config\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(API_URL_ENV, "http://from-env:9000");
        }
        let config = Config::load(&path)?;
        let resolved = config.api_base_url();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(API_URL_ENV);
        }
        assert_eq!(resolved, "http://from-env:9000");
        assert_eq!(config.api_base_url(), "http://from-config");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected_with_key_names() -> Result<()> {
        let cases = [
            ("version = 1\n[api]\nbase_url = \"  \"\n", "api.base_url"),
            ("version = 1\n[api]\ntimeout = \"0s\"\n", "must be positive"),
            ("version = 1\n[ui]\nnotice_timeout = \"soon\"\n", "ui.notice_timeout"),
            ("version = 1\n[ui]\nstart_screen = \"home\"\n", "ui.start_screen"),
            ("version = 1\n[log]\nlevel = \"warrantrack=loud\"\n", "log.level"),
        ];
        for (content, needle) in cases {
            let (_temp, path) = write_config(content)?;
            let error = Config::load(&path).expect_err("invalid config should fail");
            let message = format!("{error:#}");
            assert!(message.contains(needle), "{needle}: {message}");
        }
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("3s")?, Duration::from_secs(3));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert!(parse_duration("oops").is_err());
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.start_screen(), ScreenKind::Inventory);
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:8080"));
        Ok(())
    }
}
