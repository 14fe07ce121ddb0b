// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WARRANTRACK_LOG";

pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {} -- set [log].path", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

fn env_filter(config: &Config) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid log level {:?}", config.log_level())),
    }
}

#[cfg(test)]
mod tests {
    use super::env_filter;
    use crate::config::Config;
    use anyhow::Result;

    #[test]
    fn config_level_builds_filter() -> Result<()> {
        let mut config = Config::default();
        config.log.level = Some("warrantrack_api=debug,warn".to_owned());
        let filter = env_filter(&config)?;
        assert!(filter.to_string().contains("warrantrack_api=debug"));
        Ok(())
    }
}
