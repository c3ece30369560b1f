use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chat_logging::{LevelFilter, LogDestination};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use ytchat_core::PollerConfig;
use ytchat_engine::{FetchSettings, DEFAULT_BASE_URL};

pub(crate) const DEFAULT_CONFIG_FILENAME: &str = "ytchat.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One human-readable line per event.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub(crate) enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

/// Settings read from the optional RON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub interval_ms: u64,
    pub max_retries: u32,
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub format: OutputFormat,
    pub log: LogTarget,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let poller = PollerConfig::default();
        let fetch = FetchSettings::default();
        Self {
            interval_ms: poller.interval.as_millis() as u64,
            max_retries: poller.max_retries,
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            format: OutputFormat::Text,
            log: LogTarget::File,
            log_file: PathBuf::from("./ytchat.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub(crate) fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.interval_ms),
            max_retries: self.max_retries,
        }
    }

    pub(crate) fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..FetchSettings::default()
        }
    }

    pub(crate) fn log_destination(&self) -> Option<LogDestination> {
        match self.log {
            LogTarget::File => Some(LogDestination::File(self.log_file.clone())),
            LogTarget::Terminal => Some(LogDestination::Terminal),
            LogTarget::Both => Some(LogDestination::Both(self.log_file.clone())),
            LogTarget::Off => None,
        }
    }

    /// Unknown level names fall back to `Info`.
    pub(crate) fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Reads the config file; `Ok(None)` when it does not exist.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<Option<AppConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config from {path:?}"))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config from {path:?}"))?;
    Ok(Some(config))
}
