use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use docchat_engine::BackendSettings;
use log::LevelFilter;
use serde::Deserialize;
use url::Url;

use crate::ControllerSettings;

pub const SERVER_URL_ENV: &str = "DOCCHAT_SERVER_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid server url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

/// Client configuration, read from an optional RON file.
///
/// ```ron
/// (
///     server_url: "http://127.0.0.1:5000",
///     request_timeout_secs: 60,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub progress_interval_ms: u64,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
            progress_interval_ms: 200,
            log_file: PathBuf::from("docchat.log"),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults when `path` is `None`; a named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Applies `DOCCHAT_SERVER_URL` when it is set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_server_override(std::env::var(SERVER_URL_ENV).ok());
    }

    pub fn apply_server_override(&mut self, server_url: Option<String>) {
        if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
    }

    pub fn backend_settings(&self) -> Result<BackendSettings, ConfigError> {
        let url = Url::parse(&self.server_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.server_url.clone(),
            source,
        })?;
        let mut settings = BackendSettings::new(url);
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(settings)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            progress_interval: Duration::from_millis(self.progress_interval_ms.max(1)),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}
