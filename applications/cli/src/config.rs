/// CLI configuration
use crate::error::{CliError, Result};
use dash_client::{ClientConfig, StreamConfig, DEFAULT_STREAM_PATH};
use dash_views::DEFAULT_PER_PAGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "dash.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub stream: StreamSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Base URL of the API; required
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_stream_path")]
    pub path: String,

    /// Append the session token as `?token=` on the stream URL
    #[serde(default)]
    pub include_token: bool,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Where the token is kept between runs
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplaySettings {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `dash.toml` is read when
    /// present. `DASH__*` variables override file values, e.g.
    /// `DASH__API__BASE_URL` or `DASH__DISPLAY__PER_PAGE`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("DASH")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Apply command-line flags, which take precedence over everything else.
    #[must_use]
    pub fn with_overrides(
        mut self,
        api_base: Option<String>,
        api_key: Option<String>,
        session_file: Option<PathBuf>,
    ) -> Self {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api.base_url = base;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api.api_key = Some(key);
        }
        if session_file.is_some() {
            self.session.file = session_file;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CliError::Config(
                "API base URL is not configured (use --api-base or set DASH_API_BASE)".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(CliError::Config("api.timeout_secs must be > 0".to_string()));
        }

        if self.display.per_page == 0 {
            return Err(CliError::Config("display.per_page must be > 0".to_string()));
        }

        if self.stream.enabled && !self.stream.path.starts_with('/') {
            return Err(CliError::Config(format!(
                "stream.path must start with '/' (got {:?})",
                self.stream.path
            )));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.api.base_url.clone())
            .with_api_key(self.api.api_key.clone())
            .with_stream(StreamConfig {
                path: self.stream.enabled.then(|| self.stream.path.clone()),
                include_token: self.stream.include_token,
                reconnect_delay: Duration::from_millis(self.stream.reconnect_delay_ms),
            });
        config.timeout = Duration::from_secs(self.api.timeout_secs);
        config
    }

    /// Session file location: configured path, else
    /// `<config dir>/product-dashboard/session.json`.
    pub fn session_path(&self) -> PathBuf {
        self.session.file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("product-dashboard")
                .join("session.json")
        })
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_stream_path(),
            include_token: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

// Default values
fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_stream_path() -> String {
    DEFAULT_STREAM_PATH.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}
