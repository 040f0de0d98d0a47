//! Configuration for the ydisk_web server

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default Yandex Disk REST API base URL
pub const DEFAULT_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

/// Server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Storage backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Maximum accepted upload body in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Per-request timeout for storage API calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout for storage API calls, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Log level filter string.
    /// Set via config file or YDW_LOG_LEVEL env var. Overridden by RUST_LOG.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Storage backend configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Yandex Disk account accessed with a pre-issued OAuth token
    Yandex {
        token: String,

        #[serde(default = "default_api_base")]
        api_base: String,

        /// Passed through to the upload API; existing files are kept when false
        #[serde(default)]
        overwrite_uploads: bool,
    },

    /// Local directory standing in for the remote disk (development, tests)
    Filesystem {
        /// Directory for data storage
        path: PathBuf,
    },
}

// Hand-written so the OAuth token never reaches the logs.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Yandex {
                api_base,
                overwrite_uploads,
                ..
            } => f
                .debug_struct("Yandex")
                .field("token", &"<redacted>")
                .field("api_base", api_base)
                .field("overwrite_uploads", overwrite_uploads)
                .finish(),
            BackendConfig::Filesystem { path } => {
                f.debug_struct("Filesystem").field("path", path).finish()
            }
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("backend", &self.backend)
            .field("max_upload_size", &self.max_upload_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

// Default value functions for serde
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_upload_size() -> u64 {
    100 * 1024 * 1024 // 100MB
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_log_level() -> String {
    "ydisk_web=debug,tower_http=debug".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Filesystem {
            path: PathBuf::from("./data"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            backend: BackendConfig::default(),
            max_upload_size: default_max_upload_size(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("YDW_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.listen_addr = parsed;
            }
        }

        // A token selects the Yandex backend; otherwise a data dir selects the filesystem one
        if let Ok(token) = std::env::var("YDW_TOKEN") {
            config.backend = BackendConfig::Yandex {
                token,
                api_base: std::env::var("YDW_API_BASE").unwrap_or_else(|_| default_api_base()),
                overwrite_uploads: std::env::var("YDW_OVERWRITE_UPLOADS")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            };
        } else if let Ok(dir) = std::env::var("YDW_DATA_DIR") {
            config.backend = BackendConfig::Filesystem {
                path: PathBuf::from(dir),
            };
        }

        if let Ok(size) = std::env::var("YDW_MAX_UPLOAD_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.max_upload_size = parsed;
            }
        }

        if let Ok(secs) = std::env::var("YDW_REQUEST_TIMEOUT") {
            if let Ok(parsed) = secs.parse() {
                config.request_timeout_secs = parsed;
            }
        }

        if let Ok(level) = std::env::var("YDW_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("YDW_CONFIG") {
            if let Ok(config) = Self::from_file(&path) {
                return config;
            }
        }

        for path in &["ydisk_web.toml", "/etc/ydisk_web/config.toml"] {
            if std::path::Path::new(path).exists() {
                if let Ok(config) = Self::from_file(path) {
                    return config;
                }
            }
        }

        Self::from_env()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
