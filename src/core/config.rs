//! # Configuration Module / 配置模块
//!
//! `TarifDesk.toml` settings: backend location, data directory, default
//! language and request timeout. Every key is optional; command-line flags
//! and the `TARIF_DESK_BASE_URL` environment variable take precedence.
//!
//! `TarifDesk.toml` 配置：后端地址、数据目录、默认语言与请求超时。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name / 默认配置文件名
pub const CONFIG_FILE_NAME: &str = "TarifDesk.toml";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "TARIF_DESK_BASE_URL";

/// Application settings loaded from TOML.
/// 从 TOML 加载的应用配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output language (`de`, `fr`, `it`). Falls back to preferences and the
    /// system locale when unset.
    /// 输出语言。未设置时回退到偏好设置和系统语言。
    pub language: Option<String>,
    /// Base URL of the analysis backend / 分析后端的基础 URL
    pub base_url: String,
    /// Directory holding the JSON reference datasets / JSON 参考数据目录
    pub data_dir: PathBuf,
    /// Baseline example set; defaults to `<data_dir>/baseline_results.json`.
    pub examples_file: Option<PathBuf>,
    /// Per-request timeout in seconds. LLM-backed calls are slow.
    pub timeout_secs: u64,
    /// Where persisted preferences live.
    pub prefs_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: None,
            base_url: "http://localhost:8000".to_string(),
            data_dir: PathBuf::from("data"),
            examples_file: None,
            timeout_secs: 120,
            prefs_file: None,
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn examples_path(&self) -> PathBuf {
        self.examples_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("baseline_results.json"))
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.prefs_file
            .clone()
            .unwrap_or_else(|| expand_path(Path::new("~/.config/tarif-desk/prefs.json")))
    }

    /// Applies `TARIF_DESK_BASE_URL` when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "base_url",
                message: "must not be empty".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "base_url",
                message: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(lang) = &self.language {
            if crate::core::models::Language::parse(lang).is_none() {
                return Err(ConfigError::Invalid {
                    key: "language",
                    message: format!("unsupported language '{}'", lang),
                });
            }
        }
        Ok(self)
    }

    fn expand_paths(mut self) -> Self {
        self.data_dir = expand_path(&self.data_dir);
        self.examples_file = self.examples_file.map(|p| expand_path(&p));
        self.prefs_file = self.prefs_file.map(|p| expand_path(&p));
        self
    }
}

/// Expands `~` and environment variables in a configured path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// Loads and validates a configuration file.
/// 加载并校验配置文件。
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Parses configuration text; `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.expand_paths().validate()
}

/// Loads `path` when it exists, otherwise returns the defaults. An explicit
/// path that does not exist is still an error.
pub fn load_or_default(path: &Path, explicit: bool) -> Result<AppConfig, ConfigError> {
    if path.exists() || explicit {
        load_config(path)
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        Ok(AppConfig::default())
    }
}

/// Commented template written by `tarif-desk init --non-interactive`.
pub const DEFAULT_CONFIG: &str = r#"# tarif-desk configuration
# Every key is optional.

# Output language: "de", "fr" or "it"
language = "de"

# Base URL of the analysis backend (overridden by TARIF_DESK_BASE_URL)
base_url = "http://localhost:8000"

# Directory with the JSON reference datasets
data_dir = "data"

# Baseline example set for quality control
# examples_file = "data/baseline_results.json"

# Request timeout in seconds
timeout_secs = 120

# Persisted preferences
# prefs_file = "~/.config/tarif-desk/prefs.json"
"#;
