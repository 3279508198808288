//! # Error Types / 错误类型
//!
//! Typed errors for the library layers. Command handlers wrap these in
//! `anyhow::Error` with context, so only the boundaries that need to branch
//! on the failure kind match on them.
//!
//! 库层的类型化错误。命令处理器通过 `anyhow::Error` 包装并附加上下文。

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a backend call.
/// 后端调用失败。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}")]
    Status { status: u16, body: String },

    #[error("invalid JSON response: {source}")]
    Decode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response structure")]
    UnexpectedStructure { raw: String },
}

impl ApiError {
    /// The raw response body, when one was received.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ApiError::Network(_) => None,
            ApiError::Status { body, .. } => Some(body),
            ApiError::Decode { raw, .. } | ApiError::UnexpectedStructure { raw } => Some(raw),
        }
    }

    /// `true` when the body arrived but could not be parsed as JSON.
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Problems with the local reference datasets.
/// 本地参考数据集的问题。
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("critical datasets missing or empty: {}", .names.join(", "))]
    MissingData { names: Vec<&'static str> },
}

/// Configuration file problems.
/// 配置文件问题。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Rejected user input, reported before any backend call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("service description is empty")]
    EmptyText,

    #[error("invalid age: {0}")]
    InvalidAge(String),
}
