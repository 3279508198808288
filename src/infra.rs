//! # Infrastructure Module / 基础设施模块
//!
//! Infrastructure services for tarif-desk: the backend HTTP client, loading
//! of the reference datasets, persisted preferences, logging and i18n
//! support.
//!
//! tarif-desk 的基础设施服务：后端 HTTP 客户端、参考数据加载、
//! 偏好设置持久化、日志以及国际化支持。

pub mod data;
pub mod http;
pub mod logging;
pub mod prefs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;

// Flattened keys of locales/de.toml, generated by build.rs.
include!(concat!(env!("OUT_DIR"), "/locale_keys.rs"));

/// Looks up `key` in `locale`. Unknown keys come back unchanged.
pub fn translate(key: &str, locale: &str) -> String {
    t!(key, locale = locale).to_string()
}

/// Locales bundled into the binary.
pub fn available_locales() -> Vec<&'static str> {
    rust_i18n::available_locales!()
}
