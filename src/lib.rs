//! # Tarif Desk Library / Tarif Desk 库
//!
//! Client-side companion of a Swiss TARDOC/Pauschale billing backend: builds
//! analysis requests, renders the structured answers, answers reference-data
//! lookups from the local JSON datasets and replays the quality-control
//! example set through a sequential test runner.
//!
//! 瑞士 TARDOC/Pauschale 计费后端的客户端：构建分析请求、渲染结构化结果、
//! 基于本地 JSON 数据集回答参考数据查询，并通过顺序测试运行器回放质量控制示例集。
//!
//! ## Modules / 模块
//!
//! - `core` - Domain models, configuration, reference data and the test runner
//! - `infra` - Backend client, data loading, preferences, logging and i18n
//! - `reporting` - HTML and console rendering
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 领域模型、配置、参考数据和测试运行器
//! - `infra` - 后端客户端、数据加载、偏好设置、日志和国际化
//! - `reporting` - HTML 与控制台渲染
//! - `cli` - 命令行接口和命令

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "de");

pub mod cli;
pub mod core;
pub mod error;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::runner;

use crate::core::models::Language;

/// Detects the output language from the system locale, falling back to German.
///
/// Matches the language part of tags such as `fr-CH` against the available
/// locales.
pub fn detect_language() -> Language {
    sys_locale::get_locale()
        .and_then(|locale| Language::parse(&locale))
        .unwrap_or_default()
}

/// Sets the process-wide locale used by `t!` calls without an explicit locale.
pub fn init(lang: Language) {
    let available_locales = rust_i18n::available_locales!();
    if available_locales.contains(&lang.code()) {
        rust_i18n::set_locale(lang.code());
    } else {
        rust_i18n::set_locale(Language::default().code());
    }
}
