//! # Preferences / 偏好设置
//!
//! Small persisted user preferences: whether ICD relevance is considered by
//! default and the preferred language. Stored as JSON.
//!
//! 持久化的用户偏好：默认是否考虑 ICD 相关性以及首选语言，以 JSON 存储。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::models::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_icd_relevance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Preferences {
    /// ICD relevance is on unless explicitly switched off.
    pub fn use_icd(&self) -> bool {
        self.use_icd_relevance.unwrap_or(true)
    }
}

/// Loads preferences; a missing or unreadable file yields the defaults.
pub fn load_prefs(path: &Path) -> Preferences {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Preferences::default(),
    };
    match serde_json::from_str(&content) {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
            Preferences::default()
        }
    }
}

pub fn save_prefs(path: &Path, prefs: &Preferences) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write preferences to {}", path.display()))?;
    Ok(())
}
