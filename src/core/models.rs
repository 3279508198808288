//! # Data Models Module / 数据模型模块
//!
//! Core data structures shared by the quality-control runner and the
//! renderers: output languages, example identifiers, the baseline example
//! set, per-cell test status and the aggregate counters.
//!
//! 质量控制运行器与渲染器共享的核心数据结构：输出语言、示例标识、
//! 基线示例集、单元格测试状态以及汇总计数器。

use crate::error::DataError;
use crate::infra::t;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The three output languages of the tariff tool. German is the default.
/// 工具支持的三种输出语言，默认德语。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    Fr,
    It,
}

impl Language {
    /// Fixed order in which every example is tested.
    /// 每个示例的固定测试顺序。
    pub const ALL: [Language; 3] = [Language::De, Language::Fr, Language::It];

    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::Fr => "fr",
            Language::It => "it",
        }
    }

    /// Position of the language inside [`Language::ALL`].
    pub fn index(self) -> usize {
        match self {
            Language::De => 0,
            Language::Fr => 1,
            Language::It => 2,
        }
    }

    /// Parses `de`, `FR`, `it-CH`, `fr_CH` and similar locale tags.
    /// 解析 `de`、`FR`、`it-CH`、`fr_CH` 等语言标签。
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "de" => Some(Language::De),
            "fr" => Some(Language::Fr),
            "it" => Some(Language::It),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s).ok_or_else(|| format!("unsupported language '{}' (de, fr, it)", s))
    }
}

/// Key of an example in the baseline set. Integer-like keys are sent to the
/// backend as JSON numbers.
/// 基线集中示例的键。整数形式的键以 JSON 数字发送给后端。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleId(String);

impl ExampleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Wire representation used in `/api/test-example` requests.
    pub fn to_json(&self) -> Value {
        match self.as_number() {
            Some(n) => Value::from(n),
            None => Value::from(self.0.clone()),
        }
    }
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExampleId {
    fn from(value: &str) -> Self {
        ExampleId::new(value)
    }
}

impl From<String> for ExampleId {
    fn from(value: String) -> Self {
        ExampleId::new(value)
    }
}

/// One entry of the baseline example set.
/// 基线示例集中的一项。
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub id: ExampleId,
    /// Query text per language code.
    pub query: BTreeMap<String, String>,
}

impl Example {
    /// Query text in `lang`, falling back to German, then to the first
    /// available text.
    /// 按语言取查询文本，依次回退到德语和第一个可用文本。
    pub fn display_text(&self, lang: Language) -> &str {
        let non_empty = |code: &str| {
            self.query
                .get(code)
                .map(String::as_str)
                .filter(|s| !s.is_empty())
        };
        non_empty(lang.code())
            .or_else(|| non_empty(Language::De.code()))
            .or_else(|| self.query.values().map(String::as_str).find(|s| !s.is_empty()))
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct RawExample {
    #[serde(default)]
    query: BTreeMap<String, Option<String>>,
}

/// Parses the content of `baseline_results.json`.
///
/// Integer-like keys come first in ascending numeric order, the remaining
/// keys follow in lexicographic order. Entries whose shape cannot be read
/// are skipped with a warning.
pub fn parse_examples(json: &str, path: &Path) -> Result<Vec<Example>, DataError> {
    let map: serde_json::Map<String, Value> =
        serde_json::from_str(json).map_err(|source| DataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut examples: Vec<Example> = map
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<RawExample>(value) {
            Ok(raw) => Some(Example {
                id: ExampleId::new(key),
                query: raw
                    .query
                    .into_iter()
                    .filter_map(|(lang, text)| text.map(|t| (lang, t)))
                    .collect(),
            }),
            Err(e) => {
                tracing::warn!("Skipping example '{}' with unreadable shape: {}", key, e);
                None
            }
        })
        .collect();

    examples.sort_by(|a, b| match (a.id.as_number(), b.id.as_number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });

    Ok(examples)
}

/// Outcome of one `(example, language)` test call.
/// 单次 `(示例, 语言)` 测试调用的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ExampleId,
    pub lang: Language,
    pub passed: bool,
    pub diff: Option<String>,
    pub error: Option<String>,
}

impl TestResult {
    pub fn status(&self) -> CellStatus {
        if let Some(message) = &self.error {
            CellStatus::Error {
                message: message.clone(),
            }
        } else if self.passed {
            CellStatus::Pass
        } else {
            CellStatus::Fail {
                diff: self.diff.clone(),
            }
        }
    }
}

/// Display state of a single result cell (`res-<id>-<lang>`).
/// 单个结果单元格的显示状态。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellStatus {
    #[default]
    Empty,
    Pending,
    Pass,
    Fail {
        diff: Option<String>,
    },
    Error {
        message: String,
    },
}

impl CellStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, CellStatus::Pass)
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            CellStatus::Pass | CellStatus::Fail { .. } | CellStatus::Error { .. }
        )
    }

    /// Text shown in the cell.
    pub fn label(&self, lang: Language) -> String {
        let locale = lang.code();
        match self {
            CellStatus::Empty => String::new(),
            CellStatus::Pending => "...".to_string(),
            CellStatus::Pass => t!("qc.pass", locale = locale).to_string(),
            CellStatus::Fail { diff: Some(diff) } if !diff.is_empty() => {
                format!("{}: {}", t!("qc.fail", locale = locale), diff)
            }
            CellStatus::Fail { .. } => t!("qc.fail", locale = locale).to_string(),
            CellStatus::Error { .. } => "error".to_string(),
        }
    }

    /// CSS class used by the QC page; pass is green, fail red, error orange.
    pub fn css_class(&self) -> &'static str {
        match self {
            CellStatus::Empty => "cell-empty",
            CellStatus::Pending => "cell-pending",
            CellStatus::Pass => "cell-pass",
            CellStatus::Fail { .. } => "cell-fail",
            CellStatus::Error { .. } => "cell-error",
        }
    }
}

/// Aggregate counters of a "test all" run.
/// "全部测试" 运行的汇总计数器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub total: usize,
    pub passed: usize,
}

impl Counters {
    /// Summary line; empty while no batch has been started.
    pub fn summary(&self, lang: Language) -> String {
        if self.total == 0 {
            return String::new();
        }
        t!(
            "qc.summary",
            locale = lang.code(),
            passed = self.passed,
            total = self.total
        )
        .to_string()
    }
}
