//! # Billing Wire Types / 计费传输类型
//!
//! Request and response bodies of the analysis backend
//! (`/api/analyze-billing`, `/api/test-example`, `/api/feedback`) and the
//! conversion of raw user input into an analysis request.
//!
//! 分析后端的请求与响应体，以及将原始用户输入转换为分析请求。

use crate::core::lenient;
use crate::core::models::{ExampleId, Language};
use crate::error::{ApiError, ApiResult, InputError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw form fields as entered by the user.
/// 用户输入的原始表单字段。
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub text: String,
    /// Comma-separated ICD codes.
    pub icd: String,
    /// Comma-separated GTIN codes.
    pub gtin: String,
    pub use_icd: bool,
    pub age: Option<String>,
    pub gender: Option<String>,
}

/// Body of `POST /api/analyze-billing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub input_text: String,
    pub icd: Vec<String>,
    pub gtin: Vec<String>,
    pub use_icd: bool,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub lang: Language,
}

impl AnalyzeRequest {
    /// Normalizes the form fields. ICD codes are upper-cased, empty list
    /// entries are dropped and a blank age becomes `null`.
    /// 规范化表单字段：ICD 转大写，丢弃空项，空白年龄为 null。
    pub fn from_input(input: &UserInput, lang: Language) -> Result<Self, InputError> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyText);
        }

        let age = match input.age.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| InputError::InvalidAge(raw.to_string()))?,
            ),
        };

        Ok(Self {
            input_text: text.to_string(),
            icd: split_codes(&input.icd)
                .map(|c| c.to_uppercase())
                .collect(),
            gtin: split_codes(&input.gtin).map(str::to_string).collect(),
            use_icd: input.use_icd,
            age,
            gender: input
                .gender
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            lang,
        })
    }
}

fn split_codes(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Top-level response of `/api/analyze-billing`.
/// `/api/analyze-billing` 的顶层响应。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingResponse {
    pub llm_ergebnis_stufe1: Stage1Result,
    pub llm_ergebnis_stufe2: Stage2Result,
    pub abrechnung: Abrechnung,
    #[serde(default, deserialize_with = "lenient::list")]
    pub regel_ergebnisse_details: Vec<RuleResult>,
}

impl BillingResponse {
    /// Parses a response body. The required top-level keys and
    /// `abrechnung.type` are checked before typed decoding; a body missing any
    /// of them, or one whose sections still fail to decode, is
    /// [`ApiError::UnexpectedStructure`]. Only invalid JSON is
    /// [`ApiError::Decode`].
    pub fn from_json(raw: &str) -> ApiResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|source| ApiError::Decode {
            raw: raw.to_string(),
            source,
        })?;

        if !has_expected_structure(&value) {
            tracing::error!("Unexpected top-level structure in analysis response");
            return Err(ApiError::UnexpectedStructure {
                raw: raw.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Analysis response does not decode: {}", e);
            ApiError::UnexpectedStructure {
                raw: raw.to_string(),
            }
        })
    }
}

fn has_expected_structure(value: &Value) -> bool {
    let present = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    let has_type = value
        .get("abrechnung")
        .and_then(|a| a.get("type"))
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    present("llm_ergebnis_stufe1")
        && present("llm_ergebnis_stufe2")
        && present("regel_ergebnisse_details")
        && has_type
}

/// Stage 1 of the LLM analysis: identified services and extracted details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage1Result {
    #[serde(default, deserialize_with = "lenient::list")]
    pub identified_leistungen: Vec<IdentifiedLeistung>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub extracted_info: ExtractedInfo,
    #[serde(default, deserialize_with = "lenient::string")]
    pub begruendung_llm: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedLeistung {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub lkn: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub menge: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default, deserialize_with = "lenient::number")]
    pub dauer_minuten: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub menge_allgemein: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub geschlecht: Option<String>,
}

/// Stage 2 of the LLM analysis: TARDOC to Pauschale LKN mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage2Result {
    #[serde(default, deserialize_with = "lenient::list")]
    pub mapping_results: Vec<MappingResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    #[serde(default, deserialize_with = "lenient::string")]
    pub tardoc_lkn: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mapped_lkn: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub error: Option<String>,
}

/// Billing decision kind (`abrechnung.type`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingKind {
    Pauschale,
    Tardoc,
    Error,
    Unknown(String),
}

impl BillingKind {
    pub fn as_str(&self) -> &str {
        match self {
            BillingKind::Pauschale => "Pauschale",
            BillingKind::Tardoc => "TARDOC",
            BillingKind::Error => "Error",
            BillingKind::Unknown(other) => other,
        }
    }
}

impl Serialize for BillingKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BillingKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Pauschale" => BillingKind::Pauschale,
            "TARDOC" => BillingKind::Tardoc,
            "Error" => BillingKind::Error,
            _ => BillingKind::Unknown(raw),
        })
    }
}

/// The billing decision (`abrechnung`).
/// 计费决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abrechnung {
    #[serde(rename = "type")]
    pub kind: BillingKind,
    #[serde(default, deserialize_with = "lenient::record")]
    pub details: Option<PauschaleDetails>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub leistungen: Vec<TardocLeistung>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
    /// Pre-rendered HTML from the backend, inserted unescaped.
    #[serde(default, deserialize_with = "lenient::string")]
    pub bedingungs_pruef_html: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub bedingungs_fehler: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub conditions_met: Option<bool>,
}

impl Abrechnung {
    pub fn conditions_met(&self) -> bool {
        self.conditions_met == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauschaleDetails {
    #[serde(rename = "Pauschale", default, deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(rename = "Pauschale_Text", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
    #[serde(rename = "Taxpunkte", default)]
    pub tax_points: Option<Value>,
    /// Pre-rendered HTML from the backend, inserted unescaped.
    #[serde(default, deserialize_with = "lenient::string")]
    pub pauschale_erklaerung_html: Option<String>,
}

/// A TARDOC position proposed for billing. A missing LKN is empty and
/// renders as "not found".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TardocLeistung {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub lkn: String,
    #[serde(default = "one", deserialize_with = "lenient::quantity")]
    pub menge: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub beschreibung: Option<String>,
}

fn one() -> f64 {
    1.0
}

/// Rule-check outcome for one LKN (`regel_ergebnisse_details[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    #[serde(default, deserialize_with = "lenient::string")]
    pub lkn: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub initiale_menge: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub finale_menge: Option<f64>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub regelpruefung: Option<RuleCheck>,
}

impl RuleResult {
    /// Messages of the rule check, empty when there is no check.
    pub fn messages(&self) -> &[String] {
        self.regelpruefung
            .as_ref()
            .map(|r| r.fehler.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub abrechnungsfaehig: bool,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub fehler: Vec<String>,
}

/// Body of `POST /api/test-example`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestExampleRequest {
    pub id: Value,
    pub lang: Language,
}

impl TestExampleRequest {
    pub fn new(id: &ExampleId, lang: Language) -> Self {
        Self {
            id: id.to_json(),
            lang,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestExampleResponse {
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub diff: Option<String>,
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub context: String,
    pub user_input: String,
    pub comment: String,
    pub lang: Language,
    pub analysis_result: Option<Value>,
}

/// Backend reply to a feedback submission. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FeedbackResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.as_deref() != Some("error")
    }
}
