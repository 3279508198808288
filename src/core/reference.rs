//! # Reference Data Module / 参考数据模块
//!
//! Record types of the static tariff datasets and the lookup functions used
//! by the renderers and the `lookup` command. Every accessor is a linear scan
//! where the first case-insensitive match wins.
//!
//! 静态费率数据集的记录类型及查找函数。每个查找都是线性扫描，
//! 第一个不区分大小写的匹配项胜出。

use crate::core::lenient;
use crate::core::models::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Entry of the LKAAT service catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "LKN", default, deserialize_with = "lenient::string")]
    pub lkn: Option<String>,
    #[serde(rename = "Typ", default, deserialize_with = "lenient::string")]
    pub kind: Option<String>,
    #[serde(rename = "Beschreibung", default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(rename = "Beschreibung_f", default, deserialize_with = "lenient::string")]
    pub description_fr: Option<String>,
    #[serde(rename = "Beschreibung_i", default, deserialize_with = "lenient::string")]
    pub description_it: Option<String>,
    #[serde(rename = "MedizinischeInterpretation", default, deserialize_with = "lenient::string")]
    pub interpretation: Option<String>,
    #[serde(rename = "MedizinischeInterpretation_f", default, deserialize_with = "lenient::string")]
    pub interpretation_fr: Option<String>,
    #[serde(rename = "MedizinischeInterpretation_i", default, deserialize_with = "lenient::string")]
    pub interpretation_it: Option<String>,
}

impl CatalogEntry {
    pub fn description(&self, lang: Language) -> Option<&str> {
        localized(
            lang,
            &self.description,
            &self.description_fr,
            &self.description_it,
        )
    }

    pub fn interpretation(&self, lang: Language) -> Option<&str> {
        localized(
            lang,
            &self.interpretation,
            &self.interpretation_fr,
            &self.interpretation_it,
        )
    }
}

/// Service group membership of a tariff position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    #[serde(rename = "Gruppe", default, deserialize_with = "lenient::string_or_empty")]
    pub code: String,
    #[serde(rename = "Text", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

/// A TARDOC tariff position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffPosition {
    #[serde(rename = "LKN", default, deserialize_with = "lenient::string")]
    pub lkn: Option<String>,
    #[serde(rename = "Bezeichnung", default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(rename = "AL_(normiert)", default)]
    pub al: Option<Value>,
    #[serde(rename = "IPL_(normiert)", default)]
    pub ipl: Option<Value>,
    #[serde(rename = "Regeln_bezogen_auf_die_Tarifmechanik", default, deserialize_with = "lenient::string")]
    pub rules: Option<String>,
    #[serde(rename = "Kapitel", default, deserialize_with = "lenient::string")]
    pub chapter: Option<String>,
    #[serde(rename = "Kapitel_Bezeichnung", default, deserialize_with = "lenient::string")]
    pub chapter_title: Option<String>,
    #[serde(rename = "Leistungsgruppen", default, deserialize_with = "lenient::list")]
    pub groups: Vec<GroupRef>,
    #[serde(rename = "Dignitaeten", default, deserialize_with = "lenient::strings")]
    pub dignities: Vec<String>,
}

/// TARDOC interpretation notes for a position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    #[serde(rename = "LKN", default, deserialize_with = "lenient::string")]
    pub lkn: Option<String>,
    #[serde(rename = "Interpretation", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
    #[serde(rename = "Interpretation_f", default, deserialize_with = "lenient::string")]
    pub text_fr: Option<String>,
    #[serde(rename = "Interpretation_i", default, deserialize_with = "lenient::string")]
    pub text_it: Option<String>,
}

impl Interpretation {
    pub fn text(&self, lang: Language) -> Option<&str> {
        localized(lang, &self.text, &self.text_fr, &self.text_it)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pauschale {
    #[serde(rename = "Pauschale", default, deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(rename = "Pauschale_Text", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
    #[serde(rename = "Taxpunkte", default)]
    pub tax_points: Option<Value>,
}

/// Link between a Pauschale and one of its service positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauschaleLeistungsposition {
    #[serde(rename = "Pauschale", default, deserialize_with = "lenient::string")]
    pub pauschale: Option<String>,
    #[serde(rename = "Leistungsposition", default, deserialize_with = "lenient::string")]
    pub lkn: Option<String>,
}

/// Row of the Pauschale reference tables (`PAUSCHALEN_Tabellen.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    #[serde(rename = "Tabelle", default, deserialize_with = "lenient::string")]
    pub table: Option<String>,
    #[serde(rename = "Tabelle_Typ", default, deserialize_with = "lenient::string")]
    pub table_type: Option<String>,
    #[serde(rename = "Code", default, deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(rename = "Code_Text", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dignity {
    #[serde(rename = "Code", alias = "DignitaetCode", default, deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(rename = "Bezeichnung", alias = "DignitaetText", default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

/// Locally computed view of a TARDOC position.
/// 本地计算的 TARDOC 位置视图。
#[derive(Debug, Clone, PartialEq)]
pub struct TardocDetails {
    pub al: f64,
    pub ipl: f64,
    pub name: String,
    pub rules: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterInfo<'a> {
    pub code: String,
    pub title: Option<&'a str>,
    pub positions: Vec<&'a TariffPosition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo<'a> {
    pub code: String,
    pub text: Option<&'a str>,
    pub positions: Vec<&'a TariffPosition>,
}

/// Code/text pair returned by table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCode {
    pub code: String,
    pub text: String,
}

/// All locally loaded datasets.
/// 所有本地加载的数据集。
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub catalog: Vec<CatalogEntry>,
    pub tardoc: Vec<TariffPosition>,
    pub interpretations: Vec<Interpretation>,
    pub pauschale_lp: Vec<PauschaleLeistungsposition>,
    pub pauschalen: Vec<Pauschale>,
    pub pauschale_conditions: Vec<Value>,
    pub tables: Vec<TableEntry>,
    pub dignities: Vec<Dignity>,
}

impl ReferenceData {
    /// Display names of critical datasets that are empty.
    /// 为空的关键数据集的显示名称。
    pub fn missing_critical(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.catalog.is_empty() {
            missing.push("Leistungskatalog");
        }
        if self.tardoc.is_empty() {
            missing.push("TARDOC-Daten");
        }
        if self.pauschalen.is_empty() {
            missing.push("Pauschalen");
        }
        if self.pauschale_conditions.is_empty() {
            missing.push("Pauschalen-Bedingungen");
        }
        if self.tables.is_empty() {
            missing.push("Referenz-Tabellen");
        }
        missing
    }

    pub fn catalog_entry(&self, lkn: &str) -> Option<&CatalogEntry> {
        self.catalog
            .iter()
            .find(|e| e.lkn.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(lkn)))
    }

    /// Localized catalog description, or the LKN itself when unknown.
    /// 本地化的目录描述；未知时返回 LKN 本身。
    pub fn describe_lkn(&self, lkn: &str, lang: Language) -> String {
        self.catalog_entry(lkn)
            .and_then(|e| e.description(lang))
            .unwrap_or(lkn)
            .to_string()
    }

    pub fn tariff_position(&self, lkn: &str) -> Option<&TariffPosition> {
        self.tardoc
            .iter()
            .find(|p| p.lkn.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(lkn)))
    }

    /// AL/IPL and rule text of a TARDOC position.
    pub fn tardoc_lookup(&self, lkn: &str) -> Option<TardocDetails> {
        let Some(position) = self.tariff_position(lkn) else {
            tracing::debug!("LKN {} not found in local TARDOC data", lkn);
            return None;
        };
        Some(TardocDetails {
            al: position.al.as_ref().map(parse_german_float).unwrap_or(0.0),
            ipl: position.ipl.as_ref().map(parse_german_float).unwrap_or(0.0),
            name: position.name.clone().unwrap_or_else(|| "N/A".to_string()),
            rules: position.rules.clone().unwrap_or_default(),
        })
    }

    pub fn interpretation(&self, lkn: &str) -> Option<&Interpretation> {
        self.interpretations
            .iter()
            .find(|i| i.lkn.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(lkn)))
    }

    pub fn chapter(&self, code: &str) -> Option<ChapterInfo<'_>> {
        let positions: Vec<&TariffPosition> = self
            .tardoc
            .iter()
            .filter(|p| p.chapter.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code)))
            .collect();
        if positions.is_empty() {
            return None;
        }
        let title = positions.iter().find_map(|p| p.chapter_title.as_deref());
        Some(ChapterInfo {
            code: code.to_string(),
            title,
            positions,
        })
    }

    pub fn group(&self, code: &str) -> Option<GroupInfo<'_>> {
        let mut text = None;
        let positions: Vec<&TariffPosition> = self
            .tardoc
            .iter()
            .filter(|p| {
                p.groups.iter().any(|g| {
                    let hit = g.code.eq_ignore_ascii_case(code);
                    if hit && text.is_none() {
                        text = g.text.as_deref();
                    }
                    hit
                })
            })
            .collect();
        if positions.is_empty() {
            return None;
        }
        Some(GroupInfo {
            code: code.to_string(),
            text,
            positions,
        })
    }

    pub fn dignity(&self, code: &str) -> Option<&Dignity> {
        self.dignities
            .iter()
            .find(|d| d.code.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code)))
    }

    pub fn pauschale(&self, code: &str) -> Option<&Pauschale> {
        self.pauschalen
            .iter()
            .find(|p| p.code.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code)))
    }

    /// Pauschalen listing `lkn` among their service positions, in data order.
    pub fn pauschalen_for_lkn(&self, lkn: &str) -> Vec<&Pauschale> {
        let mut codes: Vec<&str> = Vec::new();
        for link in &self.pauschale_lp {
            if link.lkn.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(lkn)) {
                if let Some(code) = link.pauschale.as_deref() {
                    if !codes.contains(&code) {
                        codes.push(code);
                    }
                }
            }
        }
        codes.into_iter().filter_map(|c| self.pauschale(c)).collect()
    }

    /// Entries of the comma-separated tables in `table_ref` whose type
    /// matches `table_type`. Unique per code and sorted by code.
    /// 获取 `table_ref` 中逗号分隔的表中类型匹配的条目，按代码去重并排序。
    pub fn table_content(&self, table_ref: &str, table_type: &str) -> Vec<TableCode> {
        let names: Vec<String> = table_ref
            .split(',')
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();

        let mut unique: BTreeMap<String, String> = BTreeMap::new();
        for entry in &self.tables {
            let in_table = entry
                .table
                .as_deref()
                .is_some_and(|t| names.contains(&t.to_lowercase()));
            let type_matches = entry
                .table_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(table_type));
            if !(in_table && type_matches) {
                continue;
            }
            if let Some(code) = entry.code.as_deref().filter(|c| !c.is_empty()) {
                unique
                    .entry(code.to_string())
                    .or_insert_with(|| entry.text.clone().unwrap_or_else(|| "N/A".to_string()));
            }
        }
        unique
            .into_iter()
            .map(|(code, text)| TableCode { code, text })
            .collect()
    }

    /// ICD text from the reference tables. Searches `table` first when given,
    /// then every table of type `icd`. Returns the code itself when unknown.
    pub fn icd(&self, code: &str, table: Option<&str>) -> String {
        if let Some(table) = table {
            if let Some(hit) = self
                .table_content(table, "icd")
                .into_iter()
                .find(|e| e.code.eq_ignore_ascii_case(code))
            {
                return hit.text;
            }
        }
        self.tables
            .iter()
            .filter(|e| {
                e.table_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case("icd"))
            })
            .find(|e| e.code.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code)))
            .and_then(|e| e.text.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// `true` when the ICD code exists in any table of type `icd`.
    pub fn has_icd(&self, code: &str) -> bool {
        self.tables.iter().any(|e| {
            e.table_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("icd"))
                && e.code.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code))
        })
    }
}

/// Picks the text for `lang`, falling back to German. Empty strings count as
/// missing.
fn localized<'a>(
    lang: Language,
    de: &'a Option<String>,
    fr: &'a Option<String>,
    it: &'a Option<String>,
) -> Option<&'a str> {
    let pick = |v: &'a Option<String>| v.as_deref().filter(|s| !s.trim().is_empty());
    let preferred = match lang {
        Language::De => None,
        Language::Fr => pick(fr),
        Language::It => pick(it),
    };
    preferred.or_else(|| pick(de))
}

/// Reads numbers that may be JSON numbers or German-formatted strings
/// (`"12,34"`). Strings are read up to the first character that cannot
/// continue a number, so `"12,34 TP"` is `12.34` and `"1.234,5"` is `1.234`.
/// Anything unreadable counts as `0`.
/// 读取可能为 JSON 数字或德式格式字符串的数值，字符串只读取数字前缀，
/// 无法解析时为 0。
pub fn parse_german_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(&s.trim().replace(',', ".")).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Longest decimal prefix of `s` (optional sign, digits, fraction and
/// exponent), after leading whitespace.
pub(crate) fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn german_floats() {
        assert_eq!(parse_german_float(&json!("12,5")), 12.5);
        assert_eq!(parse_german_float(&json!(3.25)), 3.25);
        assert_eq!(parse_german_float(&json!("abc")), 0.0);
        assert_eq!(parse_german_float(&Value::Null), 0.0);
    }

    #[test]
    fn german_floats_read_the_numeric_prefix() {
        assert_eq!(parse_german_float(&json!("12,34 TP")), 12.34);
        assert_eq!(parse_german_float(&json!("1.234,5")), 1.234);
        assert_eq!(parse_german_float(&json!(" -3,5e2x")), -350.0);
        assert_eq!(parse_german_float(&json!("2e")), 2.0);
        assert_eq!(parse_german_float(&json!(".")), 0.0);
        assert_eq!(parse_german_float(&json!("TP 12")), 0.0);
    }

    #[test]
    fn localized_falls_back_to_german() {
        let de = Some("Konsultation".to_string());
        let fr = Some("  ".to_string());
        let it = None;
        assert_eq!(localized(Language::Fr, &de, &fr, &it), Some("Konsultation"));
        assert_eq!(localized(Language::It, &de, &fr, &it), Some("Konsultation"));
    }
}
