//! # Lenient Field Decoding / 宽松字段解码
//!
//! `deserialize_with` helpers for hand-maintained datasets and LLM-produced
//! responses, where a field may be `null`, a number instead of a string, or
//! a string instead of a number. Values that cannot be read fall back to the
//! field's empty value instead of failing the whole record.
//!
//! 用于手工维护的数据集和 LLM 生成的响应的 `deserialize_with` 辅助函数。
//! 无法读取的值回退为空值，而不是使整条记录失败。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::reference::leading_number;

/// String field that also accepts numbers and booleans. Anything else is
/// `None`.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

/// Like [`string`], but unreadable values become `""`.
pub fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(string(deserializer)?.unwrap_or_default())
}

/// Number field that also accepts numeric strings (`"15"`, `"12,5"`).
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s.trim().replace(',', ".")),
        _ => None,
    })
}

/// Quantity field: unreadable values count as one.
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(number(deserializer)?.unwrap_or(1.0))
}

/// Boolean field where `null` and non-booleans are `false`.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// Optional boolean; non-booleans are `None`.
pub fn opt_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool())
}

/// List of strings. `null` is empty and non-scalar elements are dropped.
pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    })
}

/// List of records. `null` is empty and elements that do not decode are
/// skipped with a warning.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable list element: {}", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Nested record where `null` or a wrong shape gives the default.
pub fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable record: {}", e);
        T::default()
    }))
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "string")]
        code: Option<String>,
        #[serde(default, deserialize_with = "number")]
        minutes: Option<f64>,
        #[serde(default, deserialize_with = "strings")]
        tags: Vec<String>,
    }

    #[test]
    fn scalars_are_coerced() {
        let row: Row =
            serde_json::from_value(json!({"code": 123, "minutes": "15", "tags": ["a", 7, {}]}))
                .unwrap();
        assert_eq!(row.code.as_deref(), Some("123"));
        assert_eq!(row.minutes, Some(15.0));
        assert_eq!(row.tags, vec!["a", "7"]);
    }

    #[test]
    fn nulls_become_empty() {
        let row: Row =
            serde_json::from_value(json!({"code": null, "minutes": null, "tags": null})).unwrap();
        assert_eq!(row.code, None);
        assert_eq!(row.minutes, None);
        assert!(row.tags.is_empty());
    }
}
