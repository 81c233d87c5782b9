//! Field decoders for persisted records.
//!
//! # Invariants
//! - A damaged secondary field degrades to a usable value; it never fails
//!   the record. Only identity (`id`, and `name` where required) decides
//!   whether the healer drops an entry.

use crate::model::theme::StyleMap;
use crate::svg::ColorMode;
use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text field; numbers and booleans keep their textual form.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Boolean field; also reads `"true"` and `1`.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        Value::Number(number) => number.as_i64() == Some(1),
        _ => false,
    };
    Ok(value)
}

/// Epoch-millisecond field; also reads numeric strings and RFC 3339 dates.
/// Anything else reads as `0`.
pub(crate) fn epoch_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|ms| ms as i64))
            .unwrap_or_default(),
        Value::String(text) => parse_timestamp(text.trim()).unwrap_or_default(),
        _ => 0,
    };
    Ok(value)
}

/// Unknown modes fall back to `ColorMode::Main`.
pub(crate) fn color_mode<'de, D>(deserializer: D) -> Result<ColorMode, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = match Value::deserialize(deserializer)? {
        Value::String(text) => text.parse().unwrap_or_default(),
        _ => ColorMode::default(),
    };
    Ok(mode)
}

/// Style map in stored order; scalar values become strings, nested values
/// are dropped.
pub(crate) fn style_map<'de, D>(deserializer: D) -> Result<StyleMap, D::Error>
where
    D: Deserializer<'de>,
{
    let styles = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(name, value)| scalar_text(value).map(|value| (name, value)))
            .collect(),
        _ => StyleMap::new(),
    };
    Ok(styles)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|date| date.timestamp_millis())
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use crate::model::theme::StyleMap;
    use crate::svg::ColorMode;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "super::epoch_ms")]
        at: i64,
        #[serde(default, deserialize_with = "super::color_mode")]
        mode: ColorMode,
        #[serde(default, deserialize_with = "super::style_map")]
        styles: StyleMap,
        #[serde(default, deserialize_with = "super::flag")]
        system: bool,
    }

    #[test]
    fn damaged_fields_degrade_instead_of_failing() {
        let sample: Sample = serde_json::from_value(json!({
            "at": "2024-01-01T00:00:00Z",
            "mode": "sparkle",
            "styles": {"--z": "#fff", "--line-height": 1.75, "--nested": {"a": 1}, "--a": true},
            "system": "true"
        }))
        .unwrap();

        assert_eq!(sample.at, 1_704_067_200_000);
        assert_eq!(sample.mode, ColorMode::Main);
        let styles: Vec<(&str, &str)> = sample
            .styles
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        assert_eq!(styles, vec![("--z", "#fff"), ("--line-height", "1.75"), ("--a", "true")]);
        assert!(sample.system);
    }

    #[test]
    fn numeric_strings_and_garbage_timestamps() {
        let numeric: Sample = serde_json::from_value(json!({"at": "1700000000000"})).unwrap();
        assert_eq!(numeric.at, 1_700_000_000_000);
        let garbage: Sample = serde_json::from_value(json!({"at": [1]})).unwrap();
        assert_eq!(garbage.at, 0);
        assert!(!garbage.system);
        assert!(garbage.styles.is_empty());
    }
}
