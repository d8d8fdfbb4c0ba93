//! Shared utility functions for type serialization and common operations.
//!
//! ## JSON Extraction Helpers
//!
//! Provides ergonomic helpers for extracting values from `serde_json::Value`:
//! - `json_string`, `json_string_or` - Extract strings
//! - `json_string_array` - Extract string arrays
//! - `json_number` - Lenient numeric extraction (numbers or numeric strings)

use serde::{Deserialize, Deserializer};
use std::fmt::Display;

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
#[inline]
pub fn json_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract a non-blank string, or the provided default.
#[inline]
pub fn json_string_or(value: &serde_json::Value, key: &str, default: &str) -> String {
    json_string(value, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Extract string array from JSON value by key.
///
/// Returns `None` when the key is missing or not an array, so callers can tell
/// "absent" from "present but empty". Non-string elements are skipped.
#[inline]
pub fn json_string_array(value: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    value.get(key).and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|s| s.as_str().map(String::from))
            .collect()
    })
}

/// Lenient number extraction: accepts JSON numbers and numeric strings.
///
/// LLMs frequently quote numbers (`"4.5"`); anything non-finite or
/// unparseable yields `None`.
pub fn json_number(value: &serde_json::Value, key: &str) -> Option<f64> {
    let raw = value.get(key)?;
    let n = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

// =============================================================================
// Numeric Formatting
// =============================================================================

/// Round half away from zero to the given number of decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Render a quantity the way it is shown to users: no trailing `.0`.
///
/// `45.0` renders as `45`, `4.5` as `4.5`.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

/// Render an integer with a thin-space-free comma grouping (`12,000`).
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Accept a decimal either as a JSON number or a string and keep it as text.
///
/// Inventory quantities are stored as decimal strings, but clients send both shapes.
pub fn de_decimal_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Optional variant of [`de_decimal_string`].
pub fn de_opt_decimal_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Used for deserializing database values where invalid strings should fall back gracefully.
/// Logs a warning when an invalid value is encountered.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        match Self::try_parse(s) {
            Some(v) => v,
            None => {
                tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                Self::default_value()
            }
        }
    }
}

/// Filter an iterator of Results, logging errors at warn level before discarding.
///
/// Use this instead of `.filter_map(|r| r.ok())` when you want visibility into
/// what errors are being discarded.
pub fn log_filter_warn<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string_or_blank() {
        let v = json!({"summary": "  ", "title": "ok"});
        assert_eq!(json_string_or(&v, "summary", "fallback"), "fallback");
        assert_eq!(json_string_or(&v, "title", "fallback"), "ok");
        assert_eq!(json_string_or(&v, "missing", "fallback"), "fallback");
    }

    #[test]
    fn test_json_string_array_absent_vs_empty() {
        let v = json!({"a": [], "b": ["x", 1, "y"], "c": "nope"});
        assert_eq!(json_string_array(&v, "a"), Some(vec![]));
        assert_eq!(
            json_string_array(&v, "b"),
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(json_string_array(&v, "c"), None);
        assert_eq!(json_string_array(&v, "d"), None);
    }

    #[test]
    fn test_json_number_lenient() {
        let v = json!({"a": 4.5, "b": "3,2", "c": "abc", "d": null, "e": 7});
        assert_eq!(json_number(&v, "a"), Some(4.5));
        assert_eq!(json_number(&v, "b"), Some(3.2));
        assert_eq!(json_number(&v, "c"), None);
        assert_eq!(json_number(&v, "d"), None);
        assert_eq!(json_number(&v, "e"), Some(7.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.5, 1), 4.5);
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(45.0, 1), 45.0);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(45.0), "45");
        assert_eq!(format_quantity(4.5), "4.5");
        assert_eq!(format_quantity(-0.0), "0");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(800), "800");
        assert_eq!(group_thousands(8000), "8,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-12000), "-12,000");
    }

    #[test]
    fn test_de_decimal_string() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "de_decimal_string")]
            q: String,
            #[serde(default, deserialize_with = "de_opt_decimal_string")]
            p: Option<String>,
        }

        let a: Probe = serde_json::from_str(r#"{"q": 12.5}"#).unwrap();
        assert_eq!(a.q, "12.5");
        assert_eq!(a.p, None);

        let b: Probe = serde_json::from_str(r#"{"q": "7", "p": 150}"#).unwrap();
        assert_eq!(b.q, "7");
        assert_eq!(b.p.as_deref(), Some("150"));
    }
}
