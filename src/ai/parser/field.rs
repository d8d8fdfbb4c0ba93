//! Field analysis parsing.

use serde_json::Value;

use super::{capped, content_lines, contains_any, is_numbered, or_defaults};
use crate::ai::defaults;
use crate::ai::validation::extract_json_object;
use crate::constants::caps;
use crate::types::{FieldAnalysis, json_string, json_string_array, json_string_or};

const KEYS: [&str; 5] = [
    "summary",
    "recommendations",
    "yieldOptimization",
    "risks",
    "timeline",
];

pub fn parse_field_analysis(text: &str) -> FieldAnalysis {
    let analysis = from_json(text).unwrap_or_else(|| from_lines(text));

    FieldAnalysis {
        recommendations: or_defaults(analysis.recommendations, defaults::FIELD_RECOMMENDATIONS),
        yield_optimization: or_defaults(
            analysis.yield_optimization,
            defaults::FIELD_YIELD_OPTIMIZATION,
        ),
        risks: or_defaults(analysis.risks, defaults::FIELD_RISKS),
        ..analysis
    }
}

/// Only objects that carry at least one analysis key count as an answer.
fn from_json(text: &str) -> Option<FieldAnalysis> {
    let map = extract_json_object(text)?;
    if !KEYS.iter().any(|k| map.contains_key(*k)) {
        return None;
    }
    let value = Value::Object(map);
    let list = |key: &str, cap: usize| capped(json_string_array(&value, key).unwrap_or_default(), cap);

    Some(FieldAnalysis {
        summary: json_string_or(&value, "summary", defaults::FIELD_SUMMARY),
        recommendations: list("recommendations", caps::RECOMMENDATIONS),
        yield_optimization: list("yieldOptimization", caps::YIELD_WINDOW),
        risks: list("risks", caps::RISKS),
        timeline: json_string(&value, "timeline")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| defaults::FIELD_TIMELINE.to_string()),
    })
}

fn from_lines(text: &str) -> FieldAnalysis {
    let lines = content_lines(text);
    let window = |len: usize| lines.iter().skip(1).take(len);

    FieldAnalysis {
        summary: lines
            .first()
            .cloned()
            .unwrap_or_else(|| defaults::FIELD_SUMMARY.to_string()),
        recommendations: window(caps::FIELD_RECOMMENDATION_WINDOW)
            .filter(|l| contains_any(l, &["рекомендац"]) || is_numbered(l))
            .cloned()
            .collect(),
        yield_optimization: window(caps::YIELD_WINDOW)
            .filter(|l| contains_any(l, &["урожай", "внос"]))
            .cloned()
            .collect(),
        risks: lines
            .iter()
            .filter(|l| contains_any(l, &["риск", "опасн"]))
            .take(caps::RISKS)
            .cloned()
            .collect(),
        timeline: lines
            .iter()
            .find(|l| contains_any(l, &["график", "сезон"]))
            .cloned()
            .unwrap_or_else(|| defaults::FIELD_TIMELINE.to_string()),
    }
}
