//! Feed and fertilizer analysis parsing.
//!
//! Both analyses are four lists plus a summary, and differ only in the name
//! of the first list and a few keywords. A JSON object is used when present;
//! otherwise lines are sorted into buckets in the order warnings, cost,
//! primary, suggestions.

use serde_json::Value;
use tracing::debug;

use super::{BucketRule, Matcher, capped, classify_lines, content_lines, or_defaults};
use crate::ai::defaults;
use crate::ai::validation::extract_json_object;
use crate::constants::caps;
use crate::types::{
    FeedAnalysis, FertilizerAnalysis, FieldProfile, HerdProfile, json_string, json_string_array,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStrategy {
    Json,
    KeywordText,
}

impl AnalysisStrategy {
    pub const ORDER: [AnalysisStrategy; 2] = [Self::Json, Self::KeywordText];

    fn parse(&self, text: &str, schema: &Schema) -> Option<Critique> {
        match self {
            Self::Json => from_json(text, schema),
            Self::KeywordText => Some(from_text(text, schema)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bucket {
    Primary,
    Cost,
    Warnings,
    Suggestions,
}

const COST_KEYWORDS: &[&str] = &["эконом", "затрат", "дешевле", "₸"];

struct Schema {
    primary_key: &'static str,
    rules: [BucketRule<Bucket>; 4],
}

const FEED_SCHEMA: Schema = Schema {
    primary_key: "nutritionBalance",
    rules: [
        BucketRule {
            bucket: Bucket::Warnings,
            cap: caps::ANALYSIS_WARNINGS,
            matcher: Matcher::AnyOf(&["предупр", "не хватает", "недостат", "опасн"]),
        },
        BucketRule {
            bucket: Bucket::Cost,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(COST_KEYWORDS),
        },
        BucketRule {
            bucket: Bucket::Primary,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(&["баланс", "белок", "энерг", "витамин"]),
        },
        BucketRule {
            bucket: Bucket::Suggestions,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(&["рекоменд", "добавить", "изменить", "совет"]),
        },
    ],
};

const FERTILIZER_SCHEMA: Schema = Schema {
    primary_key: "effectiveness",
    rules: [
        BucketRule {
            bucket: Bucket::Warnings,
            cap: caps::ANALYSIS_WARNINGS,
            matcher: Matcher::AnyOf(&["предупр", "передоз", "не хватает", "опасн"]),
        },
        BucketRule {
            bucket: Bucket::Cost,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(COST_KEYWORDS),
        },
        BucketRule {
            bucket: Bucket::Primary,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(&["эффект", "правильно", "подобран", "достаточ"]),
        },
        BucketRule {
            bucket: Bucket::Suggestions,
            cap: caps::ANALYSIS_BUCKET,
            matcher: Matcher::AnyOf(&["рекоменд", "добавить", "изменить", "внести"]),
        },
    ],
};

/// Kind-neutral analysis before defaults are applied.
#[derive(Debug, Default)]
struct Critique {
    summary: Option<String>,
    primary: Vec<String>,
    cost: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

fn critique(text: &str, schema: &Schema) -> Critique {
    AnalysisStrategy::ORDER
        .iter()
        .find_map(|strategy| {
            let parsed = strategy.parse(text, schema)?;
            debug!("{} analysis parsed with {:?} strategy", schema.primary_key, strategy);
            Some(parsed)
        })
        .unwrap_or_default()
}

pub fn parse_feed_analysis(text: &str, herd: &HerdProfile) -> FeedAnalysis {
    let c = critique(text, &FEED_SCHEMA);
    FeedAnalysis {
        summary: c
            .summary
            .unwrap_or_else(|| defaults::feed_analysis_summary(herd)),
        nutrition_balance: or_defaults(c.primary, defaults::FEED_NUTRITION_BALANCE),
        cost_optimization: or_defaults(c.cost, defaults::FEED_COST_OPTIMIZATION),
        warnings: c.warnings,
        suggestions: or_defaults(c.suggestions, defaults::FEED_SUGGESTIONS),
    }
}

pub fn parse_fertilizer_analysis(text: &str, field: &FieldProfile) -> FertilizerAnalysis {
    let c = critique(text, &FERTILIZER_SCHEMA);
    FertilizerAnalysis {
        summary: c
            .summary
            .unwrap_or_else(|| defaults::fertilizer_analysis_summary(&field.name)),
        effectiveness: or_defaults(c.primary, defaults::FERTILIZER_EFFECTIVENESS),
        cost_optimization: or_defaults(c.cost, defaults::FERTILIZER_COST_OPTIMIZATION),
        warnings: c.warnings,
        suggestions: or_defaults(c.suggestions, defaults::FERTILIZER_SUGGESTIONS),
    }
}

fn from_json(text: &str, schema: &Schema) -> Option<Critique> {
    let map = extract_json_object(text)?;
    let keys = [
        "summary",
        schema.primary_key,
        "costOptimization",
        "warnings",
        "suggestions",
    ];
    if !keys.iter().any(|k| map.contains_key(*k)) {
        return None;
    }
    let value = Value::Object(map);
    let list = |key: &str, cap: usize| capped(json_string_array(&value, key).unwrap_or_default(), cap);

    Some(Critique {
        summary: json_string(&value, "summary").filter(|s| !s.trim().is_empty()),
        primary: list(schema.primary_key, caps::ANALYSIS_BUCKET),
        cost: list("costOptimization", caps::ANALYSIS_BUCKET),
        warnings: list("warnings", caps::ANALYSIS_WARNINGS),
        suggestions: list("suggestions", caps::ANALYSIS_BUCKET),
    })
}

/// Section headers such as `**ПРЕДУПРЕЖДЕНИЯ:**` carry no advice.
fn is_header(line: &str) -> bool {
    line.trim_matches(|c| c == '*' || c == '#')
        .trim()
        .ends_with(':')
}

fn from_text(text: &str, schema: &Schema) -> Critique {
    let lines: Vec<String> = content_lines(text)
        .into_iter()
        .filter(|l| !is_header(l))
        .collect();
    let mut buckets = classify_lines(&lines, &schema.rules);

    Critique {
        summary: None,
        primary: buckets.take(Bucket::Primary),
        cost: buckets.take(Bucket::Cost),
        warnings: buckets.take(Bucket::Warnings),
        suggestions: buckets.take(Bucket::Suggestions),
    }
}
