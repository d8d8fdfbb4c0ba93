//! Response Parser
//!
//! Turns completion text into the advisor result types. Every entry point is
//! total: any input, including empty or hostile text, yields a well-formed
//! value. The shared shape is:
//!
//! 1. JSON object anywhere in the text (code fences and prose tolerated)
//! 2. line heuristics over non-empty trimmed lines
//! 3. default lists for anything still empty
//!
//! Bucketed heuristics go through [`classify_lines`]: an ordered list of
//! rules, each claiming up to `cap` matching lines from a shared pool, so a
//! line never lands in two buckets.

mod analysis;
mod category;
mod feeding;
mod field;

pub use analysis::{AnalysisStrategy, parse_feed_analysis, parse_fertilizer_analysis};
pub use category::parse_category;
pub use feeding::{FeedingPlanStrategy, parse_feeding_plan};
pub use field::parse_field_analysis;

use regex::Regex;
use std::sync::LazyLock;

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:\d+\.|[-•])\s*").expect("list marker regex")
});

static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern
    #[allow(clippy::expect_used)]
    Regex::new(r"^\d+\.").expect("numbered line regex")
});

// =============================================================================
// Line Helpers
// =============================================================================

/// Non-empty trimmed lines, in order.
pub(crate) fn content_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn is_numbered(line: &str) -> bool {
    NUMBERED_RE.is_match(line)
}

/// Lines that start with `N.`, `-` or `•`, marker stripped.
pub(crate) fn list_items(lines: &[String], cap: usize) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let m = LIST_MARKER_RE.find(line)?;
            let item = line[m.end()..].trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .take(cap)
        .collect()
}

/// Case-insensitive substring test against any keyword.
pub(crate) fn contains_any(line: &str, keywords: &[&str]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// `list` unless empty, then the given defaults.
pub(crate) fn or_defaults(list: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if list.is_empty() {
        crate::ai::defaults::owned(defaults)
    } else {
        list
    }
}

pub(crate) fn capped(mut list: Vec<String>, cap: usize) -> Vec<String> {
    list.retain(|s| !s.trim().is_empty());
    list.truncate(cap);
    list
}

// =============================================================================
// Ordered Buckets
// =============================================================================

/// How a bucket recognizes its lines.
#[derive(Clone, Copy)]
pub(crate) enum Matcher {
    /// Line contains any keyword (keywords are lowercase).
    AnyOf(&'static [&'static str]),
    /// Arbitrary test on the original line.
    Predicate(fn(&str) -> bool),
}

impl Matcher {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::AnyOf(keywords) => contains_any(line, keywords),
            Self::Predicate(f) => f(line),
        }
    }
}

pub(crate) struct BucketRule<B> {
    pub bucket: B,
    pub cap: usize,
    pub matcher: Matcher,
}

/// Lines claimed per bucket.
pub(crate) struct Buckets<B> {
    filled: Vec<(B, Vec<String>)>,
}

impl<B: PartialEq> Buckets<B> {
    pub fn take(&mut self, bucket: B) -> Vec<String> {
        self.filled
            .iter_mut()
            .find(|(b, _)| *b == bucket)
            .map(|(_, lines)| std::mem::take(lines))
            .unwrap_or_default()
    }
}

/// Rules run in order; each claims up to `cap` matching lines still in the
/// pool and removes them before the next rule runs.
pub(crate) fn classify_lines<B: Copy>(lines: &[String], rules: &[BucketRule<B>]) -> Buckets<B> {
    let mut pool: Vec<&String> = lines.iter().collect();
    let mut filled = Vec::with_capacity(rules.len());

    for rule in rules {
        let mut claimed = Vec::new();
        pool.retain(|line| {
            if claimed.len() < rule.cap && rule.matcher.matches(line) {
                claimed.push((*line).clone());
                false
            } else {
                true
            }
        });
        filled.push((rule.bucket, claimed));
    }

    Buckets { filled }
}
