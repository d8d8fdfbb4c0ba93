//! Feeding plan parsing.
//!
//! Two answer conventions exist: a JSON object with `dailyFeed` rows carrying
//! `perAnimalKg`, and plain text with `"Ingredient: NN%"` lines. Both are
//! strategies tried in order; the first one that yields ration rows wins.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::{BucketRule, Matcher, capped, classify_lines, content_lines, contains_any, or_defaults};
use crate::ai::defaults;
use crate::ai::validation::extract_json_object;
use crate::constants::{caps, feeding};
use crate::types::{
    FeedLine, HerdProfile, LivestockFeedingPlan, json_number, json_string_array, json_string_or,
    round_to,
};

static PERCENTAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern
    #[allow(clippy::expect_used)]
    Regex::new(r"([А-Яа-яЁёA-Za-z\s]+):\s*(\d+)%").expect("percentage regex")
});

static LEADING_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern
    #[allow(clippy::expect_used)]
    Regex::new(r"^\d+%").expect("leading percent regex")
});

const COST_KEYWORDS: &[&str] = &[
    "₸",
    "тенге",
    "экономи",
    "замен",
    "дешев",
    "альтернатив",
    "roi",
    "рентабельн",
    "выгод",
    "сбере",
];
const SCHEDULE_KEYWORDS: &[&str] = &["раз", "график", "время"];
const FEED_KEYWORD: &str = "корм";
const CURRENCY: &[&str] = &["₸", "тенге"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedingPlanStrategy {
    Json,
    PercentageText,
}

impl FeedingPlanStrategy {
    pub const ORDER: [FeedingPlanStrategy; 2] = [Self::Json, Self::PercentageText];

    /// `None` when the strategy does not apply to this text at all.
    pub fn parse(&self, text: &str, herd: &HerdProfile) -> Option<LivestockFeedingPlan> {
        match self {
            Self::Json => from_json(text, herd),
            Self::PercentageText => Some(from_text(text, herd)),
        }
    }
}

pub fn parse_feeding_plan(text: &str, herd: &HerdProfile) -> LivestockFeedingPlan {
    let mut first_candidate = None;

    for strategy in FeedingPlanStrategy::ORDER {
        let Some(plan) = strategy.parse(text, herd) else {
            continue;
        };
        if !plan.daily_feed.is_empty() {
            debug!("Feeding plan parsed with {:?} strategy", strategy);
            return with_defaults(plan, herd);
        }
        first_candidate.get_or_insert(plan);
    }

    match first_candidate {
        Some(plan) => with_defaults(plan, herd),
        None => defaults::feeding_plan_fallback(herd),
    }
}

fn with_defaults(plan: LivestockFeedingPlan, herd: &HerdProfile) -> LivestockFeedingPlan {
    LivestockFeedingPlan {
        daily_feed: if plan.daily_feed.is_empty() {
            defaults::default_daily_feed(herd.count)
        } else {
            plan.daily_feed
        },
        feeding_schedule: or_defaults(plan.feeding_schedule, defaults::FEEDING_SCHEDULE),
        nutrition_tips: or_defaults(plan.nutrition_tips, defaults::NUTRITION_TIPS),
        cost_savings: or_defaults(plan.cost_savings, defaults::COST_SAVINGS),
        summary: plan.summary,
    }
}

fn clamp_percentage(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// =============================================================================
// JSON
// =============================================================================

fn from_json(text: &str, herd: &HerdProfile) -> Option<LivestockFeedingPlan> {
    let value = Value::Object(extract_json_object(text)?);
    let list = |key: &str, cap: usize| capped(json_string_array(&value, key).unwrap_or_default(), cap);

    let daily_feed = value
        .get("dailyFeed")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter(|row| row.is_object())
                .take(feeding::MAX_INGREDIENTS)
                .map(|row| {
                    let per_animal = json_number(row, "perAnimalKg").unwrap_or(0.0).max(0.0);
                    defaults::feed_line(
                        &json_string_or(row, "ingredient", defaults::UNKNOWN_INGREDIENT),
                        clamp_percentage(json_number(row, "percentage").unwrap_or(0.0)),
                        per_animal,
                        herd.count,
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Some(LivestockFeedingPlan {
        summary: json_string_or(&value, "summary", &defaults::feeding_plan_summary(herd)),
        daily_feed,
        feeding_schedule: list("feedingSchedule", caps::SCHEDULE),
        nutrition_tips: list("nutritionTips", caps::NUTRITION_TIPS),
        cost_savings: list("costSavings", caps::COST_SAVINGS),
    })
}

// =============================================================================
// Percentage Text
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bucket {
    CostSavings,
    Schedule,
    NutritionTips,
}

const TEXT_RULES: [BucketRule<Bucket>; 3] = [
    BucketRule {
        bucket: Bucket::CostSavings,
        cap: caps::COST_SAVINGS,
        matcher: Matcher::Predicate(is_cost_saving),
    },
    BucketRule {
        bucket: Bucket::Schedule,
        cap: caps::SCHEDULE,
        matcher: Matcher::Predicate(is_schedule),
    },
    BucketRule {
        bucket: Bucket::NutritionTips,
        cap: caps::NUTRITION_TIPS,
        matcher: Matcher::Predicate(is_nutrition_tip),
    },
];

fn starts_with_percent(line: &str) -> bool {
    LEADING_PERCENT_RE.is_match(line)
}

fn is_cost_saving(line: &str) -> bool {
    !starts_with_percent(line) && contains_any(line, COST_KEYWORDS)
}

/// The leading-percentage exclusion applies to the "корм" keyword only.
fn is_schedule(line: &str) -> bool {
    let keyword = contains_any(line, SCHEDULE_KEYWORDS)
        || (contains_any(line, &[FEED_KEYWORD]) && !starts_with_percent(line));
    keyword && !contains_any(line, CURRENCY)
}

fn is_nutrition_tip(line: &str) -> bool {
    !starts_with_percent(line)
        && line.chars().count() > feeding::MIN_TIP_CHARS
        && !contains_any(line, CURRENCY)
}

/// Every `label: NN%` in the text, up to the ingredient cap.
fn ration_rows(text: &str, count: i64) -> Vec<FeedLine> {
    PERCENTAGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let label = caps.get(1)?.as_str().trim();
            if label.is_empty() {
                return None;
            }
            // digits beyond u64 are still a full ration share
            let percentage = caps.get(2)?.as_str().parse::<u64>().map_or(100, |p| p.min(100));
            Some((label.to_string(), percentage as u8))
        })
        .take(feeding::MAX_INGREDIENTS)
        .map(|(label, percentage)| {
            let per_animal = round_to(percentage as f64 * feeding::KG_PER_PERCENT, 1);
            defaults::feed_line(&label, percentage, per_animal, count)
        })
        .collect()
}

fn from_text(text: &str, herd: &HerdProfile) -> LivestockFeedingPlan {
    let daily_feed = ration_rows(text, herd.count);

    let lines: Vec<String> = content_lines(text)
        .into_iter()
        .filter(|l| l.chars().count() >= feeding::MIN_LINE_CHARS)
        .collect();
    let mut buckets = classify_lines(&lines, &TEXT_RULES);

    LivestockFeedingPlan {
        summary: defaults::feeding_plan_summary(herd),
        daily_feed,
        feeding_schedule: buckets.take(Bucket::Schedule),
        nutrition_tips: buckets.take(Bucket::NutritionTips),
        cost_savings: buckets.take(Bucket::CostSavings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn herd(count: i64) -> HerdProfile {
        HerdProfile {
            kind: "Коровы".into(),
            count,
        }
    }

    #[test]
    fn test_percentage_lines() {
        let plan = parse_feeding_plan("Пшеница: 30%\nЯчмень: 25%", &herd(10));
        assert_eq!(plan.daily_feed.len(), 2);
        assert_eq!(plan.daily_feed[0].ingredient, "Пшеница");
        assert_eq!(plan.daily_feed[0].percentage, 30);
        assert_eq!(plan.daily_feed[0].amount_per_animal, "4.5 кг/день");
        assert_eq!(
            plan.daily_feed[0].total_amount,
            "45 кг/день (всего для 10 голов)"
        );
        assert_eq!(plan.daily_feed[1].ingredient, "Ячмень");
        assert_eq!(plan.daily_feed[1].percentage, 25);
        assert_eq!(plan.daily_feed[1].amount_per_animal, "3.8 кг/день");
    }

    #[test]
    fn test_mixed_script_labels() {
        let plan = parse_feeding_plan("Premix Витамины: 5%\nSoy meal: 12%", &herd(2));
        let names: Vec<&str> = plan.daily_feed.iter().map(|f| f.ingredient.as_str()).collect();
        assert_eq!(names, vec!["Premix Витамины", "Soy meal"]);
    }

    #[test]
    fn test_ingredient_cap_and_clamp() {
        let text = (1..=9)
            .map(|i| format!("Корм{}: {}%", "а".repeat(i), i * 50))
            .collect::<Vec<_>>()
            .join("\n");
        let plan = parse_feeding_plan(&text, &herd(1));
        assert_eq!(plan.daily_feed.len(), 7);
        assert_eq!(plan.daily_feed[6].percentage, 100);
    }

    #[test]
    fn test_buckets_are_exclusive() {
        let text = "Пшеница: 40%\n\
Сено: 60%\n\
Кормить 2 раза в день, экономия 5000 тенге в месяц\n\
Замена импортного премикса местным\n\
Кормить утром и вечером в одно время\n\
Следите за свежестью и качеством воды\n\
20% рациона можно заменить жмыхом подсолнечника\n\
Добавляйте соль-лизунец для минералов";
        let plan = parse_feeding_plan(text, &herd(10));

        assert_eq!(plan.daily_feed.len(), 2);
        assert_eq!(
            plan.cost_savings,
            vec![
                "Кормить 2 раза в день, экономия 5000 тенге в месяц",
                "Замена импортного премикса местным",
            ]
        );
        assert_eq!(plan.feeding_schedule, vec!["Кормить утром и вечером в одно время"]);
        assert_eq!(
            plan.nutrition_tips,
            vec![
                "Следите за свежестью и качеством воды",
                "Добавляйте соль-лизунец для минералов",
            ]
        );

        let mut seen = HashSet::new();
        for line in plan
            .cost_savings
            .iter()
            .chain(&plan.feeding_schedule)
            .chain(&plan.nutrition_tips)
        {
            assert!(seen.insert(line), "line in two buckets: {}", line);
        }
    }

    #[test]
    fn test_cost_line_with_percentage_label() {
        let text = "Пшеница: 60%\n\
Сено: 40%\n\
Экономия: 20% если заменить покупной комбикорм своим зерном";
        let plan = parse_feeding_plan(text, &herd(10));

        assert_eq!(
            plan.cost_savings,
            vec!["Экономия: 20% если заменить покупной комбикорм своим зерном"]
        );
        assert!(!plan.feeding_schedule.contains(&plan.cost_savings[0]));
    }

    #[test]
    fn test_leading_percentage_schedule_line() {
        let text = "Пшеница: 60%\n\
Сено: 40%\n\
50% рациона давать 2 раза в день утром\n\
30% корма оставлять на ночь";
        let plan = parse_feeding_plan(text, &herd(10));

        assert_eq!(
            plan.feeding_schedule,
            vec!["50% рациона давать 2 раза в день утром"]
        );
        assert!(
            !plan
                .nutrition_tips
                .iter()
                .any(|t| t.starts_with("30% корма"))
        );
    }

    #[test]
    fn test_overflowing_percentage_is_clamped() {
        let plan = parse_feeding_plan("Корм: 99999999999999999999%\nСено: 10%", &herd(1));
        assert_eq!(plan.daily_feed.len(), 2);
        assert_eq!(plan.daily_feed[0].ingredient, "Корм");
        assert_eq!(plan.daily_feed[0].percentage, 100);
        assert_eq!(plan.daily_feed[0].amount_per_animal, "15 кг/день");
    }

    #[test]
    fn test_json_first_with_prose() {
        let text = "Конечно! Вот план:\n```json\n{\"summary\": \"Рацион для коров\", \
\"dailyFeed\": [{\"ingredient\": \"Сено\", \"perAnimalKg\": 8, \"percentage\": 60}, \
{\"ingredient\": \"Ячмень\", \"perAnimalKg\": \"2.5\", \"percentage\": 40}], \
\"feedingSchedule\": [\"Дважды в день\"], \"costSavings\": [\"Сено своего покоса\"]}\n```\n\
Сено: 99%";
        let plan = parse_feeding_plan(text, &herd(4));

        assert_eq!(plan.summary, "Рацион для коров");
        assert_eq!(plan.daily_feed.len(), 2);
        assert_eq!(plan.daily_feed[0].percentage, 60);
        assert_eq!(plan.daily_feed[0].amount_per_animal, "8 кг/день");
        assert_eq!(
            plan.daily_feed[0].total_amount,
            "32 кг/день (всего для 4 голов)"
        );
        assert_eq!(plan.daily_feed[1].amount_per_animal, "2.5 кг/день");
        assert_eq!(plan.feeding_schedule, vec!["Дважды в день"]);
        // missing in the object, filled from defaults
        assert_eq!(plan.nutrition_tips.len(), 2);
    }

    #[test]
    fn test_json_without_rows_falls_through_to_text() {
        let text = "{\"summary\": \"Без рациона\"}\nПшеница: 50%\nСено: 50%";
        let plan = parse_feeding_plan(text, &herd(2));
        assert_eq!(plan.daily_feed.len(), 2);
        assert_eq!(plan.summary, "План кормления для 2 Коровы");
    }

    #[test]
    fn test_json_without_rows_and_no_text_keeps_json_fields() {
        let text = "{\"summary\": \"Только советы\", \"nutritionTips\": [\"Соль\"]}";
        let plan = parse_feeding_plan(text, &herd(3));
        assert_eq!(plan.summary, "Только советы");
        assert_eq!(plan.nutrition_tips, vec!["Соль"]);
        assert_eq!(plan.daily_feed.len(), 5);
    }

    #[test]
    fn test_nothing_usable() {
        let plan = parse_feeding_plan("ok", &herd(10));
        assert_eq!(plan.daily_feed, defaults::default_daily_feed(10));
        assert_eq!(plan.feeding_schedule, defaults::owned(defaults::FEEDING_SCHEDULE));
        assert_eq!(plan.cost_savings, defaults::owned(defaults::COST_SAVINGS));
    }
}
