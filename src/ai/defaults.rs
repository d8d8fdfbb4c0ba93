//! Fallback Payloads
//!
//! Every canned answer the advisor can return, as constant data. The parser
//! fills empty lists from here, and the advisor returns the `*_fallback`
//! payloads when a completion fails outright.

use crate::types::{
    CategoryRecommendation, FeedAnalysis, FeedLine, FertilizerAnalysis, FieldAnalysis,
    HerdProfile, LivestockFeedingPlan, RecommendationCategory, format_quantity, round_to,
};

// =============================================================================
// Field Analysis
// =============================================================================

pub const FIELD_SUMMARY: &str = "Анализ выполнен";
pub const FIELD_TIMELINE: &str = "Составьте график работ";

pub const FIELD_FALLBACK_SUMMARY: &str = "Поле создано успешно";
pub const FIELD_FALLBACK_TIMELINE: &str = "Составьте детальный график на сезон";

pub const FIELD_RECOMMENDATIONS: &[&str] = &[
    "Проведите анализ почвы",
    "Планируйте севооборот",
    "Учитывайте погодные условия",
];

pub const FIELD_YIELD_OPTIMIZATION: &[&str] = &[
    "Оптимизируйте внесение удобрений",
    "Контролируйте влажность почвы",
];

pub const FIELD_RISKS: &[&str] = &["Следите за погодными условиями"];

pub fn field_analysis_fallback() -> FieldAnalysis {
    FieldAnalysis {
        summary: FIELD_FALLBACK_SUMMARY.to_string(),
        recommendations: owned(FIELD_RECOMMENDATIONS),
        yield_optimization: owned(FIELD_YIELD_OPTIMIZATION),
        risks: owned(FIELD_RISKS),
        timeline: FIELD_FALLBACK_TIMELINE.to_string(),
    }
}

// =============================================================================
// Feeding Plan
// =============================================================================

/// Canonical ration row: name, share of the ration, kilograms per head per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultIngredient {
    pub name: &'static str,
    pub percentage: u8,
    pub per_animal_kg: f64,
}

pub const INGREDIENTS: [DefaultIngredient; 5] = [
    DefaultIngredient { name: "Пшеница", percentage: 30, per_animal_kg: 4.5 },
    DefaultIngredient { name: "Ячмень", percentage: 25, per_animal_kg: 3.8 },
    DefaultIngredient { name: "Кукуруза", percentage: 20, per_animal_kg: 3.0 },
    DefaultIngredient { name: "Сено", percentage: 15, per_animal_kg: 2.3 },
    DefaultIngredient { name: "Витамины", percentage: 10, per_animal_kg: 1.5 },
];

pub const UNKNOWN_INGREDIENT: &str = "Неизвестно";

/// Used to fill lists a parsed answer left empty.
pub const FEEDING_SCHEDULE: &[&str] = &[
    "Кормить 2 раза в день",
    "Утром в 6:00 и вечером в 18:00",
    "Обеспечить постоянный доступ к воде",
];

pub const NUTRITION_TIPS: &[&str] = &[
    "Следите за качеством кормов",
    "Адаптируйте рацион по сезону",
];

pub const COST_SAVINGS: &[&str] = &[
    "Используйте местные корма - дешевле импортных на 30-40%",
    "Покупайте оптом для экономии 15-20%",
];

/// Returned when the completion itself failed.
pub const FEEDING_SCHEDULE_FALLBACK: &[&str] = &[
    "Кормить 2 раза в день: утром и вечером",
    "Обеспечить постоянный доступ к воде",
    "Регулярно проверять состояние животных",
];

pub const NUTRITION_TIPS_FALLBACK: &[&str] = &[
    "Следите за качеством и свежестью кормов",
    "Адаптируйте рацион в зависимости от сезона и продуктивности",
];

pub fn feeding_plan_summary(herd: &HerdProfile) -> String {
    format!("План кормления для {} {}", herd.count, herd.kind)
}

/// One ration row with per-head and whole-group daily amounts.
///
/// The group total is rounded to one decimal.
pub fn feed_line(ingredient: &str, percentage: u8, per_animal_kg: f64, count: i64) -> FeedLine {
    let total = round_to(per_animal_kg * count as f64, 1);
    FeedLine {
        ingredient: ingredient.to_string(),
        percentage,
        amount_per_animal: format!("{} кг/день", format_quantity(per_animal_kg)),
        total_amount: format!(
            "{} кг/день (всего для {} голов)",
            format_quantity(total),
            count
        ),
    }
}

pub fn default_daily_feed(count: i64) -> Vec<FeedLine> {
    INGREDIENTS
        .iter()
        .map(|i| feed_line(i.name, i.percentage, i.per_animal_kg, count))
        .collect()
}

pub fn feeding_plan_fallback(herd: &HerdProfile) -> LivestockFeedingPlan {
    LivestockFeedingPlan {
        summary: feeding_plan_summary(herd),
        daily_feed: default_daily_feed(herd.count),
        feeding_schedule: owned(FEEDING_SCHEDULE_FALLBACK),
        nutrition_tips: owned(NUTRITION_TIPS_FALLBACK),
        cost_savings: owned(COST_SAVINGS),
    }
}

// =============================================================================
// Category Recommendations
// =============================================================================

pub const CATEGORY_RECOMMENDATIONS: &[&str] = &[
    "Проведите анализ перед применением",
    "Следуйте рекомендованным дозировкам",
    "Учитывайте погодные условия",
];

pub const CATEGORY_RECOMMENDATIONS_FALLBACK: &[&str] = &[
    "Проведите профессиональный анализ",
    "Следуйте агрономическим рекомендациям",
    "Учитывайте местные условия",
];

pub fn category_fallback(category: RecommendationCategory) -> CategoryRecommendation {
    CategoryRecommendation {
        title: category.title().to_string(),
        recommendations: owned(CATEGORY_RECOMMENDATIONS_FALLBACK),
    }
}

// =============================================================================
// Feed Analysis
// =============================================================================

pub const FEED_NUTRITION_BALANCE: &[&str] = &["Проверьте баланс белков и углеводов"];
pub const FEED_COST_OPTIMIZATION: &[&str] = &["Используйте местные корма для экономии"];
pub const FEED_SUGGESTIONS: &[&str] = &["Обратитесь к ветеринару для детальной консультации"];

pub fn feed_analysis_summary(herd: &HerdProfile) -> String {
    format!("Анализ кормления для {} {}", herd.count, herd.kind)
}

/// Payload for a group with no feeds recorded; no completion is made.
pub fn feed_analysis_empty() -> FeedAnalysis {
    FeedAnalysis {
        summary: "Добавьте корма для анализа".to_string(),
        nutrition_balance: Vec::new(),
        cost_optimization: Vec::new(),
        warnings: vec!["Корма не добавлены! Добавьте корма для животных".to_string()],
        suggestions: vec![
            "Начните с добавления основных кормов: пшеница, ячмень, сено".to_string(),
        ],
    }
}

pub fn feed_analysis_fallback(herd: &HerdProfile) -> FeedAnalysis {
    FeedAnalysis {
        summary: format!("Корма добавлены для {} {}", herd.count, herd.kind),
        nutrition_balance: owned(FEED_NUTRITION_BALANCE),
        cost_optimization: owned(FEED_COST_OPTIMIZATION),
        warnings: Vec::new(),
        suggestions: owned(FEED_SUGGESTIONS),
    }
}

// =============================================================================
// Fertilizer Analysis
// =============================================================================

pub const FERTILIZER_EFFECTIVENESS: &[&str] = &["Проверьте соответствие нормам внесения"];
pub const FERTILIZER_COST_OPTIMIZATION: &[&str] = &["Используйте местные удобрения для экономии"];
pub const FERTILIZER_SUGGESTIONS: &[&str] = &["Проведите анализ почвы перед внесением удобрений"];

pub fn fertilizer_analysis_summary(field_name: &str) -> String {
    format!("Анализ удобрений для поля {}", field_name)
}

/// Payload for a field with no fertilizers recorded; no completion is made.
pub fn fertilizer_analysis_empty() -> FertilizerAnalysis {
    FertilizerAnalysis {
        summary: "Добавьте удобрения для анализа".to_string(),
        effectiveness: vec!["Введите данные об удобрениях для получения анализа".to_string()],
        cost_optimization: Vec::new(),
        warnings: vec!["Удобрения не добавлены! Добавьте удобрения для поля".to_string()],
        suggestions: vec![
            "Начните с добавления основных удобрений: азот, фосфор, калий".to_string(),
        ],
    }
}

pub fn fertilizer_analysis_fallback(field_name: &str) -> FertilizerAnalysis {
    FertilizerAnalysis {
        summary: format!("Удобрения добавлены для поля {}", field_name),
        effectiveness: owned(FERTILIZER_EFFECTIVENESS),
        cost_optimization: owned(FERTILIZER_COST_OPTIMIZATION),
        warnings: Vec::new(),
        suggestions: owned(FERTILIZER_SUGGESTIONS),
    }
}

pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn herd(count: i64) -> HerdProfile {
        HerdProfile {
            kind: "Овцы".into(),
            count,
        }
    }

    #[test]
    fn test_default_ration_sums_to_100() {
        let total: u32 = INGREDIENTS.iter().map(|i| i.percentage as u32).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_feed_line_amounts() {
        let line = feed_line("Пшеница", 30, 4.5, 10);
        assert_eq!(line.amount_per_animal, "4.5 кг/день");
        assert_eq!(line.total_amount, "45 кг/день (всего для 10 голов)");

        let line = feed_line("Ячмень", 25, 3.8, 3);
        assert_eq!(line.total_amount, "11.4 кг/день (всего для 3 голов)");
    }

    #[test]
    fn test_feeding_plan_fallback_shape() {
        let plan = feeding_plan_fallback(&herd(20));
        assert_eq!(plan.summary, "План кормления для 20 Овцы");
        assert_eq!(plan.daily_feed.len(), 5);
        assert_eq!(plan.daily_feed[3].ingredient, "Сено");
        assert_eq!(plan.daily_feed[3].total_amount, "46 кг/день (всего для 20 голов)");
        assert_eq!(plan.feeding_schedule.len(), 3);
    }

    #[test]
    fn test_empty_inventory_payloads() {
        let feed = feed_analysis_empty();
        assert!(!feed.warnings.is_empty());
        assert!(feed.nutrition_balance.is_empty());
        assert!(feed.cost_optimization.is_empty());

        let fert = fertilizer_analysis_empty();
        assert!(!fert.warnings.is_empty());
        assert!(fert.cost_optimization.is_empty());
    }

    #[test]
    fn test_category_fallback_title() {
        let rec = category_fallback(RecommendationCategory::Soil);
        assert_eq!(rec.title, "Почва");
        assert_eq!(rec.recommendations.len(), 3);
    }
}
