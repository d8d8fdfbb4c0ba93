//! Category recommendation parsing.

use super::{content_lines, list_items, or_defaults};
use crate::ai::defaults;
use crate::constants::caps;
use crate::types::{CategoryRecommendation, RecommendationCategory};

/// Numbered or bulleted lines, markers stripped, at most five.
pub fn parse_category(text: &str, category: RecommendationCategory) -> CategoryRecommendation {
    let items = list_items(&content_lines(text), caps::RECOMMENDATIONS);

    CategoryRecommendation {
        title: category.title().to_string(),
        recommendations: or_defaults(items, defaults::CATEGORY_RECOMMENDATIONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_and_bulleted() {
        let text = "Рекомендации по удобрениям:\n\
1. Внесите азот весной\n\
2.  Фосфор осенью\n\
- Калий под зябь\n\
• Микроэлементы по листу\n\
Итог: следуйте плану";
        let rec = parse_category(text, RecommendationCategory::Fertilizer);
        assert_eq!(rec.title, "Удобрения");
        assert_eq!(
            rec.recommendations,
            vec![
                "Внесите азот весной",
                "Фосфор осенью",
                "Калий под зябь",
                "Микроэлементы по листу",
            ]
        );
    }

    #[test]
    fn test_capped_at_five() {
        let text = (1..=8)
            .map(|i| format!("{}. Пункт {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let rec = parse_category(&text, RecommendationCategory::Soil);
        assert_eq!(rec.recommendations.len(), 5);
        assert_eq!(rec.recommendations[4], "Пункт 5");
    }

    #[test]
    fn test_prose_only_uses_defaults() {
        let rec = parse_category(
            "Используйте севооборот и следите за влагой.",
            RecommendationCategory::Pesticides,
        );
        assert_eq!(rec.title, "Пестициды и защита");
        assert_eq!(
            rec.recommendations,
            defaults::owned(defaults::CATEGORY_RECOMMENDATIONS)
        );
    }
}
