//! Advisor Result Types
//!
//! Structured shapes the response parser produces from completion text, and the
//! value objects prompts are rendered from. None of these are persisted.

use serde::{Deserialize, Serialize};

use super::domain::{FeedItem, FertilizerItem, Field, Livestock};

// =============================================================================
// Prompt Inputs
// =============================================================================

/// Field attributes the prompts need.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProfile {
    pub name: String,
    pub crop_type: String,
    pub area: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Field> for FieldProfile {
    fn from(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            crop_type: field.crop_type.clone(),
            area: field.area,
            latitude: field.latitude,
            longitude: field.longitude,
        }
    }
}

/// Livestock group attributes the prompts need.
#[derive(Debug, Clone, PartialEq)]
pub struct HerdProfile {
    pub kind: String,
    pub count: i64,
}

impl From<&Livestock> for HerdProfile {
    fn from(livestock: &Livestock) -> Self {
        Self {
            kind: livestock.kind.clone(),
            count: livestock.count,
        }
    }
}

/// One inventory record as rendered into analysis prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryLine {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub price_per_unit: Option<String>,
    pub application_date: Option<String>,
}

impl From<&FeedItem> for InventoryLine {
    fn from(feed: &FeedItem) -> Self {
        Self {
            name: feed.name.clone(),
            quantity: feed.quantity.clone(),
            unit: feed.unit.clone(),
            price_per_unit: feed.price_per_unit.clone(),
            application_date: None,
        }
    }
}

impl From<&FertilizerItem> for InventoryLine {
    fn from(item: &FertilizerItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.clone(),
            unit: item.unit.clone(),
            price_per_unit: item.price_per_unit.clone(),
            application_date: item.application_date.clone(),
        }
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalysis {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub yield_optimization: Vec<String>,
    pub risks: Vec<String>,
    pub timeline: String,
}

/// One ingredient row of a daily ration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedLine {
    pub ingredient: String,
    pub percentage: u8,
    pub amount_per_animal: String,
    pub total_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LivestockFeedingPlan {
    pub summary: String,
    pub daily_feed: Vec<FeedLine>,
    pub feeding_schedule: Vec<String>,
    pub nutrition_tips: Vec<String>,
    pub cost_savings: Vec<String>,
}

/// Recommendation topic for a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Fertilizer,
    Soil,
    Pesticides,
}

impl RecommendationCategory {
    pub const ALL: [RecommendationCategory; 3] = [Self::Fertilizer, Self::Soil, Self::Pesticides];

    /// Display title shown to users and embedded in prompts.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Fertilizer => "Удобрения",
            Self::Soil => "Почва",
            Self::Pesticides => "Пестициды и защита",
        }
    }
}

impl std::str::FromStr for RecommendationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fertilizer" => Ok(Self::Fertilizer),
            "soil" => Ok(Self::Soil),
            "pesticides" => Ok(Self::Pesticides),
            _ => Err(format!(
                "Unknown category: {}. Valid values: fertilizer, soil, pesticides",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecommendation {
    pub title: String,
    pub recommendations: Vec<String>,
}

/// All three category recommendations for one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub fertilizer: CategoryRecommendation,
    pub soil: CategoryRecommendation,
    pub pesticides: CategoryRecommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedAnalysis {
    pub summary: String,
    pub nutrition_balance: Vec<String>,
    pub cost_optimization: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerAnalysis {
    pub summary: String,
    pub effectiveness: Vec<String>,
    pub cost_optimization: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "soil".parse::<RecommendationCategory>(),
            Ok(RecommendationCategory::Soil)
        );
        assert!("weeds".parse::<RecommendationCategory>().is_err());
    }

    #[test]
    fn test_feeding_plan_camel_case() {
        let plan = LivestockFeedingPlan {
            summary: "s".into(),
            daily_feed: vec![FeedLine {
                ingredient: "Сено".into(),
                percentage: 15,
                amount_per_animal: "2.3 кг/день".into(),
                total_amount: "23 кг/день (всего для 10 голов)".into(),
            }],
            feeding_schedule: vec![],
            nutrition_tips: vec![],
            cost_savings: vec![],
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("dailyFeed").is_some());
        assert_eq!(json["dailyFeed"][0]["amountPerAnimal"], "2.3 кг/день");
    }
}
