//! Persisted Farm Entities
//!
//! Row types for users, fields, livestock groups, inventories and chat history,
//! plus the request payloads that create or patch them.
//!
//! Wire format is camelCase JSON; storage columns are snake_case.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::utils::{ParseWithDefault, de_decimal_string, de_opt_decimal_string};

// =============================================================================
// Users
// =============================================================================

/// Account row. The password hash never leaves the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_credentials(&self.username, &self.password)
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_credentials(&self.username, &self.password)
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    if username.trim().chars().count() < 3 {
        issues.push("username: must contain at least 3 characters".to_string());
    }
    if password.chars().count() < 6 {
        issues.push("password: must contain at least 6 characters".to_string());
    }
    ValidationError::from_issues(issues)
}

/// Profile fields a user may edit about themselves.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
}

// =============================================================================
// Fields
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Hectares
    pub area: f64,
    pub crop_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewField {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area: f64,
    pub crop_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub area: Option<f64>,
    pub crop_type: Option<String>,
}

impl NewField {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_text(&mut issues, "name", &self.name);
        check_text(&mut issues, "cropType", &self.crop_type);
        check_coordinates(&mut issues, Some(self.latitude), Some(self.longitude));
        check_area(&mut issues, Some(self.area));
        ValidationError::from_issues(issues)
    }
}

impl FieldUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if let Some(name) = &self.name {
            check_text(&mut issues, "name", name);
        }
        if let Some(crop) = &self.crop_type {
            check_text(&mut issues, "cropType", crop);
        }
        check_coordinates(&mut issues, self.latitude, self.longitude);
        check_area(&mut issues, self.area);
        ValidationError::from_issues(issues)
    }
}

// =============================================================================
// Livestock
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Livestock {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
    pub status: LivestockStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LivestockStatus {
    #[default]
    Healthy,
    Attention,
    Sick,
}

impl LivestockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Attention => "attention",
            Self::Sick => "sick",
        }
    }
}

impl ParseWithDefault for LivestockStatus {
    fn type_name() -> &'static str {
        "LivestockStatus"
    }

    fn default_value() -> Self {
        Self::Healthy
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "healthy" => Some(Self::Healthy),
            "attention" => Some(Self::Attention),
            "sick" => Some(Self::Sick),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLivestock {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
    #[serde(default)]
    pub status: LivestockStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockUpdate {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<i64>,
    pub status: Option<LivestockStatus>,
}

impl NewLivestock {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_text(&mut issues, "type", &self.kind);
        check_count(&mut issues, Some(self.count));
        ValidationError::from_issues(issues)
    }
}

impl LivestockUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if let Some(kind) = &self.kind {
            check_text(&mut issues, "type", kind);
        }
        check_count(&mut issues, self.count);
        ValidationError::from_issues(issues)
    }
}

// =============================================================================
// Inventories
// =============================================================================

/// Feed stock attached to one livestock group.
///
/// `quantity` is kept as the stored decimal text: older rows may hold values
/// that no longer parse, and the rebalancer must be able to see that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub livestock_id: String,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub price_per_unit: Option<String>,
    pub created_at: String,
}

/// Fertilizer stock planned for one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerItem {
    pub id: String,
    pub field_id: String,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub price_per_unit: Option<String>,
    pub application_date: Option<String>,
    pub created_at: String,
}

/// Create payload shared by both inventories.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(deserialize_with = "de_decimal_string")]
    pub quantity: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "de_opt_decimal_string")]
    pub price_per_unit: Option<String>,
    /// Fertilizers only; ignored for feeds.
    #[serde(default)]
    pub application_date: Option<String>,
}

/// Partial update payload shared by both inventories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_decimal_string")]
    pub quantity: Option<String>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "de_opt_decimal_string")]
    pub price_per_unit: Option<String>,
    pub application_date: Option<String>,
}

impl NewInventoryItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_text(&mut issues, "name", &self.name);
        check_decimal(&mut issues, "quantity", Some(&self.quantity));
        check_decimal(&mut issues, "pricePerUnit", self.price_per_unit.as_deref());
        check_date(&mut issues, self.application_date.as_deref());
        ValidationError::from_issues(issues)
    }
}

impl InventoryUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if let Some(name) = &self.name {
            check_text(&mut issues, "name", name);
        }
        check_decimal(&mut issues, "quantity", self.quantity.as_deref());
        check_decimal(&mut issues, "pricePerUnit", self.price_per_unit.as_deref());
        check_date(&mut issues, self.application_date.as_deref());
        ValidationError::from_issues(issues)
    }
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl ParseWithDefault for ChatRole {
    fn type_name() -> &'static str {
        "ChatRole"
    }

    fn default_value() -> Self {
        Self::User
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn check_text(issues: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(format!("{}: must not be empty", name));
    }
}

fn check_coordinates(issues: &mut Vec<String>, lat: Option<f64>, lon: Option<f64>) {
    if let Some(lat) = lat
        && !(-90.0..=90.0).contains(&lat)
    {
        issues.push(format!("latitude: {} is outside -90..90", lat));
    }
    if let Some(lon) = lon
        && !(-180.0..=180.0).contains(&lon)
    {
        issues.push(format!("longitude: {} is outside -180..180", lon));
    }
}

fn check_area(issues: &mut Vec<String>, area: Option<f64>) {
    if let Some(area) = area
        && !(area.is_finite() && area > 0.0)
    {
        issues.push("area: must be a positive number of hectares".to_string());
    }
}

fn check_count(issues: &mut Vec<String>, count: Option<i64>) {
    if let Some(count) = count
        && count < 0
    {
        issues.push("count: must not be negative".to_string());
    }
}

fn check_decimal(issues: &mut Vec<String>, name: &str, value: Option<&str>) {
    if let Some(raw) = value {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => {}
            _ => issues.push(format!("{}: '{}' is not a non-negative number", name, raw)),
        }
    }
}

fn check_date(issues: &mut Vec<String>, value: Option<&str>) {
    if let Some(raw) = value
        && parse_date(raw).is_none()
    {
        issues.push(format!("applicationDate: '{}' is not a date", raw));
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
pub fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    let raw = raw.trim();
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}
