//! Field routes, their recommendations and the fertilizer inventory.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use super::AppState;
use super::auth::AuthUser;
use super::error::{ApiError, ApiResult, OrInternal};
use crate::storage::{FertilizerStore, FieldStore};
use crate::types::{
    CategoryRecommendation, FertilizerAnalysis, FertilizerItem, Field, FieldAnalysis,
    FieldProfile, FieldSummary, FieldUpdate, InventoryLine, InventoryUpdate, NewField,
    NewInventoryItem, RecommendationCategory,
};

/// The field, if it exists and belongs to `user_id`.
fn owned_field(state: &AppState, user_id: &str, id: &str, missing: &str) -> ApiResult<Field> {
    FieldStore::new(&state.db)
        .get(id)
        .or_internal("Failed to fetch field")?
        .filter(|f| f.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(missing))
}

/// The fertilizer, with 404 when missing and 403 when another user owns it.
fn owned_fertilizer(state: &AppState, user_id: &str, id: &str) -> ApiResult<FertilizerItem> {
    let store = FertilizerStore::new(&state.db);
    let item = store
        .get(id)
        .or_internal("Ошибка при получении удобрения")?
        .ok_or_else(|| ApiError::not_found("Удобрение не найдено"))?;
    let owner = store
        .owner_of(id)
        .or_internal("Ошибка при получении удобрения")?;
    if owner.as_deref() != Some(user_id) {
        return Err(ApiError::forbidden());
    }
    Ok(item)
}

// =============================================================================
// Fields
// =============================================================================

pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<Field>>> {
    let fields = FieldStore::new(&state.db)
        .list_for_user(&auth.user.id)
        .or_internal("Failed to fetch fields")?;
    Ok(Json(fields))
}

/// Create a field and return it with a first analysis.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewField>,
) -> ApiResult<impl IntoResponse> {
    new.validate()?;
    let field = FieldStore::new(&state.db)
        .create(&auth.user.id, &new)
        .or_internal("Failed to create field")?;

    let analysis = state.advisor.analyze_field(&FieldProfile::from(&field)).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "field": field, "analysis": analysis })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> ApiResult<Json<Field>> {
    update.validate()?;
    owned_field(&state, &auth.user.id, &id, "Field not found")?;
    let field = FieldStore::new(&state.db)
        .update(&id, &update)
        .or_internal("Failed to update field")?
        .ok_or_else(|| ApiError::not_found("Field not found"))?;
    Ok(Json(field))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_field(&state, &auth.user.id, &id, "Field not found")?;
    FieldStore::new(&state.db)
        .delete(&id)
        .or_internal("Failed to delete field")?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Advice
// =============================================================================

pub async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FieldAnalysis>> {
    let field = owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    Ok(Json(
        state.advisor.analyze_field(&FieldProfile::from(&field)).await,
    ))
}

pub async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, category)): Path<(String, String)>,
) -> ApiResult<Json<CategoryRecommendation>> {
    let category: RecommendationCategory = category
        .parse()
        .map_err(|_| ApiError::bad_request("Неверная категория"))?;
    let field = owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    Ok(Json(
        state
            .advisor
            .category_recommendation(&FieldProfile::from(&field), category)
            .await,
    ))
}

pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FieldSummary>> {
    let field = owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    Ok(Json(
        state.advisor.field_summary(&FieldProfile::from(&field)).await,
    ))
}

// =============================================================================
// Fertilizers
// =============================================================================

pub async fn list_fertilizers(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FertilizerItem>>> {
    owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    let items = FertilizerStore::new(&state.db)
        .list_for_field(&id)
        .or_internal("Ошибка при получении удобрений")?;
    Ok(Json(items))
}

pub async fn create_fertilizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewInventoryItem>,
) -> ApiResult<(StatusCode, Json<FertilizerItem>)> {
    owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    new.validate()?;
    let item = FertilizerStore::new(&state.db)
        .create(&id, &new)
        .or_internal("Ошибка при создании удобрения")?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_fertilizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<InventoryUpdate>,
) -> ApiResult<Json<FertilizerItem>> {
    owned_fertilizer(&state, &auth.user.id, &id)?;
    update.validate()?;
    let item = FertilizerStore::new(&state.db)
        .update(&id, &update)
        .or_internal("Ошибка при обновлении удобрения")?
        .ok_or_else(|| ApiError::not_found("Удобрение не найдено"))?;
    Ok(Json(item))
}

pub async fn delete_fertilizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_fertilizer(&state, &auth.user.id, &id)?;
    FertilizerStore::new(&state.db)
        .delete(&id)
        .or_internal("Ошибка при удалении удобрения")?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn analyze_fertilizers(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FertilizerAnalysis>> {
    let field = owned_field(&state, &auth.user.id, &id, "Поле не найдено")?;
    let items = FertilizerStore::new(&state.db)
        .list_for_field(&id)
        .or_internal("Ошибка при анализе удобрений")?;
    let lines: Vec<InventoryLine> = items.iter().map(InventoryLine::from).collect();

    Ok(Json(
        state
            .advisor
            .analyze_fertilizers(&FieldProfile::from(&field), &lines)
            .await,
    ))
}
