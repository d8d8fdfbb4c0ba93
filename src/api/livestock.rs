//! Livestock routes, feeding plans and the feed inventory.
//!
//! Lowering a group's head-count scales its feed stock; see
//! [`crate::inventory`].

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

use super::AppState;
use super::auth::AuthUser;
use super::error::{ApiError, ApiResult, OrInternal};
use crate::inventory::{InventoryRebalancer, RebalanceOutcome};
use crate::storage::{FeedStore, LivestockStore};
use crate::types::{
    FeedAnalysis, FeedItem, HerdProfile, InventoryLine, InventoryUpdate, Livestock,
    LivestockFeedingPlan, LivestockUpdate, NewInventoryItem, NewLivestock,
};

fn owned_livestock(
    state: &AppState,
    user_id: &str,
    id: &str,
    missing: &str,
) -> ApiResult<Livestock> {
    LivestockStore::new(&state.db)
        .get(id)
        .or_internal("Failed to fetch livestock")?
        .filter(|l| l.user_id == user_id)
        .ok_or_else(|| ApiError::not_found(missing))
}

fn owned_feed(state: &AppState, user_id: &str, id: &str) -> ApiResult<FeedItem> {
    let store = FeedStore::new(&state.db);
    let feed = store
        .get(id)
        .or_internal("Ошибка при получении корма")?
        .ok_or_else(|| ApiError::not_found("Корм не найден"))?;
    let owner = store.owner_of(id).or_internal("Ошибка при получении корма")?;
    if owner.as_deref() != Some(user_id) {
        return Err(ApiError::forbidden());
    }
    Ok(feed)
}

// =============================================================================
// Livestock
// =============================================================================

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Livestock>>> {
    let herds = LivestockStore::new(&state.db)
        .list_for_user(&auth.user.id)
        .or_internal("Failed to fetch livestock")?;
    Ok(Json(herds))
}

/// Create a group and return it with a first feeding plan.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewLivestock>,
) -> ApiResult<impl IntoResponse> {
    new.validate()?;
    let livestock = LivestockStore::new(&state.db)
        .create(&auth.user.id, &new)
        .or_internal("Failed to create livestock")?;

    let plan = state
        .advisor
        .feeding_plan(&HerdProfile::from(&livestock))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "livestock": livestock, "feedingPlan": plan })),
    ))
}

/// Patch a group. A lower head-count rebalances its feeds; if that fails the
/// count is written back and the response carries the per-feed errors.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<LivestockUpdate>,
) -> ApiResult<Json<Livestock>> {
    update.validate()?;
    let current = owned_livestock(&state, &auth.user.id, &id, "Livestock not found")?;

    let updated = LivestockStore::new(&state.db)
        .update(&id, &update)
        .or_internal("Failed to update livestock")?
        .ok_or_else(|| ApiError::not_found("Livestock not found"))?;

    if let Some(new_count) = update.count {
        let outcome = InventoryRebalancer::new(state.db.as_ref()).after_count_change(
            &id,
            current.count,
            new_count,
        )?;
        if let RebalanceOutcome::Rebalanced(report) = outcome {
            info!(
                "Livestock {} reduced {} -> {}: {} feeds scaled, {} reset",
                id,
                current.count,
                new_count,
                report.scaled,
                report.warnings.len()
            );
        }
    }

    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_livestock(&state, &auth.user.id, &id, "Livestock not found")?;
    LivestockStore::new(&state.db)
        .delete(&id)
        .or_internal("Failed to delete livestock")?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn feeding_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<LivestockFeedingPlan>> {
    let livestock = owned_livestock(&state, &auth.user.id, &id, "Скот не найден")?;
    Ok(Json(
        state
            .advisor
            .feeding_plan(&HerdProfile::from(&livestock))
            .await,
    ))
}

// =============================================================================
// Feeds
// =============================================================================

pub async fn list_feeds(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<FeedItem>>> {
    owned_livestock(&state, &auth.user.id, &id, "Скот не найден")?;
    let feeds = FeedStore::new(&state.db)
        .list_for_livestock(&id)
        .or_internal("Ошибка при получении кормов")?;
    Ok(Json(feeds))
}

pub async fn create_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewInventoryItem>,
) -> ApiResult<(StatusCode, Json<FeedItem>)> {
    owned_livestock(&state, &auth.user.id, &id, "Скот не найден")?;
    new.validate()?;
    let feed = FeedStore::new(&state.db)
        .create(&id, &new)
        .or_internal("Ошибка при создании корма")?;
    Ok((StatusCode::CREATED, Json(feed)))
}

pub async fn update_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<InventoryUpdate>,
) -> ApiResult<Json<FeedItem>> {
    owned_feed(&state, &auth.user.id, &id)?;
    update.validate()?;
    let feed = FeedStore::new(&state.db)
        .update(&id, &update)
        .or_internal("Ошибка при обновлении корма")?
        .ok_or_else(|| ApiError::not_found("Корм не найден"))?;
    Ok(Json(feed))
}

pub async fn delete_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_feed(&state, &auth.user.id, &id)?;
    FeedStore::new(&state.db)
        .delete(&id)
        .or_internal("Ошибка при удалении корма")?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn analyze_feeds(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FeedAnalysis>> {
    let livestock = owned_livestock(&state, &auth.user.id, &id, "Скот не найден")?;
    let feeds = FeedStore::new(&state.db)
        .list_for_livestock(&id)
        .or_internal("Ошибка при анализе кормов")?;
    let lines: Vec<InventoryLine> = feeds.iter().map(InventoryLine::from).collect();

    Ok(Json(
        state
            .advisor
            .analyze_feeds(&HerdProfile::from(&livestock), &lines)
            .await,
    ))
}
