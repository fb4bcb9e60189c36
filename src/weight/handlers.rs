use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    LogWeightRequest, UpdateWeightRequest, WeightEntriesResponse, WeightEntryResponse,
};
use super::repo;
use crate::auth::AuthUser;
use crate::bucketing::local_date_of;
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::SuccessResponse;

pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/weight", get(list_weights).post(log_weight))
        .route("/weight/:id", patch(update_weight).delete(delete_weight))
}

/// Files the weigh-in under the caller's local today, replacing any entry
/// already logged that day.
#[instrument(skip(state, payload))]
pub async fn log_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogWeightRequest>,
) -> ApiResult<(StatusCode, Json<WeightEntryResponse>)> {
    let weight = payload.weight()?;
    let offset = payload.offset()?;
    let day = local_date_of(OffsetDateTime::now_utc(), offset);

    let entry = repo::upsert_for_day(&state.db, user_id, day, weight).await?;
    info!(%user_id, %day, weight, "weight logged");
    Ok((StatusCode::CREATED, Json(WeightEntryResponse { entry })))
}

#[instrument(skip(state))]
pub async fn list_weights(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<WeightEntriesResponse>> {
    let items = state.records.weights(user_id).await?;
    Ok(Json(WeightEntriesResponse { items }))
}

#[instrument(skip(state, payload))]
pub async fn update_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWeightRequest>,
) -> ApiResult<Json<WeightEntryResponse>> {
    let weight = payload.weight()?;
    let entry = repo::update(&state.db, user_id, id, weight)
        .await?
        .ok_or(ApiError::NotFound("Entry"))?;
    Ok(Json(WeightEntryResponse { entry }))
}

#[instrument(skip(state))]
pub async fn delete_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Entry"));
    }
    info!(%user_id, entry_id = %id, "weight entry deleted");
    Ok(Json(SuccessResponse::ok()))
}
