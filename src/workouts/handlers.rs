use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateWorkoutRequest, SearchQuery, SearchResponse, UpdateWorkoutRequest, WorkoutResponse,
    WorkoutsResponse,
};
use super::repo;
use crate::aggregation::engine;
use crate::auth::AuthUser;
use crate::bucketing::DayQuery;
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::SuccessResponse;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route("/workouts/search", get(search_exercises))
        .route("/workouts/:id", patch(update_workout).delete(delete_workout))
}

#[instrument(skip(state))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> ApiResult<Json<WorkoutsResponse>> {
    let offset = q.offset()?;
    let items = match q.date()? {
        Some(date) => {
            engine::day_workouts(state.records.as_ref(), user_id, date, offset).await?
        }
        None => state.records.workouts(user_id, None).await?,
    };
    Ok(Json(WorkoutsResponse { items }))
}

#[instrument(skip(state, payload))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateWorkoutRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutResponse>)> {
    let new_workout = payload.validate()?;
    let workout = repo::insert(&state.db, user_id, &new_workout).await?;
    info!(%user_id, workout_id = %workout.id, category = %workout.category, "workout logged");
    Ok((StatusCode::CREATED, Json(WorkoutResponse { workout })))
}

#[instrument(skip(state, payload))]
pub async fn update_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkoutRequest>,
) -> ApiResult<Json<WorkoutResponse>> {
    let patch = payload.validate()?;
    let workout = repo::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Workout"))?;
    Ok(Json(WorkoutResponse { workout }))
}

#[instrument(skip(state))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Workout"));
    }
    info!(%user_id, workout_id = %id, "workout deleted");
    Ok(Json(SuccessResponse::ok()))
}

#[instrument(skip(state))]
pub async fn search_exercises(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let muscle = q
        .muscle
        .as_deref()
        .map(|m| m.trim().to_lowercase())
        .unwrap_or_default();
    if muscle.is_empty() {
        return Err(ApiError::validation("Query param 'muscle' is required"));
    }
    let results = state.exercises.by_muscle(&muscle).await.map_err(|e| {
        error!(error = %e, %muscle, "exercise lookup failed");
        ApiError::Upstream(e.to_string())
    })?;
    Ok(Json(SearchResponse { results }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::Request;
    use time::macros::datetime;
    use tower::ServiceExt;

    use crate::aggregation::store::MemoryRecordStore;
    use crate::app::build_app;
    use crate::auth::services::JwtKeys;

    use super::*;

    async fn get(state: AppState, user_id: Uuid, uri: &str) -> (StatusCode, serde_json::Value) {
        let token = JwtKeys::from_ref(&state).sign_access(user_id).unwrap();
        let res = build_app(state)
            .oneshot(
                Request::get(uri)
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn list_for_a_local_day_is_ascending() {
        let user = Uuid::new_v4();
        let store = MemoryRecordStore::default()
            .with_workout(user, "Squat", datetime!(2025-11-02 23:00 UTC))
            .with_workout(user, "Bench", datetime!(2025-11-02 15:00 UTC))
            .with_workout(user, "Deadlift", datetime!(2025-11-03 09:00 UTC));
        let state = AppState::fake().with_records(Arc::new(store));

        let (status, body) = get(state, user, "/api/workouts?date=2025-11-02&tzOffset=360").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bench", "Squat"]);
        assert_eq!(body["items"][0]["type"], "strength");
    }

    #[tokio::test]
    async fn bad_offset_is_a_bad_request() {
        let state = AppState::fake().with_records(Arc::new(MemoryRecordStore::default()));
        let uri = "/api/workouts?date=2025-11-02&tzOffset=abc";
        let (status, _) = get(state, Uuid::new_v4(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_needs_muscle() {
        let (status, _) = get(AppState::fake(), Uuid::new_v4(), "/api/workouts/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_without_key_is_bad_gateway() {
        let (status, body) =
            get(AppState::fake(), Uuid::new_v4(), "/api/workouts/search?muscle=biceps").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Missing API_NINJAS_KEY");
    }
}
