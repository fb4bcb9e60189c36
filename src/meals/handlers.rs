use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateMealRequest, MealResponse, MealsResponse, SearchQuery, SearchResponse,
    UpdateMealRequest,
};
use super::repo;
use crate::aggregation::engine;
use crate::auth::AuthUser;
use crate::bucketing::DayQuery;
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::SuccessResponse;

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/search", get(search_meals))
        .route("/meals/:id", patch(update_meal).delete(delete_meal))
}

/// `?date=YYYY-MM-DD&tzOffset=N` limits the list to one local day.
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> ApiResult<Json<MealsResponse>> {
    let offset = q.offset()?;
    let items = match q.date()? {
        Some(date) => engine::day_meals(state.records.as_ref(), user_id, date, offset).await?,
        None => state.records.meals(user_id, None).await?,
    };
    Ok(Json(MealsResponse { items }))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> ApiResult<(StatusCode, Json<MealResponse>)> {
    let new_meal = payload.validate()?;
    let meal = repo::insert(&state.db, user_id, &new_meal).await?;
    info!(%user_id, meal_id = %meal.id, calories = meal.calories, "meal logged");
    Ok((StatusCode::CREATED, Json(MealResponse { meal })))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> ApiResult<Json<MealResponse>> {
    let patch = payload.validate()?;
    let meal = repo::update(&state.db, user_id, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Meal"))?;
    Ok(Json(MealResponse { meal }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("Meal"));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(Json(SuccessResponse::ok()))
}

#[instrument(skip(state))]
pub async fn search_meals(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let query = q.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::validation("Query is required"));
    }
    let results = state.nutrition.parse(query).await.map_err(|e| {
        error!(error = %e, "nutrition lookup failed");
        ApiError::Upstream("Failed to get nutrition info via AI".into())
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
    use crate::ai::testing::ScriptedGenerator;
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
    async fn list_for_a_local_day() {
        let user = Uuid::new_v4();
        let store = MemoryRecordStore::default()
            .with_meal(user, datetime!(2025-11-03 04:30 UTC), 300.0, 10.0, 40.0, 8.0)
            .with_meal(user, datetime!(2025-11-03 06:30 UTC), 450.0, 30.0, 50.0, 12.0);
        let state = AppState::fake().with_records(Arc::new(store));

        let (status, body) = get(state, user, "/api/meals?date=2025-11-02&tzOffset=300").await;
        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["calories"], 300.0);
    }

    #[tokio::test]
    async fn list_without_date_returns_everything() {
        let user = Uuid::new_v4();
        let store = MemoryRecordStore::default()
            .with_meal(user, datetime!(2025-11-01 12:00 UTC), 100.0, 1.0, 1.0, 1.0)
            .with_meal(user, datetime!(2025-11-03 12:00 UTC), 200.0, 1.0, 1.0, 1.0)
            .with_meal(Uuid::new_v4(), datetime!(2025-11-03 12:00 UTC), 999.0, 1.0, 1.0, 1.0);
        let state = AppState::fake().with_records(Arc::new(store));

        let (_, body) = get(state, user, "/api/meals").await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["calories"], 100.0);
    }

    #[tokio::test]
    async fn malformed_date_is_a_bad_request() {
        let state = AppState::fake().with_records(Arc::new(MemoryRecordStore::default()));
        let (status, body) = get(state, Uuid::new_v4(), "/api/meals?date=2025-02-30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("date"));
    }

    #[tokio::test]
    async fn search_requires_query() {
        let uri = "/api/meals/search?query=%20";
        let (status, _) = get(AppState::fake(), Uuid::new_v4(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_returns_parsed_items() {
        let gen = Arc::new(ScriptedGenerator::replying(
            r#"{"items":[{"mealName":"egg","quantity":2,"unit":"piece","calories":140,"protein":12,"carbs":1,"fats":10}]}"#,
        ));
        let state = AppState::fake().with_generator(gen);
        let (status, body) = get(state, Uuid::new_v4(), "/api/meals/search?query=2%20eggs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["mealName"], "egg");
        assert_eq!(body["results"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn search_failure_is_bad_gateway() {
        let state = AppState::fake().with_generator(Arc::new(ScriptedGenerator::failing(500)));
        let (status, body) = get(state, Uuid::new_v4(), "/api/meals/search?query=rice").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to get nutrition info via AI");
    }
}
