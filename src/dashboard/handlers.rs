use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::{SuggestionResponse, TzQuery, FALLBACK_SUGGESTION};
use crate::aggregation::{engine, types::DashboardSnapshot};
use crate::auth::AuthUser;
use crate::errors::ApiResult;
use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/ai-suggestion", get(get_ai_suggestion))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<TzQuery>,
) -> ApiResult<Json<DashboardSnapshot>> {
    let offset = q.offset()?;
    let snapshot = engine::dashboard_snapshot(
        state.records.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
        offset,
    )
    .await?;
    Ok(Json(snapshot))
}

/// Always answers 200: coaching is optional and never breaks the dashboard.
#[instrument(skip(state))]
pub async fn get_ai_suggestion(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<TzQuery>,
) -> Json<SuggestionResponse> {
    let offset = match q.offset() {
        Ok(o) => o,
        Err(e) => {
            warn!(error = %e, %user_id, "coach skipped: bad tzOffset");
            return Json(SuggestionResponse { suggestion: None });
        }
    };

    let inputs = match engine::coach_inputs(
        state.records.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
        offset,
    )
    .await
    {
        Ok(Some(inputs)) => inputs,
        Ok(None) => {
            info!(%user_id, "coach unavailable: no profile");
            return Json(SuggestionResponse { suggestion: None });
        }
        Err(e) => {
            warn!(error = %e, %user_id, "coach unavailable: record store");
            return Json(SuggestionResponse { suggestion: None });
        }
    };

    let suggestion = state
        .coach
        .request_coaching_tip(&inputs)
        .await
        .unwrap_or_else(|| FALLBACK_SUGGESTION.to_string());
    Json(SuggestionResponse {
        suggestion: Some(suggestion),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::{Request, StatusCode};
    use time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::aggregation::store::MemoryRecordStore;
    use crate::ai::{testing::ScriptedGenerator, TextGenerator};
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

    fn store_with_today(user: Uuid) -> MemoryRecordStore {
        let now = OffsetDateTime::now_utc();
        MemoryRecordStore::default()
            .with_profile(user, 180.0, Some(170.0))
            .with_meal(user, now, 300.0, 20.0, 30.0, 10.0)
            .with_meal(user, now, 450.0, 30.0, 50.0, 15.0)
            .with_meal(user, now, 220.0, 10.0, 25.0, 5.0)
    }

    #[tokio::test]
    async fn dashboard_reports_today_and_targets() {
        let user = Uuid::new_v4();
        let state = AppState::fake().with_records(Arc::new(store_with_today(user)));
        let (status, body) = get(state, user, "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todaysMacros"]["calories"], 970.0);
        assert_eq!(body["macroTargets"]["calories"], 2160);
        assert_eq!(body["macroTargets"]["carbs"], 225);
        assert_eq!(body["lastWorkout"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn dashboard_store_failure_is_500() {
        let state = AppState::fake().with_records(Arc::new(MemoryRecordStore::unavailable()));
        let (status, body) = get(state, Uuid::new_v4(), "/api/dashboard").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn suggestion_is_null_without_profile() {
        let state = AppState::fake().with_records(Arc::new(MemoryRecordStore::default()));
        let (status, body) = get(state, Uuid::new_v4(), "/api/dashboard/ai-suggestion").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "suggestion": null }));
    }

    #[tokio::test]
    async fn suggestion_is_null_when_store_fails() {
        let state = AppState::fake().with_records(Arc::new(MemoryRecordStore::unavailable()));
        let (status, body) = get(state, Uuid::new_v4(), "/api/dashboard/ai-suggestion").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestion"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn suggestion_falls_back_when_coach_fails() {
        let user = Uuid::new_v4();
        let state = AppState::fake()
            .with_records(Arc::new(store_with_today(user)))
            .with_generator(Arc::new(ScriptedGenerator::failing(503)));
        let (status, body) = get(state, user, "/api/dashboard/ai-suggestion").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestion"], FALLBACK_SUGGESTION);
    }

    #[tokio::test]
    async fn suggestion_uses_first_tip_and_todays_numbers() {
        let user = Uuid::new_v4();
        let gen = Arc::new(ScriptedGenerator::replying(r#"["Add Greek yogurt", "Nice pacing"]"#));
        let state = AppState::fake()
            .with_records(Arc::new(store_with_today(user)))
            .with_generator(gen.clone() as Arc<dyn TextGenerator>);
        let (_, body) = get(state, user, "/api/dashboard/ai-suggestion").await;
        assert_eq!(body["suggestion"], "Add Greek yogurt");

        let seen = gen.seen.lock().unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&seen[0].messages[1].content).unwrap();
        assert_eq!(payload["today"]["calories"], 970.0);
        assert_eq!(payload["remaining"]["calories"], 1190.0);
    }

    #[tokio::test]
    async fn dashboard_rejects_malformed_offset() {
        let user = Uuid::new_v4();
        let state = AppState::fake().with_records(Arc::new(store_with_today(user)));
        let (status, body) = get(state, user, "/api/dashboard?tzOffset=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "tzOffset must be an integer number of minutes");
    }

    #[tokio::test]
    async fn suggestion_is_null_on_malformed_offset() {
        let user = Uuid::new_v4();
        let gen = Arc::new(ScriptedGenerator::replying(r#"["unused"]"#));
        let state = AppState::fake()
            .with_records(Arc::new(store_with_today(user)))
            .with_generator(gen.clone() as Arc<dyn TextGenerator>);
        let (status, body) = get(state, user, "/api/dashboard/ai-suggestion?tzOffset=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "suggestion": null }));
        assert_eq!(gen.calls(), 0);
    }

    #[tokio::test]
    async fn dashboard_accepts_client_offset() {
        let user = Uuid::new_v4();
        let state = AppState::fake().with_records(Arc::new(store_with_today(user)));
        let (status, body) = get(state, user, "/api/dashboard?tzOffset=-330").await;
        assert_eq!(status, StatusCode::OK);
        let days = body["caloriesByDay"].as_array().unwrap();
        let total: f64 = days.iter().map(|d| d["totalCalories"].as_f64().unwrap()).sum();
        assert_eq!(total, 970.0);
    }

    #[tokio::test]
    async fn yesterday_does_not_count_toward_today() {
        let user = Uuid::new_v4();
        let store = MemoryRecordStore::default()
            .with_profile(user, 180.0, None)
            .with_meal(user, OffsetDateTime::now_utc() - Duration::days(1), 800.0, 1.0, 1.0, 1.0);
        let state = AppState::fake().with_records(Arc::new(store));
        let (_, body) = get(state, user, "/api/dashboard").await;
        assert_eq!(body["todaysMacros"]["calories"], 0.0);
        assert_eq!(body["caloriesByDay"].as_array().unwrap().len(), 1);
    }
}
