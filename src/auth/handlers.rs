use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse, OkResponse,
            PublicUser, RefreshRequest, RegisterRequest, UpdateProfileRequest,
        },
        repo_types::{NewUser, User},
        services::{
            hash_password, is_valid_email, verify_password, AuthUser, JwtKeys, MIN_PASSWORD_LEN,
        },
    },
    errors::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/change-password", post(change_password))
}

fn issue_tokens(keys: &JwtKeys, user: User) -> ApiResult<AuthResponse> {
    let token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Store(e)
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        ApiError::Store(e)
    })?;
    Ok(AuthResponse {
        token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let valid = payload.validate()?;

    if !is_valid_email(&valid.email) {
        warn!(email = %valid.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    if valid.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    if User::exists(&state.db, &valid.username, &valid.email).await? {
        warn!(username = %valid.username, email = %valid.email, "username or email taken");
        return Err(ApiError::Conflict("Username or email already taken".into()));
    }

    let password_hash = hash_password(&valid.password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            username: valid.username,
            email: valid.email,
            password_hash,
            full_name: valid.full_name,
            age: valid.age,
            height: valid.height,
            weight: valid.weight,
            target_weight: valid.target_weight,
            daily_calorie_goal: valid.daily_calorie_goal,
        },
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(issue_tokens(&keys, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("All fields are required."));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::Unauthorized);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    info!(user_id = %user.id, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized
    })?;

    let Some(user) = User::find_by_id(&state.db, claims.sub).await? else {
        warn!(user_id = %claims.sub, "refresh for unknown user");
        return Err(ApiError::Unauthorized);
    };
    Ok(Json(issue_tokens(&keys, user)?))
}

async fn load_user(state: &AppState, user_id: Uuid) -> ApiResult<User> {
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        warn!(%user_id, "token for unknown user");
        ApiError::NotFound("User")
    })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<MeResponse>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(MeResponse { user: user.into() }))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<MeResponse>> {
    let patch = payload.validate()?;

    if let Some(email) = patch.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::validation("Invalid email"));
        }
        if let Some(other) = User::find_by_email(&state.db, email).await? {
            if other.id != user_id {
                return Err(ApiError::Conflict("Email already taken".into()));
            }
        }
    }

    let user = User::update_profile(&state.db, user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(%user_id, "profile updated");
    Ok(Json(MeResponse { user: user.into() }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<OkResponse>> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::validation("Current and new password required."));
    }
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation("Password too short"));
    }

    let user = load_user(&state, user_id).await?;
    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(%user_id, "change password with wrong current password");
        return Err(ApiError::validation("Current password incorrect"));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password_hash(&state.db, user_id, &hash).await?;
    info!(%user_id, "password changed");
    Ok(Json(OkResponse { ok: true }))
}
