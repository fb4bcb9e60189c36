use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::repo_types::{ProfilePatch, User};
use crate::errors::ApiError;
use crate::validation::{non_blank, Numeric, RequiredFields};

/// Token type used to distinguish Access and Refresh JWTs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

/// Standard JWT claims used in the app.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub exp: usize,      // expiration time
    pub iat: usize,      // issued at
    pub iss: String,     // issuer
    pub aud: String,     // audience
    pub kind: TokenKind, // access or refresh
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<Numeric>,
    pub height: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub target_weight: Option<Numeric>,
    pub daily_calorie_goal: Option<Numeric>,
}

/// Registration fields after validation, before hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub target_weight: Option<f64>,
    pub daily_calorie_goal: i32,
}

impl RegisterRequest {
    pub const REQUIRED_FIELDS: [&'static str; 8] = [
        "username",
        "email",
        "password",
        "fullName",
        "age",
        "height",
        "weight",
        "dailyCalorieGoal",
    ];

    pub fn validate(&self) -> Result<ValidRegistration, ApiError> {
        let mut req = RequiredFields::new(&Self::REQUIRED_FIELDS);
        let username = req.take("username", non_blank(self.username.as_deref()));
        let email = req.take(
            "email",
            non_blank(self.email.as_deref()).map(|e| e.to_lowercase()),
        );
        let password = req.take("password", self.password.clone().filter(|p| !p.is_empty()));
        let full_name = req.take("fullName", non_blank(self.full_name.as_deref()));
        let age = req.take("age", count(&self.age, "age")?);
        let height = req.take("height", positive(&self.height, "height")?);
        let weight = req.take("weight", positive(&self.weight, "weight")?);
        let target_weight = positive(&self.target_weight, "targetWeight")?;
        let daily_calorie_goal = req.take(
            "dailyCalorieGoal",
            count(&self.daily_calorie_goal, "dailyCalorieGoal")?,
        );
        req.finish()?;

        Ok(ValidRegistration {
            username,
            email,
            password,
            full_name,
            age,
            height,
            weight,
            target_weight,
            daily_calorie_goal,
        })
    }
}

fn positive(v: &Option<Numeric>, field: &str) -> Result<Option<f64>, ApiError> {
    Ok(v.as_ref().map(|n| n.positive(field)).transpose()?.flatten())
}

fn count(v: &Option<Numeric>, field: &str) -> Result<Option<i32>, ApiError> {
    Ok(v.as_ref().map(|n| n.count(field)).transpose()?.flatten())
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub target_weight: Option<f64>,
    pub daily_calorie_goal: i32,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            age: u.age,
            height: u.height,
            weight: u.weight,
            target_weight: u.target_weight,
            daily_calorie_goal: u.daily_calorie_goal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// `PATCH /me`. A `username` key is ignored: usernames never change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<Numeric>,
    pub height: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub target_weight: Option<Numeric>,
    pub daily_calorie_goal: Option<Numeric>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<ProfilePatch, ApiError> {
        Ok(ProfilePatch {
            email: non_blank(self.email.as_deref()).map(|e| e.to_lowercase()),
            full_name: non_blank(self.full_name.as_deref()),
            age: count(&self.age, "age")?,
            height: positive(&self.height, "height")?,
            weight: positive(&self.weight, "weight")?,
            target_weight: positive(&self.target_weight, "targetWeight")?,
            daily_calorie_goal: count(&self.daily_calorie_goal, "dailyCalorieGoal")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// `{"ok": true}` after a password change.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
