use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub username: String,           // immutable after registration
    pub email: String,              // lowercased
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub full_name: String,
    pub age: i32,
    pub height: f64,                // cm
    pub weight: f64,                // lb
    pub target_weight: Option<f64>, // lb
    pub daily_calorie_goal: i32,    // legacy, superseded by computed targets
    pub created_at: OffsetDateTime,
}

/// Validated registration data.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub target_weight: Option<f64>,
    pub daily_calorie_goal: i32,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub daily_calorie_goal: Option<i32>,
}
