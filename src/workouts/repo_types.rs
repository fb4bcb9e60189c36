use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub muscle: String,
    pub equipment: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub notes: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub name: String,
    pub exercise_type: String,
    pub muscle: String,
    pub equipment: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub notes: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutPatch {
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}
