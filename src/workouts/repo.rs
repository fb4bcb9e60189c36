use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewWorkout, Workout, WorkoutPatch};
use crate::bucketing::DayRange;

const WORKOUT_COLUMNS: &str = "id, user_id, name, exercise_type, muscle, equipment, sets, reps, \
                               weight, notes, category, created_at";

pub async fn insert(db: &PgPool, user_id: Uuid, w: &NewWorkout) -> anyhow::Result<Workout> {
    let sql = format!(
        r#"
        INSERT INTO workouts
            (user_id, name, exercise_type, muscle, equipment, sets, reps, weight, notes, category)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {WORKOUT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Workout>(&sql)
        .bind(user_id)
        .bind(&w.name)
        .bind(&w.exercise_type)
        .bind(&w.muscle)
        .bind(&w.equipment)
        .bind(w.sets)
        .bind(w.reps)
        .bind(w.weight)
        .bind(&w.notes)
        .bind(&w.category)
        .fetch_one(db)
        .await
        .context("insert workout")
}

/// Workouts of one user, oldest first, optionally limited to a UTC range.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    range: Option<DayRange>,
) -> anyhow::Result<Vec<Workout>> {
    let sql = format!(
        r#"
        SELECT {WORKOUT_COLUMNS}
          FROM workouts
         WHERE user_id = $1
           AND ($2::timestamptz IS NULL OR created_at >= $2)
           AND ($3::timestamptz IS NULL OR created_at < $3)
         ORDER BY created_at ASC
        "#
    );
    sqlx::query_as::<_, Workout>(&sql)
        .bind(user_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(db)
        .await
        .context("list workouts by user")
}

pub async fn latest_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Workout>> {
    let sql = format!(
        r#"
        SELECT {WORKOUT_COLUMNS}
          FROM workouts
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT 1
        "#
    );
    sqlx::query_as::<_, Workout>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("latest workout by user")
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    workout_id: Uuid,
    patch: &WorkoutPatch,
) -> anyhow::Result<Option<Workout>> {
    let sql = format!(
        r#"
        UPDATE workouts
           SET sets   = COALESCE($3, sets),
               reps   = COALESCE($4, reps),
               weight = COALESCE($5, weight),
               notes  = COALESCE($6, notes)
         WHERE id = $1 AND user_id = $2
        RETURNING {WORKOUT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Workout>(&sql)
        .bind(workout_id)
        .bind(user_id)
        .bind(patch.sets)
        .bind(patch.reps)
        .bind(patch.weight)
        .bind(patch.notes.as_deref())
        .fetch_optional(db)
        .await
        .context("update workout")
}

pub async fn delete(db: &PgPool, user_id: Uuid, workout_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
        .bind(workout_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete workout")?;
    Ok(res.rows_affected() > 0)
}
