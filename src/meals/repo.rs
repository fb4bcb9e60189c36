use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Meal, MealPatch, NewMeal};
use crate::bucketing::DayRange;

const MEAL_COLUMNS: &str = "id, user_id, meal_name, calories, protein, carbs, fats, created_at";

pub async fn insert(db: &PgPool, user_id: Uuid, meal: &NewMeal) -> anyhow::Result<Meal> {
    let sql = format!(
        r#"
        INSERT INTO meals (user_id, meal_name, calories, protein, carbs, fats)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {MEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Meal>(&sql)
        .bind(user_id)
        .bind(&meal.meal_name)
        .bind(meal.calories)
        .bind(meal.protein)
        .bind(meal.carbs)
        .bind(meal.fats)
        .fetch_one(db)
        .await
        .context("insert meal")
}

/// Meals of one user, oldest first, optionally limited to a UTC range.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    range: Option<DayRange>,
) -> anyhow::Result<Vec<Meal>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
          FROM meals
         WHERE user_id = $1
           AND ($2::timestamptz IS NULL OR created_at >= $2)
           AND ($3::timestamptz IS NULL OR created_at < $3)
         ORDER BY created_at ASC
        "#
    );
    sqlx::query_as::<_, Meal>(&sql)
        .bind(user_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(db)
        .await
        .context("list meals by user")
}

/// Returns `None` when the meal does not exist or belongs to someone else.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
    patch: &MealPatch,
) -> anyhow::Result<Option<Meal>> {
    let sql = format!(
        r#"
        UPDATE meals
           SET meal_name = COALESCE($3, meal_name),
               calories  = COALESCE($4, calories),
               protein   = COALESCE($5, protein),
               carbs     = COALESCE($6, carbs),
               fats      = COALESCE($7, fats)
         WHERE id = $1 AND user_id = $2
        RETURNING {MEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Meal>(&sql)
        .bind(meal_id)
        .bind(user_id)
        .bind(patch.meal_name.as_deref())
        .bind(patch.calories)
        .bind(patch.protein)
        .bind(patch.carbs)
        .bind(patch.fats)
        .fetch_optional(db)
        .await
        .context("update meal")
}

pub async fn delete(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}
