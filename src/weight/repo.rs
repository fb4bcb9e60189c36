use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::WeightEntry;

/// Insert or overwrite the entry for `(user_id, date)` and sync the profile
/// weight, atomically.
pub async fn upsert_for_day(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    weight: f64,
) -> anyhow::Result<WeightEntry> {
    let mut tx = db.begin().await.context("begin tx")?;
    let entry = upsert_entry_tx(&mut tx, user_id, date, weight).await?;
    sync_profile_weight_tx(&mut tx, user_id, weight).await?;
    tx.commit().await.context("commit tx")?;
    Ok(entry)
}

async fn upsert_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: Date,
    weight: f64,
) -> anyhow::Result<WeightEntry> {
    // One row per (user_id, entry_date): the UNIQUE constraint in
    // migrations/0001_init.sql turns a second weigh-in that day into an update.
    sqlx::query_as::<_, WeightEntry>(
        r#"
        INSERT INTO weight_entries (user_id, weight, entry_date)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, entry_date) DO UPDATE SET weight = EXCLUDED.weight
        RETURNING id, weight, entry_date
        "#,
    )
    .bind(user_id)
    .bind(weight)
    .bind(date)
    .fetch_one(&mut **tx)
    .await
    .context("upsert weight entry")
}

async fn sync_profile_weight_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    weight: f64,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET weight = $2 WHERE id = $1")
        .bind(user_id)
        .bind(weight)
        .execute(&mut **tx)
        .await
        .context("sync profile weight")?;
    Ok(())
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT id, weight, entry_date
          FROM weight_entries
         WHERE user_id = $1
         ORDER BY entry_date ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list weight entries")
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    entry_id: Uuid,
    weight: f64,
) -> anyhow::Result<Option<WeightEntry>> {
    sqlx::query_as::<_, WeightEntry>(
        r#"
        UPDATE weight_entries
           SET weight = $3
         WHERE id = $1 AND user_id = $2
        RETURNING id, weight, entry_date
        "#,
    )
    .bind(entry_id)
    .bind(user_id)
    .bind(weight)
    .fetch_optional(db)
    .await
    .context("update weight entry")
}

pub async fn delete(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM weight_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete weight entry")?;
    Ok(res.rows_affected() > 0)
}
