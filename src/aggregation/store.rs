use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::UserProfile;
use crate::bucketing::DayRange;
use crate::meals::{repo as meal_repo, repo_types::Meal};
use crate::weight::{repo as weight_repo, repo_types::WeightEntry};
use crate::workouts::{repo as workout_repo, repo_types::Workout};

/// Read side of the record store. Every call is scoped to one owner.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    /// Oldest first; `None` means all of the owner's meals.
    async fn meals(&self, user_id: Uuid, range: Option<DayRange>) -> anyhow::Result<Vec<Meal>>;
    /// Oldest first; `None` means all of the owner's workouts.
    async fn workouts(&self, user_id: Uuid, range: Option<DayRange>)
        -> anyhow::Result<Vec<Workout>>;
    async fn latest_workout(&self, user_id: Uuid) -> anyhow::Result<Option<Workout>>;
    /// Ascending by date.
    async fn weights(&self, user_id: Uuid) -> anyhow::Result<Vec<WeightEntry>>;
}

#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            "SELECT weight, target_weight FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn meals(&self, user_id: Uuid, range: Option<DayRange>) -> anyhow::Result<Vec<Meal>> {
        meal_repo::list_by_user(&self.db, user_id, range).await
    }

    async fn workouts(
        &self,
        user_id: Uuid,
        range: Option<DayRange>,
    ) -> anyhow::Result<Vec<Workout>> {
        workout_repo::list_by_user(&self.db, user_id, range).await
    }

    async fn latest_workout(&self, user_id: Uuid) -> anyhow::Result<Option<Workout>> {
        workout_repo::latest_by_user(&self.db, user_id).await
    }

    async fn weights(&self, user_id: Uuid) -> anyhow::Result<Vec<WeightEntry>> {
        weight_repo::list_by_user(&self.db, user_id).await
    }
}

#[cfg(test)]
pub use memory::MemoryRecordStore;
