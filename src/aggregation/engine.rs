use std::collections::BTreeMap;

use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::store::RecordStore;
use super::types::{CoachInputs, DashboardSnapshot, DayCalories, MacroTotals, WeightPoint};
use crate::bucketing::{self, BucketError, DayRange};
use crate::errors::ApiError;
use crate::goals::{macro_targets, DEFAULT_WEIGHT_LB};
use crate::meals::repo_types::Meal;
use crate::workouts::repo_types::Workout;

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error(transparent)]
    Bucket(#[from] BucketError),
    #[error("record store: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<AggregationError> for ApiError {
    fn from(e: AggregationError) -> Self {
        match e {
            AggregationError::Bucket(b) => b.into(),
            AggregationError::Store(inner) => ApiError::Store(inner),
        }
    }
}

pub type AggregationResult<T> = Result<T, AggregationError>;

fn range_for(date: Date, tz_offset: i32) -> AggregationResult<DayRange> {
    Ok(bucketing::day_range(date, tz_offset)?)
}

pub async fn day_meals(
    store: &dyn RecordStore,
    user_id: Uuid,
    date: Date,
    tz_offset: i32,
) -> AggregationResult<Vec<Meal>> {
    let range = range_for(date, tz_offset)?;
    Ok(store.meals(user_id, Some(range)).await?)
}

/// Zeroed totals when nothing was logged that day.
pub async fn day_totals(
    store: &dyn RecordStore,
    user_id: Uuid,
    date: Date,
    tz_offset: i32,
) -> AggregationResult<MacroTotals> {
    let meals = day_meals(store, user_id, date, tz_offset).await?;
    Ok(MacroTotals::from_meals(&meals))
}

/// Workouts are listed, never summed.
pub async fn day_workouts(
    store: &dyn RecordStore,
    user_id: Uuid,
    date: Date,
    tz_offset: i32,
) -> AggregationResult<Vec<Workout>> {
    let range = range_for(date, tz_offset)?;
    Ok(store.workouts(user_id, Some(range)).await?)
}

fn group_by_local_day(meals: &[Meal], tz_offset: i32) -> BTreeMap<Date, MacroTotals> {
    let mut days: BTreeMap<Date, MacroTotals> = BTreeMap::new();
    for meal in meals {
        let day = bucketing::local_date_of(meal.created_at, tz_offset);
        days.entry(day).or_default().add_meal(meal);
    }
    days
}

/// All workouts logged on the local day of the most recent one.
async fn last_workout_session(
    store: &dyn RecordStore,
    user_id: Uuid,
    tz_offset: i32,
) -> AggregationResult<Vec<Workout>> {
    let Some(latest) = store.latest_workout(user_id).await? else {
        return Ok(Vec::new());
    };
    let day = bucketing::local_date_of(latest.created_at, tz_offset);
    day_workouts(store, user_id, day, tz_offset).await
}

/// Builds the whole dashboard or fails as a whole.
pub async fn dashboard_snapshot(
    store: &dyn RecordStore,
    user_id: Uuid,
    now: OffsetDateTime,
    tz_offset: i32,
) -> AggregationResult<DashboardSnapshot> {
    let (meals, weights, last_workout, profile) = tokio::try_join!(
        async { store.meals(user_id, None).await.map_err(AggregationError::from) },
        async { store.weights(user_id).await.map_err(AggregationError::from) },
        last_workout_session(store, user_id, tz_offset),
        async { store.profile(user_id).await.map_err(AggregationError::from) },
    )?;

    let by_day = group_by_local_day(&meals, tz_offset);
    let today = bucketing::local_date_of(now, tz_offset);
    let todays_macros = by_day.get(&today).copied().unwrap_or_default();

    let (weight, target) = profile
        .map(|p| (p.weight, p.target_weight))
        .unwrap_or((DEFAULT_WEIGHT_LB, None));
    let targets = macro_targets(weight, target);

    debug!(
        %user_id,
        days = by_day.len(),
        meals = meals.len(),
        last_workout = last_workout.len(),
        "dashboard snapshot built"
    );

    Ok(DashboardSnapshot {
        calories_by_day: by_day
            .into_iter()
            .map(|(day, totals)| DayCalories::new(day, totals))
            .collect(),
        weight_progress: weights.iter().map(WeightPoint::from).collect(),
        last_workout,
        todays_macros,
        macro_targets: targets,
    })
}

/// `None` when the owner has no profile: coaching is then unavailable.
pub async fn coach_inputs(
    store: &dyn RecordStore,
    user_id: Uuid,
    now: OffsetDateTime,
    tz_offset: i32,
) -> AggregationResult<Option<CoachInputs>> {
    let Some(profile) = store.profile(user_id).await? else {
        return Ok(None);
    };
    let today = bucketing::local_date_of(now, tz_offset);
    let totals = day_totals(store, user_id, today, tz_offset).await?;
    let targets = macro_targets(profile.weight, profile.target_weight);
    let remaining = totals.remaining(&targets);
    Ok(Some(CoachInputs {
        totals,
        targets,
        remaining,
        profile,
    }))
}
