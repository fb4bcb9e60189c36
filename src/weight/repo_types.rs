use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// One weigh-in per user and local calendar day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightEntry {
    pub id: Uuid,
    pub weight: f64,
    #[serde(with = "crate::bucketing::iso_date")]
    #[sqlx(rename = "entry_date")]
    pub date: Date,
}
