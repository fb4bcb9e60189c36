use serde::{Deserialize, Serialize};

use super::repo_types::WeightEntry;
use crate::bucketing::BucketError;
use crate::errors::ApiError;
use crate::validation::Numeric;

/// `POST /weight`. `tzOffset` picks the local day the entry is filed under.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWeightRequest {
    pub weight: Option<Numeric>,
    pub tz_offset: Option<Numeric>,
}

impl LogWeightRequest {
    pub fn weight(&self) -> Result<f64, ApiError> {
        required_weight(&self.weight)
    }

    pub fn offset(&self) -> Result<i32, ApiError> {
        let Some(raw) = self.tz_offset.as_ref() else {
            return Ok(0);
        };
        match raw.value("tzOffset").map_err(|_| BucketError::InvalidOffset)? {
            None => Ok(0),
            Some(v) if v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX) => Ok(v as i32),
            Some(_) => Err(BucketError::InvalidOffset.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWeightRequest {
    pub weight: Option<Numeric>,
}

impl UpdateWeightRequest {
    pub fn weight(&self) -> Result<f64, ApiError> {
        required_weight(&self.weight)
    }
}

fn required_weight(v: &Option<Numeric>) -> Result<f64, ApiError> {
    v.as_ref()
        .map(|n| n.positive("weight"))
        .transpose()?
        .flatten()
        .ok_or_else(|| ApiError::validation("weight is required"))
}

#[derive(Debug, Serialize)]
pub struct WeightEntriesResponse {
    pub items: Vec<WeightEntry>,
}

#[derive(Debug, Serialize)]
pub struct WeightEntryResponse {
    pub entry: WeightEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log(body: serde_json::Value) -> LogWeightRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn weight_must_be_positive() {
        assert_eq!(log(json!({ "weight": "182.4" })).weight().unwrap(), 182.4);
        assert!(log(json!({ "weight": 0 })).weight().is_err());
        assert!(log(json!({ "weight": -3 })).weight().is_err());
        assert_eq!(
            log(json!({})).weight().unwrap_err().to_string(),
            "weight is required"
        );
    }

    #[test]
    fn offset_accepts_numbers_and_strings() {
        assert_eq!(log(json!({ "weight": 1 })).offset().unwrap(), 0);
        assert_eq!(log(json!({ "weight": 1, "tzOffset": 300 })).offset().unwrap(), 300);
        assert_eq!(log(json!({ "weight": 1, "tzOffset": "-330" })).offset().unwrap(), -330);
        assert!(log(json!({ "weight": 1, "tzOffset": 12.5 })).offset().is_err());
        assert!(log(json!({ "weight": 1, "tzOffset": "west" })).offset().is_err());
    }
}
