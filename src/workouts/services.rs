use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExerciseApiConfig;

pub const CARDIO: &str = "Cardio";
pub const STRENGTH: &str = "Strength Training";
pub const FLEXIBILITY: &str = "Flexibility";

/// Display category for an exercise type; unknown types count as strength.
pub fn category_from_type(exercise_type: &str) -> &'static str {
    match exercise_type.trim().to_lowercase().as_str() {
        "cardio" => CARDIO,
        "strength" | "powerlifting" | "olympic_weightlifting" | "strongman" => STRENGTH,
        "stretching" | "stretch" | "plyometrics" => FLEXIBILITY,
        _ => STRENGTH,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExerciseError {
    #[error("Missing API_NINJAS_KEY")]
    MissingKey,
    #[error("Exercise API error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Exercise API error {status}: {body}")]
    Status { status: u16, body: String },
}

/// The subset of an exercise record the client needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub exercise_type: String,
    #[serde(default)]
    pub muscle: String,
    #[serde(default)]
    pub equipment: String,
}

/// Exercise catalogue lookup (API Ninjas compatible).
#[derive(Clone)]
pub struct ExerciseClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ExerciseClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, ExerciseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    pub fn from_config(cfg: &ExerciseApiConfig) -> Result<Self, ExerciseError> {
        if cfg.api_key.is_none() {
            warn!("API_NINJAS_KEY not set; exercise search disabled");
        }
        Self::new(cfg.url.clone(), cfg.api_key.clone())
    }

    pub async fn by_muscle(&self, muscle: &str) -> Result<Vec<ExerciseSummary>, ExerciseError> {
        let key = self.api_key.as_deref().ok_or(ExerciseError::MissingKey)?;
        let resp = self
            .client
            .get(&self.url)
            .query(&[("muscle", muscle)])
            .header("X-Api-Key", key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExerciseError::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }

        let list: Vec<ExerciseSummary> = resp.json().await?;
        debug!(%muscle, count = list.len(), "exercises fetched");
        Ok(list)
    }
}
