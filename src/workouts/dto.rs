use serde::{Deserialize, Serialize};

use super::repo_types::{NewWorkout, Workout, WorkoutPatch};
use super::services::{category_from_type, ExerciseSummary};
use crate::errors::ApiError;
use crate::validation::{non_blank, Numeric, RequiredFields};

#[derive(Debug, Default, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    pub muscle: Option<String>,
    pub equipment: Option<String>,
    pub sets: Option<Numeric>,
    pub reps: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub notes: Option<String>,
}

fn count(v: &Option<Numeric>, field: &str) -> Result<Option<i32>, ApiError> {
    Ok(v.as_ref().map(|n| n.count(field)).transpose()?.flatten())
}

fn load(v: &Option<Numeric>) -> Result<Option<f64>, ApiError> {
    Ok(v.as_ref().map(|n| n.value("weight")).transpose()?.flatten())
}

impl CreateWorkoutRequest {
    pub const REQUIRED_FIELDS: [&'static str; 6] =
        ["name", "type", "muscle", "equipment", "sets", "reps"];

    pub fn validate(&self) -> Result<NewWorkout, ApiError> {
        let mut req = RequiredFields::new(&Self::REQUIRED_FIELDS);
        let name = req.take("name", non_blank(self.name.as_deref()));
        let exercise_type = req.take("type", non_blank(self.exercise_type.as_deref()));
        let muscle = req.take("muscle", non_blank(self.muscle.as_deref()));
        let equipment = req.take("equipment", non_blank(self.equipment.as_deref()));
        let sets = req.take("sets", count(&self.sets, "sets")?);
        let reps = req.take("reps", count(&self.reps, "reps")?);
        let weight = load(&self.weight)?;
        req.finish()?;

        let category = category_from_type(&exercise_type).to_string();
        Ok(NewWorkout {
            name,
            exercise_type,
            muscle,
            equipment,
            sets,
            reps,
            weight,
            notes: self.notes.as_deref().map(str::trim).unwrap_or_default().to_string(),
            category,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub sets: Option<Numeric>,
    pub reps: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub notes: Option<String>,
}

impl UpdateWorkoutRequest {
    pub fn validate(&self) -> Result<WorkoutPatch, ApiError> {
        Ok(WorkoutPatch {
            sets: count(&self.sets, "sets")?,
            reps: count(&self.reps, "reps")?,
            weight: load(&self.weight)?,
            notes: self.notes.as_deref().map(|n| n.trim().to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutsResponse {
    pub items: Vec<Workout>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutResponse {
    pub workout: Workout,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub muscle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ExerciseSummary>,
}
