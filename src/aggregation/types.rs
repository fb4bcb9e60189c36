use serde::Serialize;
use sqlx::FromRow;
use time::Date;

use crate::goals::MacroTargets;
use crate::meals::repo_types::Meal;
use crate::weight::repo_types::WeightEntry;
use crate::workouts::repo_types::Workout;

/// The two profile fields the targets are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub weight: f64,
    pub target_weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn add_meal(&mut self, meal: &Meal) {
        self.calories += meal.calories;
        self.protein += meal.protein;
        self.carbs += meal.carbs;
        self.fats += meal.fats;
    }

    pub fn from_meals<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> Self {
        meals.into_iter().fold(Self::default(), |mut acc, m| {
            acc.add_meal(m);
            acc
        })
    }

    /// What is left of each target, floored at zero.
    pub fn remaining(&self, targets: &MacroTargets) -> MacroTotals {
        let left = |target: i64, total: f64| (target as f64 - total).max(0.0);
        MacroTotals {
            calories: left(targets.calories, self.calories),
            protein: left(targets.protein, self.protein),
            carbs: left(targets.carbs, self.carbs),
            fats: left(targets.fats, self.fats),
        }
    }
}

pub type RemainingMacros = MacroTotals;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCalories {
    #[serde(with = "crate::bucketing::iso_date")]
    pub day: Date,
    pub total_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl DayCalories {
    pub fn new(day: Date, totals: MacroTotals) -> Self {
        Self {
            day,
            total_calories: totals.calories,
            protein: totals.protein,
            carbs: totals.carbs,
            fats: totals.fats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPoint {
    pub weight: f64,
    #[serde(with = "crate::bucketing::iso_date")]
    pub date: Date,
}

impl From<&WeightEntry> for WeightPoint {
    fn from(e: &WeightEntry) -> Self {
        Self {
            weight: e.weight,
            date: e.date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub calories_by_day: Vec<DayCalories>,
    pub weight_progress: Vec<WeightPoint>,
    pub last_workout: Vec<Workout>,
    pub todays_macros: MacroTotals,
    pub macro_targets: MacroTargets,
}

/// Everything the coach needs about today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachInputs {
    pub totals: MacroTotals,
    pub targets: MacroTargets,
    pub remaining: RemainingMacros,
    pub profile: UserProfile,
}
