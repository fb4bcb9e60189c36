//! Daily calorie and macro targets from current and target body weight.
//!
//! The kcal-per-pound multipliers are a product policy, not a physiological
//! model.

use serde::Serialize;

pub const GAIN_KCAL_PER_LB: f64 = 15.0;
pub const LOSE_KCAL_PER_LB: f64 = 12.0;
pub const MAINTAIN_KCAL_PER_LB: f64 = 14.0;

pub const CALORIE_RANGE: (i64, i64) = (1200, 4500);
pub const PROTEIN_RANGE: (i64, i64) = (80, 300);
pub const FAT_RANGE: (i64, i64) = (30, 150);
pub const CARB_RANGE: (i64, i64) = (50, 600);

pub const FAT_CALORIE_SHARE: f64 = 0.25;
pub const KCAL_PER_G_PROTEIN: i64 = 4;
pub const KCAL_PER_G_CARB: i64 = 4;
pub const KCAL_PER_G_FAT: i64 = 9;

/// Used for the dashboard when the account has no profile row.
pub const DEFAULT_WEIGHT_LB: f64 = 170.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalDirection {
    Gain,
    Lose,
    Maintain,
}

impl GoalDirection {
    pub fn from_weights(current: f64, target: f64) -> Self {
        if target > current {
            GoalDirection::Gain
        } else if target < current {
            GoalDirection::Lose
        } else {
            GoalDirection::Maintain
        }
    }

    pub fn kcal_per_lb(self) -> f64 {
        match self {
            GoalDirection::Gain => GAIN_KCAL_PER_LB,
            GoalDirection::Lose => LOSE_KCAL_PER_LB,
            GoalDirection::Maintain => MAINTAIN_KCAL_PER_LB,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroTargets {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fats: i64,
}

fn clamp((lo, hi): (i64, i64), v: i64) -> i64 {
    v.clamp(lo, hi)
}

/// Carbs are derived from the already clamped calorie, protein and fat goals.
pub fn macro_targets(current_weight: f64, target_weight: Option<f64>) -> MacroTargets {
    let target = target_weight.unwrap_or(current_weight);
    let multiplier = GoalDirection::from_weights(current_weight, target).kcal_per_lb();

    let calories = clamp(CALORIE_RANGE, (current_weight * multiplier).round() as i64);
    let protein = clamp(PROTEIN_RANGE, current_weight.round() as i64);
    let fats = clamp(
        FAT_RANGE,
        (calories as f64 * FAT_CALORIE_SHARE / KCAL_PER_G_FAT as f64).round() as i64,
    );
    let left_for_carbs = calories - (protein * KCAL_PER_G_PROTEIN + fats * KCAL_PER_G_FAT);
    let carbs_raw = (left_for_carbs as f64 / KCAL_PER_G_CARB as f64).round() as i64;
    let carbs = clamp(CARB_RANGE, carbs_raw.max(0));

    MacroTargets {
        calories,
        protein,
        carbs,
        fats,
    }
}
