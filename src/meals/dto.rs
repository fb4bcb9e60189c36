use serde::{Deserialize, Serialize};

use super::repo_types::{Meal, MealPatch, NewMeal};
use super::services::NutritionItem;
use crate::errors::ApiError;
use crate::validation::{non_blank, Numeric, RequiredFields};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub meal_name: Option<String>,
    pub calories: Option<Numeric>,
    pub protein: Option<Numeric>,
    pub carbs: Option<Numeric>,
    pub fats: Option<Numeric>,
}

fn macro_field(v: &Option<Numeric>, field: &str) -> Result<Option<f64>, ApiError> {
    Ok(v.as_ref().map(|n| n.non_negative(field)).transpose()?.flatten())
}

impl CreateMealRequest {
    pub const REQUIRED_FIELDS: [&'static str; 5] =
        ["mealName", "calories", "protein", "carbs", "fats"];

    pub fn validate(&self) -> Result<NewMeal, ApiError> {
        let mut req = RequiredFields::new(&Self::REQUIRED_FIELDS);
        let meal_name = req.take("mealName", non_blank(self.meal_name.as_deref()));
        let calories = req.take("calories", macro_field(&self.calories, "calories")?);
        let protein = req.take("protein", macro_field(&self.protein, "protein")?);
        let carbs = req.take("carbs", macro_field(&self.carbs, "carbs")?);
        let fats = req.take("fats", macro_field(&self.fats, "fats")?);
        req.finish()?;

        Ok(NewMeal {
            meal_name,
            calories,
            protein,
            carbs,
            fats,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub meal_name: Option<String>,
    pub calories: Option<Numeric>,
    pub protein: Option<Numeric>,
    pub carbs: Option<Numeric>,
    pub fats: Option<Numeric>,
}

impl UpdateMealRequest {
    pub fn validate(&self) -> Result<MealPatch, ApiError> {
        if self.meal_name.is_some() && non_blank(self.meal_name.as_deref()).is_none() {
            return Err(ApiError::validation("mealName must not be blank"));
        }
        Ok(MealPatch {
            meal_name: non_blank(self.meal_name.as_deref()),
            calories: macro_field(&self.calories, "calories")?,
            protein: macro_field(&self.protein, "protein")?,
            carbs: macro_field(&self.carbs, "carbs")?,
            fats: macro_field(&self.fats, "fats")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MealsResponse {
    pub items: Vec<Meal>,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub meal: Meal,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<NutritionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> CreateMealRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn create_accepts_numbers_and_numeric_strings() {
        let meal = body(serde_json::json!({
            "mealName": "  Oats  ",
            "calories": 300,
            "protein": "10.5",
            "carbs": 54,
            "fats": 6
        }))
        .validate()
        .unwrap();
        assert_eq!(meal.meal_name, "Oats");
        assert_eq!(meal.protein, 10.5);
    }

    #[test]
    fn create_names_all_missing_fields() {
        let err = body(serde_json::json!({ "mealName": "Oats", "calories": 300 }))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: protein, carbs, fats");
    }

    #[test]
    fn zero_is_present_not_missing() {
        assert!(body(serde_json::json!({
            "mealName": "Water", "calories": 0, "protein": 0, "carbs": 0, "fats": 0
        }))
        .validate()
        .is_ok());
    }

    #[test]
    fn negative_macros_rejected() {
        let err = body(serde_json::json!({
            "mealName": "x", "calories": -5, "protein": 0, "carbs": 0, "fats": 0
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "calories must be >= 0");
    }

    #[test]
    fn update_keeps_untouched_fields() {
        let req: UpdateMealRequest =
            serde_json::from_value(serde_json::json!({ "calories": 410 })).unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(
            patch,
            MealPatch {
                calories: Some(410.0),
                ..MealPatch::default()
            }
        );
    }

    #[test]
    fn update_rejects_blank_name() {
        let req: UpdateMealRequest =
            serde_json::from_value(serde_json::json!({ "mealName": "   " })).unwrap();
        assert!(req.validate().is_err());
    }
}
