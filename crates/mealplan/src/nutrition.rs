//! Daily goals to per-meal targets.

use larder_recipe::{DietPreferences, NutritionalGoals};
use serde::Serialize;

use crate::error::MealPlanningError;
use crate::plan::MealType;

/// Share of the daily goals each meal is expected to cover.
pub const MEAL_WEIGHTS: [(MealType, f64); 3] = [
    (MealType::Breakfast, 0.3),
    (MealType::Lunch, 0.4),
    (MealType::Dinner, 0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealTarget {
    pub meal: MealType,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealTargets {
    pub diet: String,
    pub daily: NutritionalGoals,
    pub meals: [MealTarget; 3],
}

impl MealTargets {
    pub fn for_meal(&self, meal: MealType) -> &MealTarget {
        &self.meals[meal as usize]
    }
}

/// Reject goals the allocator cannot plan against.
pub fn validate_goals(diet: &str, goals: &NutritionalGoals) -> Result<(), MealPlanningError> {
    if goals.calories.is_nan() || goals.calories <= 0.0 {
        return Err(MealPlanningError::Configuration(format!(
            "diet '{}' has no calorie goal",
            diet
        )));
    }
    if goals.protein.is_nan() || goals.protein <= 0.0 {
        return Err(MealPlanningError::Configuration(format!(
            "diet '{}' has no protein goal",
            diet
        )));
    }
    Ok(())
}

/// Split a diet's daily goals into breakfast, lunch and dinner targets.
///
/// # Errors
/// `Configuration` when the diet has no entry in the table, or when its
/// calorie or protein goal is absent or zero.
pub fn resolve(diet: &str, preferences: &DietPreferences) -> Result<MealTargets, MealPlanningError> {
    let daily = preferences.goals_for(diet).copied().ok_or_else(|| {
        MealPlanningError::Configuration(format!("no nutritional goals for diet '{}'", diet))
    })?;
    validate_goals(diet, &daily)?;

    let meals = MEAL_WEIGHTS.map(|(meal, weight)| MealTarget {
        meal,
        calories: daily.calories * weight,
        protein: daily.protein * weight,
        carbs: daily.carbs * weight,
        fat: daily.fat * weight,
    });

    Ok(MealTargets {
        diet: diet.to_string(),
        daily,
        meals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_recipe::DietPreference;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_resolve_splits_by_weights() {
        let targets = resolve("keto", &DietPreferences::builtin()).unwrap();

        let breakfast = targets.for_meal(MealType::Breakfast);
        let lunch = targets.for_meal(MealType::Lunch);
        let dinner = targets.for_meal(MealType::Dinner);
        assert!(close(breakfast.calories, 540.0));
        assert!(close(lunch.calories, 720.0));
        assert!(close(dinner.protein, 36.0));
        assert!(close(lunch.fat, 56.0));
        assert!(close(
            breakfast.calories + lunch.calories + dinner.calories,
            targets.daily.calories
        ));
    }

    #[test]
    fn test_unknown_diet_is_configuration_error() {
        let result = resolve("paleo", &DietPreferences::builtin());

        assert!(matches!(result, Err(MealPlanningError::Configuration(_))));
    }

    #[test]
    fn test_zero_protein_is_configuration_error() {
        let preferences = DietPreferences {
            entries: vec![DietPreference {
                diet: "fruitarian".to_string(),
                nutritional_goals: NutritionalGoals {
                    calories: 1500.0,
                    ..Default::default()
                },
            }],
        };

        let err = resolve("fruitarian", &preferences).unwrap_err();
        assert!(err.to_string().contains("protein"));
    }
}
