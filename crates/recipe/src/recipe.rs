use std::collections::BTreeMap;

use larder_shared::normalize_name;
use serde::{Deserialize, Serialize};

use crate::{RecipeError, RecipeResult};

pub const DOUBLE_PORTION_SUFFIX: &str = " (Double Portion)";

/// Upper bound on a single portion's calories.
pub const MAX_RECIPE_CALORIES: u32 = 10_000;

/// A catalog recipe.
///
/// Ingredient quantities are grams-equivalent. Names are unique within a
/// catalog ignoring case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub diet: String,
    pub ingredients: BTreeMap<String, f64>,
    pub calories: u32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(rename = "isDoublePortion", default)]
    pub is_double_portion: bool,
}

impl Recipe {
    /// Name with any portion-doubling suffix stripped.
    pub fn base_name(&self) -> &str {
        self.name
            .strip_suffix(DOUBLE_PORTION_SUFFIX)
            .unwrap_or(&self.name)
    }

    /// Case-insensitive identity of the underlying catalog recipe.
    pub fn key(&self) -> String {
        normalize_name(self.base_name())
    }

    pub fn matches_diet(&self, diet: &str) -> bool {
        self.diet.trim().eq_ignore_ascii_case(diet.trim())
    }

    /// Derived double-portion copy: every numeric field and every ingredient
    /// quantity multiplied by two.
    pub fn doubled(&self) -> Recipe {
        Recipe {
            name: format!("{}{}", self.base_name(), DOUBLE_PORTION_SUFFIX),
            diet: self.diet.clone(),
            ingredients: self
                .ingredients
                .iter()
                .map(|(name, quantity)| (name.clone(), quantity * 2.0))
                .collect(),
            calories: self.calories.saturating_mul(2),
            protein_g: self.protein_g * 2.0,
            carbs_g: self.carbs_g * 2.0,
            fat_g: self.fat_g * 2.0,
            is_double_portion: true,
        }
    }

    pub fn validate(&self) -> RecipeResult<()> {
        if self.name.trim().is_empty() {
            return Err(RecipeError::ValidationError(
                "recipe name must not be empty".to_string(),
            ));
        }
        if self.diet.trim().is_empty() {
            return Err(RecipeError::ValidationError(format!(
                "recipe '{}' has no diet tag",
                self.name
            )));
        }
        if self.ingredients.is_empty() {
            return Err(RecipeError::ValidationError(format!(
                "recipe '{}' has no ingredients",
                self.name
            )));
        }
        if let Some((ingredient, quantity)) = self
            .ingredients
            .iter()
            .find(|(_, quantity)| !(**quantity > 0.0 && quantity.is_finite()))
        {
            return Err(RecipeError::ValidationError(format!(
                "recipe '{}' requires {} of '{}', quantities must be positive",
                self.name, quantity, ingredient
            )));
        }
        if self.calories > MAX_RECIPE_CALORIES {
            return Err(RecipeError::ValidationError(format!(
                "recipe '{}' has {} calories, at most {} allowed",
                self.name, self.calories, MAX_RECIPE_CALORIES
            )));
        }
        for (field, value) in [
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(RecipeError::ValidationError(format!(
                    "recipe '{}' has invalid {}: {}",
                    self.name, field, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken_supreme() -> Recipe {
        Recipe {
            name: "Keto Chicken Supreme".to_string(),
            diet: "keto".to_string(),
            ingredients: BTreeMap::from([
                ("chicken".to_string(), 250.0),
                ("cheese".to_string(), 100.0),
            ]),
            calories: 650,
            protein_g: 75.0,
            carbs_g: 8.0,
            fat_g: 45.0,
            is_double_portion: false,
        }
    }

    #[test]
    fn test_doubled_multiplies_every_numeric_field() {
        let doubled = chicken_supreme().doubled();

        assert_eq!(doubled.name, "Keto Chicken Supreme (Double Portion)");
        assert_eq!(doubled.calories, 1300);
        assert_eq!(doubled.protein_g, 150.0);
        assert_eq!(doubled.carbs_g, 16.0);
        assert_eq!(doubled.fat_g, 90.0);
        assert_eq!(doubled.ingredients["chicken"], 500.0);
        assert_eq!(doubled.ingredients["cheese"], 200.0);
        assert!(doubled.is_double_portion);
    }

    #[test]
    fn test_base_name_strips_suffix() {
        let recipe = chicken_supreme();
        let doubled = recipe.doubled();

        assert_eq!(doubled.base_name(), "Keto Chicken Supreme");
        assert_eq!(doubled.key(), recipe.key());
        // Doubling a doubled copy does not stack suffixes
        assert_eq!(
            doubled.doubled().name,
            "Keto Chicken Supreme (Double Portion)"
        );
    }

    #[test]
    fn test_matches_diet_ignores_case() {
        assert!(chicken_supreme().matches_diet("KETO"));
        assert!(!chicken_supreme().matches_diet("vegan"));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantities() {
        let mut recipe = chicken_supreme();
        recipe.ingredients.insert("garlic".to_string(), 0.0);

        assert!(recipe.validate().is_err());
        assert!(chicken_supreme().validate().is_ok());
    }

    #[test]
    fn test_validate_caps_calories() {
        let mut recipe = chicken_supreme();
        recipe.calories = MAX_RECIPE_CALORIES;
        assert!(recipe.validate().is_ok());

        recipe.calories = 3_000_000_000;
        assert!(matches!(
            recipe.validate(),
            Err(RecipeError::ValidationError(message)) if message.contains("calories")
        ));
        assert_eq!(recipe.doubled().calories, u32::MAX);
    }

    #[test]
    fn test_json_uses_double_portion_flag_name() {
        let json = serde_json::to_value(chicken_supreme().doubled()).unwrap();

        assert_eq!(json["isDoublePortion"], true);
        assert_eq!(json["protein_g"], 150.0);
    }
}
