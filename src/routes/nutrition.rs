use axum::{Json, extract::State};
use larder_recipe::{DOUBLE_PORTION_SUFFIX, Recipe, RecipeCatalog};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct MealsRequest {
    #[serde(default)]
    pub meals: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Meal names with no catalog recipe; they add nothing to the sums.
    pub missing: Vec<String>,
}

/// Catalog lookup that understands the double-portion suffix.
pub(super) fn lookup(catalog: &RecipeCatalog, name: &str) -> Option<Recipe> {
    match name.trim().strip_suffix(DOUBLE_PORTION_SUFFIX) {
        Some(base) => catalog.get(base).map(Recipe::doubled),
        None => catalog.get(name.trim()).cloned(),
    }
}

pub(super) fn totals(catalog: &RecipeCatalog, meals: &[String]) -> NutritionTotals {
    meals
        .iter()
        .fold(NutritionTotals::default(), |mut totals, meal| {
            match lookup(catalog, meal) {
                Some(recipe) => {
                    totals.calories += recipe.calories;
                    totals.protein += recipe.protein_g;
                    totals.carbs += recipe.carbs_g;
                    totals.fat += recipe.fat_g;
                }
                None => totals.missing.push(meal.clone()),
            }
            totals
        })
}

/// POST /api/calculate-nutrition
#[tracing::instrument(skip(state, payload), fields(meals = payload.meals.len()))]
pub async fn calculate(
    State(state): State<AppState>,
    Json(payload): Json<MealsRequest>,
) -> ApiResult<Json<NutritionTotals>> {
    let catalog = state.data.recipes()?;
    Ok(Json(totals(&catalog, &payload.meals)))
}
