use axum::{Json, extract::State};
use larder_recipe::Recipe;
use larder_shopping::{ShortfallEntry, reconcile, reconcile_recipes};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::nutrition::lookup;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RecipesRequest {
    #[serde(default)]
    pub recipes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GroceryListResponse {
    pub grocery_list: Vec<ShortfallEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// POST /api/ingredients/grocery-list - shortfall for named recipes
#[tracing::instrument(skip(state, payload), fields(recipes = payload.recipes.len()))]
pub async fn for_recipes(
    State(state): State<AppState>,
    Json(payload): Json<RecipesRequest>,
) -> ApiResult<Json<GroceryListResponse>> {
    let catalog = state.data.recipes()?;
    let ledger = state.data.merged_ingredients()?;

    let mut found: Vec<Recipe> = Vec::with_capacity(payload.recipes.len());
    let mut missing = Vec::new();
    for name in payload.recipes {
        match lookup(&catalog, &name) {
            Some(recipe) => found.push(recipe),
            None => missing.push(name),
        }
    }

    Ok(Json(GroceryListResponse {
        grocery_list: reconcile_recipes(&found, &ledger),
        missing,
    }))
}

/// GET /api/grocery-list - shortfall of the stored plan against current stock
#[tracing::instrument(skip(state))]
pub async fn for_current_plan(
    State(state): State<AppState>,
) -> ApiResult<Json<GroceryListResponse>> {
    let user_data = state.data.user_data()?;
    let plan = user_data
        .current()
        .and_then(|user| user.current_meal_plan.as_ref())
        .ok_or_else(|| ApiError::NotFound("No meal plan has been generated yet".to_string()))?;
    let ledger = state.data.merged_ingredients()?;

    Ok(Json(GroceryListResponse {
        grocery_list: reconcile(plan, &ledger),
        missing: Vec::new(),
    }))
}
