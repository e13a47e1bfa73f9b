use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use larder_mealplan::{DEFAULT_SUGGESTIONS, Suggestion, suggest};
use larder_recipe::Recipe;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::planning::resolve_diet;

#[derive(Debug, Deserialize, Validate)]
pub struct NewRecipe {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub diet: String,
    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: BTreeMap<String, f64>,
    #[validate(range(min = 1, max = 10000))]
    pub calories: u32,
    #[validate(range(min = 0.0))]
    pub protein_g: f64,
    #[validate(range(min = 0.0))]
    pub carbs_g: f64,
    #[validate(range(min = 0.0))]
    pub fat_g: f64,
}

impl From<NewRecipe> for Recipe {
    fn from(input: NewRecipe) -> Self {
        Recipe {
            name: input.name.trim().to_string(),
            diet: input.diet.trim().to_lowercase(),
            ingredients: input
                .ingredients
                .into_iter()
                .map(|(name, quantity)| (name.trim().to_lowercase(), quantity))
                .collect(),
            calories: input.calories,
            protein_g: input.protein_g,
            carbs_g: input.carbs_g,
            fat_g: input.fat_g,
            is_double_portion: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub diet: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub diet: String,
    pub suggestions: Vec<Suggestion>,
}

/// GET /api/recipes
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<String, Recipe>>> {
    Ok(Json(state.data.recipes()?.to_map()))
}

/// GET /api/recipes/{name}
#[tracing::instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Recipe>> {
    let catalog = state.data.recipes()?;
    let recipe = catalog
        .get(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Recipe '{}' not found", name)))?;
    Ok(Json(recipe))
}

/// POST /api/recipes
#[tracing::instrument(skip(state, payload), fields(user = %user.0, name = %payload.name))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewRecipe>,
) -> ApiResult<(StatusCode, Json<Recipe>)> {
    payload.validate()?;
    let recipe = Recipe::from(payload);
    recipe.validate()?;

    state
        .data
        .update_recipes(|catalog| -> ApiResult<()> {
            catalog.insert(recipe.clone())?;
            Ok(())
        })
        .await?;
    state.refresh_recipes().await?;

    tracing::info!(diet = %recipe.diet, "Recipe added");
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// DELETE /api/recipes/{name}
#[tracing::instrument(skip(state), fields(user = %user.0))]
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .data
        .update_recipes(|catalog| -> ApiResult<()> {
            catalog.remove(&name)?;
            Ok(())
        })
        .await?;
    state.refresh_recipes().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/suggestions - best compatible recipes for the diet
#[tracing::instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let catalog = state.data.recipes()?;
    let ledger = state.data.merged_ingredients()?;
    let (diet, goals) = resolve_diet(
        query.diet.as_deref(),
        &state.data.user_data()?,
        &state.data.diet_preferences()?,
    )?;

    let limit = query.limit.unwrap_or(DEFAULT_SUGGESTIONS).clamp(1, 20);
    let suggestions = suggest(&catalog, &ledger, &diet, &goals, limit);

    Ok(Json(SuggestionsResponse { diet, suggestions }))
}
