use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use larder_db::StockSource;
use larder_recipe::LedgerEntry;
use larder_shared::Unit;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::import::INGREDIENT_NAME;

#[derive(Debug, Serialize)]
pub struct IngredientView {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub grams: f64,
    pub source: &'static str,
}

impl IngredientView {
    fn new(entry: &LedgerEntry, source: StockSource) -> Self {
        Self {
            name: entry.name.clone(),
            quantity: entry.quantity,
            unit: entry.unit,
            grams: entry.grams(),
            source: source.as_str(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewIngredient {
    #[validate(
        length(min = 1, max = 100),
        regex(path = *INGREDIENT_NAME, message = "Only letters, spaces, apostrophes and hyphens")
    )]
    pub name: String,
    #[validate(range(min = 0.0, max = 10000.0, message = "Must be between 0 and 10000"))]
    pub quantity: f64,
    pub unit: Unit,
}

/// GET /api/ingredients - main stock with user entries layered on top
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<IngredientView>>> {
    let main = state.data.main_ingredients()?;
    let user = state.data.user_ingredients()?;

    let mut views: Vec<IngredientView> = main
        .iter()
        .filter(|entry| !user.contains(&entry.name))
        .map(|entry| IngredientView::new(entry, StockSource::Main))
        .chain(user.iter().map(|entry| IngredientView::new(entry, StockSource::User)))
        .collect();
    views.sort_by_key(|view| view.name.to_lowercase());

    Ok(Json(views))
}

/// POST /api/ingredients - add or replace a user ingredient
#[tracing::instrument(skip(state, payload), fields(user = %user.0, name = %payload.name))]
pub async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewIngredient>,
) -> ApiResult<(StatusCode, Json<IngredientView>)> {
    payload.validate()?;

    let entry = state
        .data
        .update_user_ingredients(|ledger| -> ApiResult<LedgerEntry> {
            ledger.upsert(&payload.name, payload.quantity, payload.unit)?;
            ledger
                .get(&payload.name)
                .cloned()
                .ok_or_else(|| ApiError::InternalError("ingredient vanished after upsert".to_string()))
        })
        .await?;
    state.refresh_ingredients().await?;

    tracing::info!(quantity = entry.quantity, unit = %entry.unit, "Stored user ingredient");
    Ok((
        StatusCode::CREATED,
        Json(IngredientView::new(&entry, StockSource::User)),
    ))
}

/// DELETE /api/ingredients/{name} - remove a user ingredient
#[tracing::instrument(skip(state), fields(user = %user.0))]
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .data
        .update_user_ingredients(|ledger| {
            ledger
                .remove(&name)
                .map(|_| ())
                .ok_or_else(|| ApiError::NotFound(format!("Ingredient '{}' not found", name)))
        })
        .await?;
    state.refresh_ingredients().await?;

    Ok(StatusCode::NO_CONTENT)
}
