use std::collections::BTreeMap;

use axum::{Json, extract::State};
use larder_mealplan::{DailyTotals, Day, PlanDiagnostics, WeeklyMealPlan};
use larder_shopping::ShortfallEntry;
use serde::{Deserialize, Serialize};
use strum::VariantArray;

use super::AppState;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::planning::{GeneratedPlan, PlanOptions, generate_and_store};

#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub diet: String,
    pub meal_plan: WeeklyMealPlan,
    pub daily_totals: BTreeMap<Day, DailyTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<PlanDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grocery_list: Option<Vec<ShortfallEntry>>,
}

impl MealPlanResponse {
    fn stored(diet: String, plan: WeeklyMealPlan) -> Self {
        let daily_totals = Day::VARIANTS
            .iter()
            .map(|day| (*day, plan.daily_totals(*day)))
            .collect();
        Self {
            diet,
            meal_plan: plan,
            daily_totals,
            diagnostics: None,
            grocery_list: None,
        }
    }
}

impl From<GeneratedPlan> for MealPlanResponse {
    fn from(generated: GeneratedPlan) -> Self {
        let diagnostics = generated.outcome.diagnostics;
        Self {
            diet: generated.diet,
            meal_plan: generated.outcome.plan,
            daily_totals: diagnostics.daily_totals.clone(),
            diagnostics: Some(diagnostics),
            grocery_list: Some(generated.shortfall),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    pub diet: Option<String>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub consume_ingredients: bool,
}

/// GET /api/meal-plan - the stored plan, generated on first request
#[tracing::instrument(skip(state))]
pub async fn current(State(state): State<AppState>) -> ApiResult<Json<MealPlanResponse>> {
    let user_data = state.data.user_data()?;
    let stored = user_data.current().and_then(|user| {
        let diet = user
            .meal_plan_diet
            .clone()
            .unwrap_or_else(|| user.dietary_goal.clone());
        user.current_meal_plan
            .clone()
            .map(|plan| MealPlanResponse::stored(diet, plan))
    });
    if let Some(response) = stored {
        return Ok(Json(response));
    }

    tracing::info!("No stored meal plan, generating one");
    let generated = generate_and_store(&state.data, &PlanOptions::default()).await?;
    Ok(Json(generated.into()))
}

/// POST /api/meal-plan - build a fresh week
#[tracing::instrument(skip(state, payload), fields(user = %user.0))]
pub async fn regenerate(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Option<Json<RegenerateRequest>>,
) -> ApiResult<Json<MealPlanResponse>> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let options = PlanOptions {
        diet: request.diet,
        seed: request.seed,
        consume_ingredients: request.consume_ingredients,
    };

    let generated = generate_and_store(&state.data, &options).await?;
    if options.consume_ingredients {
        state.refresh_ingredients().await?;
    }

    Ok(Json(generated.into()))
}
