//! Plan generation shared by the HTTP API and the CLI.

use larder_mealplan::{
    AllocationOutcome, MealPlanAllocator, MealPlanningError, PlanRequest, nutrition,
};
use larder_recipe::{DietPreferences, NutritionalGoals};
use larder_shopping::{ShortfallEntry, reconcile};
use thiserror::Error;

use crate::error::ApiError;
use crate::store::{DataError, DataStore, UserData};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Planning(#[from] MealPlanningError),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<PlanError> for ApiError {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::Planning(e) => ApiError::Planning(e),
            PlanError::Data(e) => ApiError::Data(e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub diet: Option<String>,
    pub seed: Option<u64>,
    pub consume_ingredients: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub diet: String,
    pub goals: NutritionalGoals,
    pub outcome: AllocationOutcome,
    pub shortfall: Vec<ShortfallEntry>,
}

/// Pick the diet to plan for: the requested one, else the user's goal,
/// else the first entry of the table. Goals must resolve.
pub fn resolve_diet(
    requested: Option<&str>,
    user_data: &UserData,
    preferences: &DietPreferences,
) -> Result<(String, NutritionalGoals), MealPlanningError> {
    let diet = requested
        .map(str::to_string)
        .or_else(|| user_data.current().map(|user| user.dietary_goal.clone()))
        .filter(|diet| !diet.trim().is_empty())
        .or_else(|| preferences.default_diet().map(|entry| entry.diet.clone()))
        .ok_or_else(|| {
            MealPlanningError::Configuration("diet preference table is empty".to_string())
        })?;

    let targets = nutrition::resolve(&diet, preferences)?;
    Ok((diet, targets.daily))
}

/// Allocate a week, reconcile it against the stock it started from and store the
/// plan, its text export and the grocery list. Consumed stock is written
/// back only when `consume_ingredients` is set.
#[tracing::instrument(skip(data), fields(diet = ?options.diet, seed = ?options.seed))]
pub async fn generate_and_store(
    data: &DataStore,
    options: &PlanOptions,
) -> Result<GeneratedPlan, PlanError> {
    let catalog = data.recipes()?;
    let preferences = data.diet_preferences()?;
    let user_data = data.user_data()?;
    let ledger = data.merged_ingredients()?;

    let (diet, goals) = resolve_diet(options.diet.as_deref(), &user_data, &preferences)?;

    let mut request = PlanRequest::new(diet.clone(), goals);
    if let Some(seed) = options.seed {
        request = request.with_seed(seed);
    }
    if options.consume_ingredients {
        request = request.consuming();
    }

    let outcome = MealPlanAllocator::new(&catalog).allocate(&ledger, &request)?;
    let shortfall = reconcile(&outcome.plan, &ledger);

    data.store_plan(&outcome.plan, &shortfall, &diet).await?;
    if options.consume_ingredients {
        data.save_consumed_stock(&outcome.ledger).await?;
    }

    tracing::info!(
        diet,
        unfilled = outcome.diagnostics.unfilled.len(),
        repaired = outcome.diagnostics.repaired.len(),
        shortfall = shortfall.len(),
        "Generated meal plan"
    );

    Ok(GeneratedPlan {
        diet,
        goals,
        outcome,
        shortfall,
    })
}
