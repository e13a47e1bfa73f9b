use larder_mealplan::WeeklyMealPlan;
use larder_mealplan::compatibility::aggregate_requirements;
use larder_recipe::{IngredientLedger, Recipe};
use serde::{Deserialize, Serialize};

/// Unit every shortfall is expressed in.
pub const SHORTFALL_UNIT: &str = "grams";

/// One ingredient the ledger cannot cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortfallEntry {
    pub ingredient: String,
    pub missing_amount: f64,
    pub unit: String,
}

impl ShortfallEntry {
    fn new(ingredient: String, missing_amount: f64) -> Self {
        Self {
            ingredient,
            missing_amount,
            unit: SHORTFALL_UNIT.to_string(),
        }
    }
}

/// Shortfall of a finished plan against the ledger.
///
/// Doubled slots already carry doubled ingredient maps, so every filled slot
/// counts once. Unfilled slots need nothing.
pub fn reconcile(plan: &WeeklyMealPlan, ledger: &IngredientLedger) -> Vec<ShortfallEntry> {
    reconcile_recipes(plan.filled_recipes(), ledger)
}

/// Shortfall for an arbitrary set of recipes, sorted by ingredient name.
///
/// Ledger quantities are compared in grams through the shared unit table, so
/// `2 cups` of milk covers a 480 g requirement exactly.
pub fn reconcile_recipes<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
    ledger: &IngredientLedger,
) -> Vec<ShortfallEntry> {
    let recipes: Vec<&Recipe> = recipes.into_iter().collect();
    let required = aggregate_requirements(&recipes);

    let shortfall: Vec<ShortfallEntry> = required
        .into_iter()
        .filter_map(|(ingredient, needed)| {
            let available = ledger.available_grams(&ingredient).unwrap_or(0.0);
            (available < needed).then(|| ShortfallEntry::new(ingredient, needed - available))
        })
        .collect();

    tracing::debug!(
        recipes = recipes.len(),
        missing = shortfall.len(),
        "grocery shortfall computed"
    );
    shortfall
}
