use std::cmp::Ordering;

use larder_recipe::{IngredientLedger, NutritionalGoals, Recipe, RecipeCatalog};
use serde::Serialize;

use crate::compatibility::check;

pub const DEFAULT_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub recipe: Recipe,
    pub score: f64,
    pub reason: String,
}

/// Rank every recipe that passes the full compatibility check.
///
/// Highest score first, name ascending among equal scores, at most `limit`
/// entries.
pub fn suggest(
    catalog: &RecipeCatalog,
    ledger: &IngredientLedger,
    diet: &str,
    goals: &NutritionalGoals,
    limit: usize,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = catalog
        .iter()
        .filter_map(|recipe| {
            let report = check([recipe], ledger, diet, goals);
            report.is_compatible.then(|| Suggestion {
                recipe: recipe.clone(),
                score: report.score,
                reason: report.reason,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.recipe.name.cmp(&b.recipe.name))
    });
    suggestions.truncate(limit);

    tracing::debug!(diet, count = suggestions.len(), "suggestions ranked");
    suggestions
}
