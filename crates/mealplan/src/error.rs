use thiserror::Error;

use crate::plan::Day;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MealPlanningError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "No compatible recipes: diet '{diet}' has {found} matching recipes, at least {minimum} are required"
    )]
    NoCompatibleRecipes {
        diet: String,
        found: usize,
        minimum: usize,
    },

    #[error("Unmet goal: {day} cannot reach 80% of the daily protein goal")]
    UnmetGoal { day: Day },
}
