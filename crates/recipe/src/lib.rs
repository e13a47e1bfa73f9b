mod catalog;
mod error;
pub mod io;
mod ledger;
mod preferences;
mod recipe;

pub use catalog::RecipeCatalog;
pub use error::{RecipeError, RecipeResult};
pub use ledger::{IngredientLedger, LedgerEntry};
pub use preferences::{DietPreference, DietPreferences, NutritionalGoals};
pub use recipe::{DOUBLE_PORTION_SUFFIX, MAX_RECIPE_CALORIES, Recipe};
