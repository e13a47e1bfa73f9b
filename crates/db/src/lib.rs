//! In-memory SQL store the chat agent queries.

mod error;
mod query;
mod schema;
mod sql;
mod store;
pub mod table;

pub use error::{StoreError, StoreResult};
pub use query::{
    Availability, IngredientMatch, IngredientStatus, NutritionAnalysis, RecipeDetails,
    RecipeSearch, RecipeSummary, SearchHit, SuggestedDay,
};
pub use sql::SqlRows;
pub use store::{RecipeStore, StockSource};
