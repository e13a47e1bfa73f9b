//! Grocery shortfall of a meal plan against the ingredient ledger.

mod error;
pub mod export;
mod reconcile;

pub use error::{ShoppingError, ShoppingResult};
pub use reconcile::{SHORTFALL_UNIT, ShortfallEntry, reconcile, reconcile_recipes};
