pub mod allocator;
pub mod compatibility;
pub mod error;
pub mod nutrition;
pub mod plan;
pub mod suggest;
pub mod usage;

pub use allocator::{AllocationOutcome, MealPlanAllocator, PlanDiagnostics, PlanRequest, SlotRef};
pub use compatibility::{CompatibilityReport, IngredientCheck, Nutrient};
pub use error::MealPlanningError;
pub use nutrition::{MealTarget, MealTargets};
pub use plan::{DailyTotals, Day, MealType, SlotAssignment, UNFILLED_MARKER, WeeklyMealPlan};
pub use suggest::{DEFAULT_SUGGESTIONS, Suggestion, suggest};
pub use usage::UsageTracker;
