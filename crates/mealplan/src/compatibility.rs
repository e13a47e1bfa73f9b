use std::collections::BTreeMap;

use larder_recipe::{IngredientLedger, NutritionalGoals, Recipe};
use larder_shared::normalize_name;
use serde::Serialize;
use strum::{AsRefStr, Display};

/// Share of a daily goal a single candidate may take up.
pub const NUTRIENT_CEILING: f64 = 0.4;

/// Score bonus for each macro that stays under the ceiling.
const NUTRIENT_BONUS: f64 = 0.5;

#[derive(Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

/// Outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub is_compatible: bool,
    pub reason: String,
    pub score: f64,
}

/// Per-ingredient sufficiency of a requirement map against a ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngredientCheck {
    pub sufficient: Vec<String>,
    pub missing: Vec<String>,
    pub insufficient: Vec<String>,
}

impl IngredientCheck {
    pub fn has_shortfall(&self) -> bool {
        !self.missing.is_empty() || !self.insufficient.is_empty()
    }

    fn reason(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("Missing ingredients: {}", self.missing.join(", ")));
        }
        if !self.insufficient.is_empty() {
            parts.push(format!(
                "Insufficient amounts of: {}",
                self.insufficient.join(", ")
            ));
        }
        parts.join("; ")
    }
}

/// Check a recipe or a set of recipes against stock and a diet.
///
/// # Business Rules
/// - **Diet match** short-circuits: any recipe whose tag differs from `diet`
///   fails the whole set, score 0.
/// - **Ingredients** are aggregated across the set and compared in grams
///   against the ledger. Any missing or insufficient ingredient fails the
///   check with score 0.
/// - **Nutrient ceiling**: summed calories, protein, carbs and fat must each
///   stay within 40% of the daily goal. Every violated nutrient is reported.
///   A goal of zero has no ceiling.
/// - **Score**: one point per sufficient ingredient plus 0.5 per macro
///   (protein, carbs, fat) within the ceiling. Used for ranking only.
///
/// Pure: identical inputs give identical reports.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use larder_mealplan::compatibility::check;
/// use larder_recipe::{IngredientLedger, NutritionalGoals, Recipe};
/// use larder_shared::Unit;
///
/// let omelette = Recipe {
///     name: "Omelette".to_string(),
///     diet: "keto".to_string(),
///     ingredients: BTreeMap::from([("eggs".to_string(), 200.0)]),
///     calories: 300,
///     protein_g: 20.0,
///     carbs_g: 2.0,
///     fat_g: 22.0,
///     is_double_portion: false,
/// };
/// let mut ledger = IngredientLedger::new();
/// ledger.upsert("eggs", 2.0, Unit::Pieces).unwrap();
/// let goals = NutritionalGoals { calories: 1800.0, protein: 120.0, carbs: 25.0, fat: 140.0, fiber: None };
///
/// let report = check([&omelette], &ledger, "keto", &goals);
/// assert!(report.is_compatible);
/// assert_eq!(report.score, 2.5);
/// ```
pub fn check<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
    ledger: &IngredientLedger,
    diet: &str,
    goals: &NutritionalGoals,
) -> CompatibilityReport {
    let recipes: Vec<&Recipe> = recipes.into_iter().collect();

    let mismatched = diet_mismatches(&recipes, diet);
    if !mismatched.is_empty() {
        return CompatibilityReport {
            is_compatible: false,
            reason: format!("Not suitable for {} diet: {}", diet, mismatched.join(", ")),
            score: 0.0,
        };
    }

    let ingredients = check_ingredients(&aggregate_requirements(&recipes), ledger);
    if ingredients.has_shortfall() {
        return CompatibilityReport {
            is_compatible: false,
            reason: ingredients.reason(),
            score: 0.0,
        };
    }

    let totals = NutrientTotals::of(&recipes);
    let violations = nutrient_violations(&totals, goals);
    let score = ingredients.sufficient.len() as f64 + nutrient_bonus(&totals, goals);

    if violations.is_empty() {
        CompatibilityReport {
            is_compatible: true,
            reason: "Compatible".to_string(),
            score,
        }
    } else {
        CompatibilityReport {
            is_compatible: false,
            reason: violations
                .iter()
                .map(|nutrient| format!("{} too high for diet goals", nutrient))
                .collect::<Vec<_>>()
                .join("; "),
            score,
        }
    }
}

/// Diet match and ingredient sufficiency only.
///
/// This is the gate the allocator applies to candidates: daily calories are
/// bounded by its own running budget instead of the per-candidate ceiling.
pub fn is_stocked(recipe: &Recipe, ledger: &IngredientLedger, diet: &str) -> bool {
    recipe.matches_diet(diet) && !check_ingredients(&recipe.ingredients, ledger).has_shortfall()
}

fn diet_mismatches(recipes: &[&Recipe], diet: &str) -> Vec<String> {
    recipes
        .iter()
        .filter(|recipe| !recipe.matches_diet(diet))
        .map(|recipe| recipe.name.clone())
        .collect()
}

/// Sum ingredient requirements across recipes, merging names that differ
/// only in case.
pub fn aggregate_requirements(recipes: &[&Recipe]) -> BTreeMap<String, f64> {
    let mut required = BTreeMap::new();
    for recipe in recipes {
        for (name, quantity) in &recipe.ingredients {
            *required.entry(normalize_name(name)).or_insert(0.0) += quantity;
        }
    }
    required
}

/// Compare grams-equivalent requirements against the ledger.
pub fn check_ingredients(
    required: &BTreeMap<String, f64>,
    ledger: &IngredientLedger,
) -> IngredientCheck {
    let mut check = IngredientCheck::default();
    for (name, quantity) in required {
        match ledger.available_grams(name) {
            None => check.missing.push(name.clone()),
            Some(available) if available < *quantity => check.insufficient.push(name.clone()),
            Some(_) => check.sufficient.push(name.clone()),
        }
    }
    check
}

#[derive(Debug, Default)]
struct NutrientTotals {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl NutrientTotals {
    fn of(recipes: &[&Recipe]) -> Self {
        recipes.iter().fold(Self::default(), |acc, r| Self {
            calories: acc.calories + r.calories as f64,
            protein: acc.protein + r.protein_g,
            carbs: acc.carbs + r.carbs_g,
            fat: acc.fat + r.fat_g,
        })
    }

    fn pairs(&self, goals: &NutritionalGoals) -> [(Nutrient, f64, f64); 4] {
        [
            (Nutrient::Calories, self.calories, goals.calories),
            (Nutrient::Protein, self.protein, goals.protein),
            (Nutrient::Carbs, self.carbs, goals.carbs),
            (Nutrient::Fat, self.fat, goals.fat),
        ]
    }
}

fn within_ceiling(amount: f64, goal: f64) -> bool {
    amount <= goal * NUTRIENT_CEILING
}

fn nutrient_violations(totals: &NutrientTotals, goals: &NutritionalGoals) -> Vec<Nutrient> {
    totals
        .pairs(goals)
        .into_iter()
        .filter(|(_, amount, goal)| *goal > 0.0 && !within_ceiling(*amount, *goal))
        .map(|(nutrient, _, _)| nutrient)
        .collect()
}

fn nutrient_bonus(totals: &NutrientTotals, goals: &NutritionalGoals) -> f64 {
    totals
        .pairs(goals)
        .into_iter()
        .filter(|(nutrient, amount, goal)| {
            *nutrient != Nutrient::Calories && *goal > 0.0 && within_ceiling(*amount, *goal)
        })
        .count() as f64
        * NUTRIENT_BONUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_shared::Unit;

    fn recipe(
        name: &str,
        diet: &str,
        ingredients: &[(&str, f64)],
        macros: (u32, f64, f64, f64),
    ) -> Recipe {
        Recipe {
            name: name.to_string(),
            diet: diet.to_string(),
            ingredients: ingredients
                .iter()
                .map(|(n, q)| (n.to_string(), *q))
                .collect(),
            calories: macros.0,
            protein_g: macros.1,
            carbs_g: macros.2,
            fat_g: macros.3,
            is_double_portion: false,
        }
    }

    fn keto_goals() -> NutritionalGoals {
        NutritionalGoals {
            calories: 1800.0,
            protein: 120.0,
            carbs: 25.0,
            fat: 140.0,
            fiber: None,
        }
    }

    fn ledger(entries: &[(&str, f64, Unit)]) -> IngredientLedger {
        let mut ledger = IngredientLedger::new();
        for (name, quantity, unit) in entries {
            ledger.upsert(name, *quantity, *unit).unwrap();
        }
        ledger
    }

    #[test]
    fn test_diet_mismatch_lists_offending_recipes() {
        let tofu = recipe("Tofu Bowl", "vegan", &[("tofu", 100.0)], (300, 20.0, 5.0, 10.0));
        let eggs = recipe("Eggs", "keto", &[("eggs", 100.0)], (300, 20.0, 2.0, 10.0));
        let stock = ledger(&[("tofu", 500.0, Unit::Grams), ("eggs", 5.0, Unit::Pieces)]);

        let report = check([&tofu, &eggs], &stock, "keto", &keto_goals());

        assert!(!report.is_compatible);
        assert!(report.reason.contains("Tofu Bowl"));
        assert!(!report.reason.contains("Eggs"));
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_missing_and_insufficient_are_named() {
        let dish = recipe(
            "Chicken Supreme",
            "keto",
            &[("chicken", 250.0), ("cheese", 100.0), ("spinach", 100.0)],
            (650, 75.0, 8.0, 45.0),
        );
        let stock = ledger(&[("chicken", 100.0, Unit::Grams), ("spinach", 1.0, Unit::Cups)]);

        let report = check([&dish], &stock, "keto", &keto_goals());

        assert!(!report.is_compatible);
        assert!(report.reason.contains("Missing ingredients: cheese"));
        assert!(report.reason.contains("Insufficient amounts of: chicken"));
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_requirements_aggregate_across_the_set() {
        let a = recipe("A", "keto", &[("eggs", 200.0)], (200, 10.0, 1.0, 5.0));
        let b = recipe("B", "keto", &[("Eggs", 200.0)], (200, 10.0, 1.0, 5.0));
        let stock = ledger(&[("eggs", 3.0, Unit::Pieces)]);

        assert!(check([&a], &stock, "keto", &keto_goals()).is_compatible);
        let report = check([&a, &b], &stock, "keto", &keto_goals());
        assert!(report.reason.contains("Insufficient amounts of: eggs"));
    }

    #[test]
    fn test_every_nutrient_violation_is_collected() {
        // 40% ceilings: calories 720, protein 48, carbs 10, fat 56
        let heavy = recipe("Heavy", "keto", &[("beef", 100.0)], (800, 75.0, 8.0, 60.0));
        let stock = ledger(&[("beef", 1000.0, Unit::Grams)]);

        let report = check([&heavy], &stock, "keto", &keto_goals());

        assert!(!report.is_compatible);
        assert!(report.reason.contains("Calories too high"));
        assert!(report.reason.contains("Protein too high"));
        assert!(report.reason.contains("Fat too high"));
        assert!(!report.reason.contains("Carbs"));
        // 1 ingredient + carbs bonus
        assert_eq!(report.score, 1.5);
    }

    #[test]
    fn test_score_counts_ingredients_and_macro_bonus() {
        let light = recipe(
            "Light",
            "keto",
            &[("eggs", 100.0), ("spinach", 50.0)],
            (300, 20.0, 3.0, 20.0),
        );
        let stock = ledger(&[("eggs", 2.0, Unit::Pieces), ("spinach", 50.0, Unit::Grams)]);

        let report = check([&light], &stock, "keto", &keto_goals());

        assert!(report.is_compatible);
        assert_eq!(report.reason, "Compatible");
        assert_eq!(report.score, 3.5);
    }

    #[test]
    fn test_zero_goal_has_no_ceiling() {
        let dish = recipe("Dish", "keto", &[("eggs", 100.0)], (300, 20.0, 30.0, 20.0));
        let stock = ledger(&[("eggs", 1.0, Unit::Pieces)]);
        let goals = NutritionalGoals {
            carbs: 0.0,
            ..keto_goals()
        };

        let report = check([&dish], &stock, "keto", &goals);

        assert!(report.is_compatible);
        // eggs + protein + fat, carbs earns nothing without a goal
        assert_eq!(report.score, 2.0);
    }

    #[test]
    fn test_check_is_pure() {
        let dish = recipe("Dish", "keto", &[("eggs", 250.0)], (300, 20.0, 3.0, 20.0));
        let stock = ledger(&[("eggs", 2.0, Unit::Pieces)]);

        let first = check([&dish], &stock, "keto", &keto_goals());
        let second = check([&dish], &stock, "keto", &keto_goals());

        assert_eq!(first, second);
        assert_eq!(stock.available_grams("eggs"), Some(200.0));
    }

    #[test]
    fn test_is_stocked_ignores_nutrient_ceiling() {
        let heavy = recipe("Heavy", "keto", &[("beef", 100.0)], (800, 75.0, 8.0, 60.0));
        let stock = ledger(&[("beef", 100.0, Unit::Grams)]);

        assert!(is_stocked(&heavy, &stock, "keto"));
        assert!(!is_stocked(&heavy, &stock, "vegan"));
        assert!(!is_stocked(&heavy, &IngredientLedger::new(), "keto"));
    }
}
