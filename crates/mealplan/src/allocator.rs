use std::collections::BTreeMap;

use larder_recipe::{IngredientLedger, NutritionalGoals, Recipe, RecipeCatalog};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use strum::VariantArray;

use crate::compatibility::is_stocked;
use crate::error::MealPlanningError;
use crate::nutrition::validate_goals;
use crate::plan::{DailyTotals, Day, MealType, SlotAssignment, WeeklyMealPlan};
use crate::usage::UsageTracker;

/// Fewer diet-matching recipes than this cannot fill a day without repeats.
pub const MIN_DIET_RECIPES: usize = 3;

/// Share of the daily protein goal every finished day must reach.
pub const PROTEIN_FLOOR: f64 = 0.8;

/// Inputs of one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub diet: String,
    pub goals: NutritionalGoals,
    /// Fixes the candidate shuffle; `None` draws a seed from the OS.
    pub seed: Option<u64>,
    /// Decrement the working ledger as recipes are placed.
    pub consume_ingredients: bool,
}

impl PlanRequest {
    pub fn new(diet: impl Into<String>, goals: NutritionalGoals) -> Self {
        Self {
            diet: diet.into(),
            goals,
            seed: None,
            consume_ingredients: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn consuming(mut self) -> Self {
        self.consume_ingredients = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRef {
    pub day: Day,
    pub meal: MealType,
}

/// What the run had to fall back on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanDiagnostics {
    /// Filled by a recipe already used on an earlier day.
    pub repeated: Vec<SlotRef>,
    /// Filled by doubling a fresh recipe.
    pub doubled: Vec<SlotRef>,
    /// Doubled in place by the protein repair pass.
    pub repaired: Vec<SlotRef>,
    pub unfilled: Vec<SlotRef>,
    pub daily_totals: BTreeMap<Day, DailyTotals>,
}

impl PlanDiagnostics {
    pub fn repaired_days(&self) -> Vec<Day> {
        let mut days: Vec<Day> = self.repaired.iter().map(|slot| slot.day).collect();
        days.dedup();
        days
    }
}

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub plan: WeeklyMealPlan,
    pub diagnostics: PlanDiagnostics,
    /// The run's working copy. Only differs from the input when
    /// `consume_ingredients` was set.
    pub ledger: IngredientLedger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Fresh,
    Repeat,
    DoubledFresh,
}

/// Working copy of the ledger owned by one run.
struct Pantry {
    ledger: IngredientLedger,
    diet: String,
    consume: bool,
}

impl Pantry {
    fn covers(&self, recipe: &Recipe) -> bool {
        is_stocked(recipe, &self.ledger, &self.diet)
    }

    /// Whether one more portion of an already placed recipe is in stock.
    fn covers_second_portion(&self, recipe: &Recipe) -> bool {
        if self.consume {
            self.covers(recipe)
        } else {
            self.covers(&recipe.doubled())
        }
    }

    fn take(&mut self, recipe: &Recipe) {
        if !self.consume {
            return;
        }
        for (name, grams) in &recipe.ingredients {
            self.ledger.consume(name, *grams);
        }
    }
}

/// Builds a 7-day x 3-meal plan from a recipe catalog.
///
/// Slots are filled day by day in breakfast, lunch, dinner order. Each slot
/// walks a fallback ladder over the shuffled diet-matching recipes that the
/// working ledger can cover:
///
/// 1. a recipe not used yet this week that fits the remaining calorie budget
/// 2. any recipe not used today that fits the budget
/// 3. a recipe not used yet this week whose double portion fits
///
/// and is left unfilled when none applies. After each day, if protein is
/// under 80% of the goal, placed recipes are doubled in slot order while
/// calories allow, until the floor is met. A day still under the floor fails
/// the whole run.
pub struct MealPlanAllocator<'a> {
    catalog: &'a RecipeCatalog,
}

impl<'a> MealPlanAllocator<'a> {
    pub fn new(catalog: &'a RecipeCatalog) -> Self {
        Self { catalog }
    }

    /// Plan against a private copy of `ledger`; the caller's ledger is never
    /// modified.
    pub fn allocate(
        &self,
        ledger: &IngredientLedger,
        request: &PlanRequest,
    ) -> Result<AllocationOutcome, MealPlanningError> {
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.allocate_with_rng(ledger.clone(), request, &mut rng)
    }

    /// Plan with an injected random source, taking ownership of the ledger.
    ///
    /// # Errors
    /// * `Configuration` - calorie or protein goal missing
    /// * `NoCompatibleRecipes` - fewer than three recipes carry the diet tag
    /// * `UnmetGoal` - first day that stays under the protein floor
    #[tracing::instrument(skip_all, fields(diet = %request.diet, seed = ?request.seed))]
    pub fn allocate_with_rng<R: Rng + ?Sized>(
        &self,
        ledger: IngredientLedger,
        request: &PlanRequest,
        rng: &mut R,
    ) -> Result<AllocationOutcome, MealPlanningError> {
        validate_goals(&request.diet, &request.goals)?;

        let mut candidates: Vec<&Recipe> = self.catalog.by_diet(&request.diet).collect();
        if candidates.len() < MIN_DIET_RECIPES {
            return Err(MealPlanningError::NoCompatibleRecipes {
                diet: request.diet.clone(),
                found: candidates.len(),
                minimum: MIN_DIET_RECIPES,
            });
        }
        candidates.shuffle(rng);

        let mut run = PlanRun {
            candidates,
            pantry: Pantry {
                ledger,
                diet: request.diet.clone(),
                consume: request.consume_ingredients,
            },
            usage: UsageTracker::new(),
            plan: WeeklyMealPlan::new(),
            diagnostics: PlanDiagnostics::default(),
            max_calories: request.goals.calories,
            protein_floor: request.goals.protein * PROTEIN_FLOOR,
        };

        for day in Day::VARIANTS {
            run.fill_day(*day);
            run.repair_protein(*day)?;
            let totals = run.plan.daily_totals(*day);
            run.diagnostics.daily_totals.insert(*day, totals);
        }

        tracing::info!(
            repeated = run.diagnostics.repeated.len(),
            doubled = run.diagnostics.doubled.len(),
            repaired = run.diagnostics.repaired.len(),
            unfilled = run.diagnostics.unfilled.len(),
            "meal plan allocated"
        );

        Ok(AllocationOutcome {
            plan: run.plan,
            diagnostics: run.diagnostics,
            ledger: run.pantry.ledger,
        })
    }
}

struct PlanRun<'a> {
    candidates: Vec<&'a Recipe>,
    pantry: Pantry,
    usage: UsageTracker,
    plan: WeeklyMealPlan,
    diagnostics: PlanDiagnostics,
    max_calories: f64,
    protein_floor: f64,
}

impl PlanRun<'_> {
    fn fill_day(&mut self, day: Day) {
        self.usage.start_day();
        let mut totals = DailyTotals::default();

        for meal in MealType::VARIANTS {
            let slot = SlotRef { day, meal: *meal };
            let remaining = self.max_calories - totals.calories as f64;

            let Some((recipe, tier)) = self.pick(remaining) else {
                tracing::debug!(%day, %meal, remaining, "no candidate in any tier");
                self.diagnostics.unfilled.push(slot);
                self.plan.set(day, *meal, SlotAssignment::Unfilled);
                continue;
            };

            match tier {
                Tier::Fresh => {}
                Tier::Repeat => self.diagnostics.repeated.push(slot),
                Tier::DoubledFresh => self.diagnostics.doubled.push(slot),
            }
            tracing::debug!(%day, %meal, recipe = %recipe.name, ?tier, "slot filled");

            self.pantry.take(&recipe);
            self.usage.mark_used(&recipe);
            totals.add(&recipe);
            self.plan.set(day, *meal, SlotAssignment::Filled(recipe));
        }
    }

    /// First match wins within each tier.
    fn pick(&self, remaining: f64) -> Option<(Recipe, Tier)> {
        let fits = |calories: u32| calories as f64 <= remaining;

        if let Some(recipe) = self.candidates.iter().find(|r| {
            self.usage.is_fresh(r) && fits(r.calories) && self.pantry.covers(r)
        }) {
            return Some(((*recipe).clone(), Tier::Fresh));
        }

        if let Some(recipe) = self.candidates.iter().find(|r| {
            !self.usage.is_used_today(r) && fits(r.calories) && self.pantry.covers(r)
        }) {
            return Some(((*recipe).clone(), Tier::Repeat));
        }

        // Anything passing here already passed the first tier: a double
        // portion that fits the budget and the stock implies a single one does.
        self.candidates
            .iter()
            .filter(|r| self.usage.is_fresh(r) && fits(r.calories.saturating_mul(2)))
            .map(|r| r.doubled())
            .find(|doubled| self.pantry.covers(doubled))
            .map(|doubled| (doubled, Tier::DoubledFresh))
    }

    fn repair_protein(&mut self, day: Day) -> Result<(), MealPlanningError> {
        let mut totals = self.plan.daily_totals(day);
        if totals.protein_g >= self.protein_floor {
            return Ok(());
        }
        tracing::info!(
            %day,
            protein = totals.protein_g,
            floor = self.protein_floor,
            "protein under floor, doubling portions"
        );

        for meal in MealType::VARIANTS {
            if totals.protein_g >= self.protein_floor {
                break;
            }
            let Some(recipe) = self.plan.get(day, *meal).recipe().cloned() else {
                continue;
            };
            if recipe.is_double_portion
                || totals.calories.saturating_add(recipe.calories) as f64 > self.max_calories
                || !self.pantry.covers_second_portion(&recipe)
            {
                continue;
            }

            self.pantry.take(&recipe);
            totals.add(&recipe);
            self.plan
                .set(day, *meal, SlotAssignment::Filled(recipe.doubled()));
            self.diagnostics.repaired.push(SlotRef { day, meal: *meal });
        }

        if totals.protein_g < self.protein_floor {
            tracing::warn!(%day, protein = totals.protein_g, "protein floor unreachable");
            return Err(MealPlanningError::UnmetGoal { day });
        }
        Ok(())
    }
}
