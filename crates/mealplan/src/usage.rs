use std::collections::HashSet;

use larder_recipe::Recipe;

/// Tracks which recipes a planning run has already placed.
///
/// Recipes are keyed by base name, so a double portion counts as a use of
/// the recipe it was derived from.
///
/// - `today`: cleared at the start of every day, forbids same-day repeats
/// - `week`: persists across the run, prefers fresh recipes on later days
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    today: HashSet<String>,
    week: HashSet<String>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_day(&mut self) {
        self.today.clear();
    }

    pub fn mark_used(&mut self, recipe: &Recipe) {
        let key = recipe.key();
        self.today.insert(key.clone());
        self.week.insert(key);
    }

    pub fn is_used_today(&self, recipe: &Recipe) -> bool {
        self.today.contains(&recipe.key())
    }

    pub fn is_used_this_week(&self, recipe: &Recipe) -> bool {
        self.week.contains(&recipe.key())
    }

    /// Neither used today nor on any earlier day.
    pub fn is_fresh(&self, recipe: &Recipe) -> bool {
        !self.is_used_this_week(recipe)
    }

    pub fn week_count(&self) -> usize {
        self.week.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn recipe(name: &str) -> Recipe {
        Recipe {
            name: name.to_string(),
            diet: "vegan".to_string(),
            ingredients: BTreeMap::from([("tofu".to_string(), 100.0)]),
            calories: 300,
            protein_g: 20.0,
            carbs_g: 10.0,
            fat_g: 10.0,
            is_double_portion: false,
        }
    }

    #[test]
    fn test_start_day_keeps_week_history() {
        let mut usage = UsageTracker::new();
        let bowl = recipe("Buddha Bowl");

        usage.mark_used(&bowl);
        assert!(usage.is_used_today(&bowl));

        usage.start_day();
        assert!(!usage.is_used_today(&bowl));
        assert!(usage.is_used_this_week(&bowl));
        assert!(!usage.is_fresh(&bowl));
    }

    #[test]
    fn test_double_portion_counts_as_base_recipe() {
        let mut usage = UsageTracker::new();
        let bowl = recipe("Buddha Bowl");

        usage.mark_used(&bowl.doubled());

        assert!(usage.is_used_today(&bowl));
        assert!(usage.is_used_today(&recipe("buddha bowl")));
        assert_eq!(usage.week_count(), 1);
    }
}
