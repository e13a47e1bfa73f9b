use std::collections::HashMap;
use std::fmt::{self, Write as _};

use larder_recipe::Recipe;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Marker stored in a slot the allocator could not fill.
pub const UNFILLED_MARKER: &str = "No suitable recipe found";

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

/// Content of one (day, meal) slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotAssignment {
    Filled(Recipe),
    Unfilled,
}

impl SlotAssignment {
    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            SlotAssignment::Filled(recipe) => Some(recipe),
            SlotAssignment::Unfilled => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, SlotAssignment::Filled(_))
    }
}

impl Serialize for SlotAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotAssignment::Filled(recipe) => recipe.serialize(serializer),
            SlotAssignment::Unfilled => serializer.serialize_str(UNFILLED_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for SlotAssignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Recipe(Recipe),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Recipe(recipe) => Ok(SlotAssignment::Filled(recipe)),
            Raw::Marker(marker) if marker == UNFILLED_MARKER => Ok(SlotAssignment::Unfilled),
            Raw::Marker(other) => Err(de::Error::custom(format!(
                "expected a recipe or \"{}\", found \"{}\"",
                UNFILLED_MARKER, other
            ))),
        }
    }
}

/// Nutrient sums for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories: u32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl DailyTotals {
    pub fn add(&mut self, recipe: &Recipe) {
        self.calories = self.calories.saturating_add(recipe.calories);
        self.protein_g += recipe.protein_g;
        self.carbs_g += recipe.carbs_g;
        self.fat_g += recipe.fat_g;
    }
}

/// The full 7 x 3 grid. Every slot always holds either a recipe or the
/// unfilled marker.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyMealPlan {
    slots: [[SlotAssignment; 3]; 7],
}

impl Default for WeeklyMealPlan {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| std::array::from_fn(|_| SlotAssignment::Unfilled)),
        }
    }
}

impl WeeklyMealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Day, meal: MealType) -> &SlotAssignment {
        &self.slots[day as usize][meal as usize]
    }

    pub fn set(&mut self, day: Day, meal: MealType, assignment: SlotAssignment) {
        self.slots[day as usize][meal as usize] = assignment;
    }

    /// Slots in day-then-meal order.
    pub fn slots(&self) -> impl Iterator<Item = (Day, MealType, &SlotAssignment)> {
        Day::VARIANTS.iter().flat_map(move |day| {
            MealType::VARIANTS
                .iter()
                .map(move |meal| (*day, *meal, self.get(*day, *meal)))
        })
    }

    pub fn filled_recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.slots().filter_map(|(_, _, slot)| slot.recipe())
    }

    pub fn daily_totals(&self, day: Day) -> DailyTotals {
        let mut totals = DailyTotals::default();
        for slot in &self.slots[day as usize] {
            if let Some(recipe) = slot.recipe() {
                totals.add(recipe);
            }
        }
        totals
    }

    /// Plain-text rendering written to `meal_plan.txt`.
    pub fn render_text(&self) -> String {
        let mut out = String::from("Weekly Meal Plan\n================\n");
        for day in Day::VARIANTS {
            let _ = writeln!(out, "\n{}", day);
            for meal in MealType::VARIANTS {
                match self.get(*day, *meal) {
                    SlotAssignment::Filled(recipe) => {
                        let _ = writeln!(
                            out,
                            "  {}: {} ({} kcal, {}g protein)",
                            meal, recipe.name, recipe.calories, recipe.protein_g
                        );
                    }
                    SlotAssignment::Unfilled => {
                        let _ = writeln!(out, "  {}: {}", meal, UNFILLED_MARKER);
                    }
                }
            }
            let totals = self.daily_totals(*day);
            let _ = writeln!(
                out,
                "  Total: {} kcal, {}g protein, {}g carbs, {}g fat",
                totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
            );
        }
        out
    }
}

struct DaySlots<'a>(&'a [SlotAssignment; 3]);

impl Serialize for DaySlots<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MealType::VARIANTS.len()))?;
        for meal in MealType::VARIANTS {
            map.serialize_entry(meal.as_ref(), &self.0[*meal as usize])?;
        }
        map.end()
    }
}

impl Serialize for WeeklyMealPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Day::VARIANTS.len()))?;
        for day in Day::VARIANTS {
            map.serialize_entry(day.as_ref(), &DaySlots(&self.slots[*day as usize]))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeeklyMealPlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = HashMap::<Day, HashMap<MealType, SlotAssignment>>::deserialize(deserializer)?;
        let mut plan = WeeklyMealPlan::new();
        for day in Day::VARIANTS {
            let mut meals = raw
                .remove(day)
                .ok_or_else(|| de::Error::custom(format!("meal plan is missing {}", day)))?;
            for meal in MealType::VARIANTS {
                let slot = meals.remove(meal).ok_or_else(|| {
                    de::Error::custom(format!("meal plan is missing {} {}", day, meal))
                })?;
                plan.set(*day, *meal, slot);
            }
        }
        Ok(plan)
    }
}

impl fmt::Display for WeeklyMealPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn recipe(name: &str, calories: u32, protein: f64) -> Recipe {
        Recipe {
            name: name.to_string(),
            diet: "keto".to_string(),
            ingredients: BTreeMap::from([("eggs".to_string(), 100.0)]),
            calories,
            protein_g: protein,
            carbs_g: 5.0,
            fat_g: 20.0,
            is_double_portion: false,
        }
    }

    #[test]
    fn test_new_plan_is_fully_unfilled() {
        let plan = WeeklyMealPlan::new();

        assert_eq!(plan.slots().count(), 21);
        assert!(plan.slots().all(|(_, _, slot)| !slot.is_filled()));
    }

    #[test]
    fn test_json_shape_keeps_day_and_meal_order() {
        let mut plan = WeeklyMealPlan::new();
        plan.set(
            Day::Monday,
            MealType::Lunch,
            SlotAssignment::Filled(recipe("Omelette", 400, 30.0)),
        );

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.starts_with("{\"Monday\":{\"Breakfast\":\"No suitable recipe found\",\"Lunch\":{"));
        assert!(json.find("\"Tuesday\"").unwrap() < json.find("\"Sunday\"").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Monday"]["Lunch"]["name"], "Omelette");
        assert_eq!(value["Sunday"]["Dinner"], UNFILLED_MARKER);
    }

    #[test]
    fn test_json_deserializes_back() {
        let mut plan = WeeklyMealPlan::new();
        plan.set(
            Day::Friday,
            MealType::Dinner,
            SlotAssignment::Filled(recipe("Steak", 700, 60.0).doubled()),
        );

        let json = serde_json::to_value(&plan).unwrap();
        let parsed: WeeklyMealPlan = serde_json::from_value(json).unwrap();

        assert_eq!(parsed, plan);
    }

    #[test]
    fn test_missing_slot_is_rejected() {
        let mut value = serde_json::to_value(WeeklyMealPlan::new()).unwrap();
        value["Wednesday"]
            .as_object_mut()
            .unwrap()
            .remove("Dinner");

        let err = serde_json::from_value::<WeeklyMealPlan>(value).unwrap_err();
        assert!(err.to_string().contains("Wednesday Dinner"));
    }

    #[test]
    fn test_unknown_marker_is_rejected() {
        let mut value = serde_json::to_value(WeeklyMealPlan::new()).unwrap();
        value["Monday"]["Breakfast"] = serde_json::Value::String("nothing".to_string());

        assert!(serde_json::from_value::<WeeklyMealPlan>(value).is_err());
    }

    #[test]
    fn test_daily_totals_skip_unfilled_slots() {
        let mut plan = WeeklyMealPlan::new();
        plan.set(
            Day::Tuesday,
            MealType::Breakfast,
            SlotAssignment::Filled(recipe("A", 300, 20.0)),
        );
        plan.set(
            Day::Tuesday,
            MealType::Dinner,
            SlotAssignment::Filled(recipe("B", 500, 45.5)),
        );

        let totals = plan.daily_totals(Day::Tuesday);
        assert_eq!(totals.calories, 800);
        assert_eq!(totals.protein_g, 65.5);
        assert_eq!(plan.daily_totals(Day::Monday), DailyTotals::default());
    }

    #[test]
    fn test_render_text_lists_every_slot() {
        let text = WeeklyMealPlan::new().render_text();

        assert_eq!(text.matches(UNFILLED_MARKER).count(), 21);
        assert!(text.contains("Sunday"));
    }
}
