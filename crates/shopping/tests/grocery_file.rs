use std::collections::BTreeMap;

use larder_mealplan::{Day, MealType, SlotAssignment, WeeklyMealPlan};
use larder_recipe::{IngredientLedger, Recipe};
use larder_shared::Unit;
use larder_shopping::{export, reconcile};
use temp_dir::TempDir;

fn omelette() -> Recipe {
    Recipe {
        name: "Cheese Omelette".to_string(),
        diet: "keto".to_string(),
        ingredients: BTreeMap::from([("eggs".to_string(), 300.0), ("cheese".to_string(), 50.0)]),
        calories: 450,
        protein_g: 30.0,
        carbs_g: 3.0,
        fat_g: 35.0,
        is_double_portion: false,
    }
}

#[test]
fn plan_shortfall_survives_the_csv_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("grocery_list.csv");

    let mut plan = WeeklyMealPlan::new();
    plan.set(Day::Monday, MealType::Breakfast, SlotAssignment::Filled(omelette()));
    plan.set(Day::Tuesday, MealType::Breakfast, SlotAssignment::Filled(omelette().doubled()));
    let mut ledger = IngredientLedger::new();
    ledger.upsert("eggs", 6.0, Unit::Pieces)?;

    let shortfall = reconcile(&plan, &ledger);
    export::save_grocery_list(&path, &shortfall)?;
    let list = export::load_grocery_list(&path)?;

    assert_eq!(list.len(), 2);
    assert_eq!(list["cheese"], "150g");
    assert_eq!(list["eggs"], "300g");

    Ok(())
}

#[test]
fn missing_grocery_file_reads_empty() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    assert!(export::load_grocery_list(dir.child("grocery_list.csv"))?.is_empty());

    Ok(())
}
