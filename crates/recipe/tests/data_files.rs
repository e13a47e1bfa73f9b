use std::path::PathBuf;

use larder_recipe::io;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[test]
fn bundled_recipe_catalog_loads() -> anyhow::Result<()> {
    let catalog = io::load_recipes(data_dir().join("recipes.csv"))?;

    assert_eq!(catalog.len(), 20);
    assert_eq!(catalog.by_diet("keto").count(), 3);
    for diet in ["vegetarian", "vegan", "mediterranean", "low-carb", "bulking", "cutting"] {
        assert!(
            catalog.by_diet(diet).count() >= 2,
            "diet {diet} is missing from the bundled catalog"
        );
    }

    Ok(())
}

#[test]
fn bundled_diet_table_matches_builtin() -> anyhow::Result<()> {
    let preferences = io::load_diet_preferences(data_dir().join("diet_preferences.json"))?;

    assert_eq!(preferences, larder_recipe::DietPreferences::builtin());

    Ok(())
}

#[test]
fn bundled_pantry_covers_every_catalog_ingredient() -> anyhow::Result<()> {
    let catalog = io::load_recipes(data_dir().join("recipes.csv"))?;
    let ledger = io::load_ingredients(data_dir().join("available_ingredients.csv"))?;

    for recipe in catalog.iter() {
        for ingredient in recipe.ingredients.keys() {
            assert!(ledger.contains(ingredient), "{ingredient} is not stocked");
        }
    }

    Ok(())
}
