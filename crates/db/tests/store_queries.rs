use std::collections::BTreeMap;

use larder_db::{RecipeSearch, RecipeStore, StoreError};
use larder_recipe::{IngredientLedger, Recipe, RecipeCatalog};
use larder_shared::Unit;

fn recipe(
    name: &str,
    diet: &str,
    ingredients: &[(&str, f64)],
    calories: u32,
    macros: (f64, f64, f64),
) -> Recipe {
    Recipe {
        name: name.to_string(),
        diet: diet.to_string(),
        ingredients: ingredients
            .iter()
            .map(|(n, q)| (n.to_string(), *q))
            .collect::<BTreeMap<_, _>>(),
        calories,
        protein_g: macros.0,
        carbs_g: macros.1,
        fat_g: macros.2,
        is_double_portion: false,
    }
}

async fn store() -> anyhow::Result<RecipeStore> {
    let catalog = RecipeCatalog::from_recipes(vec![
        recipe(
            "Tofu Bowl",
            "vegan",
            &[("tofu", 300.0), ("broccoli", 150.0)],
            400,
            (35.0, 25.0, 22.0),
        ),
        recipe(
            "Chicken Salad",
            "low-carb",
            &[("chicken", 200.0), ("lettuce", 150.0), ("cheese", 50.0)],
            400,
            (45.0, 8.0, 25.0),
        ),
        recipe(
            "Cheese Omelette",
            "keto",
            &[("eggs", 200.0), ("cheese", 100.0)],
            550,
            (45.0, 5.0, 42.0),
        ),
    ])?;

    let mut main = IngredientLedger::new();
    main.upsert("tofu", 500.0, Unit::Grams)?;
    main.upsert("broccoli", 100.0, Unit::Grams)?;
    main.upsert("eggs", 4.0, Unit::Pieces)?;
    let mut user = IngredientLedger::new();
    user.upsert("Cheese", 100.0, Unit::Grams)?;
    user.upsert("chicken", 50.0, Unit::Grams)?;

    Ok(RecipeStore::load(&catalog, &main, &user).await?)
}

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| name(item).to_string()).collect()
}

#[tokio::test]
async fn find_recipes_by_named_ingredients() -> anyhow::Result<()> {
    let store = store().await?;

    let matches = store
        .find_recipes_by_ingredients(&["Tofu".to_string()], None)
        .await?;

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].recipe_name, "Tofu Bowl");
    assert_eq!(matches[0].matching_ingredients, 1);
    assert_eq!(matches[0].total_ingredients, 2);
    assert_eq!(matches[0].match_percentage, 50.0);

    Ok(())
}

#[tokio::test]
async fn find_recipes_defaults_to_stocked_ingredients() -> anyhow::Result<()> {
    let store = store().await?;

    let matches = store.find_recipes_by_ingredients(&[], None).await?;
    assert_eq!(
        names(&matches, |m| m.recipe_name.as_str()),
        vec!["Cheese Omelette", "Tofu Bowl", "Chicken Salad"]
    );
    assert_eq!(matches[2].match_percentage, 66.67);

    let vegan = store.find_recipes_by_ingredients(&[], Some("VEGAN")).await?;
    assert_eq!(names(&vegan, |m| m.recipe_name.as_str()), vec!["Tofu Bowl"]);

    Ok(())
}

#[tokio::test]
async fn analyze_nutrition_splits_macro_calories() -> anyhow::Result<()> {
    let store = store().await?;

    let analysis = store.analyze_nutritional_content("tofu bowl").await?;

    assert_eq!(analysis.recipe_name, "Tofu Bowl");
    assert_eq!(analysis.calories, 400);
    assert_eq!(analysis.total_calories, 438.0);
    assert_eq!(analysis.protein_percentage, 31.96);
    let sum = analysis.protein_percentage + analysis.carbs_percentage + analysis.fat_percentage;
    assert!((sum - 100.0).abs() < 0.05);

    let err = store.analyze_nutritional_content("Pizza").await.unwrap_err();
    assert!(matches!(err, StoreError::RecipeNotFound(name) if name == "Pizza"));

    Ok(())
}

#[tokio::test]
async fn availability_sums_main_and_user_stock() -> anyhow::Result<()> {
    let store = store().await?;

    let availability = store.check_ingredient_availability("Chicken Salad").await?;

    let missing = names(&availability.missing_ingredients, |s| s.ingredient.as_str());
    assert_eq!(missing, vec!["lettuce"]);

    let by_name: BTreeMap<_, _> = availability
        .available_ingredients
        .iter()
        .map(|status| (status.ingredient.as_str(), status))
        .collect();
    assert!(by_name["cheese"].sufficient);
    assert_eq!(by_name["cheese"].sources, vec!["user"]);
    assert!(!by_name["chicken"].sufficient);
    assert_eq!(by_name["chicken"].available_grams, 50.0);
    assert_eq!(by_name["chicken"].required_grams, 200.0);

    Ok(())
}

#[tokio::test]
async fn replacing_stock_refreshes_availability() -> anyhow::Result<()> {
    let store = store().await?;
    let mut main = IngredientLedger::new();
    main.upsert("eggs", 2.0, Unit::Pieces)?;
    main.upsert("cheese", 1.0, Unit::Cups)?;

    store.replace_ingredients(&main, &IngredientLedger::new()).await?;
    let availability = store.check_ingredient_availability("Cheese Omelette").await?;

    assert!(availability.missing_ingredients.is_empty());
    assert!(availability.available_ingredients.iter().all(|s| s.sufficient));

    Ok(())
}

#[tokio::test]
async fn suggest_meal_plan_fills_days_in_meal_order() -> anyhow::Result<()> {
    let store = store().await?;

    let plan = store.suggest_meal_plan(1, None, Some(450), None).await?;

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].day, 1);
    assert_eq!(
        plan[0].meals.keys().collect::<Vec<_>>(),
        vec!["breakfast", "lunch"]
    );
    assert!(plan[0].meals.values().all(|r| r.calories <= 450));

    let keto = store.suggest_meal_plan(3, Some("keto"), None, Some(40.0)).await?;
    assert_eq!(keto.len(), 1);
    assert_eq!(keto[0].meals["breakfast"].name, "Cheese Omelette");

    Ok(())
}

#[tokio::test]
async fn search_recipes_by_text_limits_and_ingredients() -> anyhow::Result<()> {
    let store = store().await?;

    let bowls = store
        .search_recipes(&RecipeSearch {
            text: Some("BOWL".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(names(&bowls, |h| h.recipe.name.as_str()), vec!["Tofu Bowl"]);

    let light = store
        .search_recipes(&RecipeSearch {
            max_calories: Some(450),
            ..Default::default()
        })
        .await?;
    assert_eq!(
        names(&light, |h| h.recipe.name.as_str()),
        vec!["Chicken Salad", "Tofu Bowl"]
    );

    let cheesy = store
        .search_recipes(&RecipeSearch {
            ingredients: vec!["cheese".to_string()],
            ..Default::default()
        })
        .await?;
    assert_eq!(
        names(&cheesy, |h| h.recipe.name.as_str()),
        vec!["Cheese Omelette", "Chicken Salad", "Tofu Bowl"]
    );
    assert_eq!(cheesy[1].match_percentage, Some(33.33));

    Ok(())
}

#[tokio::test]
async fn recipe_details_bundle_every_view() -> anyhow::Result<()> {
    let store = store().await?;

    let details = store.get_recipe_details("Cheese Omelette").await?;

    assert_eq!(details.recipe.diet, "keto");
    assert_eq!(details.ingredients.get("eggs"), Some(&200.0));
    assert_eq!(details.nutritional_analysis.calories, 550);
    assert!(details.ingredient_availability.missing_ingredients.is_empty());

    Ok(())
}

#[tokio::test]
async fn execute_sql_returns_rows_as_objects() -> anyhow::Result<()> {
    let store = store().await?;

    let result = store
        .execute_sql("SELECT name, calories, protein_g FROM recipes ORDER BY calories DESC, name;")
        .await?;

    assert_eq!(result.columns, vec!["name", "calories", "protein_g"]);
    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[0]["name"], "Cheese Omelette");
    assert_eq!(result.rows[0]["calories"], 550);
    assert_eq!(result.rows[0]["protein_g"], 45.0);

    let err = store.execute_sql("DELETE FROM recipes").await.unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly(_)));
    assert_eq!(store.execute_sql("SELECT * FROM recipes").await?.rows.len(), 3);

    let named = store
        .execute_sql("SELECT name FROM recipes WHERE name = 'Create Your Own Bowl'")
        .await?;
    assert!(named.rows.is_empty());

    let err = store
        .execute_sql("WITH gone AS (SELECT 1) DELETE FROM recipes")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly(_)), "{err:?}");
    assert_eq!(store.execute_sql("SELECT * FROM recipes").await?.rows.len(), 3);

    // the connection is writable again for catalog reloads
    store.replace_recipes(&RecipeCatalog::new()).await?;
    assert!(store.execute_sql("SELECT * FROM recipes").await?.rows.is_empty());

    store.close().await;
    Ok(())
}
