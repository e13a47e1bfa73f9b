//! CSV and JSON readers/writers for the flat-file data set.
//!
//! Parsing works on any `Read`/`Write`; the path helpers only add file
//! handling. Row numbers in errors are 1-based and count data rows only.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use larder_shared::Unit;
use serde::{Deserialize, Serialize};

use crate::{
    DietPreferences, IngredientLedger, LedgerEntry, Recipe, RecipeCatalog, RecipeError,
    RecipeResult,
};

#[derive(Debug, Serialize, Deserialize)]
struct RecipeRecord {
    #[serde(rename = "Recipe_Name")]
    name: String,
    #[serde(rename = "Diet")]
    diet: String,
    #[serde(rename = "Calories")]
    calories: u32,
    #[serde(rename = "Protein_g")]
    protein_g: f64,
    #[serde(rename = "Carbs_g")]
    carbs_g: f64,
    #[serde(rename = "Fat_g")]
    fat_g: f64,
    #[serde(rename = "Ingredients")]
    ingredients: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct IngredientRecord {
    #[serde(rename = "Ingredient")]
    name: String,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "Unit")]
    unit: String,
}

/// Parse the `name:qty;name:qty` ingredient column.
pub fn parse_ingredient_spec(spec: &str) -> Result<BTreeMap<String, f64>, String> {
    let mut ingredients = BTreeMap::new();
    for part in spec.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, quantity) = part
            .split_once(':')
            .ok_or_else(|| format!("ingredient '{}' is not in name:quantity form", part))?;
        let quantity: f64 = quantity
            .trim()
            .parse()
            .map_err(|_| format!("ingredient '{}' has a non-numeric quantity", name.trim()))?;
        *ingredients.entry(name.trim().to_lowercase()).or_insert(0.0) += quantity;
    }
    Ok(ingredients)
}

pub fn format_ingredient_spec(ingredients: &BTreeMap<String, f64>) -> String {
    ingredients
        .iter()
        .map(|(name, quantity)| format!("{}:{}", name, quantity))
        .collect::<Vec<_>>()
        .join(";")
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub fn parse_recipes_csv<R: Read>(reader: R) -> RecipeResult<RecipeCatalog> {
    let mut catalog = RecipeCatalog::new();
    for (index, record) in csv_reader(reader).deserialize::<RecipeRecord>().enumerate() {
        let row = index + 1;
        let record = record.map_err(|e| RecipeError::MalformedRow {
            row,
            message: e.to_string(),
        })?;
        let ingredients = parse_ingredient_spec(&record.ingredients)
            .map_err(|message| RecipeError::MalformedRow { row, message })?;
        catalog
            .insert(Recipe {
                name: record.name,
                diet: record.diet,
                ingredients,
                calories: record.calories,
                protein_g: record.protein_g,
                carbs_g: record.carbs_g,
                fat_g: record.fat_g,
                is_double_portion: false,
            })
            .map_err(|e| RecipeError::MalformedRow {
                row,
                message: e.to_string(),
            })?;
    }
    Ok(catalog)
}

pub fn write_recipes_csv<W: Write>(catalog: &RecipeCatalog, writer: W) -> RecipeResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for recipe in catalog.iter() {
        csv_writer.serialize(RecipeRecord {
            name: recipe.name.clone(),
            diet: recipe.diet.clone(),
            calories: recipe.calories,
            protein_g: recipe.protein_g,
            carbs_g: recipe.carbs_g,
            fat_g: recipe.fat_g,
            ingredients: format_ingredient_spec(&recipe.ingredients),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn parse_ingredients_csv<R: Read>(reader: R) -> RecipeResult<IngredientLedger> {
    let mut ledger = IngredientLedger::new();
    for (index, record) in csv_reader(reader)
        .deserialize::<IngredientRecord>()
        .enumerate()
    {
        let row = index + 1;
        let record = record.map_err(|e| RecipeError::MalformedRow {
            row,
            message: e.to_string(),
        })?;
        let unit = Unit::from_str(&record.unit).map_err(|_| RecipeError::MalformedRow {
            row,
            message: format!("unknown unit '{}'", record.unit),
        })?;
        ledger
            .upsert(&record.name, record.quantity, unit)
            .map_err(|e| RecipeError::MalformedRow {
                row,
                message: e.to_string(),
            })?;
    }
    Ok(ledger)
}

pub fn write_ingredients_csv<'a, W: Write>(
    entries: impl IntoIterator<Item = &'a LedgerEntry>,
    writer: W,
) -> RecipeResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(IngredientRecord {
            name: entry.name.clone(),
            quantity: entry.quantity,
            unit: entry.unit.to_string(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn load_recipes(path: impl AsRef<Path>) -> RecipeResult<RecipeCatalog> {
    parse_recipes_csv(File::open(path)?)
}

pub fn save_recipes(path: impl AsRef<Path>, catalog: &RecipeCatalog) -> RecipeResult<()> {
    write_recipes_csv(catalog, File::create(path)?)
}

pub fn load_ingredients(path: impl AsRef<Path>) -> RecipeResult<IngredientLedger> {
    parse_ingredients_csv(File::open(path)?)
}

/// Like [`load_ingredients`], but a missing file is an empty ledger.
pub fn load_ingredients_or_empty(path: impl AsRef<Path>) -> RecipeResult<IngredientLedger> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "ingredient file absent, using empty ledger");
        return Ok(IngredientLedger::new());
    }
    load_ingredients(path)
}

pub fn save_ingredients(path: impl AsRef<Path>, ledger: &IngredientLedger) -> RecipeResult<()> {
    write_ingredients_csv(ledger.iter(), File::create(path)?)
}

pub fn load_diet_preferences(path: impl AsRef<Path>) -> RecipeResult<DietPreferences> {
    Ok(serde_json::from_reader(File::open(path)?)?)
}

pub fn save_diet_preferences(
    path: impl AsRef<Path>,
    preferences: &DietPreferences,
) -> RecipeResult<()> {
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, preferences)?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPES: &str = "\
Recipe_Name,Diet,Calories,Protein_g,Carbs_g,Fat_g,Ingredients
Keto Chicken Supreme,keto,650,75,8,45,chicken:250;cheese:100;spinach:100;garlic:15
Vegan Buddha Bowl,vegan,350,25,30,18,tofu:200;broccoli:150;spinach:100;soy_sauce:20
";

    #[test]
    fn test_parse_recipes_csv() {
        let catalog = parse_recipes_csv(RECIPES.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        let chicken = catalog.get("keto chicken supreme").unwrap();
        assert_eq!(chicken.calories, 650);
        assert_eq!(chicken.ingredients["cheese"], 100.0);
        assert_eq!(chicken.ingredients.len(), 4);
    }

    #[test]
    fn test_recipes_csv_rewrites_identically() {
        let catalog = parse_recipes_csv(RECIPES.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_recipes_csv(&catalog, &mut buffer).unwrap();

        let reparsed = parse_recipes_csv(buffer.as_slice()).unwrap();
        assert_eq!(catalog.to_map(), reparsed.to_map());
    }

    #[test]
    fn test_malformed_recipe_row_is_numbered() {
        let csv = "\
Recipe_Name,Diet,Calories,Protein_g,Carbs_g,Fat_g,Ingredients
Good,vegan,100,1,1,1,tofu:10
Bad,vegan,100,1,1,1,tofu=10
";
        match parse_recipes_csv(csv.as_bytes()) {
            Err(RecipeError::MalformedRow { row, message }) => {
                assert_eq!(row, 2);
                assert!(message.contains("tofu=10"));
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_recipe_row_with_runaway_calories_is_rejected() {
        let csv = "\
Recipe_Name,Diet,Calories,Protein_g,Carbs_g,Fat_g,Ingredients
Keto Feast,keto,3000000000,60,5,40,chicken:250
";
        match parse_recipes_csv(csv.as_bytes()) {
            Err(RecipeError::MalformedRow { row, message }) => {
                assert_eq!(row, 1);
                assert!(message.contains("calories"), "{message}");
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ingredients_csv_normalizes_units() {
        let csv = "\
Ingredient,Quantity,Unit
Milk,2,Cups
eggs,4,pieces
";
        let ledger = parse_ingredients_csv(csv.as_bytes()).unwrap();

        assert_eq!(ledger.get("milk").unwrap().unit, Unit::Cups);
        assert_eq!(ledger.available_grams("eggs"), Some(400.0));
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let csv = "Ingredient,Quantity,Unit\nflour,2,pounds\n";

        let err = parse_ingredients_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(err.to_string().contains("pounds"));
    }

    #[test]
    fn test_ingredient_spec_sums_repeated_names() {
        let parsed = parse_ingredient_spec("Tofu:100; tofu:50;rice:20").unwrap();

        assert_eq!(parsed["tofu"], 150.0);
        assert_eq!(format_ingredient_spec(&parsed), "rice:20;tofu:150");
    }

    #[test]
    fn test_missing_user_file_is_empty_ledger() {
        let dir = temp_dir::TempDir::new().unwrap();

        let ledger = load_ingredients_or_empty(dir.child("user_ingredients.csv")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_diet_preferences_file_round_trip() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("diet_preferences.json");

        save_diet_preferences(&path, &DietPreferences::builtin()).unwrap();
        let loaded = load_diet_preferences(&path).unwrap();

        assert_eq!(loaded, DietPreferences::builtin());
    }
}
