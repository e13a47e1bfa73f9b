//! Bulk ingredient intake: `name,quantity,unit` lines and random stock.

use std::str::FromStr;
use std::sync::LazyLock;

use larder_recipe::{IngredientLedger, LedgerEntry};
use larder_shared::Unit;
use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;
use strum::VariantArray;

/// Letters, spaces, apostrophes and hyphens.
pub static INGREDIENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\s'-]+$").expect("ingredient name pattern is valid")
});

pub const MAX_IMPORT_QUANTITY: u32 = 10_000;
pub const MAX_GENERATED_QUANTITY: u32 = 1_000;

const PANTRY: [&str; 40] = [
    "rice", "pasta", "quinoa", "oats", "flour", "bread", "tofu", "tempeh", "chicken", "beef",
    "salmon", "tuna", "eggs", "milk", "cheese", "yogurt", "butter", "olive oil", "lentils",
    "chickpeas", "black beans", "spinach", "broccoli", "carrots", "tomatoes", "onions", "garlic",
    "bell peppers", "zucchini", "mushrooms", "avocado", "lettuce", "potatoes", "sweet potatoes",
    "apples", "bananas", "almonds", "peanut butter", "honey", "soy sauce",
];

/// Parse and validate one import line.
pub fn parse_import_line(line: &str) -> Result<LedgerEntry, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, quantity, unit] = parts.as_slice() else {
        return Err(format!(
            "expected 'name,quantity,unit', got {} field(s)",
            parts.len()
        ));
    };

    if !INGREDIENT_NAME.is_match(name) {
        return Err(format!(
            "invalid ingredient name '{}': only letters, spaces, apostrophes and hyphens",
            name
        ));
    }
    let quantity: u32 = quantity
        .parse()
        .map_err(|_| format!("quantity '{}' is not a whole number", quantity))?;
    if !(1..=MAX_IMPORT_QUANTITY).contains(&quantity) {
        return Err(format!(
            "quantity {} out of range 1..={}",
            quantity, MAX_IMPORT_QUANTITY
        ));
    }
    let unit = Unit::from_str(unit).map_err(|_| {
        let known: Vec<&str> = Unit::VARIANTS.iter().map(|unit| unit.as_ref()).collect();
        format!("unknown unit '{}' (expected one of {})", unit, known.join(", "))
    })?;

    Ok(LedgerEntry {
        name: name.trim().to_string(),
        quantity: f64::from(quantity),
        unit,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStatus {
    pub line: usize,
    pub input: String,
    pub result: Result<LedgerEntry, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub lines: Vec<LineStatus>,
}

impl ImportReport {
    pub fn accepted(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.lines.iter().filter_map(|status| status.result.as_ref().ok())
    }

    pub fn rejected(&self) -> usize {
        self.lines.iter().filter(|status| status.result.is_err()).count()
    }
}

/// Validate every non-blank line; line numbers are 1-based.
pub fn import_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> ImportReport {
    let lines = lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| LineStatus {
            line: index + 1,
            input: line.trim().to_string(),
            result: parse_import_line(line),
        })
        .collect();
    ImportReport { lines }
}

/// Random stock drawn from a fixed pantry list, at most one entry per name.
pub fn generate_ingredients<R: Rng + ?Sized>(count: usize, rng: &mut R) -> IngredientLedger {
    PANTRY
        .choose_multiple(rng, count.min(PANTRY.len()))
        .map(|name| LedgerEntry {
            name: name.to_string(),
            quantity: f64::from(rng.random_range(1..=MAX_GENERATED_QUANTITY)),
            unit: *Unit::VARIANTS.choose(rng).unwrap_or(&Unit::Grams),
        })
        .collect()
}
