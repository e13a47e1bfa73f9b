//! `grocery_list.csv`: header `ingredient,missing_amount`, amounts written as
//! grams with a `g` suffix (`500g`).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ShoppingResult;
use crate::reconcile::ShortfallEntry;

#[derive(Debug, Serialize, Deserialize)]
struct GroceryRecord {
    ingredient: String,
    missing_amount: String,
}

/// `500.0` -> `500g`, `12.345` -> `12.35g`.
pub fn format_amount(grams: f64) -> String {
    let rounded = (grams * 100.0).round() / 100.0;
    format!("{}g", rounded)
}

pub fn write_grocery_csv<W: Write>(entries: &[ShortfallEntry], writer: W) -> ShoppingResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        writer.write_record(["ingredient", "missing_amount"])?;
    }
    for entry in entries {
        writer.serialize(GroceryRecord {
            ingredient: entry.ingredient.clone(),
            missing_amount: format_amount(entry.missing_amount),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Ingredient to amount string, as written.
pub fn read_grocery_csv<R: Read>(reader: R) -> ShoppingResult<BTreeMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut list = BTreeMap::new();
    for record in reader.deserialize() {
        let record: GroceryRecord = record?;
        list.insert(record.ingredient, record.missing_amount);
    }
    Ok(list)
}

pub fn save_grocery_list(path: impl AsRef<Path>, entries: &[ShortfallEntry]) -> ShoppingResult<()> {
    write_grocery_csv(entries, File::create(path)?)
}

/// A missing file is an empty list.
pub fn load_grocery_list(path: impl AsRef<Path>) -> ShoppingResult<BTreeMap<String, String>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no grocery list yet");
        return Ok(BTreeMap::new());
    }
    read_grocery_csv(File::open(path)?)
}
