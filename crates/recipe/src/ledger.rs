use std::collections::BTreeMap;

use larder_shared::{Unit, convert_to_grams, normalize_name};
use serde::{Deserialize, Serialize};

use crate::{RecipeError, RecipeResult};

/// One stocked ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl LedgerEntry {
    pub fn grams(&self) -> f64 {
        convert_to_grams(self.quantity, self.unit)
    }
}

/// What is physically available, keyed by case-insensitive ingredient name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl IngredientLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Grams-equivalent stock of an ingredient, `None` when it is not stocked.
    pub fn available_grams(&self, name: &str) -> Option<f64> {
        self.get(name).map(LedgerEntry::grams)
    }

    pub fn upsert(&mut self, name: &str, quantity: f64, unit: Unit) -> RecipeResult<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RecipeError::ValidationError(
                "ingredient name must not be empty".to_string(),
            ));
        }
        if !(quantity >= 0.0 && quantity.is_finite()) {
            return Err(RecipeError::NegativeQuantity {
                name: trimmed.to_string(),
                quantity,
            });
        }
        self.entries.insert(
            normalize_name(trimmed),
            LedgerEntry {
                name: trimmed.to_string(),
                quantity,
                unit,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<LedgerEntry> {
        self.entries.remove(&normalize_name(name))
    }

    /// Take up to `grams` of an ingredient out of stock.
    ///
    /// The remainder stays in the entry's own unit and never drops below
    /// zero. Returns the grams actually taken.
    pub fn consume(&mut self, name: &str, grams: f64) -> f64 {
        let Some(entry) = self.entries.get_mut(&normalize_name(name)) else {
            return 0.0;
        };
        let available = entry.grams();
        let taken = grams.clamp(0.0, available);
        entry.quantity = entry.unit.from_grams(available - taken).max(0.0);
        taken
    }

    /// Layer `other` on top of this ledger; its entries win on name clashes.
    pub fn merge(&mut self, other: &IngredientLedger) {
        for (key, entry) in &other.entries {
            self.entries.insert(key.clone(), entry.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LedgerEntry> for IngredientLedger {
    fn from_iter<T: IntoIterator<Item = LedgerEntry>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| (normalize_name(&entry.name), entry))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_grams_converts_units() {
        let mut ledger = IngredientLedger::new();
        ledger.upsert("Milk", 2.0, Unit::Cups).unwrap();
        ledger.upsert("eggs", 3.0, Unit::Pieces).unwrap();

        assert_eq!(ledger.available_grams("milk"), Some(480.0));
        assert_eq!(ledger.available_grams("EGGS"), Some(300.0));
        assert_eq!(ledger.available_grams("cheese"), None);
    }

    #[test]
    fn test_upsert_rejects_negative_quantity() {
        let mut ledger = IngredientLedger::new();

        let result = ledger.upsert("garlic", -1.0, Unit::Grams);
        assert!(matches!(result, Err(RecipeError::NegativeQuantity { .. })));
        assert!(ledger.upsert("garlic", 0.0, Unit::Grams).is_ok());
    }

    #[test]
    fn test_consume_clamps_at_zero_and_keeps_unit() {
        let mut ledger = IngredientLedger::new();
        ledger.upsert("milk", 1.0, Unit::Cups).unwrap();

        assert_eq!(ledger.consume("milk", 120.0), 120.0);
        let entry = ledger.get("milk").unwrap();
        assert_eq!(entry.unit, Unit::Cups);
        assert!((entry.quantity - 0.5).abs() < 1e-9);

        assert_eq!(ledger.consume("milk", 500.0), 120.0);
        assert_eq!(ledger.get("milk").unwrap().quantity, 0.0);
        assert_eq!(ledger.consume("saffron", 10.0), 0.0);
    }

    #[test]
    fn test_merge_prefers_incoming_entries() {
        let mut main: IngredientLedger = [
            LedgerEntry {
                name: "Tofu".to_string(),
                quantity: 100.0,
                unit: Unit::Grams,
            },
            LedgerEntry {
                name: "rice".to_string(),
                quantity: 1.0,
                unit: Unit::Cups,
            },
        ]
        .into_iter()
        .collect();
        let mut user = IngredientLedger::new();
        user.upsert("tofu", 500.0, Unit::Grams).unwrap();

        main.merge(&user);

        assert_eq!(main.len(), 2);
        assert_eq!(main.available_grams("tofu"), Some(500.0));
    }
}
