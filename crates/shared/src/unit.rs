use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

/// Units an ingredient quantity may be recorded in.
#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Grams,
    Ml,
    Pieces,
    Cups,
    Tablespoons,
}

impl Unit {
    /// Grams-equivalent of one unit.
    ///
    /// Liquids assume a density of 1 g/ml; a piece is a rough 100 g.
    pub fn grams_factor(self) -> f64 {
        match self {
            Unit::Grams => 1.0,
            Unit::Ml => 1.0,
            Unit::Pieces => 100.0,
            Unit::Cups => 240.0,
            Unit::Tablespoons => 15.0,
        }
    }

    /// Inverse of [`convert_to_grams`] for this unit.
    pub fn from_grams(self, grams: f64) -> f64 {
        grams / self.grams_factor()
    }
}

/// Convert a quantity to its grams-equivalent.
///
/// This is the only conversion table in the workspace: both the compatibility
/// check and the grocery reconciliation call it.
pub fn convert_to_grams(quantity: f64, unit: Unit) -> f64 {
    quantity * unit.grams_factor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_convert_to_grams_table() {
        assert_eq!(convert_to_grams(2.0, Unit::Cups), 480.0);
        assert_eq!(convert_to_grams(3.0, Unit::Tablespoons), 45.0);
        assert_eq!(convert_to_grams(2.0, Unit::Pieces), 200.0);
        assert_eq!(convert_to_grams(150.0, Unit::Ml), 150.0);
        assert_eq!(convert_to_grams(150.0, Unit::Grams), 150.0);
    }

    #[test]
    fn test_from_grams_inverts_conversion() {
        for unit in Unit::VARIANTS {
            let grams = convert_to_grams(4.0, *unit);
            assert!((unit.from_grams(grams) - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unit_parsing_is_case_insensitive() {
        assert_eq!(Unit::from_str("Cups").unwrap(), Unit::Cups);
        assert_eq!(Unit::from_str("ML").unwrap(), Unit::Ml);
        assert_eq!(Unit::from_str("tablespoons").unwrap(), Unit::Tablespoons);
        assert!(Unit::from_str("pounds").is_err());
    }

    #[test]
    fn test_unit_display_is_lowercase() {
        assert_eq!(Unit::Tablespoons.to_string(), "tablespoons");
        assert_eq!(serde_json::to_string(&Unit::Pieces).unwrap(), "\"pieces\"");
    }
}
