mod unit;

pub use unit::*;

/// Canonical key for an ingredient or recipe name (trimmed, lowercase).
///
/// Every lookup that treats names case-insensitively goes through this.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Cheese "), "cheese");
        assert_eq!(normalize_name("Soy_Sauce"), "soy_sauce");
    }
}
