use serde::{Deserialize, Serialize};

/// Daily nutritional goals for a diet. Absent values read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionalGoals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPreference {
    pub diet: String,
    pub nutritional_goals: NutritionalGoals,
}

/// The diet reference table, stored as `{"user_preferences": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DietPreferences {
    #[serde(rename = "user_preferences")]
    pub entries: Vec<DietPreference>,
}

impl DietPreferences {
    pub fn goals_for(&self, diet: &str) -> Option<&NutritionalGoals> {
        self.entries
            .iter()
            .find(|entry| entry.diet.trim().eq_ignore_ascii_case(diet.trim()))
            .map(|entry| &entry.nutritional_goals)
    }

    /// First entry, used when a user has not picked a diet.
    pub fn default_diet(&self) -> Option<&DietPreference> {
        self.entries.first()
    }

    pub fn diets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.diet.as_str())
    }

    /// Built-in table written by `larder preferences init`.
    pub fn builtin() -> Self {
        let entry = |diet: &str,
                     calories: f64,
                     protein: f64,
                     carbs: f64,
                     fat: f64,
                     fiber: Option<f64>| DietPreference {
            diet: diet.to_string(),
            nutritional_goals: NutritionalGoals {
                calories,
                protein,
                carbs,
                fat,
                fiber,
            },
        };

        Self {
            entries: vec![
                entry("vegetarian", 2000.0, 50.0, 250.0, 65.0, None),
                entry("vegan", 1800.0, 60.0, 220.0, 60.0, Some(30.0)),
                entry("keto", 1800.0, 120.0, 25.0, 140.0, None),
                entry("mediterranean", 2200.0, 70.0, 275.0, 73.0, None),
                entry("low-carb", 1900.0, 95.0, 100.0, 110.0, None),
                entry("bulking", 3000.0, 180.0, 350.0, 85.0, None),
                entry("cutting", 1600.0, 160.0, 140.0, 55.0, None),
            ],
        }
    }
}
