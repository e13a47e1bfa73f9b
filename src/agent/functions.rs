use larder_db::{RecipeSearch, RecipeStore, StoreError};
use serde::Deserialize;
use serde_json::{Value, json};
use strum::IntoStaticStr;
use thiserror::Error;

use super::FunctionSchema;

/// Upper bound on `suggest_meal_plan` days.
const MAX_PLAN_DAYS: usize = 14;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("invalid function call: {0}")]
    InvalidCall(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Functions the model may call, with their arguments.
#[derive(Debug, Clone, PartialEq, Deserialize, IntoStaticStr)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentFunction {
    ExecuteSql {
        query: String,
    },
    FindRecipesByIngredients {
        #[serde(default)]
        available_ingredients: Vec<String>,
        diet: Option<String>,
    },
    AnalyzeNutritionalContent {
        recipe_name: String,
    },
    SuggestMealPlan {
        days: usize,
        diet: Option<String>,
        max_calories: Option<i64>,
        min_protein: Option<f64>,
    },
    CheckIngredientAvailability {
        recipe_name: String,
    },
    GetRecipeDetails {
        recipe_name: String,
    },
    SearchRecipes {
        query: Option<String>,
        diet: Option<String>,
        min_protein: Option<f64>,
        max_calories: Option<i64>,
        #[serde(default)]
        ingredients: Vec<String>,
    },
}

impl AgentFunction {
    /// Build from the name and JSON argument text of a model function call.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, serde_json::Error> {
        let arguments: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments)?
        };
        serde_json::from_value(json!({ "name": name, "arguments": arguments }))
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    #[tracing::instrument(skip(store), fields(function = self.name()))]
    pub async fn run(self, store: &RecipeStore) -> Result<Value, FunctionError> {
        let value = match self {
            AgentFunction::ExecuteSql { query } => {
                serde_json::to_value(store.execute_sql(&query).await?)
            }
            AgentFunction::FindRecipesByIngredients {
                available_ingredients,
                diet,
            } => serde_json::to_value(
                store
                    .find_recipes_by_ingredients(&available_ingredients, diet.as_deref())
                    .await?,
            ),
            AgentFunction::AnalyzeNutritionalContent { recipe_name } => {
                serde_json::to_value(store.analyze_nutritional_content(&recipe_name).await?)
            }
            AgentFunction::SuggestMealPlan {
                days,
                diet,
                max_calories,
                min_protein,
            } => serde_json::to_value(
                store
                    .suggest_meal_plan(
                        days.clamp(1, MAX_PLAN_DAYS),
                        diet.as_deref(),
                        max_calories,
                        min_protein,
                    )
                    .await?,
            ),
            AgentFunction::CheckIngredientAvailability { recipe_name } => {
                serde_json::to_value(store.check_ingredient_availability(&recipe_name).await?)
            }
            AgentFunction::GetRecipeDetails { recipe_name } => {
                serde_json::to_value(store.get_recipe_details(&recipe_name).await?)
            }
            AgentFunction::SearchRecipes {
                query,
                diet,
                min_protein,
                max_calories,
                ingredients,
            } => {
                let search = RecipeSearch {
                    text: query,
                    diet,
                    min_protein,
                    max_calories,
                    ingredients,
                };
                serde_json::to_value(store.search_recipes(&search).await?)
            }
        }?;
        Ok(value)
    }

    pub fn schemas() -> Vec<FunctionSchema> {
        let recipe_name = json!({
            "type": "object",
            "properties": {
                "recipe_name": {"type": "string", "description": "Name of the recipe"}
            },
            "required": ["recipe_name"]
        });

        vec![
            FunctionSchema {
                name: "execute_sql",
                description: "Run a read-only SQL query (SELECT or WITH) against the tables \
                    recipes(key, name, diet, calories, protein_g, carbs_g, fat_g), \
                    recipe_ingredients(recipe_key, ingredient_name, quantity) and \
                    ingredients(name, quantity, unit, grams, source)",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "SQL query to execute"}
                    },
                    "required": ["query"]
                }),
            },
            FunctionSchema {
                name: "find_recipes_by_ingredients",
                description: "Find recipes that use the given ingredients, or what is in stock when the list is empty",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "available_ingredients": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Ingredient names"
                        },
                        "diet": {"type": "string", "description": "Optional dietary restriction"}
                    },
                    "required": ["available_ingredients"]
                }),
            },
            FunctionSchema {
                name: "analyze_nutritional_content",
                description: "Get the macro breakdown of a recipe",
                parameters: recipe_name.clone(),
            },
            FunctionSchema {
                name: "suggest_meal_plan",
                description: "Pick random recipes for a number of days, three meals a day",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "days": {"type": "integer", "description": "Number of days to plan"},
                        "diet": {"type": "string", "description": "Dietary restriction"},
                        "max_calories": {"type": "integer", "description": "Maximum calories per meal"},
                        "min_protein": {"type": "number", "description": "Minimum protein per meal in grams"}
                    },
                    "required": ["days"]
                }),
            },
            FunctionSchema {
                name: "check_ingredient_availability",
                description: "Check which ingredients of a recipe are in stock and in what amount",
                parameters: recipe_name.clone(),
            },
            FunctionSchema {
                name: "get_recipe_details",
                description: "Get a recipe with its ingredients, stock availability and nutrition",
                parameters: recipe_name,
            },
            FunctionSchema {
                name: "search_recipes",
                description: "Search recipes by text, diet, protein floor, calorie ceiling or ingredients",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Text found in the recipe name or diet"},
                        "diet": {"type": "string"},
                        "min_protein": {"type": "number"},
                        "max_calories": {"type": "integer"},
                        "ingredients": {"type": "array", "items": {"type": "string"}}
                    }
                }),
            },
        ]
    }
}
