use std::collections::{BTreeMap, BTreeSet, HashMap};

use larder_shared::normalize_name;
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement, SimpleExpr, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::error::{StoreError, StoreResult};
use crate::store::RecipeStore;
use crate::table::{Ingredients, RecipeIngredients, Recipes};

const MEALS: [&str; 3] = ["breakfast", "lunch", "dinner"];

#[derive(Debug, Clone, FromRow)]
struct RecipeRow {
    key: String,
    name: String,
    diet: String,
    calories: i64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
}

#[derive(Debug, Clone, FromRow)]
struct RequirementRow {
    recipe_key: String,
    ingredient_name: String,
    quantity: f64,
}

#[derive(Debug, Clone, FromRow)]
struct StockRow {
    name: String,
    grams: f64,
    source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub name: String,
    pub diet: String,
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl From<RecipeRow> for RecipeSummary {
    fn from(row: RecipeRow) -> Self {
        Self {
            name: row.name,
            diet: row.diet,
            calories: row.calories,
            protein_g: row.protein_g,
            carbs_g: row.carbs_g,
            fat_g: row.fat_g,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientMatch {
    pub recipe_name: String,
    pub diet: String,
    pub matching_ingredients: usize,
    pub total_ingredients: usize,
    pub match_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionAnalysis {
    pub recipe_name: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Calories implied by the macros: protein and carbs at 4 kcal/g, fat at 9.
    pub total_calories: f64,
    pub protein_percentage: f64,
    pub carbs_percentage: f64,
    pub fat_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedDay {
    pub day: usize,
    pub meals: BTreeMap<String, RecipeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientStatus {
    pub ingredient: String,
    pub required_grams: f64,
    pub available_grams: f64,
    pub sources: Vec<String>,
    pub sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub recipe_name: String,
    pub available_ingredients: Vec<IngredientStatus>,
    pub missing_ingredients: Vec<IngredientStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetails {
    pub recipe: RecipeSummary,
    pub ingredients: BTreeMap<String, f64>,
    pub ingredient_availability: Availability,
    pub nutritional_analysis: NutritionAnalysis,
}

/// Criteria for [`RecipeStore::search_recipes`]. Every field narrows the
/// result; an empty query lists the whole catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeSearch {
    /// Substring of the recipe name or diet, case-insensitive.
    pub text: Option<String>,
    pub diet: Option<String>,
    pub min_protein: Option<f64>,
    pub max_calories: Option<i64>,
    /// Rank by the share of these ingredients each recipe uses.
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn recipe_select() -> SelectStatement {
    Query::select()
        .columns([
            Recipes::Key,
            Recipes::Name,
            Recipes::Diet,
            Recipes::Calories,
            Recipes::ProteinG,
            Recipes::CarbsG,
            Recipes::FatG,
        ])
        .from(Recipes::Table)
        .to_owned()
}

impl RecipeStore {
    async fn fetch_recipes(&self, statement: SelectStatement) -> StoreResult<Vec<RecipeRow>> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_all(self.pool())
            .await?)
    }

    async fn fetch_recipe(&self, name: &str) -> StoreResult<RecipeRow> {
        let statement = recipe_select()
            .and_where(Expr::col(Recipes::Key).eq(normalize_name(name)))
            .limit(1)
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::RecipeNotFound(name.to_string()))
    }

    /// Requirements grouped by recipe key. `None` loads every recipe.
    async fn requirements(
        &self,
        keys: Option<Vec<String>>,
    ) -> StoreResult<HashMap<String, BTreeMap<String, f64>>> {
        let mut statement = Query::select()
            .columns([
                RecipeIngredients::RecipeKey,
                RecipeIngredients::IngredientName,
                RecipeIngredients::Quantity,
            ])
            .from(RecipeIngredients::Table)
            .to_owned();
        if let Some(keys) = keys {
            statement.and_where(Expr::col(RecipeIngredients::RecipeKey).is_in(keys));
        }
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, RequirementRow, _>(&sql, values)
            .fetch_all(self.pool())
            .await?;

        let mut grouped: HashMap<String, BTreeMap<String, f64>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.recipe_key)
                .or_default()
                .insert(row.ingredient_name, row.quantity);
        }
        Ok(grouped)
    }

    async fn stock(&self) -> StoreResult<Vec<StockRow>> {
        let statement = Query::select()
            .columns([
                Ingredients::Name,
                Ingredients::Grams,
                Ingredients::Source,
            ])
            .from(Ingredients::Table)
            .order_by_expr(Expr::col(Ingredients::Name), Order::Asc)
            .to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, StockRow, _>(&sql, values)
            .fetch_all(self.pool())
            .await?)
    }

    /// Recipes using at least one of `ingredients`, best coverage first.
    ///
    /// An empty list matches against everything in stock, main and user.
    #[tracing::instrument(skip(self))]
    pub async fn find_recipes_by_ingredients(
        &self,
        ingredients: &[String],
        diet: Option<&str>,
    ) -> StoreResult<Vec<IngredientMatch>> {
        let wanted: BTreeSet<String> = if ingredients.is_empty() {
            self.stock().await?.into_iter().map(|row| row.name).collect()
        } else {
            ingredients.iter().map(|name| normalize_name(name)).collect()
        };

        let mut statement = recipe_select();
        if let Some(diet) = diet {
            statement.and_where(Expr::col(Recipes::Diet).eq(diet.to_lowercase()));
        }
        let recipes = self.fetch_recipes(statement).await?;
        let requirements = self.requirements(None).await?;

        let mut matches: Vec<IngredientMatch> = recipes
            .into_iter()
            .filter_map(|recipe| {
                let needed = requirements.get(&recipe.key)?;
                let matching = needed.keys().filter(|name| wanted.contains(*name)).count();
                (matching > 0).then(|| IngredientMatch {
                    recipe_name: recipe.name,
                    diet: recipe.diet,
                    matching_ingredients: matching,
                    total_ingredients: needed.len(),
                    match_percentage: percentage(matching, needed.len()),
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.match_percentage
                .total_cmp(&a.match_percentage)
                .then_with(|| a.recipe_name.cmp(&b.recipe_name))
        });
        Ok(matches)
    }

    #[tracing::instrument(skip(self))]
    pub async fn analyze_nutritional_content(&self, recipe: &str) -> StoreResult<NutritionAnalysis> {
        let row = self.fetch_recipe(recipe).await?;

        let protein_kcal = row.protein_g * 4.0;
        let carbs_kcal = row.carbs_g * 4.0;
        let fat_kcal = row.fat_g * 9.0;
        let total = protein_kcal + carbs_kcal + fat_kcal;
        let share = |kcal: f64| if total > 0.0 { round2(kcal / total * 100.0) } else { 0.0 };

        Ok(NutritionAnalysis {
            recipe_name: row.name,
            calories: row.calories,
            protein: row.protein_g,
            carbs: row.carbs_g,
            fat: row.fat_g,
            total_calories: round2(total),
            protein_percentage: share(protein_kcal),
            carbs_percentage: share(carbs_kcal),
            fat_percentage: share(fat_kcal),
        })
    }

    /// Random recipes meeting the per-meal limits, three to a day.
    ///
    /// Days run short when the filtered pool has fewer than `days * 3`
    /// recipes.
    #[tracing::instrument(skip(self))]
    pub async fn suggest_meal_plan(
        &self,
        days: usize,
        diet: Option<&str>,
        max_calories: Option<i64>,
        min_protein: Option<f64>,
    ) -> StoreResult<Vec<SuggestedDay>> {
        let mut statement = recipe_select();
        if let Some(diet) = diet {
            statement.and_where(Expr::col(Recipes::Diet).eq(diet.to_lowercase()));
        }
        if let Some(max_calories) = max_calories {
            statement.and_where(Expr::col(Recipes::Calories).lte(max_calories));
        }
        if let Some(min_protein) = min_protein {
            statement.and_where(Expr::col(Recipes::ProteinG).gte(min_protein));
        }
        statement
            .order_by_expr(SimpleExpr::FunctionCall(Func::random()), Order::Asc)
            .limit((days * MEALS.len()) as u64);

        let recipes = self.fetch_recipes(statement).await?;
        let mut plan: Vec<SuggestedDay> = Vec::new();
        for (i, recipe) in recipes.into_iter().enumerate() {
            let day = i / MEALS.len() + 1;
            if plan.last().map(|d| d.day) != Some(day) {
                plan.push(SuggestedDay {
                    day,
                    meals: BTreeMap::new(),
                });
            }
            if let Some(current) = plan.last_mut() {
                current
                    .meals
                    .insert(MEALS[i % MEALS.len()].to_string(), recipe.into());
            }
        }
        Ok(plan)
    }

    /// Required grams per ingredient against the summed main and user stock.
    #[tracing::instrument(skip(self))]
    pub async fn check_ingredient_availability(&self, recipe: &str) -> StoreResult<Availability> {
        let row = self.fetch_recipe(recipe).await?;
        let required = self
            .requirements(Some(vec![row.key.clone()]))
            .await?
            .remove(&row.key)
            .unwrap_or_default();

        let mut stock: HashMap<String, (f64, Vec<String>)> = HashMap::new();
        for item in self.stock().await? {
            let entry = stock.entry(item.name).or_default();
            entry.0 += item.grams;
            entry.1.push(item.source);
        }

        let mut availability = Availability {
            recipe_name: row.name,
            available_ingredients: Vec::new(),
            missing_ingredients: Vec::new(),
        };
        for (ingredient, required_grams) in required {
            match stock.get(&ingredient) {
                Some((grams, sources)) => availability.available_ingredients.push(IngredientStatus {
                    ingredient,
                    required_grams,
                    available_grams: *grams,
                    sources: sources.clone(),
                    sufficient: *grams >= required_grams,
                }),
                None => availability.missing_ingredients.push(IngredientStatus {
                    ingredient,
                    required_grams,
                    available_grams: 0.0,
                    sources: Vec::new(),
                    sufficient: false,
                }),
            }
        }
        Ok(availability)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_recipe_details(&self, recipe: &str) -> StoreResult<RecipeDetails> {
        let row = self.fetch_recipe(recipe).await?;
        let ingredients = self
            .requirements(Some(vec![row.key.clone()]))
            .await?
            .remove(&row.key)
            .unwrap_or_default();
        let ingredient_availability = self.check_ingredient_availability(recipe).await?;
        let nutritional_analysis = self.analyze_nutritional_content(recipe).await?;

        Ok(RecipeDetails {
            recipe: row.into(),
            ingredients,
            ingredient_availability,
            nutritional_analysis,
        })
    }

    /// Lowest calories first, or best ingredient coverage first when
    /// `ingredients` is set.
    #[tracing::instrument(skip(self))]
    pub async fn search_recipes(&self, search: &RecipeSearch) -> StoreResult<Vec<SearchHit>> {
        let mut statement = recipe_select();
        if let Some(text) = search.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let pattern = format!("%{}%", text.trim().to_lowercase());
            statement.and_where(Expr::cust_with_values(
                "(lower(name) LIKE ? OR diet LIKE ?)",
                [pattern.clone(), pattern],
            ));
        }
        if let Some(diet) = &search.diet {
            statement.and_where(Expr::col(Recipes::Diet).eq(diet.to_lowercase()));
        }
        if let Some(min_protein) = search.min_protein {
            statement.and_where(Expr::col(Recipes::ProteinG).gte(min_protein));
        }
        if let Some(max_calories) = search.max_calories {
            statement.and_where(Expr::col(Recipes::Calories).lte(max_calories));
        }
        statement
            .order_by_expr(Expr::col(Recipes::Calories), Order::Asc)
            .order_by_expr(Expr::col(Recipes::Name), Order::Asc);

        let recipes = self.fetch_recipes(statement).await?;
        if search.ingredients.is_empty() {
            return Ok(recipes
                .into_iter()
                .map(|recipe| SearchHit {
                    recipe: recipe.into(),
                    match_percentage: None,
                })
                .collect());
        }

        let wanted: BTreeSet<String> = search.ingredients.iter().map(|i| normalize_name(i)).collect();
        let requirements = self.requirements(None).await?;
        let mut hits: Vec<SearchHit> = recipes
            .into_iter()
            .map(|recipe| {
                let needed = requirements.get(&recipe.key);
                let total = needed.map_or(0, BTreeMap::len);
                let matching = needed.map_or(0, |n| n.keys().filter(|k| wanted.contains(*k)).count());
                SearchHit {
                    recipe: recipe.into(),
                    match_percentage: Some(percentage(matching, total)),
                }
            })
            .collect();
        // stable: ties keep the calorie order
        hits.sort_by(|a, b| {
            b.match_percentage
                .unwrap_or(0.0)
                .total_cmp(&a.match_percentage.unwrap_or(0.0))
        });
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds_to_two_places() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 2), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
    }
}
