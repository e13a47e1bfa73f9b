use std::collections::{BTreeMap, BTreeSet, HashMap};

use larder_shared::normalize_name;

use crate::{Recipe, RecipeError, RecipeResult};

/// Recipes in load order, indexed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    index: HashMap<String, usize>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting invalid recipes and duplicate names.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> RecipeResult<Self> {
        let mut catalog = Self::new();
        for recipe in recipes {
            catalog.insert(recipe)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.index
            .get(&normalize_name(name))
            .map(|position| &self.recipes[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    pub fn insert(&mut self, recipe: Recipe) -> RecipeResult<()> {
        recipe.validate()?;
        let key = normalize_name(&recipe.name);
        if self.index.contains_key(&key) {
            return Err(RecipeError::AlreadyExists(recipe.name));
        }
        self.index.insert(key, self.recipes.len());
        self.recipes.push(recipe);
        Ok(())
    }

    /// Insert or replace the recipe with the same name, keeping its position.
    pub fn upsert(&mut self, recipe: Recipe) -> RecipeResult<()> {
        recipe.validate()?;
        match self.index.get(&normalize_name(&recipe.name)) {
            Some(position) => {
                self.recipes[*position] = recipe;
                Ok(())
            }
            None => self.insert(recipe),
        }
    }

    pub fn remove(&mut self, name: &str) -> RecipeResult<Recipe> {
        let position = self
            .index
            .remove(&normalize_name(name))
            .ok_or_else(|| RecipeError::NotFound(name.to_string()))?;
        let removed = self.recipes.remove(position);
        self.reindex();
        Ok(removed)
    }

    fn reindex(&mut self) {
        self.index = self
            .recipes
            .iter()
            .enumerate()
            .map(|(position, recipe)| (normalize_name(&recipe.name), position))
            .collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn by_diet<'a>(&'a self, diet: &'a str) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.recipes.iter().filter(move |r| r.matches_diet(diet))
    }

    /// Distinct diet tags, lowercase and sorted.
    pub fn diets(&self) -> BTreeSet<String> {
        self.recipes.iter().map(|r| normalize_name(&r.diet)).collect()
    }

    /// Recipe name to recipe, the shape the HTTP API returns.
    pub fn to_map(&self) -> BTreeMap<String, Recipe> {
        self.recipes
            .iter()
            .map(|r| (r.name.clone(), r.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, diet: &str) -> Recipe {
        Recipe {
            name: name.to_string(),
            diet: diet.to_string(),
            ingredients: BTreeMap::from([("tofu".to_string(), 200.0)]),
            calories: 300,
            protein_g: 20.0,
            carbs_g: 10.0,
            fat_g: 10.0,
            is_double_portion: false,
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = RecipeCatalog::from_recipes([recipe("Vegan Buddha Bowl", "vegan")]).unwrap();

        assert!(catalog.get("vegan buddha bowl").is_some());
        assert!(catalog.contains("VEGAN BUDDHA BOWL"));
        assert!(catalog.get("Buddha").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicate_names() {
        let mut catalog = RecipeCatalog::from_recipes([recipe("Tofu Scramble", "vegan")]).unwrap();

        let result = catalog.insert(recipe("tofu scramble", "vegan"));
        assert!(matches!(result, Err(RecipeError::AlreadyExists(_))));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut catalog = RecipeCatalog::from_recipes([
            recipe("A", "vegan"),
            recipe("B", "keto"),
            recipe("C", "vegan"),
        ])
        .unwrap();

        catalog.remove("a").unwrap();

        assert_eq!(catalog.get("C").unwrap().name, "C");
        assert_eq!(catalog.get("B").unwrap().diet, "keto");
        assert!(matches!(catalog.remove("a"), Err(RecipeError::NotFound(_))));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut catalog =
            RecipeCatalog::from_recipes([recipe("A", "vegan"), recipe("B", "vegan")]).unwrap();

        let mut updated = recipe("a", "keto");
        updated.calories = 999;
        catalog.upsert(updated).unwrap();

        let names: Vec<_> = catalog.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "B"]);
        assert_eq!(catalog.get("A").unwrap().calories, 999);
    }

    #[test]
    fn test_by_diet_and_diets() {
        let catalog = RecipeCatalog::from_recipes([
            recipe("A", "Vegan"),
            recipe("B", "keto"),
            recipe("C", "vegan"),
        ])
        .unwrap();

        assert_eq!(catalog.by_diet("vegan").count(), 2);
        assert_eq!(
            catalog.diets().into_iter().collect::<Vec<_>>(),
            vec!["keto".to_string(), "vegan".to_string()]
        );
    }
}
