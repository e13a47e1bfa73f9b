//! Flat-file persistence for the single-user application.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use larder_mealplan::WeeklyMealPlan;
use larder_recipe::{DietPreferences, IngredientLedger, RecipeCatalog, RecipeError, io as recipe_io};
use larder_shopping::{ShoppingError, ShortfallEntry, export};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::DataConfig;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Recipe data error: {0}")]
    Recipe(#[from] RecipeError),

    #[error("Grocery list error: {0}")]
    Shopping(#[from] ShoppingError),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// One entry of `user_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(rename = "dietaryGoal")]
    pub dietary_goal: String,
    #[serde(
        rename = "currentMealPlan",
        default,
        deserialize_with = "deserialize_stored_plan",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_meal_plan: Option<WeeklyMealPlan>,
    /// Diet the stored plan was generated for.
    #[serde(rename = "mealPlanDiet", default, skip_serializing_if = "Option::is_none")]
    pub meal_plan_diet: Option<String>,
}

/// An empty object or a partial grid reads as "no plan".
fn deserialize_stored_plan<'de, D>(deserializer: D) -> Result<Option<WeeklyMealPlan>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

impl UserData {
    /// The application is single-user: the first profile is the user.
    pub fn current(&self) -> Option<&UserProfile> {
        self.users.first()
    }

    pub fn current_mut(&mut self) -> Option<&mut UserProfile> {
        self.users.first_mut()
    }
}

/// Login account, kept apart from the profile in `users.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Accounts {
    #[serde(default)]
    users: Vec<UserAccount>,
}

/// Paths from config plus a lock that serializes every write.
///
/// Reads do not take the lock. Each `update_*` call holds it across the
/// read-modify-write so concurrent requests cannot lose each other's edits.
#[derive(Debug)]
pub struct DataStore {
    paths: DataConfig,
    lock: Mutex<()>,
}

impl DataStore {
    pub fn new(paths: DataConfig) -> Self {
        Self {
            paths,
            lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &DataConfig {
        &self.paths
    }

    fn path(&self, file: &str) -> PathBuf {
        self.paths.path(file)
    }

    async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn recipes(&self) -> Result<RecipeCatalog, DataError> {
        Ok(recipe_io::load_recipes(self.path(&self.paths.recipes_file))?)
    }

    pub fn main_ingredients(&self) -> Result<IngredientLedger, DataError> {
        Ok(recipe_io::load_ingredients(
            self.path(&self.paths.ingredients_file),
        )?)
    }

    pub fn user_ingredients(&self) -> Result<IngredientLedger, DataError> {
        Ok(recipe_io::load_ingredients_or_empty(
            self.path(&self.paths.user_ingredients_file),
        )?)
    }

    /// Main stock with the user's entries layered on top.
    pub fn merged_ingredients(&self) -> Result<IngredientLedger, DataError> {
        let mut ledger = self.main_ingredients()?;
        ledger.merge(&self.user_ingredients()?);
        Ok(ledger)
    }

    pub fn diet_preferences(&self) -> Result<DietPreferences, DataError> {
        Ok(recipe_io::load_diet_preferences(
            self.path(&self.paths.diet_preferences_file),
        )?)
    }

    pub fn user_data(&self) -> Result<UserData, DataError> {
        Ok(read_json_or_default(&self.path(&self.paths.user_data_file))?)
    }

    pub fn accounts(&self) -> Result<Vec<UserAccount>, DataError> {
        let accounts: Accounts = read_json_or_default(&self.path(&self.paths.users_file))?;
        Ok(accounts.users)
    }

    pub async fn save_diet_preferences(&self, preferences: &DietPreferences) -> Result<(), DataError> {
        let _guard = self.write_guard().await;
        recipe_io::save_diet_preferences(self.path(&self.paths.diet_preferences_file), preferences)?;
        Ok(())
    }

    pub async fn update_recipes<T, E>(
        &self,
        update: impl FnOnce(&mut RecipeCatalog) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DataError>,
    {
        let _guard = self.write_guard().await;
        let mut catalog = self.recipes()?;
        let out = update(&mut catalog)?;
        recipe_io::save_recipes(self.path(&self.paths.recipes_file), &catalog)
            .map_err(DataError::from)?;
        Ok(out)
    }

    pub async fn update_user_ingredients<T, E>(
        &self,
        update: impl FnOnce(&mut IngredientLedger) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DataError>,
    {
        let _guard = self.write_guard().await;
        let mut ledger = self.user_ingredients()?;
        let out = update(&mut ledger)?;
        recipe_io::save_ingredients(self.path(&self.paths.user_ingredients_file), &ledger)
            .map_err(DataError::from)?;
        Ok(out)
    }

    pub async fn update_user_data<T, E>(
        &self,
        update: impl FnOnce(&mut UserData) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DataError>,
    {
        let _guard = self.write_guard().await;
        let mut data = self.user_data()?;
        let out = update(&mut data)?;
        write_json(&self.path(&self.paths.user_data_file), &data)?;
        Ok(out)
    }

    pub async fn update_accounts<T, E>(
        &self,
        update: impl FnOnce(&mut Vec<UserAccount>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DataError>,
    {
        let _guard = self.write_guard().await;
        let mut accounts = Accounts {
            users: self.accounts()?,
        };
        let out = update(&mut accounts.users)?;
        write_json(&self.path(&self.paths.users_file), &accounts)?;
        Ok(out)
    }

    /// Write the plan to the user profile, `meal_plan.txt` and the grocery
    /// list in one locked step.
    #[tracing::instrument(skip_all, fields(shortfall = shortfall.len()))]
    pub async fn store_plan(
        &self,
        plan: &WeeklyMealPlan,
        shortfall: &[ShortfallEntry],
        diet: &str,
    ) -> Result<(), DataError> {
        let _guard = self.write_guard().await;

        let mut data = self.user_data()?;
        match data.current_mut() {
            Some(user) => {
                user.current_meal_plan = Some(plan.clone());
                user.meal_plan_diet = Some(diet.to_string());
            }
            None => data.users.push(UserProfile {
                name: String::new(),
                dietary_goal: diet.to_string(),
                current_meal_plan: Some(plan.clone()),
                meal_plan_diet: Some(diet.to_string()),
            }),
        }
        write_json(&self.path(&self.paths.user_data_file), &data)?;

        let text_path = self.path(&self.paths.meal_plan_file);
        fs::write(&text_path, plan.render_text()).map_err(|source| DataError::Io {
            path: text_path,
            source,
        })?;

        export::save_grocery_list(self.path(&self.paths.grocery_list_file), shortfall)?;

        tracing::info!(diet, "Stored meal plan and grocery list");
        Ok(())
    }

    /// Persist the ledger left over after a consuming plan run, main and
    /// user stock alike.
    pub async fn save_consumed_stock(&self, ledger: &IngredientLedger) -> Result<(), DataError> {
        let _guard = self.write_guard().await;

        let main = self.main_ingredients()?;
        let user = self.user_ingredients()?;
        let split = |source: &IngredientLedger| -> IngredientLedger {
            source
                .iter()
                .filter_map(|entry| ledger.get(&entry.name).cloned())
                .collect()
        };

        // user entries override main ones on merge, so they take the remainder
        let user_left = split(&user);
        let main_left: IngredientLedger = split(&main)
            .iter()
            .filter(|entry| !user_left.contains(&entry.name))
            .chain(main.iter().filter(|entry| user_left.contains(&entry.name)))
            .cloned()
            .collect();

        recipe_io::save_ingredients(self.path(&self.paths.ingredients_file), &main_left)?;
        recipe_io::save_ingredients(self.path(&self.paths.user_ingredients_file), &user_left)?;
        Ok(())
    }
}

fn read_json_or_default<T>(path: &Path) -> Result<T, DataError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(DataError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DataError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_shared::Unit;
    use temp_dir::TempDir;

    fn store(dir: &TempDir) -> DataStore {
        DataStore::new(DataConfig::new(dir.path()))
    }

    #[test]
    fn test_missing_optional_files_read_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.user_ingredients().unwrap().is_empty());
        assert_eq!(store.user_data().unwrap(), UserData::default());
        assert!(store.accounts().unwrap().is_empty());
        assert!(store.recipes().is_err());
    }

    #[test]
    fn test_empty_stored_plan_reads_as_none() {
        let json = r#"{"users":[{"name":"Sam","dietaryGoal":"keto","currentMealPlan":{}}]}"#;

        let data: UserData = serde_json::from_str(json).unwrap();

        let user = data.current().unwrap();
        assert_eq!(user.dietary_goal, "keto");
        assert!(user.current_meal_plan.is_none());
    }

    #[tokio::test]
    async fn test_stored_plan_keeps_its_diet() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .update_user_data(|data| -> Result<(), DataError> {
                data.users.push(UserProfile {
                    name: "Sam".to_string(),
                    dietary_goal: "vegan".to_string(),
                    current_meal_plan: None,
                    meal_plan_diet: None,
                });
                Ok(())
            })
            .await
            .unwrap();

        store
            .store_plan(&WeeklyMealPlan::default(), &[], "keto")
            .await
            .unwrap();

        let data = store.user_data().unwrap();
        let user = data.current().unwrap();
        assert_eq!(user.dietary_goal, "vegan");
        assert_eq!(user.meal_plan_diet.as_deref(), Some("keto"));
    }

    #[tokio::test]
    async fn test_user_ingredient_update_persists() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .update_user_ingredients(|ledger| -> Result<(), DataError> {
                ledger.upsert("Cheese", 200.0, Unit::Grams)?;
                Ok(())
            })
            .await
            .unwrap();

        let ledger = store.user_ingredients().unwrap();
        assert_eq!(ledger.available_grams("cheese"), Some(200.0));
    }

    #[tokio::test]
    async fn test_consumed_stock_split_by_source() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut main = IngredientLedger::new();
        main.upsert("tofu", 500.0, Unit::Grams).unwrap();
        main.upsert("rice", 300.0, Unit::Grams).unwrap();
        recipe_io::save_ingredients(dir.child("available_ingredients.csv"), &main).unwrap();
        let mut user = IngredientLedger::new();
        user.upsert("rice", 1000.0, Unit::Grams).unwrap();
        recipe_io::save_ingredients(dir.child("user_available_ingredients.csv"), &user).unwrap();

        let mut left = store.merged_ingredients().unwrap();
        left.consume("tofu", 200.0);
        left.consume("rice", 400.0);
        store.save_consumed_stock(&left).await.unwrap();

        let main = store.main_ingredients().unwrap();
        let user = store.user_ingredients().unwrap();
        assert_eq!(main.available_grams("tofu"), Some(300.0));
        assert_eq!(main.available_grams("rice"), Some(300.0));
        assert_eq!(user.available_grams("rice"), Some(600.0));
    }
}
