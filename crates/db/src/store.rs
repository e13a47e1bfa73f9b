use std::collections::BTreeMap;
use std::str::FromStr;

use larder_recipe::{IngredientLedger, RecipeCatalog};
use larder_shared::normalize_name;
use sea_query::{Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StoreResult;
use crate::schema::create_tables;
use crate::table::{Ingredients, RecipeIngredients, Recipes};

/// Which ingredient file a stock row was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSource {
    Main,
    User,
}

impl StockSource {
    pub fn as_str(self) -> &'static str {
        match self {
            StockSource::Main => "main",
            StockSource::User => "user",
        }
    }
}

/// In-memory SQL view of the catalog and the ingredient files.
///
/// Constructed explicitly at startup and passed to whoever queries it. The
/// pool holds a single connection that never expires: every connection to
/// `sqlite::memory:` is its own database.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    pool: SqlitePool,
}

impl RecipeStore {
    pub async fn open() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        create_tables(&pool).await?;
        tracing::info!("Created in-memory recipe store");

        Ok(Self { pool })
    }

    /// Open and fill from the catalog and both stock ledgers.
    pub async fn load(
        catalog: &RecipeCatalog,
        main: &IngredientLedger,
        user: &IngredientLedger,
    ) -> StoreResult<Self> {
        let store = Self::open().await?;
        store.replace_recipes(catalog).await?;
        store.replace_ingredients(main, user).await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[tracing::instrument(skip_all, fields(recipes = catalog.len()))]
    pub async fn replace_recipes(&self, catalog: &RecipeCatalog) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            Query::delete().from_table(Recipes::Table).to_owned(),
            Query::delete().from_table(RecipeIngredients::Table).to_owned(),
        ] {
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        for recipe in catalog.iter() {
            let key = recipe.key();
            let statement = Query::insert()
                .into_table(Recipes::Table)
                .columns([
                    Recipes::Key,
                    Recipes::Name,
                    Recipes::Diet,
                    Recipes::Calories,
                    Recipes::ProteinG,
                    Recipes::CarbsG,
                    Recipes::FatG,
                ])
                .values_panic([
                    key.clone().into(),
                    recipe.name.to_owned().into(),
                    recipe.diet.to_lowercase().into(),
                    i64::from(recipe.calories).into(),
                    recipe.protein_g.into(),
                    recipe.carbs_g.into(),
                    recipe.fat_g.into(),
                ])
                .to_owned();
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;

            let mut requirements = BTreeMap::new();
            for (ingredient, quantity) in &recipe.ingredients {
                *requirements.entry(normalize_name(ingredient)).or_insert(0.0) += quantity;
            }
            for (ingredient, quantity) in requirements {
                let statement = Query::insert()
                    .into_table(RecipeIngredients::Table)
                    .columns([
                        RecipeIngredients::RecipeKey,
                        RecipeIngredients::IngredientName,
                        RecipeIngredients::Quantity,
                    ])
                    .values_panic([
                        key.clone().into(),
                        ingredient.into(),
                        quantity.into(),
                    ])
                    .to_owned();
                let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
                sqlx::query_with(&sql, values).execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(main = main.len(), user = user.len()))]
    pub async fn replace_ingredients(
        &self,
        main: &IngredientLedger,
        user: &IngredientLedger,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let statement = Query::delete().from_table(Ingredients::Table).to_owned();
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        for (ledger, source) in [(main, StockSource::Main), (user, StockSource::User)] {
            for entry in ledger.iter() {
                let statement = Query::insert()
                    .into_table(Ingredients::Table)
                    .columns([
                        Ingredients::Name,
                        Ingredients::Quantity,
                        Ingredients::Unit,
                        Ingredients::Grams,
                        Ingredients::Source,
                    ])
                    .values_panic([
                        normalize_name(&entry.name).into(),
                        entry.quantity.into(),
                        entry.unit.to_string().into(),
                        entry.grams().into(),
                        source.as_str().into(),
                    ])
                    .to_owned();
                let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
                sqlx::query_with(&sql, values).execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Closed in-memory recipe store");
    }
}
