use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table, TableCreateStatement};
use sqlx::SqlitePool;

use crate::error::StoreResult;
use crate::table::{Ingredients, RecipeIngredients, Recipes};

fn create_recipes() -> TableCreateStatement {
    Table::create()
        .table(Recipes::Table)
        .if_not_exists()
        .col(ColumnDef::new(Recipes::Key).string().not_null().primary_key())
        .col(ColumnDef::new(Recipes::Name).string().not_null())
        .col(ColumnDef::new(Recipes::Diet).string().not_null())
        .col(ColumnDef::new(Recipes::Calories).integer().not_null())
        .col(ColumnDef::new(Recipes::ProteinG).double().not_null())
        .col(ColumnDef::new(Recipes::CarbsG).double().not_null())
        .col(ColumnDef::new(Recipes::FatG).double().not_null())
        .to_owned()
}

fn create_recipe_ingredients() -> TableCreateStatement {
    Table::create()
        .table(RecipeIngredients::Table)
        .if_not_exists()
        .col(ColumnDef::new(RecipeIngredients::RecipeKey).string().not_null())
        .col(ColumnDef::new(RecipeIngredients::IngredientName).string().not_null())
        .col(ColumnDef::new(RecipeIngredients::Quantity).double().not_null())
        .primary_key(
            Index::create()
                .col(RecipeIngredients::RecipeKey)
                .col(RecipeIngredients::IngredientName),
        )
        .to_owned()
}

/// Main and user stock live side by side, told apart by `source`.
fn create_ingredients() -> TableCreateStatement {
    Table::create()
        .table(Ingredients::Table)
        .if_not_exists()
        .col(ColumnDef::new(Ingredients::Name).string().not_null())
        .col(ColumnDef::new(Ingredients::Quantity).double().not_null())
        .col(ColumnDef::new(Ingredients::Unit).string().not_null())
        .col(ColumnDef::new(Ingredients::Grams).double().not_null())
        .col(ColumnDef::new(Ingredients::Source).string().not_null())
        .primary_key(
            Index::create()
                .col(Ingredients::Name)
                .col(Ingredients::Source),
        )
        .to_owned()
}

pub(crate) async fn create_tables(pool: &SqlitePool) -> StoreResult<()> {
    for statement in [create_recipes(), create_recipe_ingredients(), create_ingredients()] {
        let sql = statement.to_string(SqliteQueryBuilder);
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}
