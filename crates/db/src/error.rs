use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Recipe '{0}' not found")]
    RecipeNotFound(String),

    #[error("Rejected query: {0}")]
    ReadOnly(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
