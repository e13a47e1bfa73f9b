use thiserror::Error;

pub type RecipeResult<T> = Result<T, RecipeError>;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Recipe already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid quantity {quantity} for ingredient '{name}': must be zero or more")]
    NegativeQuantity { name: String, quantity: f64 },

    #[error("Malformed row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
