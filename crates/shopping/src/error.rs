use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShoppingError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ShoppingResult<T> = Result<T, ShoppingError>;
