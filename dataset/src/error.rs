//! Dataset error types.

use thiserror::Error;

/// Errors raised while loading or querying the property dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("IO error: {0}")]
    Io(String),
    /// The statement is not a single read-only query.
    #[error("Query rejected: {0}")]
    Rejected(String),
}

impl From<sqlx::Error> for DatasetError {
    fn from(e: sqlx::Error) -> Self {
        DatasetError::Database(e.to_string())
    }
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        DatasetError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        DatasetError::Io(e.to_string())
    }
}
