//! Error types for price data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for price data operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while loading the historical price table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Price source does not exist
    #[error("Price file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source has no date column
    #[error("Price data must contain a '{column}' column. Found: {found:?}")]
    MissingDateColumn {
        /// Expected name of the date column
        column: &'static str,
        /// Columns that were present
        found: Vec<String>,
    },

    /// A date cell could not be parsed
    #[error("Invalid date '{value}' on row {row}")]
    InvalidDate {
        /// 1-based data row
        row: usize,
        /// Raw cell content
        value: String,
    },

    /// A price cell is missing or not numeric
    #[error("Invalid price '{value}' for {column} on row {row}")]
    InvalidPrice {
        /// 1-based data row
        row: usize,
        /// Symbol column
        column: String,
        /// Raw cell content
        value: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
