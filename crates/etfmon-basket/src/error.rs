//! Error types for constituent parsing.

use thiserror::Error;

/// Result type for constituent parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Structural problems with an uploaded constituent file.
///
/// These are always caused by the caller's input and carry enough detail to
/// fix it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The content is not UTF-8 or not a delimited table
    #[error("Invalid CSV format: {0}")]
    FormatInvalid(String),

    /// Header names that appear more than once
    #[error("CSV contains duplicate columns: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    /// `name` or `weight` is absent; holds the columns that were found
    #[error("CSV must contain 'name' and 'weight' columns. Found: {0:?}")]
    MissingColumns(Vec<String>),

    /// Header present but no data rows
    #[error("CSV file is empty")]
    Empty,

    /// A weight cell that is neither blank nor a number
    #[error("All weights must be numeric values. Row {row} has weight '{value}'")]
    NonNumericWeight {
        /// 1-based data row
        row: usize,
        /// Raw cell content
        value: String,
    },
}

/// Rejected weight-sum tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Weight tolerance must be a finite, non-negative number, got {0}")]
pub struct InvalidTolerance(pub f64);
