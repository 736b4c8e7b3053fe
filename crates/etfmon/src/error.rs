//! Error type for the analysis pipeline.

use etfmon_basket::ParseError;
use etfmon_data::LoadError;
use thiserror::Error;

/// Heading placed above the list of validation failures.
const VALIDATION_HEADING: &str = "ETF data validation failed:";

/// Anything that stops an upload from producing a report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The price table could not be loaded
    #[error("Price data unavailable: {0}")]
    Load(#[from] LoadError),

    /// The upload is not a usable constituent file
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The constituents break one or more business rules
    #[error("{}", validation_detail(.0))]
    Validation(Vec<String>),

    /// Unexpected failure after validation passed
    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl AnalysisError {
    /// Whether the caller's input caused the failure.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Validation(_))
    }
}

/// Every validation message as a bulleted list under a heading.
pub fn validation_detail(errors: &[String]) -> String {
    let mut detail = String::from(VALIDATION_HEADING);
    for error in errors {
        detail.push_str("\n- ");
        detail.push_str(error);
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = AnalysisError::Validation(vec![
            "Duplicate symbols found: A".to_string(),
            "Invalid weight values detected:\n  - B: -0.1 (negative)".to_string(),
        ]);

        assert_eq!(
            err.to_string(),
            "ETF data validation failed:\n- Duplicate symbols found: A\n- Invalid weight values detected:\n  - B: -0.1 (negative)"
        );
    }

    #[test]
    fn test_parse_message_passes_through() {
        let err = AnalysisError::from(ParseError::Empty);
        assert_eq!(err.to_string(), "CSV file is empty");
    }

    #[rstest]
    #[case(AnalysisError::Parse(ParseError::Empty), true)]
    #[case(AnalysisError::Validation(vec![]), true)]
    #[case(AnalysisError::Load(LoadError::NotFound { path: "x.csv".into() }), false)]
    #[case(AnalysisError::Calculation("boom".to_string()), false)]
    fn test_client_error_classification(#[case] err: AnalysisError, #[case] expected: bool) {
        assert_eq!(err.is_client_error(), expected);
    }
}
