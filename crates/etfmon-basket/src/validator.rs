//! Business-rule validation for constituent lists.

use crate::constituent::{Constituent, total_weight};
use crate::error::InvalidTolerance;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Default acceptable deviation of the weight sum from 1.0.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 0.005;

/// Number of known symbols quoted in a missing-symbol message.
const SYMBOL_SAMPLE_SIZE: usize = 10;

/// Outcome of a single rule: `Err` carries the user-facing message.
pub type CheckResult = std::result::Result<(), String>;

/// Outcome of running every rule over a constituent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no rule failed.
    pub ok: bool,
    /// One message per failed rule, in rule order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    /// Every error, one per line.
    pub fn message(&self) -> String {
        self.errors.join("\n")
    }
}

/// Checks constituent lists against a universe of known symbols.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstituentValidator {
    tolerance: f64,
}

impl Default for ConstituentValidator {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_WEIGHT_TOLERANCE,
        }
    }
}

impl ConstituentValidator {
    /// Create a validator accepting weight sums within `1.0 ± tolerance`.
    ///
    /// # Errors
    /// Returns [`InvalidTolerance`] if `tolerance` is negative or not finite.
    pub fn new(tolerance: f64) -> Result<Self, InvalidTolerance> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    /// Configured tolerance.
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The list must have at least one constituent.
    pub fn non_empty(&self, constituents: &[Constituent]) -> CheckResult {
        if constituents.is_empty() {
            return Err("ETF must have at least one constituent.".to_string());
        }
        Ok(())
    }

    /// Every symbol must appear once. Lists each duplicated symbol, sorted.
    pub fn no_duplicates(&self, constituents: &[Constituent]) -> CheckResult {
        let mut seen = HashSet::new();
        let duplicates: BTreeSet<&str> = constituents
            .iter()
            .map(|c| c.symbol.as_str())
            .filter(|symbol| !seen.insert(*symbol))
            .collect();

        if duplicates.is_empty() {
            return Ok(());
        }
        Err(format!(
            "Duplicate symbols found: {}",
            duplicates.into_iter().collect::<Vec<_>>().join(", ")
        ))
    }

    /// Every weight must lie in `[0, 1]`.
    pub fn weight_ranges(&self, constituents: &[Constituent]) -> CheckResult {
        let invalid: Vec<String> = constituents
            .iter()
            .filter_map(|c| {
                if c.weight < 0.0 {
                    Some(format!("  - {}: {:?} (negative)", c.symbol, c.weight))
                } else if c.weight > 1.0 {
                    Some(format!("  - {}: {:?} (exceeds 100%)", c.symbol, c.weight))
                } else {
                    None
                }
            })
            .collect();

        if invalid.is_empty() {
            return Ok(());
        }
        Err(format!("Invalid weight values detected:\n{}", invalid.join("\n")))
    }

    /// Weights must sum to 1.0 within the tolerance. A NaN weight always fails.
    pub fn weights_sum(&self, constituents: &[Constituent]) -> CheckResult {
        let total = total_weight(constituents);
        let deviation = (total - 1.0).abs();

        if deviation.is_nan() || deviation > self.tolerance {
            return Err(format!(
                "Weight sum validation failed: weights sum to {:.4}, expected 1.0 ± {}. \
                 Please ensure all constituent weights add up to 100%.",
                total, self.tolerance
            ));
        }
        Ok(())
    }

    /// Every symbol must be priced. Lists the missing symbols and a sample of
    /// known ones.
    pub fn symbols_exist(
        &self,
        constituents: &[Constituent],
        known_symbols: &BTreeSet<String>,
    ) -> CheckResult {
        let mut missing: Vec<&str> = Vec::new();
        for constituent in constituents {
            let symbol = constituent.symbol.as_str();
            if !known_symbols.contains(symbol) && !missing.contains(&symbol) {
                missing.push(symbol);
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        let mut sample: Vec<&str> = known_symbols
            .iter()
            .take(SYMBOL_SAMPLE_SIZE)
            .map(String::as_str)
            .collect();
        if known_symbols.len() > SYMBOL_SAMPLE_SIZE {
            sample.push("...");
        }

        Err(format!(
            "The following symbols were not found in price data: {}. Available symbols: {}",
            missing.join(", "),
            sample.join(", ")
        ))
    }

    /// Run every rule and collect all failures.
    ///
    /// An empty list reports only the emptiness error. Otherwise duplicates,
    /// weight ranges, weight sum and symbol existence are all checked, in that
    /// order, without stopping at the first failure.
    pub fn validate_all(
        &self,
        constituents: &[Constituent],
        known_symbols: &BTreeSet<String>,
    ) -> ValidationResult {
        if let Err(msg) = self.non_empty(constituents) {
            warn!("ETF validation failed: empty constituent list");
            return ValidationResult::from_errors(vec![msg]);
        }

        let errors: Vec<String> = [
            self.no_duplicates(constituents),
            self.weight_ranges(constituents),
            self.weights_sum(constituents),
            self.symbols_exist(constituents, known_symbols),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            debug!("Validated {} constituents", constituents.len());
        } else {
            warn!(
                "ETF validation failed with {} error(s): {:?}",
                errors.len(),
                errors
            );
        }
        ValidationResult::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn list(items: &[(&str, f64)]) -> Vec<Constituent> {
        items.iter().map(|(s, w)| Constituent::new(*s, *w)).collect()
    }

    #[fixture]
    fn known() -> BTreeSet<String> {
        ["A", "B", "C", "D", "E"].into_iter().map(String::from).collect()
    }

    #[fixture]
    fn validator() -> ConstituentValidator {
        ConstituentValidator::default()
    }

    #[rstest]
    #[case(-0.1)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_tolerance(#[case] tolerance: f64) {
        assert!(ConstituentValidator::new(tolerance).is_err());
    }

    #[test]
    fn test_zero_tolerance_allowed() {
        let validator = ConstituentValidator::new(0.0).unwrap();
        assert_eq!(validator.tolerance(), 0.0);
        assert!(validator.weights_sum(&list(&[("A", 0.5), ("B", 0.5)])).is_ok());
    }

    #[rstest]
    fn test_non_empty(validator: ConstituentValidator) {
        let err = validator.non_empty(&[]).unwrap_err();
        assert_eq!(err, "ETF must have at least one constituent.");
        assert!(validator.non_empty(&list(&[("A", 1.0)])).is_ok());
    }

    #[rstest]
    fn test_no_duplicates_lists_each_sorted(validator: ConstituentValidator) {
        let constituents = list(&[("B", 0.1), ("A", 0.1), ("B", 0.1), ("A", 0.1), ("B", 0.1), ("C", 0.5)]);
        let err = validator.no_duplicates(&constituents).unwrap_err();
        assert_eq!(err, "Duplicate symbols found: A, B");
    }

    #[rstest]
    fn test_no_duplicates_is_case_sensitive(validator: ConstituentValidator) {
        assert!(validator.no_duplicates(&list(&[("a", 0.5), ("A", 0.5)])).is_ok());
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(0.5)]
    fn test_weight_bounds_inclusive(validator: ConstituentValidator, #[case] weight: f64) {
        assert!(validator.weight_ranges(&list(&[("A", weight)])).is_ok());
    }

    #[rstest]
    fn test_weight_ranges_enumerates_offenders(validator: ConstituentValidator) {
        let constituents = list(&[("A", 0.6), ("B", -0.1), ("C", 1.5)]);
        let err = validator.weight_ranges(&constituents).unwrap_err();

        assert_eq!(
            err,
            "Invalid weight values detected:\n  - B: -0.1 (negative)\n  - C: 1.5 (exceeds 100%)"
        );
    }

    #[rstest]
    #[case(-1e-20, "  - A: -1e-20 (negative)")]
    #[case(2.0, "  - A: 2.0 (exceeds 100%)")]
    #[case(1e21, "  - A: 1e21 (exceeds 100%)")]
    fn test_weight_ranges_formats_extreme_weights(
        validator: ConstituentValidator,
        #[case] weight: f64,
        #[case] line: &str,
    ) {
        let err = validator.weight_ranges(&list(&[("A", weight)])).unwrap_err();
        assert!(err.ends_with(line), "unexpected message: {err}");
    }

    #[rstest]
    #[case(&[("A", 0.5), ("B", 0.3), ("C", 0.2)])]
    #[case(&[("A", 0.3), ("B", 0.2), ("C", 0.25), ("D", 0.15), ("E", 0.1)])]
    #[case(&[("A", 0.996)])]
    #[case(&[("A", 1.004)])]
    fn test_weights_sum_within_tolerance(
        validator: ConstituentValidator,
        #[case] items: &[(&str, f64)],
    ) {
        assert!(validator.weights_sum(&list(items)).is_ok());
    }

    #[rstest]
    fn test_weights_sum_too_low(validator: ConstituentValidator) {
        let err = validator.weights_sum(&list(&[("A", 0.4), ("B", 0.3)])).unwrap_err();

        assert!(err.contains("0.7000"));
        assert!(err.contains("1.0"));
        assert!(err.contains("0.005"));
    }

    #[rstest]
    fn test_weights_sum_nan_always_fails(validator: ConstituentValidator) {
        let err = validator
            .weights_sum(&list(&[("A", 0.5), ("B", f64::NAN)]))
            .unwrap_err();
        assert!(err.contains("NaN"));
    }

    #[rstest]
    fn test_symbols_exist(validator: ConstituentValidator, known: BTreeSet<String>) {
        let constituents = list(&[("A", 0.5), ("UNKNOWN_SYMBOL", 0.3), ("ZZZ", 0.2)]);
        let err = validator.symbols_exist(&constituents, &known).unwrap_err();

        assert_eq!(
            err,
            "The following symbols were not found in price data: UNKNOWN_SYMBOL, ZZZ. \
             Available symbols: A, B, C, D, E"
        );
    }

    #[rstest]
    fn test_symbol_sample_truncated(validator: ConstituentValidator) {
        let known: BTreeSet<String> = (0..15).map(|i| format!("S{i:02}")).collect();
        let err = validator
            .symbols_exist(&list(&[("X", 1.0)]), &known)
            .unwrap_err();

        assert!(err.ends_with("S00, S01, S02, S03, S04, S05, S06, S07, S08, S09, ..."));
        assert!(!err.contains("S10"));
    }

    #[rstest]
    fn test_validate_all_valid(validator: ConstituentValidator, known: BTreeSet<String>) {
        let result = validator.validate_all(&list(&[("A", 0.5), ("B", 0.3), ("C", 0.2)]), &known);
        assert_eq!(result, ValidationResult { ok: true, errors: vec![] });
    }

    #[rstest]
    fn test_validate_all_empty_short_circuits(
        validator: ConstituentValidator,
        known: BTreeSet<String>,
    ) {
        let result = validator.validate_all(&[], &known);
        assert!(!result.ok);
        assert_eq!(result.errors, vec!["ETF must have at least one constituent."]);
    }

    #[rstest]
    fn test_validate_all_collects_in_order(
        validator: ConstituentValidator,
        known: BTreeSet<String>,
    ) {
        let constituents = list(&[("A", 0.3), ("B", -0.4), ("A", 0.3), ("NOPE", 0.2)]);
        let result = validator.validate_all(&constituents, &known);

        assert!(!result.ok);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("Duplicate symbols found: A"));
        assert!(result.errors[1].starts_with("Invalid weight values detected"));
        assert!(result.errors[2].starts_with("Weight sum validation failed"));
        assert!(result.errors[3].contains("NOPE"));
        assert_eq!(result.message().lines().next().unwrap(), result.errors[0]);
    }
}
