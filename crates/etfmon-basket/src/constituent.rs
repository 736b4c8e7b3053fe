//! Weighted index constituent.

use serde::{Deserialize, Serialize};

/// One symbol and its fractional allocation in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// Price-table symbol.
    pub symbol: String,
    /// Fraction of the index; expected in `[0, 1]`. May be NaN when the
    /// uploaded cell was blank.
    pub weight: f64,
}

impl Constituent {
    /// Create a new constituent.
    pub fn new(symbol: impl Into<String>, weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
        }
    }
}

/// Sum of all weights. NaN if any weight is NaN.
pub fn total_weight(constituents: &[Constituent]) -> f64 {
    constituents.iter().map(|c| c.weight).sum()
}
