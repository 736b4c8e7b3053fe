//! Result records produced by the index calculator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Constituent with its most recent price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPrice {
    /// Constituent symbol.
    pub symbol: String,
    /// Constituent weight.
    pub weight: f64,
    /// Price on the last date of the table, `0.0` if the symbol is unknown.
    pub latest_price: f64,
}

/// Constituent ranked by market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Constituent symbol.
    pub symbol: String,
    /// Constituent weight.
    pub weight: f64,
    /// Price on the last date of the table.
    pub latest_price: f64,
    /// `weight * latest_price`.
    pub holding_value: f64,
}

impl From<LatestPrice> for Holding {
    fn from(latest: LatestPrice) -> Self {
        Self {
            holding_value: latest.weight * latest.latest_price,
            symbol: latest.symbol,
            weight: latest.weight,
            latest_price: latest.latest_price,
        }
    }
}

/// Index level on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexPricePoint {
    /// Price-table date.
    pub date: NaiveDate,
    /// Weighted sum of constituent prices on `date`.
    pub price: f64,
}
