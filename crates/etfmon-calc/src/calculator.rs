//! Weighted-sum index over a price snapshot.

use crate::types::{Holding, IndexPricePoint, LatestPrice};
use etfmon_basket::Constituent;
use etfmon_data::PriceTable;
use polars::prelude::Float64Chunked;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Number of holdings returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

/// Computes index views for a constituent list against one price snapshot.
///
/// The calculator owns its snapshot, so every view derived from the same
/// calculator sees the same prices even if the backing store reloads.
#[derive(Debug, Clone)]
pub struct IndexCalculator {
    prices: PriceTable,
}

impl IndexCalculator {
    /// Create a calculator over a price snapshot.
    pub const fn new(prices: PriceTable) -> Self {
        Self { prices }
    }

    /// The snapshot this calculator reads from.
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Latest price for each constituent, in input order.
    ///
    /// Symbols absent from the price table get `0.0`.
    pub fn latest_prices(&self, constituents: &[Constituent]) -> Vec<LatestPrice> {
        constituents
            .iter()
            .map(|c| LatestPrice {
                symbol: c.symbol.clone(),
                weight: c.weight,
                latest_price: self.prices.latest_price(&c.symbol).unwrap_or(0.0),
            })
            .collect()
    }

    /// Index level on every date of the snapshot, oldest first.
    ///
    /// Each point is `Σ weight × price` over the constituents found in the
    /// table. Unknown symbols are left out of the sum.
    pub fn index_series(&self, constituents: &[Constituent]) -> Vec<IndexPricePoint> {
        let dates = self.prices.dates();
        let mut levels = vec![0.0; dates.len()];

        for constituent in constituents {
            let Some(column) = self.prices.prices(&constituent.symbol) else {
                warn!(
                    "Symbol {} not found in price data, excluded from index series",
                    constituent.symbol
                );
                continue;
            };
            accumulate(&mut levels, column, constituent.weight);
        }

        debug!(
            "Computed index series with {} points for {} constituents",
            levels.len(),
            constituents.len()
        );

        dates
            .into_iter()
            .zip(levels)
            .map(|(date, price)| IndexPricePoint { date, price })
            .collect()
    }

    /// The `top_n` largest positions by `weight × latest price`.
    ///
    /// `None` means [`DEFAULT_TOP_N`]. Ties keep input order. A NaN value
    /// ranks below every number.
    pub fn top_holdings(&self, constituents: &[Constituent], top_n: Option<usize>) -> Vec<Holding> {
        let top_n = top_n.unwrap_or(DEFAULT_TOP_N);

        let mut holdings: Vec<Holding> = self
            .latest_prices(constituents)
            .into_iter()
            .map(Holding::from)
            .collect();

        holdings.sort_by(|a, b| descending(a.holding_value, b.holding_value));
        holdings.truncate(top_n);
        holdings
    }
}

/// Add `weight × price` to each level. A null price contributes NaN.
fn accumulate(levels: &mut [f64], column: &Float64Chunked, weight: f64) {
    for (level, price) in levels.iter_mut().zip(column) {
        *level += weight * price.unwrap_or(f64::NAN);
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    let rank = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
    rank(b).total_cmp(&rank(a))
}
