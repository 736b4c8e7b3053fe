//! Date-ordered price table backed by a polars `DataFrame`.

use crate::error::{LoadError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Name of the date column in every price table.
pub const DATE_COLUMN: &str = "DATE";

/// Date formats accepted for the date column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Datetime formats accepted for the date column; the time part is dropped.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Historical prices with one row per date and one `Float64` column per symbol.
///
/// Rows are sorted ascending by date, so the last row always holds the most
/// recent prices. Cloning is cheap: polars shares column buffers and copies
/// them on write, so a clone can be mutated without touching the original.
#[derive(Debug, Clone)]
pub struct PriceTable {
    frame: DataFrame,
}

impl PriceTable {
    /// Read a price table from a CSV file.
    ///
    /// # Errors
    /// Returns [`LoadError::NotFound`] if the file does not exist, and any
    /// error [`PriceTable::from_csv_reader`] can produce.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Read a price table from CSV data.
    ///
    /// The header must contain a `DATE` column; every other column is a symbol
    /// whose cells must all be numeric. Rows are sorted by date (stable, so
    /// rows sharing a date keep their file order).
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let date_idx = headers
            .iter()
            .position(|h| h == DATE_COLUMN)
            .ok_or_else(|| LoadError::MissingDateColumn {
                column: DATE_COLUMN,
                found: headers.clone(),
            })?;

        let mut dates: Vec<String> = Vec::new();
        let mut prices: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;

            for (col_idx, raw) in record.iter().enumerate() {
                if col_idx == date_idx {
                    let date = parse_date(raw).ok_or_else(|| LoadError::InvalidDate {
                        row,
                        value: raw.to_string(),
                    })?;
                    dates.push(date.format("%Y-%m-%d").to_string());
                } else {
                    let price = raw
                        .parse::<f64>()
                        .ok()
                        .filter(|p| p.is_finite())
                        .ok_or_else(|| LoadError::InvalidPrice {
                            row,
                            column: headers[col_idx].clone(),
                            value: raw.to_string(),
                        })?;
                    prices[col_idx].push(price);
                }
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
        for (col_idx, (name, values)) in headers.iter().zip(prices).enumerate() {
            if col_idx == date_idx {
                columns.push(Series::new(DATE_COLUMN.into(), std::mem::take(&mut dates)).into());
            } else {
                columns.push(Series::new(name.as_str().into(), values).into());
            }
        }

        // Date strings are normalized to ISO form above, so the cast is exact
        let frame = DataFrame::new(columns)?
            .lazy()
            .with_column(col(DATE_COLUMN).cast(DataType::Date))
            .sort(
                [DATE_COLUMN],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        Ok(Self { frame })
    }

    /// The underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Mutable access to the underlying frame.
    ///
    /// Only this table is affected; other snapshots keep their own data.
    pub const fn frame_mut(&mut self) -> &mut DataFrame {
        &mut self.frame
    }

    /// Consume the table, returning the frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of dates (rows).
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// All symbol columns, i.e. every column except `DATE`.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != DATE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether `symbol` has a price column.
    pub fn contains(&self, symbol: &str) -> bool {
        symbol != DATE_COLUMN && self.frame.column(symbol).is_ok()
    }

    /// Row dates in table order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let Ok(column) = self.frame.column(DATE_COLUMN) else {
            return Vec::new();
        };
        let Ok(strings) = column.cast(&DataType::String) else {
            return Vec::new();
        };
        let Ok(strings) = strings.str() else {
            return Vec::new();
        };

        strings
            .into_iter()
            .flatten()
            .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .collect()
    }

    /// Price column for `symbol`, or `None` if the symbol is unknown.
    pub fn prices(&self, symbol: &str) -> Option<&Float64Chunked> {
        if symbol == DATE_COLUMN {
            return None;
        }
        self.frame.column(symbol).ok()?.f64().ok()
    }

    /// Price of `symbol` on the most recent date.
    pub fn latest_price(&self, symbol: &str) -> Option<f64> {
        let prices = self.prices(symbol)?;
        let last = prices.len().checked_sub(1)?;
        prices.get(last)
    }

    /// First and last date in the table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        Some((*dates.first()?, *dates.last()?))
    }
}

/// Parse a date cell in any of the supported formats.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
