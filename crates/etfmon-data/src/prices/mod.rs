//! Historical price table and its process-wide cache.

pub mod store;
pub mod table;

pub use store::{CsvFileSource, PriceSource, PriceStore};
pub use table::{DATE_COLUMN, PriceTable};
