#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfmon/etfmon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prices;

pub use error::{LoadError, Result};
pub use prices::{CsvFileSource, DATE_COLUMN, PriceSource, PriceStore, PriceTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
