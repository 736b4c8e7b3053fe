#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfmon/etfmon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use etfmon_basket as basket;
pub use etfmon_calc as calc;
pub use etfmon_data as data;
pub use etfmon_output as output;

pub use error::AnalysisError;
pub use pipeline::EtfAnalyzer;

// Re-export the types most callers need
pub use etfmon_basket::{
    Constituent, ConstituentParser, ConstituentValidator, DEFAULT_WEIGHT_TOLERANCE, ParseError,
    ValidationResult,
};
pub use etfmon_calc::{DEFAULT_TOP_N, Holding, IndexCalculator, IndexPricePoint, LatestPrice};
pub use etfmon_data::{LoadError, PriceStore, PriceTable};
pub use etfmon_output::{EtfReport, ExportFormat, export_report};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
