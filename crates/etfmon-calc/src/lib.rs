#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfmon/etfmon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calculator;
pub mod types;

pub use calculator::{DEFAULT_TOP_N, IndexCalculator};
pub use types::{Holding, IndexPricePoint, LatestPrice};
