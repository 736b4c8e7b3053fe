#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfmon/etfmon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod constituent;
pub mod error;
pub mod parser;
pub mod validator;

pub use constituent::{Constituent, total_weight};
pub use error::{InvalidTolerance, ParseError, Result};
pub use parser::{ConstituentParser, NAME_COLUMN, WEIGHT_COLUMN};
pub use validator::{
    CheckResult, ConstituentValidator, DEFAULT_WEIGHT_TOLERANCE, ValidationResult,
};
