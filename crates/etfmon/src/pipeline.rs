//! Upload-to-report pipeline.

use crate::error::AnalysisError;
use etfmon_basket::{Constituent, ConstituentParser, ConstituentValidator};
use etfmon_calc::{DEFAULT_TOP_N, IndexCalculator};
use etfmon_data::PriceStore;
use etfmon_output::EtfReport;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs parse, validation and calculation for uploaded constituent files.
///
/// Cheap to clone; clones share the same [`PriceStore`].
#[derive(Debug, Clone)]
pub struct EtfAnalyzer {
    store: Arc<PriceStore>,
    parser: ConstituentParser,
    validator: ConstituentValidator,
    top_n: usize,
}

impl EtfAnalyzer {
    /// Create an analyzer reporting the default number of top holdings.
    pub const fn new(store: Arc<PriceStore>, validator: ConstituentValidator) -> Self {
        Self {
            store,
            parser: ConstituentParser::new(),
            validator,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Set how many top holdings each report carries.
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// The shared price store.
    pub const fn store(&self) -> &Arc<PriceStore> {
        &self.store
    }

    /// The validator applied to every upload.
    pub const fn validator(&self) -> &ConstituentValidator {
        &self.validator
    }

    /// Number of top holdings per report.
    pub const fn top_n(&self) -> usize {
        self.top_n
    }

    /// Whether the price table has been loaded.
    pub fn data_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// Parse an uploaded file and analyze its constituents.
    ///
    /// # Errors
    /// [`AnalysisError::Parse`] for a malformed file, otherwise as
    /// [`EtfAnalyzer::analyze`].
    pub fn analyze_csv(&self, content: &[u8], filename: &str) -> Result<EtfReport, AnalysisError> {
        let constituents = self.parser.parse(content, filename)?;
        self.analyze(&constituents)
    }

    /// Validate constituents and compute the report.
    ///
    /// All three views are computed from one price snapshot.
    ///
    /// # Errors
    /// [`AnalysisError::Load`] if the price table cannot be read and
    /// [`AnalysisError::Validation`] with every failed rule otherwise.
    pub fn analyze(&self, constituents: &[Constituent]) -> Result<EtfReport, AnalysisError> {
        let snapshot = self.store.snapshot()?;

        let validation = self
            .validator
            .validate_all(constituents, &snapshot.symbols());
        if !validation.ok {
            return Err(AnalysisError::Validation(validation.errors));
        }
        debug!("Validation passed for {} constituents", constituents.len());

        let calculator = IndexCalculator::new(snapshot);
        let report = EtfReport::success(
            calculator.latest_prices(constituents),
            calculator.index_series(constituents),
            calculator.top_holdings(constituents, Some(self.top_n)),
        );

        info!(
            "Analyzed ETF with {} constituents over {} dates",
            report.table_data.len(),
            report.time_series.len()
        );
        Ok(report)
    }
}
