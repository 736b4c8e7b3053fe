//! Load-once cache for the historical price table.

use super::table::PriceTable;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Somewhere a [`PriceTable`] can be read from.
pub trait PriceSource: Send + Sync + fmt::Debug {
    /// Read the full table.
    fn read_table(&self) -> Result<PriceTable>;

    /// Human-readable description for log output.
    fn describe(&self) -> String;
}

/// CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvFileSource {
    fn read_table(&self) -> Result<PriceTable> {
        PriceTable::from_csv_path(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Caches one [`PriceTable`] for the lifetime of the store.
///
/// The first call to [`snapshot`](Self::snapshot) or
/// [`known_symbols`](Self::known_symbols) loads the table; concurrent first
/// callers block on the same lock, so the source is read at most once. A
/// failed load leaves the cache empty and the next caller tries again.
#[derive(Debug)]
pub struct PriceStore {
    source: Box<dyn PriceSource>,
    cache: Mutex<Option<PriceTable>>,
}

impl PriceStore {
    /// Create a store over an arbitrary source. Nothing is read yet.
    pub fn new(source: impl PriceSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Mutex::new(None),
        }
    }

    /// Create a store reading a CSV file.
    pub fn from_csv(path: impl Into<PathBuf>) -> Self {
        Self::new(CsvFileSource::new(path))
    }

    /// Describe the underlying source.
    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// Read the source and replace the cached table.
    pub fn load(&self) -> Result<()> {
        let mut cache = self.cache.lock();
        *cache = Some(self.read_source()?);
        Ok(())
    }

    /// Whether a table has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cache.lock().is_some()
    }

    /// An independent copy of the cached table, loading it first if needed.
    pub fn snapshot(&self) -> Result<PriceTable> {
        self.with_table(PriceTable::clone)
    }

    /// Every symbol with a price column.
    pub fn known_symbols(&self) -> Result<BTreeSet<String>> {
        self.with_table(PriceTable::symbols)
    }

    fn with_table<T>(&self, f: impl FnOnce(&PriceTable) -> T) -> Result<T> {
        let mut cache = self.cache.lock();
        if let Some(table) = cache.as_ref() {
            return Ok(f(table));
        }

        debug!(source = %self.source.describe(), "Price table not cached yet");
        let table = cache.insert(self.read_source()?);
        Ok(f(&*table))
    }

    fn read_source(&self) -> Result<PriceTable> {
        let table = self.source.read_table()?;

        info!(
            "Loaded {} rows of price data from {}",
            table.height(),
            self.source.describe()
        );
        if let Some((first, last)) = table.date_range() {
            info!("Date range: {} to {}", first, last);
        }

        Ok(table)
    }
}
