//! CSV dataset loader with a per-path cache

use crate::error::{AttritionError, DataLoadError, Result};
use crate::types::table::Table;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Default dataset file name, resolved relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "HR-Employee-Attrition.csv";

/// Loader for delimited HR datasets.
///
/// Tables are memoized by path: loading the same path twice returns the same
/// `Arc<Table>` without re-reading the file.
pub struct DataLoader {
    /// Field delimiter
    delimiter: u8,
    /// Loaded tables keyed by the path they were read from
    cache: RwLock<HashMap<PathBuf, Arc<Table>>>,
}

impl DataLoader {
    /// Create a comma-delimited loader
    pub fn new() -> Self {
        Self::with_delimiter(b',')
    }

    /// Create a loader for a specific field delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a table, reusing the cached copy when this path was loaded before
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Table>> {
        let path = path.as_ref();

        {
            let cache = self
                .cache
                .read()
                .map_err(|e| AttritionError::Lock(e.to_string()))?;
            if let Some(table) = cache.get(path) {
                debug!(path = %path.display(), table_id = %table.id(), "Dataset cache hit");
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(self.read_csv(path)?);

        let mut cache = self
            .cache
            .write()
            .map_err(|e| AttritionError::Lock(e.to_string()))?;
        // Another caller may have raced us here; keep whichever table landed first
        let table = cache
            .entry(path.to_path_buf())
            .or_insert(table)
            .clone();

        Ok(table)
    }

    /// Number of cached tables
    pub fn cached_count(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Read and type a CSV file without consulting the cache
    pub fn read_csv(&self, path: &Path) -> Result<Table> {
        info!(path = %path.display(), "Loading dataset");

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DataLoadError::NotFound(path.to_path_buf()),
            _ => DataLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
            return Err(DataLoadError::Empty(path.to_path_buf()).into());
        }

        // Types are inferred over every row, so a single stray string keeps a column categorical
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_separator(self.delimiter))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| match e {
                PolarsError::NoData(_) => DataLoadError::Empty(path.to_path_buf()),
                other => DataLoadError::Parse {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            })?;
        if frame.width() == 0 {
            return Err(DataLoadError::Empty(path.to_path_buf()).into());
        }

        let table = Table::from_frame(frame)?;
        info!(
            path = %path.display(),
            rows = table.n_rows(),
            columns = table.n_columns(),
            table_id = %table.id(),
            "Dataset loaded"
        );

        Ok(table)
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}
