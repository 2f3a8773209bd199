use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::types::RawTable;

/// Input collaborator: hands the pipeline a raw table. The core does not
/// know about file paths or encodings beyond this boundary.
pub trait Extractor {
    fn extract(&self) -> Result<RawTable>;
}

/// Reads a delimited file into a `RawTable`.
pub struct CsvExtractor {
    path: PathBuf,
}

impl CsvExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Extractor for CsvExtractor {
    fn extract(&self) -> Result<RawTable> {
        if !self.path.exists() {
            return Err(EtlError::MissingSource(self.path.clone()));
        }
        debug!("reading input file {}", self.path.display());

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        let table = RawTable::new(headers, rows);
        info!(
            rows = table.len(),
            "extraction complete for {}",
            self.path.display()
        );
        Ok(table)
    }
}
