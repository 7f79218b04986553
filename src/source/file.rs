//! Perfdata file reader.
//!
//! Reads a tab-separated perfdata file into [`RawRecord`]s, failing fast on
//! the first malformed line.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use super::record::RawRecord;
use crate::error::LoadError;

/// A perfdata file on disk.
#[derive(Debug, Clone)]
pub struct PerfdataFile {
    path: PathBuf,
    description: String,
}

impl PerfdataFile {
    /// Create a reader for the given path. Nothing is opened until [`load`](Self::load).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a human-readable description of the source.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Read every line of the file, in order.
    pub fn load(&self) -> Result<Vec<RawRecord>, LoadError> {
        let file = File::open(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records = read_records(file)?;
        tracing::debug!(source = %self.description, records = records.len(), "perfdata loaded");
        Ok(records)
    }
}

/// Parse perfdata lines from any reader.
///
/// Blank lines are skipped. Quote characters carry no meaning in perfdata
/// output, so quoting is disabled and every tab is a field separator.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let fields = result.map_err(|source| LoadError::Tsv {
            line: source.position().map_or(0, |p| p.line()),
            source,
        })?;
        let line = fields.position().map_or(0, |p| p.line());
        records.push(RawRecord::from_fields(line, &fields)?);
    }

    Ok(records)
}
