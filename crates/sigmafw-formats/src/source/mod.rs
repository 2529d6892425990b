//! Input sources for the image builder
//!
//! A source is one input document bound to the sample rate it was authored
//! for. The builder only sees the [`RecordSource`] trait: the records a source
//! yields and its declared sample rate.

mod error;
mod parser;
mod record;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use error::{SourceError, SourceResult};
pub use parser::{parse_document, parse_hex_list};
pub use record::Record;

/// Something that yields records for one sample rate
pub trait RecordSource {
    /// Sample rate the records were authored for
    fn sample_rate(&self) -> u32;

    /// Name used in logs and error messages
    fn name(&self) -> String;

    /// Extract records, data records first, each group in document order
    fn records(&self) -> SourceResult<Vec<Record>>;
}

/// SigmaStudio XML export on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSource {
    path: PathBuf,
    sample_rate: u32,
}

impl XmlSource {
    /// Bind an XML file to its sample rate
    pub fn new(path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            sample_rate,
        }
    }

    /// Path of the document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for XmlSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn records(&self) -> SourceResult<Vec<Record>> {
        debug!("Reading {}", self.path.display());
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_document(&text)
    }
}

/// Records supplied directly rather than parsed from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordList {
    name: String,
    sample_rate: u32,
    records: Vec<Record>,
}

impl RecordList {
    /// Empty record list for a sample rate
    pub fn new(name: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            sample_rate,
            records: Vec::new(),
        }
    }

    /// Append a record
    #[must_use]
    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Append several records
    #[must_use]
    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records.extend(records);
        self
    }
}

impl RecordSource for RecordList {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn records(&self) -> SourceResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}
