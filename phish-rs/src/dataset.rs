//! Dataset loading and persistence
//!
//! Reads labelled email CSV files into memory and writes the cleaned
//! intermediate file produced by the training pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PhishError, Result};

/// Column holding raw email text in the source dataset
pub const RAW_TEXT_COLUMN: &str = "text_combined";
/// Column holding normalized text in the preprocessed dataset
pub const CLEAN_TEXT_COLUMN: &str = "clean_text";
/// Column holding the 0/1 label
pub const LABEL_COLUMN: &str = "label";

/// Ground truth class of an email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Legitimate mail (0)
    Legitimate,
    /// Phishing mail (1)
    Phishing,
}

impl Label {
    /// Numeric class as used in CSV files and API responses
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Legitimate => 0,
            Label::Phishing => 1,
        }
    }

    /// Parse a CSV label cell (`0`, `1`, `0.0`, `1.0`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "0" | "0.0" => Some(Label::Legitimate),
            "1" | "1.0" => Some(Label::Phishing),
            _ => None,
        }
    }
}

impl From<bool> for Label {
    fn from(is_phishing: bool) -> Self {
        if is_phishing {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One labelled email as read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRecord {
    /// Text cell; `None` when the cell was empty
    pub text: Option<String>,
    /// Ground truth
    pub label: Label,
}

/// Normalized email ready for feature encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub clean_text: String,
    pub label: Label,
}

/// Shape and class distribution of a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub phishing: usize,
    pub legitimate: usize,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset shape: ({}, {})", self.rows, self.columns)?;
        writeln!(f, "Class distribution:")?;
        writeln!(f, "  1 (phishing)   {}", self.phishing)?;
        write!(f, "  0 (legitimate) {}", self.legitimate)
    }
}

/// In-memory table of labelled emails
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<EmailRecord>,
    columns: usize,
}

impl Dataset {
    /// Build a dataset from records already in memory
    pub fn from_records(records: Vec<EmailRecord>) -> Self {
        Self { records, columns: 2 }
    }

    /// Load the raw dataset (`text_combined`, `label`)
    pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path, RAW_TEXT_COLUMN)
    }

    /// Load the preprocessed dataset (`clean_text`, `label`)
    pub fn load_cleaned<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path, CLEAN_TEXT_COLUMN)
    }

    /// Load a CSV file, reading `text_column` and `label`.
    ///
    /// Other columns are ignored. Fails with [`PhishError::DataSource`] if the
    /// file is absent, a required column is missing, or a label is not 0/1.
    pub fn load<P: AsRef<Path>>(path: P, text_column: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PhishError::DataSource(format!(
                "dataset not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            PhishError::DataSource(format!("failed to open {}: {}", path.display(), e))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| PhishError::DataSource(format!("failed to read header: {}", e)))?
            .clone();
        let column_index = |name: &str| {
            headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                PhishError::DataSource(format!(
                    "{} is missing required column '{}'",
                    path.display(),
                    name
                ))
            })
        };
        let text_idx = column_index(text_column)?;
        let label_idx = column_index(LABEL_COLUMN)?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                PhishError::DataSource(format!("malformed row {}: {}", row + 1, e))
            })?;

            let raw_label = record.get(label_idx).unwrap_or_default();
            let label = Label::parse(raw_label).ok_or_else(|| {
                PhishError::DataSource(format!(
                    "row {} has invalid label '{}' (expected 0 or 1)",
                    row + 1,
                    raw_label
                ))
            })?;

            let text = record
                .get(text_idx)
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            records.push(EmailRecord { text, label });
        }

        debug!("Loaded {} rows from {}", records.len(), path.display());

        Ok(Self {
            records,
            columns: headers.len(),
        })
    }

    /// All records in file order
    pub fn records(&self) -> &[EmailRecord] {
        &self.records
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no rows were loaded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels in file order
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Shape and class counts
    pub fn summary(&self) -> DatasetSummary {
        let phishing = self
            .records
            .iter()
            .filter(|r| r.label == Label::Phishing)
            .count();

        DatasetSummary {
            rows: self.records.len(),
            columns: self.columns,
            phishing,
            legitimate: self.records.len() - phishing,
        }
    }
}

/// Write cleaned records as CSV with header `clean_text,label`.
///
/// Overwrites any existing file.
pub fn write_cleaned<P: AsRef<Path>>(path: P, records: &[CleanedRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([CLEAN_TEXT_COLUMN, LABEL_COLUMN])?;
    for record in records {
        writer.write_record([record.clean_text.as_str(), &record.label.to_string()])?;
    }
    writer.flush()?;

    info!("Preprocessed data saved to {}", path.display());
    Ok(())
}
