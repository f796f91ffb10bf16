//! Error types for phish-rs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, PhishError>;

/// Classifier pipeline error types
#[derive(Error, Debug)]
pub enum PhishError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset file absent or malformed
    #[error("Data source error: {0}")]
    DataSource(String),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A component was used before `fit`
    #[error("{0} is not fitted yet; call fit before using it")]
    NotFitted(&'static str),

    /// Feature vector width does not match the fitted model
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Train/test split cannot be made
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Caller passed inconsistent input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Artifact file does not exist
    #[error("Artifact missing: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// Artifact file exists but cannot be decoded
    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Vectorizer and model come from different training runs
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote download failed
    #[error("Fetch error: {0}")]
    Fetch(String),
}

impl PhishError {
    /// True when the error means the artifact pair has not been produced yet
    pub fn is_artifact_missing(&self) -> bool {
        matches!(self, PhishError::ArtifactMissing(_))
    }
}
