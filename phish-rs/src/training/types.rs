//! Training result types

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::classifier::{ClassificationReport, FitSummary};

/// Everything a training run produced besides the artifact files themselves
#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    pub run_id: Uuid,
    pub report: ClassificationReport,
    pub fit_summary: FitSummary,
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
}

impl fmt::Display for TrainingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training run {}", self.run_id)?;
        writeln!(
            f,
            "  samples: {} train / {} test, vocabulary: {} terms",
            self.train_size, self.test_size, self.vocabulary_size
        )?;
        writeln!(
            f,
            "  optimizer: {} iterations, converged: {}, loss: {:.6}",
            self.fit_summary.iterations, self.fit_summary.converged, self.fit_summary.final_loss
        )?;
        writeln!(f)?;
        writeln!(f, "Classification Report:")?;
        writeln!(f, "{}", self.report)?;
        writeln!(f, "Vectorizer saved to {}", self.vectorizer_path.display())?;
        write!(f, "Model saved to {}", self.model_path.display())
    }
}
