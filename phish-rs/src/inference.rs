//! Single-email prediction against a loaded artifact pair

use serde::Serialize;
use tracing::debug;

use crate::artifacts::ModelArtifacts;
use crate::classifier::DECISION_THRESHOLD;
use crate::config::Config;
use crate::dataset::Label;
use crate::error::Result;
use crate::text::normalize;

/// Classification of one email
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of phishing
    pub probability: f64,
}

impl Prediction {
    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

/// Immutable predictor shared by every request
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: ModelArtifacts,
    normalize_input: bool,
}

impl Predictor {
    pub fn new(artifacts: ModelArtifacts, normalize_input: bool) -> Self {
        Self {
            artifacts,
            normalize_input,
        }
    }

    /// Load the artifact pair named by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let artifacts = ModelArtifacts::load_from(&config.artifacts)?;
        Ok(Self::new(artifacts, config.serving.normalize_input))
    }

    /// Classify raw email text.
    ///
    /// Empty text is valid input and still yields a prediction.
    pub fn predict_one(&self, raw_text: &str) -> Result<Prediction> {
        let vector = if self.normalize_input {
            self.artifacts
                .vectorizer
                .transform_one(&normalize(Some(raw_text)))?
        } else {
            self.artifacts.vectorizer.transform_one(raw_text)?
        };

        let probability = self.artifacts.model.predict_proba_one(&vector)?;
        let label = Label::from(probability >= DECISION_THRESHOLD);
        debug!(
            "Predicted {} (p={:.4}, {} known terms)",
            label,
            probability,
            vector.nnz()
        );

        Ok(Prediction { label, probability })
    }

    pub fn normalizes_input(&self) -> bool {
        self.normalize_input
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }
}
