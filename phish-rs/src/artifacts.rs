//! Trained artifact persistence
//!
//! The vectorizer and the classifier are stored as two bincode files. Each
//! file carries an envelope with the id of the training run that produced
//! it, so a vectorizer from one run is never paired with a model from
//! another.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::LogisticRegression;
use crate::config::ArtifactsConfig;
use crate::error::{PhishError, Result};
use crate::features::TfidfVectorizer;

/// Current on-disk layout version
pub const FORMAT_VERSION: u32 = 1;

const VECTORIZER_KIND: &str = "tfidf-vectorizer";
const MODEL_KIND: &str = "logistic-regression";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    format_version: u32,
    kind: String,
    run_id: Uuid,
    trained_at: DateTime<Utc>,
    payload: T,
}

/// A fitted vectorizer and classifier from the same training run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub vectorizer: TfidfVectorizer,
    pub model: LogisticRegression,
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifacts {
    /// Pair a freshly trained vectorizer and model under a new run id
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticRegression) -> Result<Self> {
        check_pair(&vectorizer, &model)?;
        Ok(Self {
            vectorizer,
            model,
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
        })
    }

    /// Write both files, replacing any previous pair
    pub fn save(&self, vectorizer_path: &Path, model_path: &Path) -> Result<()> {
        self.write_envelope(vectorizer_path, VECTORIZER_KIND, &self.vectorizer)?;
        self.write_envelope(model_path, MODEL_KIND, &self.model)?;

        info!(
            "Saved artifacts for run {} to {} and {}",
            self.run_id,
            vectorizer_path.display(),
            model_path.display()
        );
        Ok(())
    }

    /// Read both files and check they belong together
    pub fn load(vectorizer_path: &Path, model_path: &Path) -> Result<Self> {
        let vectorizer: Envelope<TfidfVectorizer> = read_envelope(vectorizer_path, VECTORIZER_KIND)?;
        let model: Envelope<LogisticRegression> = read_envelope(model_path, MODEL_KIND)?;

        if vectorizer.run_id != model.run_id {
            return Err(PhishError::ArtifactMismatch(format!(
                "vectorizer is from run {} but model is from run {}",
                vectorizer.run_id, model.run_id
            )));
        }
        check_pair(&vectorizer.payload, &model.payload)?;

        info!(
            "Loaded artifacts for run {} (trained {})",
            model.run_id, model.trained_at
        );

        Ok(Self {
            vectorizer: vectorizer.payload,
            model: model.payload,
            run_id: model.run_id,
            trained_at: model.trained_at,
        })
    }

    /// Save to the locations named by the config
    pub fn save_to(&self, config: &ArtifactsConfig) -> Result<()> {
        self.save(&config.vectorizer_path(), &config.model_path())
    }

    /// Load from the locations named by the config
    pub fn load_from(config: &ArtifactsConfig) -> Result<Self> {
        Self::load(&config.vectorizer_path(), &config.model_path())
    }

    fn write_envelope<T: Serialize>(&self, path: &Path, kind: &str, payload: &T) -> Result<()> {
        let envelope = Envelope {
            format_version: FORMAT_VERSION,
            kind: kind.to_string(),
            run_id: self.run_id,
            trained_at: self.trained_at,
            payload,
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| {
            PhishError::ArtifactCorrupt(format!("failed to encode {}: {}", kind, e))
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;
        debug!("Wrote {} ({} bytes) to {}", kind, bytes.len(), path.display());
        Ok(())
    }
}

fn read_envelope<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Envelope<T>> {
    if !path.exists() {
        return Err(PhishError::ArtifactMissing(PathBuf::from(path)));
    }

    let bytes = fs::read(path)?;
    let envelope: Envelope<T> = bincode::deserialize(&bytes).map_err(|e| {
        PhishError::ArtifactCorrupt(format!("{}: {}", path.display(), e))
    })?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(PhishError::ArtifactCorrupt(format!(
            "{}: unsupported format version {} (expected {})",
            path.display(),
            envelope.format_version,
            FORMAT_VERSION
        )));
    }
    if envelope.kind != kind {
        return Err(PhishError::ArtifactMismatch(format!(
            "{} holds a {}, expected a {}",
            path.display(),
            envelope.kind,
            kind
        )));
    }
    Ok(envelope)
}

fn check_pair(vectorizer: &TfidfVectorizer, model: &LogisticRegression) -> Result<()> {
    let vocabulary = vectorizer.vocabulary_size()?;
    let features = model.n_features()?;
    if vocabulary != features {
        return Err(PhishError::ArtifactMismatch(format!(
            "vectorizer has {} terms but model expects {} features",
            vocabulary, features
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Label;
    use tempfile::TempDir;

    fn trained_pair(corpus: &[&str]) -> (TfidfVectorizer, LogisticRegression) {
        let mut vectorizer = TfidfVectorizer::default();
        let x = vectorizer.fit_transform(corpus).unwrap();
        let labels: Vec<Label> = (0..corpus.len())
            .map(|i| Label::from(i % 2 == 0))
            .collect();
        let mut model = LogisticRegression::default();
        model.fit(&x, &labels).unwrap();
        (vectorizer, model)
    }

    fn corpus() -> Vec<&'static str> {
        vec![
            "claim your free prize now",
            "team meeting moved to friday",
            "verify your account password urgently",
            "lunch order for the office",
        ]
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let (vectorizer, model) = trained_pair(&corpus());
        let artifacts = ModelArtifacts::new(vectorizer, model).unwrap();

        let vec_path = dir.path().join("vectorizer.bin");
        let model_path = dir.path().join("model.bin");
        artifacts.save(&vec_path, &model_path).unwrap();

        let loaded = ModelArtifacts::load(&vec_path, &model_path).unwrap();
        assert_eq!(loaded, artifacts);
    }

    #[test]
    fn test_save_creates_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let config = ArtifactsConfig {
            dir: dir.path().join("nested/models"),
            ..ArtifactsConfig::default()
        };

        let (v1, m1) = trained_pair(&corpus());
        let first = ModelArtifacts::new(v1, m1).unwrap();
        first.save_to(&config).unwrap();

        let (v2, m2) = trained_pair(&corpus());
        let second = ModelArtifacts::new(v2, m2).unwrap();
        second.save_to(&config).unwrap();

        let loaded = ModelArtifacts::load_from(&config).unwrap();
        assert_eq!(loaded.run_id, second.run_id);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ModelArtifacts::load(
            &dir.path().join("vectorizer.bin"),
            &dir.path().join("model.bin"),
        )
        .unwrap_err();
        assert!(err.is_artifact_missing());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let (vectorizer, model) = trained_pair(&corpus());
        let artifacts = ModelArtifacts::new(vectorizer, model).unwrap();
        let vec_path = dir.path().join("vectorizer.bin");
        let model_path = dir.path().join("model.bin");
        artifacts.save(&vec_path, &model_path).unwrap();

        fs::write(&model_path, b"not a model").unwrap();
        let err = ModelArtifacts::load(&vec_path, &model_path).unwrap_err();
        assert!(matches!(err, PhishError::ArtifactCorrupt(_)));
    }

    #[test]
    fn test_pair_from_different_runs_rejected() {
        let dir = TempDir::new().unwrap();
        let (v1, m1) = trained_pair(&corpus());
        let (v2, m2) = trained_pair(&corpus());
        let a = ModelArtifacts::new(v1, m1).unwrap();
        let b = ModelArtifacts::new(v2, m2).unwrap();

        let vec_path = dir.path().join("vectorizer.bin");
        let model_path = dir.path().join("model.bin");
        let other_model = dir.path().join("other.bin");
        a.save(&vec_path, &model_path).unwrap();
        b.save(&dir.path().join("unused.bin"), &other_model).unwrap();

        let err = ModelArtifacts::load(&vec_path, &other_model).unwrap_err();
        assert!(matches!(err, PhishError::ArtifactMismatch(_)));
    }

    #[test]
    fn test_swapped_files_rejected() {
        let dir = TempDir::new().unwrap();
        let (vectorizer, model) = trained_pair(&corpus());
        let artifacts = ModelArtifacts::new(vectorizer, model).unwrap();
        let vec_path = dir.path().join("vectorizer.bin");
        let model_path = dir.path().join("model.bin");
        artifacts.save(&vec_path, &model_path).unwrap();

        assert!(ModelArtifacts::load(&model_path, &vec_path).is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let (vectorizer, _) = trained_pair(&corpus());
        let (_, model) = trained_pair(&["alpha beta", "gamma delta", "epsilon zeta", "eta theta iota"]);
        let err = ModelArtifacts::new(vectorizer, model).unwrap_err();
        assert!(matches!(err, PhishError::ArtifactMismatch(_)));
    }

    #[test]
    fn test_unfitted_rejected() {
        let err = ModelArtifacts::new(TfidfVectorizer::default(), LogisticRegression::default())
            .unwrap_err();
        assert!(matches!(err, PhishError::NotFitted(_)));
    }
}
