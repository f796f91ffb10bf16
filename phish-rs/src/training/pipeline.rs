//! Offline training pipeline

use tracing::{info, warn};

use super::types::TrainingOutcome;
use crate::artifacts::ModelArtifacts;
use crate::classifier::{ClassificationReport, LogisticParams, LogisticRegression};
use crate::config::Config;
use crate::dataset::{write_cleaned, CleanedRecord, Dataset, Label};
use crate::error::{PhishError, Result};
use crate::features::{TfidfVectorizer, VectorizerParams};
use crate::split::stratified_split;
use crate::text::normalize;

/// Trains and persists a vectorizer/model pair from the configured dataset
pub struct TrainingPipeline {
    config: Config,
}

impl TrainingPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize the raw dataset and write the cleaned CSV
    pub fn preprocess(&self) -> Result<Vec<CleanedRecord>> {
        let dataset = Dataset::load_raw(&self.config.data.raw_path)?;
        info!(
            "Loaded {} rows from {}",
            dataset.len(),
            self.config.data.raw_path.display()
        );

        let cleaned: Vec<CleanedRecord> = dataset
            .records()
            .iter()
            .map(|r| CleanedRecord {
                clean_text: normalize(r.text.as_deref()),
                label: r.label,
            })
            .collect();

        write_cleaned(&self.config.data.cleaned_path, &cleaned)?;
        Ok(cleaned)
    }

    /// Full run starting from the raw dataset
    pub fn run(&self) -> Result<TrainingOutcome> {
        let cleaned = self.preprocess()?;
        let (texts, labels) = cleaned
            .into_iter()
            .map(|r| (r.clean_text, r.label))
            .unzip();
        self.train(texts, labels)
    }

    /// Run starting from an existing cleaned CSV; empty cells become `""`
    pub fn run_from_cleaned(&self) -> Result<TrainingOutcome> {
        let dataset = Dataset::load_cleaned(&self.config.data.cleaned_path)?;
        info!(
            "Loaded {} cleaned rows from {}",
            dataset.len(),
            self.config.data.cleaned_path.display()
        );

        let (texts, labels) = dataset
            .records()
            .iter()
            .map(|r| (r.text.clone().unwrap_or_default(), r.label))
            .unzip();
        self.train(texts, labels)
    }

    /// Split, fit, evaluate and save
    pub fn train(&self, texts: Vec<String>, labels: Vec<Label>) -> Result<TrainingOutcome> {
        if texts.len() != labels.len() {
            return Err(PhishError::InvalidInput(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        let training = &self.config.training;

        let split = stratified_split(&labels, training.test_ratio, training.seed)?;
        let (train_texts, train_labels) = select(&split.train, &texts, &labels);
        let (test_texts, test_labels) = select(&split.test, &texts, &labels);

        let mut vectorizer = TfidfVectorizer::new(VectorizerParams {
            max_features: training.max_features,
        });
        let x_train = vectorizer.fit_transform(&train_texts)?;
        let x_test = vectorizer.transform(&test_texts)?;
        info!(
            "Encoded {} train and {} test documents over {} terms",
            x_train.n_rows(),
            x_test.n_rows(),
            x_train.n_cols()
        );

        let mut model = LogisticRegression::new(LogisticParams {
            max_iterations: training.max_iterations,
            regularization: training.regularization,
            tolerance: training.tolerance,
        });
        let fit_summary = model.fit(&x_train, &train_labels)?;
        if !fit_summary.converged {
            warn!("Saving a model that stopped at the iteration cap");
        }

        let predicted = model.predict(&x_test)?;
        let report = ClassificationReport::new(&predicted, &test_labels)?;
        info!("Classification Report:\n{}", report);

        let vocabulary_size = vectorizer.vocabulary_size()?;
        let artifacts = ModelArtifacts::new(vectorizer, model)?;
        artifacts.save_to(&self.config.artifacts)?;

        Ok(TrainingOutcome {
            run_id: artifacts.run_id,
            report,
            fit_summary,
            train_size: split.train.len(),
            test_size: split.test.len(),
            vocabulary_size,
            vectorizer_path: self.config.artifacts.vectorizer_path(),
            model_path: self.config.artifacts.model_path(),
        })
    }
}

fn select<'a>(indices: &[usize], texts: &'a [String], labels: &[Label]) -> (Vec<&'a str>, Vec<Label>) {
    indices
        .iter()
        .map(|&i| (texts[i].as_str(), labels[i]))
        .unzip()
}
