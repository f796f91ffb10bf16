//! phish-rs: Phishing email classifier
//!
//! Trains a TF-IDF + logistic regression model on labelled email text and
//! serves single-email predictions from the persisted artifact pair.
//!
//! # Features
//!
//! - **Normalization**: lowercase ASCII letters only, single-spaced
//! - **Features**: TF-IDF with a frequency-capped vocabulary (5000 terms)
//! - **Model**: L2-regularized logistic regression
//! - **Evaluation**: stratified 80/20 split with a fixed seed
//! - **Artifacts**: versioned bincode files tagged with the training run id
//!
//! # Example Configuration
//!
//! ```toml
//! [data]
//! raw_path = "phishing_emails.csv"
//! cleaned_path = "preprocessed_emails.csv"
//!
//! [artifacts]
//! dir = "models"
//!
//! [training]
//! max_features = 5000
//! seed = 42
//!
//! [[remote_files]]
//! file_id = "1AbCdEf"
//! destination = "models/phishing_model.bin"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use phish_rs::{Config, Predictor};
//!
//! # fn main() -> phish_rs::Result<()> {
//! let predictor = Predictor::from_config(&Config::default())?;
//! let prediction = predictor.predict_one("Verify your account now")?;
//! println!("{} ({:.2})", prediction.label, prediction.probability);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod fetch;
pub mod inference;
pub mod split;
pub mod telemetry;
pub mod text;
pub mod training;

pub use artifacts::ModelArtifacts;
pub use config::Config;
pub use dataset::{Dataset, Label};
pub use error::{PhishError, Result};
pub use inference::{Prediction, Predictor};
pub use training::{TrainingOutcome, TrainingPipeline};
