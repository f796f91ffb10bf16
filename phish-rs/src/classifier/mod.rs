//! Classification module
//!
//! Logistic regression over TF-IDF features and the held-out evaluation
//! report produced after training.

pub mod logistic;
pub mod metrics;

pub use logistic::{
    sigmoid, FitSummary, LogisticParams, LogisticRegression, DECISION_THRESHOLD,
    DEFAULT_MAX_ITERATIONS,
};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
