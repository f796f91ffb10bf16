//! Training orchestration
//!
//! Runs the offline pipeline end to end: load, normalize, split, encode,
//! fit, evaluate and persist the artifact pair.

pub mod pipeline;
pub mod types;

pub use pipeline::TrainingPipeline;
pub use types::TrainingOutcome;
