//! Feature encoding
//!
//! Turns cleaned email text into sparse TF-IDF vectors.

pub mod sparse;
pub mod tfidf;

pub use sparse::{SparseMatrix, SparseVector};
pub use tfidf::{tokenize, TfidfVectorizer, VectorizerParams, DEFAULT_MAX_FEATURES};
