//! TF-IDF vectorizer
//!
//! Bag-of-words encoder with a frequency-capped vocabulary and smoothed
//! inverse document frequency. Rows are L2-normalized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::sparse::{SparseMatrix, SparseVector};
use crate::error::{PhishError, Result};

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 5000;

// Tokens are runs of two or more word characters.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Vectorizer hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Keep at most this many terms, ranked by corpus frequency
    pub max_features: usize,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

/// State learned by `fit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedVocabulary {
    /// term -> column
    vocabulary: HashMap<String, usize>,
    /// idf per column
    idf: Vec<f64>,
}

/// TF-IDF text encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    fitted: Option<FittedVocabulary>,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(params: VectorizerParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    /// Hyper-parameters
    pub fn params(&self) -> VectorizerParams {
        self.params
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Number of columns produced by `transform`
    pub fn vocabulary_size(&self) -> Result<usize> {
        Ok(self.state()?.idf.len())
    }

    /// Vocabulary terms ordered by column
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let state = self.state()?;
        let mut names = vec![String::new(); state.idf.len()];
        for (term, &idx) in &state.vocabulary {
            names[idx] = term.clone();
        }
        Ok(names)
    }

    /// Learned idf weight of `term`, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Result<Option<f64>> {
        let state = self.state()?;
        Ok(state.vocabulary.get(term).map(|&idx| state.idf[idx]))
    }

    /// Learn vocabulary and idf from `corpus`
    pub fn fit<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<()> {
        self.fit_transform(corpus).map(|_| ())
    }

    /// Learn vocabulary and idf, returning the encoded corpus
    pub fn fit_transform<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<SparseMatrix> {
        if self.params.max_features == 0 {
            return Err(PhishError::InvalidInput(
                "max_features must be at least 1".to_string(),
            ));
        }

        let doc_counts: Vec<HashMap<String, usize>> =
            corpus.iter().map(|d| count_terms(d.as_ref())).collect();

        let mut term_frequency: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for (term, &count) in counts {
                *term_frequency.entry(term.as_str()).or_insert(0) += count;
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(PhishError::InvalidInput(
                "empty vocabulary; documents contain no tokens".to_string(),
            ));
        }

        // Most frequent first, ties alphabetical
        let mut ranked: Vec<(&str, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.params.max_features);

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_documents = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, term) in kept.iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_documents) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term.to_string(), idx);
        }

        debug!(
            "Fitted TF-IDF vocabulary: {} terms from {} documents",
            vocabulary.len(),
            corpus.len()
        );

        let state = FittedVocabulary { vocabulary, idf };
        let mut matrix = SparseMatrix::new(state.idf.len());
        for counts in &doc_counts {
            matrix.push(state.encode(counts))?;
        }

        self.fitted = Some(state);
        Ok(matrix)
    }

    /// Encode texts with the fitted vocabulary.
    ///
    /// Unknown terms are ignored; a text with no known term encodes to the
    /// zero vector.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<SparseMatrix> {
        let state = self.state()?;
        let mut matrix = SparseMatrix::new(state.idf.len());
        for text in texts {
            matrix.push(state.encode(&count_terms(text.as_ref())))?;
        }
        Ok(matrix)
    }

    /// Encode a single text
    pub fn transform_one(&self, text: &str) -> Result<SparseVector> {
        let state = self.state()?;
        Ok(state.encode(&count_terms(text)))
    }

    fn state(&self) -> Result<&FittedVocabulary> {
        self.fitted
            .as_ref()
            .ok_or(PhishError::NotFitted("TfidfVectorizer"))
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(VectorizerParams::default())
    }
}

impl FittedVocabulary {
    fn encode(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let pairs = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&idx| (idx, count as f64 * self.idf[idx]))
            })
            .collect();

        let mut row = SparseVector::from_pairs(pairs);
        let norm = row.norm();
        if norm > 0.0 {
            row.scale(1.0 / norm);
        }
        row
    }
}

/// Split text into lowercase tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn count_terms(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "verify your account now",
            "your invoice is attached",
            "verify your password now now",
        ]
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Click HERE: a b cd 10am!"),
            vec!["click", "here", "cd", "10am"]
        );
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfidfVectorizer::default();
        let err = vectorizer.transform(&["hello world"]).unwrap_err();
        assert!(matches!(err, PhishError::NotFitted(_)));
        assert!(vectorizer.vocabulary_size().is_err());
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&corpus()).unwrap();

        let names = vectorizer.feature_names().unwrap();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(vectorizer.vocabulary_size().unwrap(), 8);
    }

    #[test]
    fn test_smoothed_idf() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&corpus()).unwrap();

        // "your" appears in all 3 documents, "invoice" in 1
        let your = vectorizer.idf("your").unwrap().unwrap();
        let invoice = vectorizer.idf("invoice").unwrap().unwrap();
        assert!((your - 1.0).abs() < 1e-12);
        assert!((invoice - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert_eq!(vectorizer.idf("missing").unwrap(), None);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vectorizer = TfidfVectorizer::new(VectorizerParams { max_features: 2 });
        vectorizer.fit(&corpus()).unwrap();

        // now: 3, your: 3; everything else is rarer
        assert_eq!(vectorizer.feature_names().unwrap(), vec!["now", "your"]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&corpus()).unwrap();

        assert_eq!(matrix.n_rows(), 3);
        for row in matrix.rows() {
            assert!((row.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fit_then_transform_reproduces_matrix() {
        let mut vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer.fit_transform(&corpus()).unwrap();
        let transformed = vectorizer.transform(&corpus()).unwrap();
        assert_eq!(fitted, transformed);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&corpus()).unwrap();

        let matrix = vectorizer.transform(&["completely unrelated words", ""]).unwrap();
        assert_eq!(matrix.n_cols(), 8);
        assert!(matrix.row(0).is_zero());
        assert!(matrix.row(1).is_zero());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let mut vectorizer = TfidfVectorizer::default();
        let err = vectorizer.fit(&["", "a b"]).unwrap_err();
        assert!(matches!(err, PhishError::InvalidInput(_)));
        assert!(!vectorizer.is_fitted());
    }
}
