//! Stratified train/test split

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::dataset::Label;
use crate::error::{PhishError, Result};

/// Default share of samples held out for evaluation
pub const DEFAULT_TEST_RATIO: f64 = 0.2;
/// Default seed for reproducible splits
pub const DEFAULT_SEED: u64 = 42;

/// Row indices of each side of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so each class keeps its proportion on both sides.
///
/// Each class is shuffled with a `ChaCha8Rng` seeded from `seed`, and
/// `round(len * test_ratio)` of its members go to the test side. The same
/// labels and seed always give the same indices.
pub fn stratified_split(labels: &[Label], test_ratio: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PhishError::InvalidSplit(format!(
            "test ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }

    let mut legitimate: Vec<usize> = Vec::new();
    let mut phishing: Vec<usize> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        match label {
            Label::Legitimate => legitimate.push(i),
            Label::Phishing => phishing.push(i),
        }
    }

    for (name, members) in [("legitimate", &legitimate), ("phishing", &phishing)] {
        if members.len() < 2 {
            return Err(PhishError::InvalidSplit(format!(
                "the {} class has only {} member(s); at least 2 are required",
                name,
                members.len()
            )));
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    legitimate.shuffle(&mut rng);
    phishing.shuffle(&mut rng);

    let test_count = |len: usize| {
        let n = (len as f64 * test_ratio).round() as usize;
        // keep at least one sample of the class on each side
        n.clamp(1, len - 1)
    };
    let test0 = test_count(legitimate.len());
    let test1 = test_count(phishing.len());

    let test: Vec<usize> = legitimate[..test0]
        .iter()
        .chain(phishing[..test1].iter())
        .copied()
        .collect();
    let train: Vec<usize> = legitimate[test0..]
        .iter()
        .chain(phishing[test1..].iter())
        .copied()
        .collect();

    info!(
        "Split: train={} ({}+{}) test={} ({}+{})",
        train.len(),
        legitimate.len() - test0,
        phishing.len() - test1,
        test.len(),
        test0,
        test1,
    );

    Ok(SplitIndices { train, test })
}
