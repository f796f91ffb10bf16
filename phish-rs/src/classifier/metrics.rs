//! Evaluation metrics
//!
//! Per-class precision/recall/F1 plus accuracy, computed from predicted and
//! ground-truth labels.

use serde::Serialize;
use std::fmt;

use crate::dataset::Label;
use crate::error::{PhishError, Result};

/// Precision, recall, F1 and support for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Confusion counts with phishing as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_count: usize,
}

impl ConfusionMatrix {
    /// Count outcomes of `predicted` against `actual`
    pub fn from_labels(predicted: &[Label], actual: &[Label]) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(PhishError::InvalidInput(format!(
                "{} predictions but {} labels",
                predicted.len(),
                actual.len()
            )));
        }

        let mut matrix = Self::default();
        for (&pred, &truth) in predicted.iter().zip(actual) {
            match (pred, truth) {
                (Label::Phishing, Label::Phishing) => matrix.tp += 1,
                (Label::Phishing, Label::Legitimate) => matrix.fp += 1,
                (Label::Legitimate, Label::Legitimate) => matrix.tn += 1,
                (Label::Legitimate, Label::Phishing) => matrix.fn_count += 1,
            }
        }
        Ok(matrix)
    }

    /// Total samples counted
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_count
    }
}

/// Held-out evaluation summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub legitimate: ClassMetrics,
    pub phishing: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Build the report from predicted and true labels
    pub fn new(predicted: &[Label], actual: &[Label]) -> Result<Self> {
        let confusion = ConfusionMatrix::from_labels(predicted, actual)?;
        let ConfusionMatrix {
            tp,
            fp,
            tn,
            fn_count,
        } = confusion;

        let phishing = class_metrics(tp, fp, fn_count);
        // For the negative class the roles of the error counts swap
        let legitimate = class_metrics(tn, fn_count, fp);

        let total = confusion.total();
        let accuracy = ratio(tp + tn, total);

        let macro_avg = ClassMetrics {
            precision: (legitimate.precision + phishing.precision) / 2.0,
            recall: (legitimate.recall + phishing.recall) / 2.0,
            f1: (legitimate.f1 + phishing.f1) / 2.0,
            support: total,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                (f(&legitimate) * legitimate.support as f64
                    + f(&phishing) * phishing.support as f64)
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m: &ClassMetrics| m.precision),
            recall: weighted(|m: &ClassMetrics| m.recall),
            f1: weighted(|m: &ClassMetrics| m.f1),
            support: total,
        };

        Ok(Self {
            legitimate,
            phishing,
            accuracy,
            macro_avg,
            weighted_avg,
            confusion,
        })
    }
}

fn class_metrics(true_pos: usize, false_pos: usize, false_neg: usize) -> ClassMetrics {
    let precision = ratio(true_pos, true_pos + false_pos);
    let recall = ratio(true_pos, true_pos + false_neg);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support: true_pos + false_neg,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        write_row(f, "0", &self.legitimate)?;
        write_row(f, "1", &self.phishing)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion.total()
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, m.precision, m.recall, m.f1, m.support
    )
}
