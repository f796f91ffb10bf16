//! Binary logistic regression
//!
//! Minimizes the L2-regularized mean log-loss with full-batch gradient
//! descent. The step size comes from the Lipschitz bound of the gradient,
//! so every iteration decreases the objective.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Label;
use crate::features::{SparseMatrix, SparseVector};
use crate::error::{PhishError, Result};

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Probability at or above which a sample is labelled phishing
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Optimizer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Iteration cap; hitting it is not an error
    pub max_iterations: usize,
    /// Inverse regularization strength (C); larger means weaker L2 penalty
    pub regularization: f64,
    /// Stop when the largest gradient component drops below this
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            regularization: 1.0,
            tolerance: 1e-4,
        }
    }
}

/// Outcome of a `fit` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Iterations actually run
    pub iterations: usize,
    /// False when `max_iterations` was reached first
    pub converged: bool,
    /// Objective value at the returned parameters
    pub final_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LinearWeights {
    weights: Vec<f64>,
    bias: f64,
}

/// Logistic regression classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: LogisticParams,
    fitted: Option<LinearWeights>,
}

impl LogisticRegression {
    /// Create an unfitted classifier
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    /// Optimizer settings
    pub fn params(&self) -> LogisticParams {
        self.params
    }

    /// True once `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Input dimensionality the model was trained on
    pub fn n_features(&self) -> Result<usize> {
        Ok(self.state()?.weights.len())
    }

    /// Learned bias term
    pub fn bias(&self) -> Result<f64> {
        Ok(self.state()?.bias)
    }

    /// Learned weight vector
    pub fn weights(&self) -> Result<&[f64]> {
        Ok(&self.state()?.weights)
    }

    /// Fit on `x` with labels `y`.
    ///
    /// Runs until converged or `max_iterations`; in the latter case a warning
    /// is logged and the partially optimized parameters are kept.
    pub fn fit(&mut self, x: &SparseMatrix, y: &[Label]) -> Result<FitSummary> {
        if x.n_rows() != y.len() {
            return Err(PhishError::InvalidInput(format!(
                "{} samples but {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(PhishError::InvalidInput(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if !(y.contains(&Label::Phishing) && y.contains(&Label::Legitimate)) {
            return Err(PhishError::InvalidInput(
                "training data must contain both classes".to_string(),
            ));
        }
        if self.params.regularization <= 0.0 {
            return Err(PhishError::InvalidInput(
                "regularization must be positive".to_string(),
            ));
        }

        let n = y.len() as f64;
        let targets: Vec<f64> = y.iter().map(|l| l.as_u8() as f64).collect();
        let penalty = 1.0 / (self.params.regularization * n);

        let max_sq_norm = x
            .rows()
            .iter()
            .map(|r| r.norm().powi(2))
            .fold(0.0f64, f64::max);
        let lipschitz = 0.25 * (max_sq_norm + 1.0) + penalty;
        let step = 1.0 / lipschitz;

        let mut state = LinearWeights {
            weights: vec![0.0; x.n_cols()],
            bias: 0.0,
        };
        let mut grad_w = vec![0.0; x.n_cols()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.params.max_iterations {
            let grad_b = self.gradient(&state, x, &targets, penalty, &mut grad_w);

            let max_grad = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < self.params.tolerance {
                converged = true;
                break;
            }

            for (w, g) in state.weights.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }
            state.bias -= step * grad_b;
            iterations += 1;
        }

        let final_loss = objective(&state, x, &targets, penalty);
        if converged {
            debug!(
                "Logistic regression converged after {} iterations (loss {:.6})",
                iterations, final_loss
            );
        } else {
            warn!(
                "Logistic regression did not converge within {} iterations (loss {:.6}); using current parameters",
                self.params.max_iterations, final_loss
            );
        }

        self.fitted = Some(state);
        Ok(FitSummary {
            iterations,
            converged,
            final_loss,
        })
    }

    /// Raw linear score `w·x + b` per row
    pub fn decision_function(&self, x: &SparseMatrix) -> Result<Vec<f64>> {
        let state = self.checked_state(x.n_cols())?;
        Ok(x.rows().iter().map(|row| state.score(row)).collect())
    }

    /// Probability of phishing per row
    pub fn predict_proba(&self, x: &SparseMatrix) -> Result<Vec<f64>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(sigmoid)
            .collect())
    }

    /// Hard label per row (phishing iff probability >= 0.5)
    pub fn predict(&self, x: &SparseMatrix) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| Label::from(p >= DECISION_THRESHOLD))
            .collect())
    }

    /// Probability of phishing for a single vector of dimension `n_features`
    pub fn predict_proba_one(&self, row: &SparseVector) -> Result<f64> {
        let state = self.state()?;
        if let Some(max) = row.max_index() {
            if max >= state.weights.len() {
                return Err(PhishError::DimensionMismatch {
                    expected: state.weights.len(),
                    actual: max + 1,
                });
            }
        }
        Ok(sigmoid(state.score(row)))
    }

    // Fills `grad_w` and returns the bias gradient.
    fn gradient(
        &self,
        state: &LinearWeights,
        x: &SparseMatrix,
        targets: &[f64],
        penalty: f64,
        grad_w: &mut [f64],
    ) -> f64 {
        let n = targets.len() as f64;
        for (g, w) in grad_w.iter_mut().zip(&state.weights) {
            *g = penalty * w;
        }

        let mut grad_b = 0.0;
        for (row, &t) in x.rows().iter().zip(targets) {
            let residual = (sigmoid(state.score(row)) - t) / n;
            for (idx, value) in row.iter() {
                grad_w[idx] += residual * value;
            }
            grad_b += residual;
        }
        grad_b
    }

    fn state(&self) -> Result<&LinearWeights> {
        self.fitted
            .as_ref()
            .ok_or(PhishError::NotFitted("LogisticRegression"))
    }

    fn checked_state(&self, n_cols: usize) -> Result<&LinearWeights> {
        let state = self.state()?;
        if state.weights.len() != n_cols {
            return Err(PhishError::DimensionMismatch {
                expected: state.weights.len(),
                actual: n_cols,
            });
        }
        Ok(state)
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticParams::default())
    }
}

impl LinearWeights {
    fn score(&self, row: &SparseVector) -> f64 {
        row.dot(&self.weights) + self.bias
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn objective(state: &LinearWeights, x: &SparseMatrix, targets: &[f64], penalty: f64) -> f64 {
    let n = targets.len() as f64;
    let data_loss: f64 = x
        .rows()
        .iter()
        .zip(targets)
        .map(|(row, &t)| {
            let z = state.score(row);
            // log(1 + e^z) - t*z without overflow
            z.max(0.0) + (-z.abs()).exp().ln_1p() - t * z
        })
        .sum::<f64>()
        / n;
    let l2: f64 = state.weights.iter().map(|w| w * w).sum();
    data_loss + 0.5 * penalty * l2
}
