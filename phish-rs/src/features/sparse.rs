//! Row-oriented sparse matrix

use serde::{Deserialize, Serialize};

use crate::error::{PhishError, Result};

/// Sparse feature vector: sorted column indices with their values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs. Pairs are sorted by index and
    /// zero values dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    /// Iterate over stored `(index, value)` entries
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// True when every component is zero
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Value at `index` (zero if not stored)
    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    /// Dot product with a dense vector
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale every stored value
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.values {
            *v *= factor;
        }
    }

    /// Largest stored index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }
}

/// Feature matrix with a fixed column count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    n_cols: usize,
    rows: Vec<SparseVector>,
}

impl SparseMatrix {
    /// Empty matrix with `n_cols` columns
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            rows: Vec::new(),
        }
    }

    /// Build from rows, checking that no entry exceeds `n_cols`
    pub fn from_rows(n_cols: usize, rows: Vec<SparseVector>) -> Result<Self> {
        if let Some(max) = rows.iter().filter_map(SparseVector::max_index).max() {
            if max >= n_cols {
                return Err(PhishError::DimensionMismatch {
                    expected: n_cols,
                    actual: max + 1,
                });
            }
        }
        Ok(Self { n_cols, rows })
    }

    /// Append a row
    pub fn push(&mut self, row: SparseVector) -> Result<()> {
        if let Some(max) = row.max_index() {
            if max >= self.n_cols {
                return Err(PhishError::DimensionMismatch {
                    expected: self.n_cols,
                    actual: max + 1,
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (feature dimensionality)
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Row `i`
    pub fn row(&self, i: usize) -> &SparseVector {
        &self.rows[i]
    }

    /// All rows
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Copy of the rows at `indices`, in that order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            n_cols: self.n_cols,
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}
