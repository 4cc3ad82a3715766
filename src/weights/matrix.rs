//! Reciprocal pairwise comparison matrix

use ndarray::{array, Array2};

use crate::error::{EngineError, EngineResult};

// Reciprocity is checked multiplicatively: m[i][j] * m[j][i] must be 1.
const RECIPROCITY_TOLERANCE: f64 = 1e-6;

/// N x N reciprocal comparison matrix: unit diagonal, `m[j][i] = 1/m[i][j]`,
/// all entries positive. Validated on construction.
#[derive(Debug, Clone)]
pub struct PairwiseMatrix {
    inner: Array2<f64>,
}

impl PairwiseMatrix {
    /// Two-criterion matrix from a single comparison value: criterion 1 is
    /// `value` times as important as criterion 2.
    pub fn from_comparison(value: f64) -> EngineResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "pairwise comparison value must be positive, got {value}"
            )));
        }
        Ok(Self {
            inner: array![[1.0, value], [1.0 / value, 1.0]],
        })
    }

    /// Full matrix from rows. Rejects non-square input, non-positive
    /// entries, a non-unit diagonal and broken reciprocity.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> EngineResult<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(EngineError::Configuration(
                "pairwise matrix needs at least two criteria".to_string(),
            ));
        }

        let mut inner = Array2::zeros((n, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(EngineError::Configuration(format!(
                    "pairwise matrix row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(EngineError::Configuration(format!(
                        "pairwise matrix entry [{i}][{j}] must be positive, got {value}"
                    )));
                }
                inner[[i, j]] = value;
            }
        }

        for i in 0..n {
            if (inner[[i, i]] - 1.0).abs() > RECIPROCITY_TOLERANCE {
                return Err(EngineError::Configuration(format!(
                    "pairwise matrix diagonal entry [{i}][{i}] must be 1, got {}",
                    inner[[i, i]]
                )));
            }
            for j in (i + 1)..n {
                if (inner[[i, j]] * inner[[j, i]] - 1.0).abs() > RECIPROCITY_TOLERANCE {
                    return Err(EngineError::Configuration(format!(
                        "pairwise matrix entries [{i}][{j}] and [{j}][{i}] are not reciprocal"
                    )));
                }
            }
        }

        Ok(Self { inner })
    }

    /// Number of criteria compared.
    pub fn order(&self) -> usize {
        self.inner.nrows()
    }

    pub(crate) fn as_array(&self) -> &Array2<f64> {
        &self.inner
    }
}
