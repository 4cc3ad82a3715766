//! Weight derivation
//!
//! The canonical path is the principal eigenvector of the pairwise matrix.
//! A bare relative-importance list has no consistent pairwise matrix behind
//! it, so it falls back to plain normalization - a pragmatic approximation,
//! not a theoretically equivalent substitute.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::constants::{EIGEN_CONVERGENCE, EIGEN_MAX_ITERATIONS, WEIGHT_TOLERANCE};
use crate::error::{EngineError, EngineResult};
use crate::weights::matrix::PairwiseMatrix;

/// Eigen decomposition seam. Not every target ships a linear-algebra
/// routine, so the primitive is pluggable.
pub trait EigenSolver {
    /// Principal eigenvector (largest real eigenvalue) of a positive
    /// reciprocal matrix, returned normalized to sum 1.
    fn principal_eigenvector(&self, matrix: &PairwiseMatrix) -> EngineResult<Vec<f64>>;
}

/// Power iteration. For a positive reciprocal matrix the iteration
/// converges to the Perron eigenvector, which is exactly the AHP weight
/// vector.
#[derive(Debug, Clone)]
pub struct PowerIteration {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PowerIteration {
    fn default() -> Self {
        Self {
            max_iterations: EIGEN_MAX_ITERATIONS,
            tolerance: EIGEN_CONVERGENCE,
        }
    }
}

impl EigenSolver for PowerIteration {
    fn principal_eigenvector(&self, matrix: &PairwiseMatrix) -> EngineResult<Vec<f64>> {
        let a = matrix.as_array();
        let n = matrix.order();
        let mut v = Array1::from_elem(n, 1.0 / n as f64);

        for _ in 0..self.max_iterations {
            let product = a.dot(&v);
            let total = product.sum();
            if !total.is_finite() || total <= 0.0 {
                return Err(EngineError::Configuration(
                    "pairwise matrix is degenerate, power iteration diverged".to_string(),
                ));
            }
            let next = product / total;
            let delta = next
                .iter()
                .zip(v.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            v = next;
            if delta < self.tolerance {
                break;
            }
        }

        Ok(v.to_vec())
    }
}

/// The two historical weighting strategies, unified behind one input.
#[derive(Debug, Clone)]
pub enum WeightInput {
    /// Single 2-criterion comparison: criterion 1 is `a` times as important
    /// as criterion 2.
    Comparison(f64),
    /// Full reciprocal matrix over N criteria.
    Matrix(PairwiseMatrix),
    /// Relative importance numbers without a comparison matrix.
    Direct(Vec<f64>),
}

/// Solve any weight input into normalized weights.
pub fn solve(input: &WeightInput, solver: &dyn EigenSolver) -> EngineResult<Vec<f64>> {
    match input {
        WeightInput::Comparison(value) => {
            let matrix = PairwiseMatrix::from_comparison(*value)?;
            solver.principal_eigenvector(&matrix)
        }
        WeightInput::Matrix(matrix) => solver.principal_eigenvector(matrix),
        WeightInput::Direct(raw) => normalize_direct(raw),
    }
}

/// Plain normalization: each weight divided by the sum of all weights.
pub fn normalize_direct(raw: &[f64]) -> EngineResult<Vec<f64>> {
    if raw.is_empty() {
        return Err(EngineError::Configuration(
            "no criterion weights supplied".to_string(),
        ));
    }
    if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(EngineError::Configuration(
            "criterion weights must be finite and non-negative".to_string(),
        ));
    }
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(EngineError::Configuration(
            "criterion weights sum to zero".to_string(),
        ));
    }
    Ok(raw.iter().map(|w| w / total).collect())
}

/// Normalized weights bound to criterion names, in criterion order.
/// Weights are non-negative and sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    pub fn from_parts(names: Vec<String>, weights: Vec<f64>) -> EngineResult<Self> {
        if names.len() != weights.len() {
            return Err(EngineError::Configuration(format!(
                "{} criterion names for {} weights",
                names.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::Configuration(
                "solved weights must be finite and non-negative".to_string(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::Configuration(format!(
                "solved weights sum to {total}, expected 1"
            )));
        }
        Ok(Self {
            entries: names.into_iter().zip(weights).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, w)| (n.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
