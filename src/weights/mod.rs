//! Weight Solver
//!
//! Derives normalized importance weights from pairwise comparisons
//! (principal eigenvector) or from a direct relative-importance list
//! (plain normalization). Both paths produce a canonical [`WeightVector`].
//!
//! ## Structure
//! - `matrix`: reciprocal pairwise comparison matrix
//! - `solver`: eigen solver, weight inputs, weight vector

pub mod matrix;
pub mod solver;

pub use matrix::PairwiseMatrix;
pub use solver::{
    normalize_direct, solve, EigenSolver, PowerIteration, WeightInput, WeightVector,
};
