//! Unified error handling for cost-criterion routines.
//!
//! This module defines `CostError`, the central error type used by the
//! covariance transform and the optimality criteria built on top of it.
//! Only caller-contract violations are represented here: a singular
//! sensitivity matrix is a modeled outcome (infinite cost), never an
//! error. An alias `CostResult<T>` standardizes the return type across
//! cost code.

/// Unified error type for cost-criterion routines.
///
/// Covers malformed input shapes only. Degenerate (zero-determinant)
/// sensitivity matrices are resolved locally into infinite covariance
/// entries and costs, so no variant exists for them.
#[derive(Debug, Clone, PartialEq)]
pub enum CostError {
    // ---- Caller contract ----
    /// Input cannot be read as a batch of 2x2 matrices.
    HessianShape {
        found: Vec<usize>,
    },

    /// Custom weight matrix is not 2x2.
    WeightShape {
        found: Vec<usize>,
    },
}

pub type CostResult<T> = Result<T, CostError>;

impl std::error::Error for CostError {}

impl std::fmt::Display for CostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Caller contract ----
            CostError::HessianShape { found } => {
                write!(
                    f,
                    "Cost Error: Hessian batch must have trailing shape [2, 2], found {:?}",
                    found
                )
            }
            CostError::WeightShape { found } => {
                write!(f, "Cost Error: weight matrix must be 2x2, found {:?}", found)
            }
        }
    }
}
