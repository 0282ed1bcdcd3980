//! Unified error handling for scan-protocol routines.
//!
//! This module defines `ScanError` for construction-time violations in
//! the protocol layer. Degenerate protocols (for example those too long
//! to fit a single repeat) are not errors: they produce zero Fisher
//! information and hence infinite cost downstream.

/// Unified error type for scan-protocol construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    // ---- Construction ----
    /// A searched-label-duration strategy needs LD limits.
    MissingLdLimits {
        strategy: String,
    },

    /// Search-variable index out of range.
    ParamIndexOutOfRange {
        index: usize,
        nparams: usize,
    },

    /// Timing does not match the protocol's PLD count.
    TimingShapeMismatch {
        expected: usize,
        found: usize,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;

impl std::error::Error for ScanError {}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            ScanError::MissingLdLimits { strategy } => {
                write!(f, "Scan Error: LD limits required for the {strategy} strategy")
            }
            ScanError::ParamIndexOutOfRange { index, nparams } => {
                write!(f, "Scan Error: search variable {index} out of range (nparams = {nparams})")
            }
            ScanError::TimingShapeMismatch { expected, found } => {
                write!(f, "Scan Error: timing has {found} PLDs, protocol expects {expected}")
            }
        }
    }
}
