//! Unified error handling for physiological and scan parameter structures.
//!
//! This module defines `ParamError`, the central error type reported by
//! the validated constructors in `structures`. An alias `ParamResult<T>`
//! standardizes the return type across parameter code.

/// Unified error type for parameter-structure validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    // ---- Physiological parameters ----
    /// CBF must be finite and strictly positive (internal s^-1 units).
    InvalidCbf {
        value: f64,
    },

    /// Noise standard deviation must be finite and strictly positive.
    InvalidNoise {
        value: f64,
    },

    // ---- Search limits ----
    /// Limits must satisfy min < max with both finite.
    InvalidRange {
        name: String,
        min: f64,
        max: f64,
    },

    /// Step must be finite, positive, and no larger than the range.
    InvalidStep {
        name: String,
        step: f64,
    },

    // ---- ATT distribution ----
    /// Taper must be non-negative and fit twice into the ATT range.
    InvalidTaper {
        taper: f64,
        range: f64,
    },

    /// Every ATT sample received zero prior weight.
    EmptyAttWeight,

    // ---- Scan parameters ----
    /// Scan duration must be finite and strictly positive.
    InvalidDuration {
        value: f64,
    },

    /// At least one PLD is required.
    InvalidNpld {
        value: usize,
    },

    /// Readout time must be finite and non-negative.
    InvalidReadout {
        value: f64,
    },

    /// Label duration must be finite and strictly positive.
    InvalidLabelDuration {
        value: f64,
    },

    /// At least one slice is required.
    InvalidNslices {
        value: usize,
    },

    /// Per-slice time increment must be finite and non-negative.
    InvalidSliceDt {
        value: f64,
    },
}

pub type ParamResult<T> = Result<T, ParamError>;

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Physiological parameters ----
            ParamError::InvalidCbf { value } => {
                write!(f, "Param Error: Invalid CBF {value}, must be finite and > 0")
            }
            ParamError::InvalidNoise { value } => {
                write!(f, "Param Error: Invalid noise SD {value}, must be finite and > 0")
            }

            // ---- Search limits ----
            ParamError::InvalidRange { name, min, max } => {
                write!(f, "Param Error: Invalid {name} range [{min}, {max}], need min < max")
            }
            ParamError::InvalidStep { name, step } => {
                write!(f, "Param Error: Invalid {name} step {step}, must be positive and fit the range")
            }

            // ---- ATT distribution ----
            ParamError::InvalidTaper { taper, range } => {
                write!(f, "Param Error: Invalid taper {taper} for ATT range {range}")
            }
            ParamError::EmptyAttWeight => {
                write!(f, "Param Error: ATT prior assigns zero weight to every sample")
            }

            // ---- Scan parameters ----
            ParamError::InvalidDuration { value } => {
                write!(f, "Param Error: Invalid scan duration {value}, must be finite and > 0")
            }
            ParamError::InvalidNpld { value } => {
                write!(f, "Param Error: Invalid number of PLDs {value}, must be >= 1")
            }
            ParamError::InvalidReadout { value } => {
                write!(f, "Param Error: Invalid readout time {value}, must be finite and >= 0")
            }
            ParamError::InvalidLabelDuration { value } => {
                write!(f, "Param Error: Invalid label duration {value}, must be finite and > 0")
            }
            ParamError::InvalidNslices { value } => {
                write!(f, "Param Error: Invalid number of slices {value}, must be >= 1")
            }
            ParamError::InvalidSliceDt { value } => {
                write!(f, "Param Error: Invalid slice time increment {value}, must be finite and >= 0")
            }
        }
    }
}
