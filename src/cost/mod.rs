//! cost — covariance transform and design-optimality criteria.
//!
//! Purpose
//! -------
//! Turn batches of 2x2 sensitivity (Fisher information) matrices into
//! scalar protocol costs. This module is the objective function of the
//! protocol search: every candidate scan timing is judged by how tightly
//! its sensitivity matrix constrains CBF and ATT.
//!
//! Key behaviors
//! -------------
//! - Convert sensitivity batches into rescaled covariance batches with a
//!   defined all-infinity policy for exactly singular inputs
//!   ([`covariance`]).
//! - Reduce covariance batches to scalar costs through three
//!   interchangeable criteria behind one trait ([`criteria`]):
//!   L-optimal (CBF), L-optimal (ATT), and D-optimal.
//! - Report caller-contract violations through [`CostError`]; singular
//!   sensitivities are modeled outcomes, never errors.
//!
//! Conventions
//! -----------
//! - All batched inputs carry trailing [2, 2] axes with logical indices
//!   [CBF, ATT]; outputs preserve the leading batch shape.
//! - Costs are non-negative, infinity permitted, NaN forbidden; costs of
//!   different criteria are not comparable with each other.
//!
//! Downstream usage
//! ----------------
//! - The optimizer selects a criterion by name, holds it as
//!   `&dyn CostMeasure`, and averages the per-hypothesis cost batch over
//!   the ATT prior.

pub mod covariance;
pub mod criteria;
pub mod errors;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::covariance::{CBF_UNIT_SCALE, batch_determinant, calc_covariance};
pub use self::criteria::{CostMeasure, DOptimalCost, LOptimalCost, WeightTarget};
pub use self::errors::{CostError, CostResult};
