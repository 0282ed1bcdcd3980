//! structures — validated configuration for the protocol search.
//!
//! Purpose
//! -------
//! Hold the immutable, construction-time configuration that the kinetic
//! model, scan representation, and optimizer consume: physiological
//! constants, the scan being optimized for, the tapered ATT prior, and
//! named search limits.
//!
//! Conventions
//! -----------
//! - All constructors validate and report [`ParamError`]; instances are
//!   immutable afterwards.
//! - CBF is carried in internal s^-1 units throughout; only the cost
//!   layer converts back to ml/100g/min.

pub mod att_dist;
pub mod errors;
pub mod params;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::att_dist::ATTDist;
pub use self::errors::{ParamError, ParamResult};
pub use self::params::{Limits, PhysParams, ScanParams};
