//! optpcasl — design-optimality toolkit for PCASL protocol optimization.
//!
//! Purpose
//! -------
//! Answer, for a proposed arterial-spin-labeling acquisition protocol,
//! how precisely the underlying physiological parameters (cerebral blood
//! flow and arterial transit time) can be recovered from noisy
//! measurements, and search the space of scan timings for the protocol
//! that recovers them best.
//!
//! Key behaviors
//! -------------
//! - Evaluate the Buxton kinetic model and its analytic CBF/ATT
//!   sensitivities per timing point ([`kinetic_model`]).
//! - Assemble per-protocol, per-ATT-hypothesis Fisher information
//!   matrices ([`scan`]).
//! - Reduce sensitivity batches to scalar design-optimality costs:
//!   L-optimal (CBF), L-optimal (ATT), and D-optimal ([`cost`]).
//! - Minimize a chosen criterion over PLD and label-duration lattices by
//!   grid search and coordinate descent ([`optimize`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - An exactly singular sensitivity matrix means the protocol cannot
//!   identify the parameters; it yields an infinite (worst, orderable)
//!   cost, never a NaN and never an error.
//! - CBF is carried internally in s^-1 units; covariance entries are
//!   converted to ml/100g/min by the cost layer only.
//! - All numeric routines are pure; construction-time validation is the
//!   only place user input is checked.
//!
//! Downstream usage
//! ----------------
//! - The `optpcasl` binary wires the modules together from command-line
//!   options. Library users typically build [`structures::PhysParams`],
//!   an [`structures::ATTDist`], a [`scan::PcaslProtocol`], pick a
//!   [`cost::CostMeasure`], and run [`optimize::Optimizer`].
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests pinning its numerics;
//!   `tests/integration_protocol_search.rs` exercises the full pipeline
//!   from parameters to a converged search for all three criteria.

pub mod cost;
pub mod kinetic_model;
pub mod optimize;
pub mod scan;
pub mod structures;

// ---- Re-exports (primary surface) -----------------------------------------

pub use crate::cost::{CostMeasure, DOptimalCost, LOptimalCost, WeightTarget};
pub use crate::kinetic_model::BuxtonPcasl;
pub use crate::optimize::{Optimizer, SearchOutput};
pub use crate::scan::{LdStrategy, PcaslProtocol, ScanTiming};
pub use crate::structures::{ATTDist, Limits, PhysParams, ScanParams};
