//! optimize — search drivers minimizing a cost criterion over protocols.
//!
//! Purpose
//! -------
//! Tie a [`PcaslProtocol`](crate::scan::PcaslProtocol) to one cost
//! criterion and search its timing lattice: an optional coarsened grid
//! search for a warm start, then cyclic coordinate descent. Infinite
//! costs order naturally as worst values, so degenerate candidates need
//! no special casing here.

pub mod errors;
pub mod optimizer;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{SearchError, SearchResult};
pub use self::optimizer::{Optimizer, SearchOutput};
