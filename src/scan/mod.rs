//! scan — candidate-protocol representation for the search.
//!
//! Purpose
//! -------
//! Represent multi-PLD PCASL protocols as searchable timing vectors and
//! turn each candidate into the Fisher information batch the cost
//! criteria consume. The three label-duration schemes of the original
//! design (fixed, one shared searched LD, one LD per PLD) are one
//! parametrized type here.
//!
//! Downstream usage
//! ----------------
//! - The optimizer iterates over a protocol's flat search variables,
//!   proposes lattice values, and evaluates candidates through
//!   [`PcaslProtocol::hessians`].

pub mod errors;
pub mod protocol;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{ScanError, ScanResult};
pub use self::protocol::{LdStrategy, PcaslProtocol, ScanTiming};
