//! Unified error handling for the protocol search.
//!
//! This module defines `SearchError`, which wraps the cost-layer and
//! scan-layer errors the search can surface, plus search-specific
//! budget violations. An alias `SearchResult<T>` standardizes the
//! return type across search code. Infinite costs are not errors.

use crate::cost::errors::CostError;
use crate::scan::errors::ScanError;

/// Unified error type for the protocol search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    // ---- Wrapped layers ----
    /// Cost-criterion contract violation.
    Cost(CostError),

    /// Scan-protocol contract violation.
    Scan(ScanError),

    // ---- Search configuration ----
    /// Grid-search budget must allow at least one candidate.
    InvalidBudget {
        max_pts: usize,
    },
}

pub type SearchResult<T> = Result<T, SearchError>;

impl std::error::Error for SearchError {}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Wrapped layers ----
            SearchError::Cost(err) => write!(f, "Search Error: {err}"),
            SearchError::Scan(err) => write!(f, "Search Error: {err}"),

            // ---- Search configuration ----
            SearchError::InvalidBudget { max_pts } => {
                write!(f, "Search Error: grid-search budget {max_pts} allows no candidates")
            }
        }
    }
}

impl From<CostError> for SearchError {
    fn from(err: CostError) -> Self {
        SearchError::Cost(err)
    }
}

impl From<ScanError> for SearchError {
    fn from(err: ScanError) -> Self {
        SearchError::Scan(err)
    }
}
