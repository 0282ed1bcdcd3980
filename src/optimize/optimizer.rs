//! optimize::optimizer — grid search and coordinate descent over protocols.
//!
//! Purpose
//! -------
//! Drive a selected cost criterion across candidate protocol timings:
//! reduce the per-ATT-sample cost batch to a scalar by the prior-weighted
//! mean, optionally warm-start from a coarsened exhaustive grid search,
//! and refine by cyclic coordinate descent on the timing lattice.
//!
//! Key behaviors
//! -------------
//! - [`Optimizer::evaluate`]: Fisher information batch for one timing,
//!   criterion cost per ATT sample, taper-weighted mean.
//! - [`Optimizer::gridsearch`]: enumerate non-decreasing PLD tuples on a
//!   stride-coarsened lattice, capped by a candidate budget, and return
//!   the best timing found.
//! - [`Optimizer::optimize`]: sweep the flat search variables in turn,
//!   moving each to its best lattice value while keeping the PLDs
//!   non-decreasing, until a full sweep changes nothing.
//!
//! Invariants & assumptions
//! ------------------------
//! - Infinite cost is a valid, orderable worst value; a landscape that
//!   is infinite everywhere converges immediately at infinite cost.
//! - Strict improvement is required to move a variable, so the search
//!   terminates on any finite lattice.
//! - Costs from different criteria are never mixed within one search.

use crate::cost::criteria::CostMeasure;
use crate::optimize::errors::{SearchError, SearchResult};
use crate::scan::{PcaslProtocol, ScanTiming};
use log::{debug, info};
use ndarray::{Array1, Ix1};

/// Upper bound on coordinate-descent sweeps; each sweep must strictly
/// improve some variable, so this is a safety stop, not a tuning knob.
const MAX_SWEEPS: usize = 50;

/// Outcome of a protocol search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutput {
    /// Best timing found.
    pub timing: ScanTiming,
    /// Prior-weighted mean cost of `timing`.
    pub cost: f64,
    /// Label/control averages that fit the scan duration.
    pub num_av: usize,
    /// Scan time occupied by those averages (s).
    pub scan_time: f64,
    /// Coordinate-descent sweeps performed.
    pub sweeps: usize,
    /// Whether a full sweep completed without any change.
    pub converged: bool,
}

/// Search driver tying one protocol family to one cost criterion.
pub struct Optimizer<'a> {
    protocol: &'a PcaslProtocol,
    criterion: &'a dyn CostMeasure,
}

impl<'a> Optimizer<'a> {
    pub fn new(protocol: &'a PcaslProtocol, criterion: &'a dyn CostMeasure) -> Self {
        Optimizer { protocol, criterion }
    }

    /// Display name of the criterion under search.
    pub fn criterion_name(&self) -> &str {
        self.criterion.name()
    }

    /// Scalar cost of one candidate timing: the criterion cost per ATT
    /// sample, reduced by the taper-weighted mean over the prior.
    pub fn evaluate(&self, timing: &ScanTiming) -> SearchResult<f64> {
        let hessians = self.protocol.hessians(timing)?.into_dyn();
        let costs = self
            .criterion
            .cost(&hessians)?
            .into_dimensionality::<Ix1>()
            .expect("criterion preserves the one-dimensional ATT batch");
        Ok(self.protocol.att_dist().weighted_mean(&costs))
    }

    /// Coarsened exhaustive search over non-decreasing PLD tuples.
    ///
    /// The PLD lattice is strided until the number of non-decreasing
    /// tuples fits within `max_pts`, then every tuple is evaluated with
    /// label durations held at the initial timing. Returns the best
    /// timing found (the initial timing if nothing beats it), intended
    /// as a warm start for [`Optimizer::optimize`].
    ///
    /// # Errors
    /// - `SearchError::InvalidBudget` when `max_pts` is zero.
    pub fn gridsearch(&self, max_pts: usize) -> SearchResult<ScanTiming> {
        if max_pts == 0 {
            return Err(SearchError::InvalidBudget { max_pts });
        }
        let npld = self.protocol.scan().npld;
        let base = self.protocol.pld_limits().grid();
        let mut stride = 1;
        loop {
            let coarse_len = (base.len() + stride - 1) / stride;
            if coarse_len <= 1
                || monotone_combinations(coarse_len as u128, npld as u32) <= max_pts as u128
            {
                break;
            }
            stride += 1;
        }
        let coarse: Vec<f64> = base.iter().copied().step_by(stride).collect();
        info!(
            "gridsearch: {} PLD values after striding by {stride}, budget {max_pts}",
            coarse.len()
        );

        let template = self.protocol.initial_timing();
        let mut best = template.clone();
        let mut best_cost = self.evaluate(&best)?;
        let mut evaluated = 0usize;

        // Odometer over non-decreasing index tuples into the coarse grid.
        let mut indices = vec![0usize; npld];
        loop {
            let plds = Array1::from_iter(indices.iter().map(|&i| coarse[i]));
            let timing = ScanTiming { lds: template.lds.clone(), plds };
            let cost = self.evaluate(&timing)?;
            evaluated += 1;
            if cost < best_cost {
                best_cost = cost;
                best = timing;
            }

            let mut k = npld;
            loop {
                if k == 0 {
                    debug!("gridsearch: evaluated {evaluated} candidates, best cost {best_cost}");
                    return Ok(best);
                }
                k -= 1;
                if indices[k] + 1 < coarse.len() {
                    let next = indices[k] + 1;
                    for slot in indices[k..].iter_mut() {
                        *slot = next;
                    }
                    break;
                }
            }
        }
    }

    /// Cyclic coordinate descent from `initial` (or the protocol's
    /// default starting timing).
    ///
    /// Each sweep visits every search variable and moves it to the
    /// lattice value with the strictly lowest cost among those keeping
    /// the PLDs non-decreasing. The search stops when a sweep changes
    /// nothing or after [`MAX_SWEEPS`] sweeps.
    pub fn optimize(&self, initial: Option<ScanTiming>) -> SearchResult<SearchOutput> {
        let mut timing = initial.unwrap_or_else(|| self.protocol.initial_timing());
        let mut best_cost = self.evaluate(&timing)?;
        info!("{}: starting search at cost {best_cost}", self.criterion.name());

        let mut sweeps = 0;
        let mut converged = false;
        while sweeps < MAX_SWEEPS {
            let mut changed = false;
            for index in 0..self.protocol.nparams() {
                let grid = self.protocol.param_limits(index)?.grid();
                let mut best_value = None;
                for value in grid {
                    if !self.protocol.pld_order_ok(&timing, index, value) {
                        continue;
                    }
                    let candidate = self.protocol.with_param(&timing, index, value)?;
                    let cost = self.evaluate(&candidate)?;
                    if cost < best_cost {
                        best_cost = cost;
                        best_value = Some(value);
                    }
                }
                if let Some(value) = best_value {
                    timing = self.protocol.with_param(&timing, index, value)?;
                    changed = true;
                }
            }
            sweeps += 1;
            debug!("sweep {sweeps}: cost {best_cost}");
            if !changed {
                converged = true;
                break;
            }
        }

        let (num_av, scan_time) = self.protocol.repeats(&timing);
        Ok(SearchOutput { timing, cost: best_cost, num_av, scan_time, sweeps, converged })
    }
}

/// Number of non-decreasing k-tuples over an m-point lattice,
/// C(m + k - 1, k), saturating instead of overflowing.
fn monotone_combinations(m: u128, k: u32) -> u128 {
    let mut count: u128 = 1;
    for i in 0..k as u128 {
        count = count.saturating_mul(m + i);
        count /= i + 1;
    }
    count
}
