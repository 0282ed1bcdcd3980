//! scan::protocol — candidate-protocol representation and Fisher information.
//!
//! Purpose
//! -------
//! Represent one candidate PCASL protocol (label durations plus
//! post-labeling delays), expose its timing values as a flat vector of
//! search variables for the optimizer, and assemble the per-ATT-sample
//! Fisher information batch that the cost criteria consume.
//!
//! Key behaviors
//! -------------
//! - Collapse the three label-duration schemes of the original design
//!   (fixed LD, one shared searched LD, one LD per PLD) into a single
//!   [`PcaslProtocol`] parametrized by [`LdStrategy`].
//! - Map search-variable indices onto timing entries: LD variables
//!   first, then the PLDs in ascending order.
//! - Assemble one 2x2 Fisher information matrix per ATT sample: the sum
//!   of sensitivity outer products over PLDs, averaged over slices and
//!   scaled by `num_averages / noise^2`.
//! - Account for repeats: each average is a label/control pair, so
//!   `num_averages = floor(duration / (2 * sum(ld + pld + readout)))`.
//!
//! Invariants & assumptions
//! ------------------------
//! - PLDs are kept non-decreasing by the search through
//!   [`PcaslProtocol::pld_order_ok`]; the protocol itself does not
//!   reorder timings.
//! - A protocol too long for even one repeat yields a zero Fisher
//!   information matrix for every ATT sample. That is a modeled outcome
//!   (infinite cost downstream), not an error.
//! - For a 2D readout each slice sees an effective PLD shifted by
//!   `slice_index * slicedt`; the assembled matrix is the per-slice
//!   average.

use crate::kinetic_model::BuxtonPcasl;
use crate::scan::errors::{ScanError, ScanResult};
use crate::structures::{ATTDist, Limits, ScanParams};
use log::debug;
use ndarray::{Array1, Array3};

/// Ordering slack when holding PLDs non-decreasing on the lattice.
const ORDER_TOL: f64 = 1e-12;

/// How label durations participate in the search.
///
/// - `Fixed`: all LDs pinned to the scan's nominal label duration.
/// - `Shared`: one searched LD applied to every PLD.
/// - `PerPld`: an independently searched LD for each PLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdStrategy {
    Fixed,
    Shared,
    PerPld,
}

impl LdStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            LdStrategy::Fixed => "fixed-LD",
            LdStrategy::Shared => "shared-LD",
            LdStrategy::PerPld => "multi-LD",
        }
    }
}

/// One concrete candidate protocol: a label duration and a PLD per
/// acquisition, both in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTiming {
    pub lds: Array1<f64>,
    pub plds: Array1<f64>,
}

impl ScanTiming {
    pub fn npld(&self) -> usize {
        self.plds.len()
    }
}

/// A multi-PLD PCASL protocol family under search.
///
/// Owns the kinetic model, the scan parameters, the ATT prior, and the
/// search limits; candidate timings flow through as values.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaslProtocol {
    model: BuxtonPcasl,
    scan: ScanParams,
    att_dist: ATTDist,
    pld_lims: Limits,
    ld_lims: Option<Limits>,
    strategy: LdStrategy,
}

impl PcaslProtocol {
    /// Validated constructor.
    ///
    /// # Errors
    /// - `ScanError::MissingLdLimits` when `strategy` searches label
    ///   durations but no LD limits were supplied.
    pub fn new(
        model: BuxtonPcasl,
        scan: ScanParams,
        att_dist: ATTDist,
        pld_lims: Limits,
        ld_lims: Option<Limits>,
        strategy: LdStrategy,
    ) -> ScanResult<Self> {
        if strategy != LdStrategy::Fixed && ld_lims.is_none() {
            return Err(ScanError::MissingLdLimits { strategy: strategy.label().to_string() });
        }
        Ok(PcaslProtocol { model, scan, att_dist, pld_lims, ld_lims, strategy })
    }

    pub fn scan(&self) -> &ScanParams {
        &self.scan
    }

    pub fn att_dist(&self) -> &ATTDist {
        &self.att_dist
    }

    pub fn strategy(&self) -> LdStrategy {
        self.strategy
    }

    pub fn pld_limits(&self) -> &Limits {
        &self.pld_lims
    }

    /// Number of searched label-duration variables.
    fn ld_count(&self) -> usize {
        match self.strategy {
            LdStrategy::Fixed => 0,
            LdStrategy::Shared => 1,
            LdStrategy::PerPld => self.scan.npld,
        }
    }

    /// Total number of search variables (LD variables first, then PLDs).
    pub fn nparams(&self) -> usize {
        self.ld_count() + self.scan.npld
    }

    /// Search limits that constrain the given variable.
    pub fn param_limits(&self, index: usize) -> ScanResult<&Limits> {
        if index >= self.nparams() {
            return Err(ScanError::ParamIndexOutOfRange { index, nparams: self.nparams() });
        }
        if index < self.ld_count() {
            // new() guarantees LD limits exist whenever ld_count() > 0.
            Ok(self.ld_lims.as_ref().expect("LD limits present for searched-LD strategies"))
        } else {
            Ok(&self.pld_lims)
        }
    }

    /// Starting point for the search: PLDs evenly spaced across their
    /// limits, label durations from the scan parameters (fixed) or the
    /// LD-limits midpoint (searched).
    pub fn initial_timing(&self) -> ScanTiming {
        let npld = self.scan.npld;
        let plds = if npld == 1 {
            Array1::from_elem(1, self.pld_lims.midpoint())
        } else {
            let span = self.pld_lims.max() - self.pld_lims.min();
            Array1::from_iter(
                (0..npld).map(|i| self.pld_lims.min() + span * i as f64 / (npld - 1) as f64),
            )
        };
        let ld = match self.strategy {
            LdStrategy::Fixed => self.scan.ld,
            _ => self
                .ld_lims
                .as_ref()
                .expect("LD limits present for searched-LD strategies")
                .midpoint(),
        };
        ScanTiming { lds: Array1::from_elem(npld, ld), plds }
    }

    /// Copy of `timing` with one search variable replaced. A shared LD
    /// variable updates every label duration at once.
    pub fn with_param(
        &self,
        timing: &ScanTiming,
        index: usize,
        value: f64,
    ) -> ScanResult<ScanTiming> {
        if index >= self.nparams() {
            return Err(ScanError::ParamIndexOutOfRange { index, nparams: self.nparams() });
        }
        let mut next = timing.clone();
        if index < self.ld_count() {
            match self.strategy {
                LdStrategy::Shared => next.lds.fill(value),
                _ => next.lds[index] = value,
            }
        } else {
            next.plds[index - self.ld_count()] = value;
        }
        Ok(next)
    }

    /// Whether replacing one search variable keeps the PLDs
    /// non-decreasing. LD variables are unconstrained by ordering.
    pub fn pld_order_ok(&self, timing: &ScanTiming, index: usize, value: f64) -> bool {
        if index < self.ld_count() {
            return true;
        }
        let i = index - self.ld_count();
        let below_ok = i == 0 || value >= timing.plds[i - 1] - ORDER_TOL;
        let above_ok = i + 1 == timing.npld() || value <= timing.plds[i + 1] + ORDER_TOL;
        below_ok && above_ok
    }

    /// Number of label/control averages that fit the scan duration, and
    /// the scan time they occupy.
    ///
    /// One average acquires every PLD once as a label/control pair:
    /// `2 * sum(ld + pld + readout)` seconds.
    pub fn repeats(&self, timing: &ScanTiming) -> (usize, f64) {
        let tr: f64 = timing
            .lds
            .iter()
            .zip(timing.plds.iter())
            .map(|(ld, pld)| ld + pld + self.scan.readout)
            .sum();
        let pair = 2.0 * tr;
        let num_av = (self.scan.duration / pair).floor() as usize;
        (num_av, num_av as f64 * pair)
    }

    /// Fisher information batch for one candidate timing, shape
    /// `(natt, 2, 2)` with logical indices [CBF, ATT].
    ///
    /// Per ATT sample: the sum over PLDs (and the average over slices)
    /// of the sensitivity outer product, scaled by
    /// `num_averages / noise^2`. Zero repeats give a zero matrix.
    ///
    /// # Errors
    /// - `ScanError::TimingShapeMismatch` when the timing's PLD count
    ///   differs from the protocol's.
    pub fn hessians(&self, timing: &ScanTiming) -> ScanResult<Array3<f64>> {
        if timing.npld() != self.scan.npld {
            return Err(ScanError::TimingShapeMismatch {
                expected: self.scan.npld,
                found: timing.npld(),
            });
        }
        let (num_av, _) = self.repeats(timing);
        let scale =
            num_av as f64 / (self.scan.noise * self.scan.noise * self.scan.nslices as f64);
        debug!(
            "hessians: {} PLDs, {} averages, strategy {}",
            timing.npld(),
            num_av,
            self.strategy.label()
        );

        let atts = self.att_dist.atts();
        let mut hessian = Array3::<f64>::zeros((atts.len(), 2, 2));
        for (j, &att) in atts.iter().enumerate() {
            let mut sum_ff = 0.0;
            let mut sum_fa = 0.0;
            let mut sum_aa = 0.0;
            for (ld, pld) in timing.lds.iter().zip(timing.plds.iter()) {
                for s in 0..self.scan.nslices {
                    let pld_eff = pld + s as f64 * self.scan.slicedt;
                    let (df, datt) = self.model.sensitivity(*ld, pld_eff, att);
                    sum_ff += df * df;
                    sum_fa += df * datt;
                    sum_aa += datt * datt;
                }
            }
            hessian[[j, 0, 0]] = scale * sum_ff;
            hessian[[j, 0, 1]] = scale * sum_fa;
            hessian[[j, 1, 0]] = scale * sum_fa;
            hessian[[j, 1, 1]] = scale * sum_aa;
        }
        Ok(hessian)
    }
}
