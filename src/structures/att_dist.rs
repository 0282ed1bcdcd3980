//! Tapered prior distribution over arterial transit times.
//!
//! The protocol search does not optimize for a single ATT but for a
//! range of plausible values. `ATTDist` samples that range on a uniform
//! lattice and assigns each sample a weight: 1 on the central plateau,
//! ramping linearly to 0 over a taper of configurable length at each
//! end. The optimizer reduces per-sample costs to a scalar by the
//! weighted mean over this prior.

use crate::structures::errors::{ParamError, ParamResult};
use ndarray::Array1;

/// Tapered ATT prior on a uniform lattice.
///
/// Weights are 1 inside `[start + taper, end - taper]` and ramp linearly
/// to 0 at `start` and `end`. A zero taper gives a uniform prior.
#[derive(Debug, Clone, PartialEq)]
pub struct ATTDist {
    atts: Array1<f64>,
    weights: Array1<f64>,
}

impl ATTDist {
    /// Validated constructor.
    ///
    /// # Arguments
    /// - `start`, `end`: inclusive ATT range (s), `start < end`.
    /// - `step`: lattice step (s), positive and at most `end - start`.
    /// - `taper`: ramp length (s) at each end; `2 * taper <= end - start`.
    ///
    /// # Errors
    /// - `ParamError::InvalidRange` / `InvalidStep` for a malformed
    ///   lattice.
    /// - `ParamError::InvalidTaper` if the tapers overlap.
    /// - `ParamError::EmptyAttWeight` if no sample receives positive
    ///   weight (every sample sits on a ramp endpoint).
    pub fn new(start: f64, end: f64, step: f64, taper: f64) -> ParamResult<Self> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ParamError::InvalidRange { name: "ATT".to_string(), min: start, max: end });
        }
        if !step.is_finite() || step <= 0.0 || step > end - start {
            return Err(ParamError::InvalidStep { name: "ATT".to_string(), step });
        }
        if !taper.is_finite() || taper < 0.0 || 2.0 * taper > end - start {
            return Err(ParamError::InvalidTaper { taper, range: end - start });
        }

        let count = ((end - start) / step + 1e-9).floor() as usize + 1;
        let atts = Array1::from_iter((0..count).map(|i| start + i as f64 * step));
        let weights = atts.mapv(|att| {
            if taper == 0.0 {
                1.0
            } else if att < start + taper {
                (att - start) / taper
            } else if att > end - taper {
                (end - att) / taper
            } else {
                1.0
            }
        });
        if !weights.iter().any(|&w| w > 0.0) {
            return Err(ParamError::EmptyAttWeight);
        }
        Ok(ATTDist { atts, weights })
    }

    /// ATT samples (s), ascending.
    pub fn atts(&self) -> &Array1<f64> {
        &self.atts
    }

    /// Prior weight per sample, in [0, 1].
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Number of ATT samples.
    pub fn len(&self) -> usize {
        self.atts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atts.is_empty()
    }

    /// Weighted mean of one value per ATT sample.
    ///
    /// Zero-weight samples are skipped before multiplying, so an
    /// infinite cost at a zero-weight sample cannot turn the mean into
    /// NaN through `0 * inf`. An infinite cost at any positively
    /// weighted sample makes the mean infinite, which is the intended
    /// "worst possible" ordering.
    pub fn weighted_mean(&self, values: &Array1<f64>) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for (&v, &w) in values.iter().zip(self.weights.iter()) {
            if w > 0.0 {
                num += w * v;
                den += w;
            }
        }
        num / den
    }
}
