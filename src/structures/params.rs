//! Physiological constants, scan parameters, and search limits.
//!
//! This module holds the construction-time configuration consumed by the
//! kinetic model and the protocol search:
//! - `PhysParams`: physiological and acquisition constants of the PCASL
//!   experiment, with literature defaults.
//! - `ScanParams`: the scan being optimized for (duration, PLD count,
//!   readout, fixed label duration, noise, slice geometry).
//! - `Limits`: a named inclusive search lattice for one timing variable.
//!
//! All constructors validate their inputs and report `ParamError`;
//! instances are immutable after construction.

use crate::structures::errors::{ParamError, ParamResult};

/// Physiological and acquisition constants for the PCASL experiment.
///
/// CBF is carried in internal flow units of s^-1 (divide ml/100g/min by
/// 6000); the cost layer converts covariance entries back to clinical
/// units. Defaults follow the standard literature values used by the
/// optimization framework: T1 of blood 1.65 s, T1 of tissue 1.445 s,
/// inversion efficiency 0.85, partition coefficient 0.9, CBF 50
/// ml/100g/min, noise SD 0.002 relative to M0.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysParams {
    /// Equilibrium magnetization of arterial blood (normalized).
    pub m0b: f64,
    /// Longitudinal relaxation time of blood (s).
    pub t1b: f64,
    /// Longitudinal relaxation time of tissue (s).
    pub t1t: f64,
    /// Labeling (inversion) efficiency.
    pub alpha: f64,
    /// Blood-brain partition coefficient.
    pub lam: f64,
    /// CBF to optimize for, internal s^-1 units.
    pub f: f64,
    /// Additive noise standard deviation relative to M0.
    pub noise: f64,
}

impl Default for PhysParams {
    fn default() -> Self {
        PhysParams {
            m0b: 1.0,
            t1b: 1.65,
            t1t: 1.445,
            alpha: 0.85,
            lam: 0.9,
            f: 50.0 / 6000.0,
            noise: 0.002,
        }
    }
}

impl PhysParams {
    /// Literature defaults with caller-chosen CBF and noise level.
    ///
    /// # Errors
    /// - `ParamError::InvalidCbf` if `f` is not finite and positive.
    /// - `ParamError::InvalidNoise` if `noise` is not finite and positive.
    pub fn new(f: f64, noise: f64) -> ParamResult<Self> {
        if !f.is_finite() || f <= 0.0 {
            return Err(ParamError::InvalidCbf { value: f });
        }
        if !noise.is_finite() || noise <= 0.0 {
            return Err(ParamError::InvalidNoise { value: noise });
        }
        Ok(PhysParams { f, noise, ..PhysParams::default() })
    }
}

/// Parameters of the scan being optimized for.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParams {
    /// Desired total scan duration (s).
    pub duration: f64,
    /// Number of post-labeling delays.
    pub npld: usize,
    /// Non-ASL readout time appended to each PLD (s).
    pub readout: f64,
    /// Label duration used when label durations are not searched (s).
    pub ld: f64,
    /// Additive noise standard deviation relative to M0.
    pub noise: f64,
    /// Number of slices in the acquisition.
    pub nslices: usize,
    /// Time increase per slice for a 2D readout (s).
    pub slicedt: f64,
}

impl ScanParams {
    /// Validated constructor.
    ///
    /// # Errors
    /// One `ParamError` variant per violated field constraint: positive
    /// finite duration, at least one PLD, non-negative readout and slice
    /// increment, positive label duration and noise, at least one slice.
    pub fn new(
        duration: f64,
        npld: usize,
        readout: f64,
        ld: f64,
        noise: f64,
        nslices: usize,
        slicedt: f64,
    ) -> ParamResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ParamError::InvalidDuration { value: duration });
        }
        if npld == 0 {
            return Err(ParamError::InvalidNpld { value: npld });
        }
        if !readout.is_finite() || readout < 0.0 {
            return Err(ParamError::InvalidReadout { value: readout });
        }
        if !ld.is_finite() || ld <= 0.0 {
            return Err(ParamError::InvalidLabelDuration { value: ld });
        }
        if !noise.is_finite() || noise <= 0.0 {
            return Err(ParamError::InvalidNoise { value: noise });
        }
        if nslices == 0 {
            return Err(ParamError::InvalidNslices { value: nslices });
        }
        if !slicedt.is_finite() || slicedt < 0.0 {
            return Err(ParamError::InvalidSliceDt { value: slicedt });
        }
        Ok(ScanParams { duration, npld, readout, ld, noise, nslices, slicedt })
    }
}

/// Named inclusive search range with a fixed lattice step.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    name: String,
    min: f64,
    max: f64,
    step: f64,
}

impl Limits {
    /// Validated constructor.
    ///
    /// # Errors
    /// - `ParamError::InvalidRange` unless `min < max` with both finite.
    /// - `ParamError::InvalidStep` unless `0 < step <= max - min`.
    pub fn new(name: &str, min: f64, max: f64, step: f64) -> ParamResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ParamError::InvalidRange { name: name.to_string(), min, max });
        }
        if !step.is_finite() || step <= 0.0 || step > max - min {
            return Err(ParamError::InvalidStep { name: name.to_string(), step });
        }
        Ok(Limits { name: name.to_string(), min, max, step })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Inclusive lattice of candidate values, `min, min + step, ..., max`.
    ///
    /// A small relative slack absorbs floating-point drift so that `max`
    /// itself is included when the range is an integer number of steps.
    pub fn grid(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step + 1e-9).floor() as usize + 1;
        (0..count).map(|i| self.min + i as f64 * self.step).collect()
    }

    /// Midpoint of the range, snapped to the nearest lattice value.
    pub fn midpoint(&self) -> f64 {
        let mid = 0.5 * (self.min + self.max);
        let steps = ((mid - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }
}
