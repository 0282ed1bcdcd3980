//! Buxton general kinetic model for PCASL and its parameter sensitivities.
//!
//! This module evaluates the single-compartment (well-mixed) Buxton
//! solution for the PCASL difference signal and its analytic partial
//! derivatives with respect to the two estimated parameters, CBF and
//! ATT. The scan layer assembles these sensitivities into per-protocol
//! Fisher information matrices; nothing here depends on the search.
//!
//! The signal for a label duration `ld`, post-labeling delay `pld`, and
//! transit time `att` has three regimes:
//! - no bolus yet (`ld + pld < att`): zero signal;
//! - inflow (`pld < att <= ld + pld`): the bolus is still arriving;
//! - post-bolus (`att <= pld`): the full bolus has arrived and decays
//!   with the apparent tissue relaxation time T1'.
//!
//! Conventions:
//! - All times in seconds, CBF in internal s^-1 units.
//! - `1/T1' = 1/T1t + f/lambda`, evaluated once at the nominal CBF; the
//!   signal is then linear in `f`, so the CBF sensitivity is `signal/f`.
//! - The ATT sensitivity is the exact derivative of each regime; it is
//!   discontinuous at the regime boundaries, as in the reference model.

use crate::structures::PhysParams;

/// Buxton PCASL kinetic model at fixed physiological parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuxtonPcasl {
    phys: PhysParams,
    t1_prime: f64,
}

impl BuxtonPcasl {
    /// Build the model, precomputing the apparent tissue relaxation
    /// time `1/T1' = 1/T1t + f/lambda`.
    pub fn new(phys: PhysParams) -> Self {
        let t1_prime = 1.0 / (1.0 / phys.t1t + phys.f / phys.lam);
        BuxtonPcasl { phys, t1_prime }
    }

    /// Apparent tissue relaxation time T1' (s).
    pub fn t1_prime(&self) -> f64 {
        self.t1_prime
    }

    /// Physiological parameters the model was built with.
    pub fn phys(&self) -> &PhysParams {
        &self.phys
    }

    /// Difference signal (fraction of M0) at one timing point.
    ///
    /// # Arguments
    /// - `ld`: label duration (s).
    /// - `pld`: post-labeling delay, measured from the end of labeling (s).
    /// - `att`: arterial transit time hypothesis (s).
    pub fn signal(&self, ld: f64, pld: f64, att: f64) -> f64 {
        let p = &self.phys;
        if ld + pld < att {
            return 0.0;
        }
        let amp = 2.0 * p.m0b * p.alpha * p.f * self.t1_prime * (-att / p.t1b).exp();
        if pld < att {
            // Inflow: bolus arriving for a duration of (ld + pld - att).
            amp * (1.0 - (-(ld + pld - att) / self.t1_prime).exp())
        } else {
            // Post-bolus: full bolus decaying since (pld - att).
            amp * (1.0 - (-ld / self.t1_prime).exp()) * (-(pld - att) / self.t1_prime).exp()
        }
    }

    /// Analytic sensitivities `(dS/df, dS/datt)` at one timing point.
    ///
    /// The CBF derivative uses the linearity of the signal in `f` at
    /// fixed T1'. The ATT derivative is exact within each regime and
    /// zero before bolus arrival.
    pub fn sensitivity(&self, ld: f64, pld: f64, att: f64) -> (f64, f64) {
        let p = &self.phys;
        if ld + pld < att {
            return (0.0, 0.0);
        }
        let signal = self.signal(ld, pld, att);
        let df = signal / p.f;
        let datt = if pld < att {
            // d/datt of exp(-att/T1b) * (1 - exp(-(ld+pld-att)/T1')).
            let amp = 2.0 * p.m0b * p.alpha * p.f * self.t1_prime;
            let decay = (-att / p.t1b).exp();
            let inflow = (-(ld + pld - att) / self.t1_prime).exp();
            amp * decay * (-(1.0 - inflow) / p.t1b - inflow / self.t1_prime)
        } else {
            signal * (1.0 / self.t1_prime - 1.0 / p.t1b)
        };
        (df, datt)
    }
}
