//! cost::covariance — batched sensitivity-to-covariance transform.
//!
//! Purpose
//! -------
//! Convert a batch of 2x2 sensitivity (Fisher information) matrices into
//! the corresponding batch of parameter covariance matrices, expressed in
//! clinically meaningful units. This is the numerical foundation shared by
//! the L-optimal criteria; the D-optimal criterion bypasses it via a
//! closed-form determinant shortcut.
//!
//! Key behaviors
//! -------------
//! - Compute the determinant of every 2x2 block in the batch
//!   ([`batch_determinant`]).
//! - Invert non-singular blocks in closed form; blocks whose determinant
//!   is exactly zero become all-positive-infinity blocks
//!   ([`calc_covariance`]).
//! - Rescale the CBF-related entries from internal flow units (s^-1) into
//!   ml/100g/min: entry [0,0] by 6000^2 and the [0,1]/[1,0] cross terms
//!   by 6000.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs carry any number of leading batch axes with trailing shape
//!   [2, 2]; anything else is a caller-contract violation reported as
//!   [`CostError::HessianShape`].
//! - Singularity is detected by exact floating equality against zero.
//!   Near-singular blocks therefore invert to very large finite entries
//!   rather than infinity. This matches the reference behavior and is
//!   intentionally not a tolerance band; relaxing it would silently
//!   change which protocols are flagged as uninformative.
//! - The unit rescale multiplies by positive finite constants, so
//!   infinite entries stay positive infinity and never collapse to NaN.
//!
//! Conventions
//! -----------
//! - Logical indices of each 2x2 block are [CBF, ATT] x [CBF, ATT].
//! - All routines are pure: no logging, no global state, no `unsafe`.
//!   A singular input is a modeled outcome, not an error.
//!
//! Downstream usage
//! ----------------
//! - [`crate::cost::criteria::LOptimalCost`] reduces the output of
//!   [`calc_covariance`] to a weighted trace.
//! - [`crate::cost::criteria::DOptimalCost`] consumes
//!   [`batch_determinant`] directly.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover closed-form inversion against hand-computed
//!   inverses, the all-infinity policy for singular blocks, unit
//!   rescaling, batch independence, and shape violations.

use crate::cost::errors::{CostError, CostResult};
use ndarray::{Array3, ArrayD, IxDyn};

/// Conversion factor from internal flow units (s^-1) to ml/100g/min.
pub const CBF_UNIT_SCALE: f64 = 6000.0;

/// Validate the trailing [2, 2] shape and return the leading batch shape.
///
/// # Arguments
/// - `hessian`: batch of matrices with any number of leading axes.
///
/// # Returns
/// The leading batch shape (possibly empty for a single matrix), or
/// [`CostError::HessianShape`] when the trailing axes are not [2, 2].
pub(crate) fn leading_shape(hessian: &ArrayD<f64>) -> CostResult<Vec<usize>> {
    let shape = hessian.shape();
    if shape.len() < 2 || shape[shape.len() - 2..] != [2, 2] {
        return Err(CostError::HessianShape { found: shape.to_vec() });
    }
    Ok(shape[..shape.len() - 2].to_vec())
}

/// calc_covariance — covariance matrices from a sensitivity batch.
///
/// Purpose
/// -------
/// Produce, for every 2x2 sensitivity block in the batch, the rescaled
/// matrix inverse, or an all-infinity block when the sensitivity is
/// exactly singular.
///
/// Parameters
/// ----------
/// - `hessian`: `&ArrayD<f64>`
///   Batch of sensitivity matrices with trailing shape [2, 2]. Logical
///   indices are [CBF, ATT] in both trailing axes. Read-only.
///
/// Returns
/// -------
/// `CostResult<ArrayD<f64>>`
///   Batch of covariance matrices with the same shape as the input. For
///   a non-singular block the result is `rescale(inverse(block))`; for a
///   block with determinant exactly zero every entry is positive
///   infinity.
///
/// Errors
/// ------
/// - `CostError::HessianShape`
///   The trailing axes of `hessian` are not [2, 2].
///
/// Notes
/// -----
/// - The rescale step runs after the singular branch, so infinite
///   entries are multiplied by positive constants and remain positive
///   infinity; no path here can produce NaN from finite input.
/// - Entry [1,1] (the ATT variance) is not rescaled; ATT is already in
///   seconds.
pub fn calc_covariance(hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>> {
    let leading = leading_shape(hessian)?;
    let batch: usize = leading.iter().product();
    let contiguous = hessian.as_standard_layout();
    let blocks = contiguous
        .view()
        .into_shape((batch, 2, 2))
        .expect("standard-layout view always reshapes to (batch, 2, 2)");

    let mut cov = Array3::<f64>::zeros((batch, 2, 2));
    for (mut dst, src) in cov.outer_iter_mut().zip(blocks.outer_iter()) {
        let a = src[[0, 0]];
        let b = src[[0, 1]];
        let c = src[[1, 0]];
        let d = src[[1, 1]];
        let det = a * d - b * c;
        if det == 0.0 {
            dst.fill(f64::INFINITY);
        } else {
            dst[[0, 0]] = d / det;
            dst[[0, 1]] = -b / det;
            dst[[1, 0]] = -c / det;
            dst[[1, 1]] = a / det;
        }
        // Change into (ml/100g/min); positive scale keeps infinities infinite.
        dst[[0, 0]] *= CBF_UNIT_SCALE * CBF_UNIT_SCALE;
        dst[[0, 1]] *= CBF_UNIT_SCALE;
        dst[[1, 0]] *= CBF_UNIT_SCALE;
    }

    let mut full = leading;
    full.push(2);
    full.push(2);
    Ok(cov
        .into_shape(IxDyn(&full))
        .expect("element count is preserved when restoring the batch shape"))
}

/// batch_determinant — determinant of every 2x2 block in a batch.
///
/// Purpose
/// -------
/// Evaluate the closed-form 2x2 determinant independently for each batch
/// element, preserving the leading batch shape.
///
/// Parameters
/// ----------
/// - `hessian`: `&ArrayD<f64>`
///   Batch of matrices with trailing shape [2, 2].
///
/// Returns
/// -------
/// `CostResult<ArrayD<f64>>`
///   Determinants with shape equal to the leading batch shape of the
///   input (a zero-dimensional array for a single matrix).
///
/// Errors
/// ------
/// - `CostError::HessianShape`
///   The trailing axes of `hessian` are not [2, 2].
pub fn batch_determinant(hessian: &ArrayD<f64>) -> CostResult<ArrayD<f64>> {
    let leading = leading_shape(hessian)?;
    let batch: usize = leading.iter().product();
    let contiguous = hessian.as_standard_layout();
    let blocks = contiguous
        .view()
        .into_shape((batch, 2, 2))
        .expect("standard-layout view always reshapes to (batch, 2, 2)");

    let dets: Vec<f64> = blocks
        .outer_iter()
        .map(|m| m[[0, 0]] * m[[1, 1]] - m[[0, 1]] * m[[1, 0]])
        .collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&leading), dets)
        .expect("determinant count matches the batch shape"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Closed-form inversion and unit rescaling for non-singular blocks.
    // - The all-infinity policy for exactly singular blocks.
    // - Batch independence and leading-shape preservation.
    // - Shape-violation reporting.
    //
    // They intentionally DO NOT cover:
    // - Criterion-level reductions (weighted trace, inverse determinant),
    //   which live in `cost::criteria`.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-10;

    #[test]
    // Purpose
    // -------
    // Verify the covariance of a diagonal positive-definite sensitivity
    // matrix against the hand-computed rescaled inverse.
    //
    // Given
    // -----
    // - H = [[2, 0], [0, 4]], whose inverse is [[0.5, 0], [0, 0.25]].
    //
    // Expect
    // ------
    // - cov = [[0.5 * 36e6, 0], [0, 0.25]] = [[18_000_000, 0], [0, 0.25]].
    fn calc_covariance_diagonal_matrix_matches_rescaled_inverse() {
        // Arrange
        let hessian = array![[2.0, 0.0], [0.0, 4.0]].into_dyn();

        // Act
        let cov = calc_covariance(&hessian).unwrap();

        // Assert
        assert_eq!(cov.shape(), &[2, 2]);
        assert!((cov[[0, 0]] - 18_000_000.0).abs() < TOL);
        assert!((cov[[0, 1]]).abs() < TOL);
        assert!((cov[[1, 0]]).abs() < TOL);
        assert!((cov[[1, 1]] - 0.25).abs() < TOL);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the off-diagonal entries of a non-diagonal sensitivity
    // matrix pick up exactly one factor of the unit scale.
    //
    // Given
    // -----
    // - H = [[4, 0], [0, 0.25]] with determinant 1, so the inverse is
    //   [[0.25, 0], [0, 4]].
    // - H = [[2, 1], [1, 1]] with determinant 1, so the inverse is
    //   [[1, -1], [-1, 2]].
    //
    // Expect
    // ------
    // - First block: cov = [[9_000_000, 0], [0, 4]].
    // - Second block: cov = [[36e6, -6000], [-6000, 2]].
    fn calc_covariance_applies_unit_scale_per_entry() {
        // Arrange
        let hessian =
            array![[[4.0, 0.0], [0.0, 0.25]], [[2.0, 1.0], [1.0, 1.0]]].into_dyn();

        // Act
        let cov = calc_covariance(&hessian).unwrap();

        // Assert
        assert!((cov[[0, 0, 0]] - 9_000_000.0).abs() < TOL);
        assert!((cov[[0, 1, 1]] - 4.0).abs() < TOL);
        assert!((cov[[1, 0, 0]] - 36_000_000.0).abs() < TOL);
        assert!((cov[[1, 0, 1]] + 6000.0).abs() < TOL);
        assert!((cov[[1, 1, 0]] + 6000.0).abs() < TOL);
        assert!((cov[[1, 1, 1]] - 2.0).abs() < TOL);
    }

    #[test]
    // Purpose
    // -------
    // Verify the singular-input policy: every entry becomes positive
    // infinity, never NaN, including after the unit rescale.
    //
    // Given
    // -----
    // - H = [[1, 1], [1, 1]] with determinant exactly zero.
    //
    // Expect
    // ------
    // - All four covariance entries equal +infinity.
    fn calc_covariance_singular_block_is_all_positive_infinity() {
        // Arrange
        let hessian = array![[1.0, 1.0], [1.0, 1.0]].into_dyn();

        // Act
        let cov = calc_covariance(&hessian).unwrap();

        // Assert
        for &entry in cov.iter() {
            assert_eq!(entry, f64::INFINITY);
            assert!(!entry.is_nan());
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that a singular block inside a batch does not contaminate
    // its neighbors, and that batched evaluation matches per-element
    // evaluation.
    //
    // Given
    // -----
    // - A batch of [singular, diagonal PD] matrices.
    //
    // Expect
    // ------
    // - Block 0 is all infinity; block 1 equals the standalone result.
    fn calc_covariance_batch_elements_are_independent() {
        // Arrange
        let batch =
            array![[[1.0, 1.0], [1.0, 1.0]], [[2.0, 0.0], [0.0, 4.0]]].into_dyn();
        let single = array![[2.0, 0.0], [0.0, 4.0]].into_dyn();

        // Act
        let cov_batch = calc_covariance(&batch).unwrap();
        let cov_single = calc_covariance(&single).unwrap();

        // Assert
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(cov_batch[[0, i, j]], f64::INFINITY);
                assert_eq!(cov_batch[[1, i, j]], cov_single[[i, j]]);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that leading batch axes of arbitrary rank are preserved.
    //
    // Given
    // -----
    // - A (2, 3, 2, 2) batch of identity matrices.
    //
    // Expect
    // ------
    // - Output shape (2, 3, 2, 2); every block is the rescaled identity
    //   inverse [[36e6, 0], [0, 1]].
    fn calc_covariance_preserves_multi_axis_batch_shape() {
        // Arrange
        let mut hessian = ArrayD::<f64>::zeros(IxDyn(&[2, 3, 2, 2]));
        for i in 0..2 {
            for j in 0..3 {
                hessian[[i, j, 0, 0]] = 1.0;
                hessian[[i, j, 1, 1]] = 1.0;
            }
        }

        // Act
        let cov = calc_covariance(&hessian).unwrap();

        // Assert
        assert_eq!(cov.shape(), &[2, 3, 2, 2]);
        for i in 0..2 {
            for j in 0..3 {
                assert!((cov[[i, j, 0, 0]] - 36_000_000.0).abs() < TOL);
                assert!((cov[[i, j, 1, 1]] - 1.0).abs() < TOL);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify determinant batching and leading-shape preservation,
    // including the zero-dimensional single-matrix case.
    //
    // Given
    // -----
    // - A single matrix with determinant 8 and a batch of two matrices
    //   with determinants 8 and 0.
    //
    // Expect
    // ------
    // - Scalar output 8 for the single matrix; [8, 0] for the batch.
    fn batch_determinant_matches_closed_form() {
        // Arrange
        let single = array![[2.0, 0.0], [0.0, 4.0]].into_dyn();
        let batch =
            array![[[2.0, 0.0], [0.0, 4.0]], [[1.0, 1.0], [1.0, 1.0]]].into_dyn();

        // Act
        let det_single = batch_determinant(&single).unwrap();
        let det_batch = batch_determinant(&batch).unwrap();

        // Assert
        assert_eq!(det_single.shape(), &[] as &[usize]);
        let scalar = *det_single.iter().next().unwrap();
        assert!((scalar - 8.0).abs() < TOL);
        assert_eq!(det_batch.shape(), &[2]);
        assert!((det_batch[[0]] - 8.0).abs() < TOL);
        assert_eq!(det_batch[[1]], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that malformed trailing shapes are reported as a
    // caller-contract violation.
    //
    // Given
    // -----
    // - A (3, 3) matrix and a one-dimensional array.
    //
    // Expect
    // ------
    // - Both report `CostError::HessianShape` with the offending shape.
    fn calc_covariance_rejects_non_2x2_trailing_shape() {
        // Arrange
        let square3 = ArrayD::<f64>::zeros(IxDyn(&[3, 3]));
        let vector = ArrayD::<f64>::zeros(IxDyn(&[4]));

        // Act
        let err3 = calc_covariance(&square3).unwrap_err();
        let err1 = calc_covariance(&vector).unwrap_err();

        // Assert
        assert_eq!(err3, CostError::HessianShape { found: vec![3, 3] });
        assert_eq!(err1, CostError::HessianShape { found: vec![4] });
    }
}
