//! Integration tests — full pipeline from parameters to a converged search.
//!
//! Purpose
//! -------
//! Exercise the public surface end to end: physiological and scan
//! parameters in, kinetic model and Fisher assembly in the middle, a
//! converged timing search out, for each of the three cost criteria and
//! each label-duration strategy.
//!
//! Scope
//! -----
//! These tests cover:
//! - The wiring between `structures`, `kinetic_model`, `scan`, `cost`,
//!   and `optimize` through the re-exported surface only.
//! - Search outputs that a user would act on: monotone PLDs, timings on
//!   the search lattice, scan time within the requested duration, and
//!   costs consistent with direct evaluation.
//!
//! They intentionally DO NOT re-pin module-level numerics; those live in
//! the per-module unit tests.

use ndarray::Ix1;
use optpcasl::{
    ATTDist, BuxtonPcasl, CostMeasure, DOptimalCost, LOptimalCost, LdStrategy, Limits, Optimizer,
    PcaslProtocol, PhysParams, ScanParams,
};

// ---- Helpers ---------------------------------------------------------------

/// A deliberately small protocol family so full searches stay cheap:
/// two PLDs on a coarse lattice and a five-sample ATT prior.
fn small_protocol(strategy: LdStrategy) -> PcaslProtocol {
    let model = BuxtonPcasl::new(PhysParams::default());
    let scan = ScanParams::new(240.0, 2, 0.5, 1.4, 0.002, 1, 0.0).unwrap();
    let att_dist = ATTDist::new(0.5, 1.5, 0.25, 0.25).unwrap();
    let pld_lims = Limits::new("PLD", 0.25, 1.75, 0.25).unwrap();
    let ld_lims = Limits::new("LD", 0.8, 1.8, 0.2).unwrap();
    PcaslProtocol::new(model, scan, att_dist, pld_lims, Some(ld_lims), strategy).unwrap()
}

fn assert_on_lattice(value: f64, lims: &Limits) {
    let steps = ((value - lims.min()) / lims.step()).round();
    assert!(
        (value - (lims.min() + steps * lims.step())).abs() < 1e-9,
        "{value} is off the {} lattice",
        lims.name()
    );
}

// ---- Tests -----------------------------------------------------------------

#[test]
// Purpose
// -------
// Verify the full pipeline converges for each criterion and reports a
// finite cost, monotone PLDs, lattice-valued timings, and a scan time
// within the requested duration.
fn search_converges_for_all_criteria() {
    let cbf = LOptimalCost::cbf();
    let att = LOptimalCost::att();
    let joint = DOptimalCost::new();
    let criteria: [&dyn CostMeasure; 3] = [&cbf, &att, &joint];

    for criterion in criteria {
        // Arrange
        let protocol = small_protocol(LdStrategy::Fixed);
        let optimizer = Optimizer::new(&protocol, criterion);

        // Act
        let output = optimizer.optimize(None).unwrap();

        // Assert
        assert!(output.converged, "{} did not converge", criterion.name());
        assert!(output.cost.is_finite());
        assert!(output.cost > 0.0);
        assert!(output.scan_time <= 240.0 + 1e-9);
        assert!(output.num_av >= 1);
        for pair in output.timing.plds.as_slice().unwrap().windows(2) {
            assert!(pair[0] <= pair[1] + 1e-12);
        }
        for &pld in output.timing.plds.iter() {
            assert_on_lattice(pld, protocol.pld_limits());
        }
        // Fixed strategy never touches the label durations.
        assert!(output.timing.lds.iter().all(|&ld| (ld - 1.4).abs() < 1e-12));
    }
}

#[test]
// Purpose
// -------
// Verify a grid-search warm start feeds coordinate descent without
// regression: the refined cost is no worse than the warm-start cost,
// and both agree with direct evaluation.
fn gridsearch_warm_start_feeds_coordinate_descent() {
    // Arrange
    let protocol = small_protocol(LdStrategy::Fixed);
    let criterion = LOptimalCost::cbf();
    let optimizer = Optimizer::new(&protocol, &criterion);

    // Act
    let warm_start = optimizer.gridsearch(10_000).unwrap();
    let start_cost = optimizer.evaluate(&warm_start).unwrap();
    let output = optimizer.optimize(Some(warm_start)).unwrap();

    // Assert
    assert!(output.converged);
    assert!(output.cost <= start_cost);
    let direct = optimizer.evaluate(&output.timing).unwrap();
    assert!((direct - output.cost).abs() <= 1e-9 * output.cost.abs());
}

#[test]
// Purpose
// -------
// Verify the searched-LD strategies: a shared LD keeps every label
// duration equal, a per-PLD LD may not, and both land on the LD
// lattice.
fn searched_label_durations_stay_on_their_lattice() {
    // Arrange
    let shared = small_protocol(LdStrategy::Shared);
    let multi = small_protocol(LdStrategy::PerPld);
    let criterion = DOptimalCost::new();
    let ld_lims = Limits::new("LD", 0.8, 1.8, 0.2).unwrap();

    // Act
    let shared_out = Optimizer::new(&shared, &criterion).optimize(None).unwrap();
    let multi_out = Optimizer::new(&multi, &criterion).optimize(None).unwrap();

    // Assert
    assert!(shared_out.converged);
    assert!(multi_out.converged);
    let first = shared_out.timing.lds[0];
    assert!(shared_out.timing.lds.iter().all(|&ld| (ld - first).abs() < 1e-12));
    for &ld in shared_out.timing.lds.iter().chain(multi_out.timing.lds.iter()) {
        assert_on_lattice(ld, &ld_lims);
    }
}

#[test]
// Purpose
// -------
// Verify each criterion's search improves on the shared starting
// timing and that the reported cost matches direct evaluation of the
// returned timing.
fn searches_improve_on_the_starting_timing() {
    // Arrange
    let protocol = small_protocol(LdStrategy::Fixed);
    let cbf = LOptimalCost::cbf();
    let att = LOptimalCost::att();
    let initial = protocol.initial_timing();

    for criterion in [&cbf as &dyn CostMeasure, &att] {
        let optimizer = Optimizer::new(&protocol, criterion);
        let start_cost = optimizer.evaluate(&initial).unwrap();

        // Act
        let output = optimizer.optimize(None).unwrap();

        // Assert
        assert!(output.cost <= start_cost, "{} regressed", criterion.name());
        let direct = optimizer.evaluate(&output.timing).unwrap();
        assert!((direct - output.cost).abs() <= 1e-9 * output.cost.abs());
    }
}

#[test]
// Purpose
// -------
// Verify the degenerate end of the pipeline: a scan too short for one
// label/control pair produces an infinite (never NaN) cost for every
// criterion, and the search still converges rather than erroring.
fn uninformative_scan_costs_infinity_and_still_converges() {
    // Arrange
    let model = BuxtonPcasl::new(PhysParams::default());
    let scan = ScanParams::new(3.0, 2, 0.5, 1.4, 0.002, 1, 0.0).unwrap();
    let att_dist = ATTDist::new(0.5, 1.5, 0.25, 0.25).unwrap();
    let pld_lims = Limits::new("PLD", 0.25, 1.75, 0.5).unwrap();
    let protocol =
        PcaslProtocol::new(model, scan, att_dist, pld_lims, None, LdStrategy::Fixed).unwrap();

    let cbf = LOptimalCost::cbf();
    let att = LOptimalCost::att();
    let joint = DOptimalCost::new();
    let criteria: [&dyn CostMeasure; 3] = [&cbf, &att, &joint];

    for criterion in criteria {
        // Act
        let optimizer = Optimizer::new(&protocol, criterion);
        let output = optimizer.optimize(None).unwrap();

        // Assert
        assert!(output.converged);
        assert_eq!(output.cost, f64::INFINITY);
        assert!(!output.cost.is_nan());
        assert_eq!(output.num_av, 0);
    }
}

#[test]
// Purpose
// -------
// Verify the criterion batch surface directly against the protocol's
// Fisher assembly: the per-ATT cost vector has one entry per ATT
// sample and every entry is positive for an informative protocol.
fn per_att_costs_align_with_the_prior() {
    // Arrange
    let protocol = small_protocol(LdStrategy::Fixed);
    let criterion = LOptimalCost::att();
    let timing = protocol.initial_timing();

    // Act
    let hessians = protocol.hessians(&timing).unwrap().into_dyn();
    let costs = criterion.cost(&hessians).unwrap().into_dimensionality::<Ix1>().unwrap();

    // Assert
    assert_eq!(costs.len(), protocol.att_dist().atts().len());
    assert!(costs.iter().all(|&c| c > 0.0));
}
