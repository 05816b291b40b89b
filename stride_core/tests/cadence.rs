use rstest::rstest;
use stride_core::{CadenceCfg, CadenceEstimator};

const NS: i64 = 1_000_000_000;

#[rstest]
#[case(200_000_000)] // 0.2 s, double-trigger territory
#[case(250_000_000)] // exactly the minimum is still rejected
#[case(0)]
#[case(-100_000_000)] // out-of-order event
fn short_or_invalid_intervals_are_rejected(#[case] delta_ns: i64) {
    let mut est = CadenceEstimator::new(CadenceCfg::default());
    assert_eq!(est.update(delta_ns, 0), None);
    assert_eq!(est.current(), 0.0);
}

#[test]
fn first_accepted_interval_sets_cadence_directly() {
    let mut est = CadenceEstimator::new(CadenceCfg::default());
    // 0.5 s between steps is 120 steps/minute.
    assert_eq!(est.update(NS / 2, 0), Some(120.0));
    assert_eq!(est.current(), 120.0);
}

#[test]
fn later_intervals_blend_evenly() {
    let mut est = CadenceEstimator::new(CadenceCfg::default());
    est.update(NS / 2, 0); // 120 spm
    // A 1 s interval is 60 spm; with a 0.5 blend the estimate lands halfway.
    let spm = est.update(3 * NS / 2, NS / 2).unwrap();
    assert!((spm - 90.0).abs() < 1e-3, "spm {spm}");
}

#[test]
fn rejection_leaves_the_estimate_untouched() {
    let mut est = CadenceEstimator::new(CadenceCfg::default());
    est.update(NS / 2, 0);
    assert_eq!(est.update(NS / 2 + 100_000_000, NS / 2), None);
    assert_eq!(est.current(), 120.0);
}

#[test]
fn reset_returns_to_zero() {
    let mut est = CadenceEstimator::new(CadenceCfg::default());
    est.update(NS / 2, 0);
    est.reset();
    assert_eq!(est.current(), 0.0);
    // Post-reset the next accepted interval seeds the estimate again.
    assert_eq!(est.update(NS, 0), Some(60.0));
}

#[test]
fn full_blend_tracks_the_latest_interval() {
    let mut est = CadenceEstimator::new(CadenceCfg {
        blend: 1.0,
        ..CadenceCfg::default()
    });
    est.update(NS / 2, 0);
    let spm = est.update(NS, 0).unwrap();
    assert!((spm - 60.0).abs() < 1e-3);
}
