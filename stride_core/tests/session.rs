use stride_core::error::PipelineError;
use stride_core::{
    MetricKind, OrientationAlgorithm, PipelineMode, Sample, SessionAggregator, SessionCfg,
    SessionPhase, StepAlgorithm, Vec3,
};

const NS: i64 = 1_000_000_000;
const MOVING: Vec3 = Vec3::new(1.0, 0.0, 0.0);

fn agg(mode: PipelineMode) -> SessionAggregator {
    SessionAggregator::builder().with_mode(mode).build().unwrap()
}

fn accel(t_ns: i64, magnitude: f32) -> Sample {
    Sample::Accelerometer {
        t_ns,
        v: Vec3::new(0.0, 0.0, magnitude),
    }
}

fn gyro(t_ns: i64, v: Vec3) -> Sample {
    Sample::Gyroscope { t_ns, v }
}

fn is_state_error(e: &eyre::Report) -> bool {
    matches!(
        e.downcast_ref::<PipelineError>(),
        Some(PipelineError::State(_))
    )
}

#[test]
fn start_twice_is_rejected_without_losing_the_session() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    let err = a.start().unwrap_err();
    assert!(is_state_error(&err));
    assert_eq!(a.phase(), SessionPhase::Measuring);
}

#[test]
fn stop_while_idle_is_rejected() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    let err = a.stop().unwrap_err();
    assert!(is_state_error(&err));
    assert_eq!(a.phase(), SessionPhase::Idle);
}

#[test]
fn mode_is_fixed_while_measuring() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    let err = a
        .set_mode(PipelineMode::Orientation(OrientationAlgorithm::Ewma))
        .unwrap_err();
    assert!(is_state_error(&err));
    assert_eq!(a.mode(), PipelineMode::Step(StepAlgorithm::Custom));

    a.stop().unwrap();
    a.set_mode(PipelineMode::Orientation(OrientationAlgorithm::Ewma))
        .unwrap();
    assert_eq!(a.mode(), PipelineMode::Orientation(OrientationAlgorithm::Ewma));
}

#[test]
fn samples_while_idle_are_dropped() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    let snap = a.ingest(accel(NS, 12.0));
    assert!(!snap.measuring);
    assert_eq!(snap.history.len(), 0);
    assert!(a.records().is_empty());
}

#[test]
fn first_sample_sets_the_zero_point_and_is_discarded() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    // Arbitrary absolute epoch; everything downstream is relative to it.
    let snap = a.ingest(gyro(5 * NS, MOVING));
    assert_eq!(snap.history.len(), 0);
    assert!(a.records().is_empty());

    a.ingest(accel(5 * NS + NS / 2, 9.8));
    assert_eq!(a.records().len(), 1);
    assert_eq!(a.records()[0].t_ns, NS / 2);
    assert_eq!(a.records()[0].metric, MetricKind::Raw);
}

#[test]
fn non_finite_samples_are_counted_not_ingested() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    a.ingest(gyro(NS, MOVING));
    let snap = a.ingest(accel(NS + 20_000_000, f32::NAN));
    assert_eq!(snap.dropped_samples, 1);
    assert!(a.records().is_empty());

    // The pipeline keeps working afterwards.
    let snap = a.ingest(accel(NS + 40_000_000, 9.8));
    assert_eq!(snap.dropped_samples, 1);
    assert_eq!(a.records().len(), 1);
    assert!(snap.latest_accel.is_finite());
}

#[test]
fn history_is_bounded_and_oldest_first() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    a.ingest(gyro(0, Vec3::default())); // zero point, stationary gyro
    for i in 1..=500_i64 {
        a.ingest(accel(i * 20_000_000, i as f32));
    }
    let snap = a.snapshot();
    assert_eq!(snap.history.len(), 200);
    // Inserts 301..=500 survive, oldest first.
    assert_eq!(snap.history[0], 301.0);
    assert_eq!(snap.history[199], 500.0);
    // The export log is unbounded and kept in full.
    assert_eq!(a.records().len(), 500);
}

#[test]
fn custom_mode_counts_steps_and_classifies_impact() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    a.ingest(gyro(0, MOVING)); // zero point only
    a.ingest(gyro(10_000_000, MOVING));
    // Sustained elevation: one rising-edge step, the rest raw records. Start
    // past the refractory window so the crossing is not swallowed.
    let mut last = a.snapshot();
    for i in 1..=50_i64 {
        last = a.ingest(accel(NS + i * 20_000_000, 12.0));
    }
    assert_eq!(last.step_count, 1);
    assert_eq!(last.impact.total(), 1);
    assert_eq!(last.impact.low, 1); // smoothed ~11 at the crossing
    let steps = a
        .records()
        .iter()
        .filter(|r| r.metric == MetricKind::Step)
        .count();
    assert_eq!(steps, 1);
}

#[test]
fn hardware_mode_counts_events_and_estimates_cadence() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Hardware));
    a.start().unwrap();
    // First event is the zero point; three more at 0.5 s spacing.
    a.ingest(Sample::HardwareStep { t_ns: 0 });
    for i in 1..=3_i64 {
        a.ingest(Sample::HardwareStep { t_ns: i * NS / 2 });
    }
    let snap = a.snapshot();
    assert_eq!(snap.step_count, 3);
    assert_eq!(snap.cadence_spm, 120.0);
    // Hardware events carry no impact classification.
    assert_eq!(snap.impact.total(), 0);
    let kinds: Vec<_> = a.records().iter().map(|r| r.metric).collect();
    assert_eq!(kinds, vec![MetricKind::Step; 3]);
}

#[test]
fn hardware_events_are_ignored_in_custom_mode() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    a.ingest(gyro(0, MOVING));
    for i in 1..=5_i64 {
        a.ingest(Sample::HardwareStep { t_ns: i * NS / 2 });
    }
    assert_eq!(a.snapshot().step_count, 0);
}

#[test]
fn ewma_mode_tracks_gravity_only() {
    let mut a = agg(PipelineMode::Orientation(OrientationAlgorithm::Ewma));
    a.start().unwrap();
    a.ingest(gyro(0, MOVING));
    let tilt = 30.0_f32.to_radians();
    let g = Vec3::new(0.0, -9.81 * tilt.sin(), 9.81 * tilt.cos());
    let mut snap = a.snapshot();
    for i in 1..=40_i64 {
        snap = a.ingest(Sample::Gravity {
            t_ns: i * 20_000_000,
            v: g,
        });
    }
    let angle = snap.latest_angle_deg.unwrap();
    assert!((angle - 30.0).abs() < 0.1, "angle {angle}");
    // Accelerometer samples only contribute raw magnitude in this mode.
    let snap = a.ingest(accel(NS, 12.0));
    assert_eq!(snap.step_count, 0);
    assert_eq!(a.records().last().unwrap().metric, MetricKind::Raw);
}

#[test]
fn fusion_mode_needs_two_gyro_ticks() {
    let mut a = agg(PipelineMode::Orientation(
        OrientationAlgorithm::ComplementaryFusion,
    ));
    a.start().unwrap();
    a.ingest(accel(0, 9.8)); // zero point
    a.ingest(accel(10_000_000, 9.8));
    // First gyro tick only seeds the time base.
    let snap = a.ingest(gyro(20_000_000, MOVING));
    assert_eq!(snap.latest_angle_deg, None);
    // Second tick produces an angle from the 20 ms delta.
    let snap = a.ingest(gyro(40_000_000, MOVING));
    let angle = snap.latest_angle_deg.unwrap();
    // 1 rad/s over 20 ms, level accelerometer: 0.98 * 57.2958 * 0.02.
    assert!((angle - 1.1229).abs() < 1e-3, "angle {angle}");
}

#[test]
fn start_zeroes_session_state_but_keeps_the_export_log() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Hardware));
    a.start().unwrap();
    a.ingest(Sample::HardwareStep { t_ns: 0 });
    a.ingest(Sample::HardwareStep { t_ns: NS / 2 });
    a.stop().unwrap();
    assert_eq!(a.records().len(), 1);

    a.start().unwrap();
    let snap = a.snapshot();
    assert_eq!(snap.step_count, 0);
    assert_eq!(snap.cadence_spm, 0.0);
    assert!(snap.history.is_empty());
    // Log survives the boundary until exported or reset.
    assert_eq!(a.records().len(), 1);
}

#[test]
fn reset_clears_everything_including_the_log() {
    let mut a = agg(PipelineMode::Step(StepAlgorithm::Hardware));
    a.start().unwrap();
    a.ingest(Sample::HardwareStep { t_ns: 0 });
    a.ingest(Sample::HardwareStep { t_ns: NS / 2 });
    a.reset();
    assert_eq!(a.phase(), SessionPhase::Idle);
    assert!(a.records().is_empty());
    assert_eq!(a.snapshot().step_count, 0);
}

#[test]
fn identical_replays_produce_identical_snapshots() {
    let script: Vec<Sample> = (0..200_i64)
        .map(|i| {
            if i % 2 == 0 {
                gyro(i * 10_000_000, MOVING)
            } else {
                accel(i * 10_000_000, if (i / 2) % 19 < 6 { 13.5 } else { 8.5 })
            }
        })
        .collect();

    let mut a = agg(PipelineMode::Step(StepAlgorithm::Custom));
    a.start().unwrap();
    for s in &script {
        a.ingest(*s);
    }
    let first = a.snapshot();

    a.stop().unwrap();
    a.reset();
    a.start().unwrap();
    for s in &script {
        a.ingest(*s);
    }
    assert_eq!(a.snapshot(), first);
}

#[test]
fn from_config_respects_history_capacity() {
    let cfg = stride_config::load_toml("[history]\ncapacity = 10\n").unwrap();
    let mut a = SessionAggregator::builder()
        .with_mode(PipelineMode::Step(StepAlgorithm::Custom))
        .with_cfg(SessionCfg::from_config(&cfg))
        .build()
        .unwrap();
    a.start().unwrap();
    a.ingest(gyro(0, Vec3::default()));
    for i in 1..=50_i64 {
        a.ingest(accel(i * 20_000_000, i as f32));
    }
    assert_eq!(a.snapshot().history.len(), 10);
}

#[test]
fn builder_rejects_invalid_tuning() {
    let bad = SessionCfg {
        history_capacity: 0,
        ..SessionCfg::default()
    };
    let err = SessionAggregator::builder().with_cfg(bad).build().unwrap_err();
    assert!(err.to_string().contains("history_capacity"));
}
