//! Session orchestration: routes samples to the detectors and filters,
//! owns counters, the bounded history ring, and the export log.

use crate::cadence::{CadenceCfg, CadenceEstimator};
use crate::detector::{DetectorCfg, StepDetector};
use crate::error::{BuildError, PipelineError, Result};
use crate::history::{DEFAULT_HISTORY_CAPACITY, MetricRing};
use crate::impact::{self, ImpactCfg};
use crate::orientation::{ComplementaryFusionFilter, EwmaAngleFilter, OrientationCfg};
use crate::types::{
    ImpactCounts, MeasurementRecord, MetricKind, OrientationAlgorithm, PipelineMode, Sample,
    SessionSnapshot, StepAlgorithm, Vec3,
};

/// Runtime configuration for one aggregator instance.
#[derive(Debug, Clone, Copy)]
pub struct SessionCfg {
    pub detector: DetectorCfg,
    pub cadence: CadenceCfg,
    pub impact: ImpactCfg,
    pub orientation: OrientationCfg,
    pub history_capacity: usize,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            detector: DetectorCfg::default(),
            cadence: CadenceCfg::default(),
            impact: ImpactCfg::default(),
            orientation: OrientationCfg::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl SessionCfg {
    /// Map the file schema onto runtime config.
    pub fn from_config(cfg: &stride_config::Config) -> Self {
        Self {
            detector: DetectorCfg::from(&cfg.detector),
            cadence: CadenceCfg::from(&cfg.cadence),
            impact: ImpactCfg::from(&cfg.impact),
            orientation: OrientationCfg::from(&cfg.orientation),
            history_capacity: cfg.history.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Measuring,
}

/// Typed form of the drop-and-report policy: a sample carrying a non-finite
/// axis value must never reach filter state.
fn check_finite(sample: &Sample) -> std::result::Result<(), PipelineError> {
    if sample.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::MalformedSample("non-finite axis value"))
    }
}

/// Orchestrates the signal-processing pipeline for one session at a time.
///
/// Logically single-threaded: one producer calls `ingest` under a single
/// mutual-exclusion boundary; readers consume immutable `SessionSnapshot`
/// copies. Nothing here blocks, sleeps, or performs I/O.
pub struct SessionAggregator {
    mode: PipelineMode,
    impact_cfg: ImpactCfg,

    phase: SessionPhase,
    session_start_ns: Option<i64>,
    // Cadence reference: seeded by the session's first sample, advanced only
    // when an interval is accepted.
    cadence_ref_ns: i64,

    detector: StepDetector,
    cadence: CadenceEstimator,
    ewma: EwmaAngleFilter,
    fusion: ComplementaryFusionFilter,
    last_gyro_ns: Option<i64>,

    step_count: u32,
    impact: ImpactCounts,
    latest_accel: Vec3,
    latest_gyro: Vec3,
    latest_gravity: Vec3,
    latest_angle_deg: Option<f32>,

    history: MetricRing,
    // Unbounded export log; survives stop() until consumed or reset.
    records: Vec<MeasurementRecord>,
    dropped_samples: u64,
}

impl core::fmt::Debug for SessionAggregator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionAggregator")
            .field("mode", &self.mode.name())
            .field("phase", &self.phase)
            .field("step_count", &self.step_count)
            .field("records", &self.records.len())
            .finish()
    }
}

impl SessionAggregator {
    /// Start building an aggregator.
    pub fn builder() -> SessionAggregatorBuilder {
        SessionAggregatorBuilder::default()
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_measuring(&self) -> bool {
        self.phase == SessionPhase::Measuring
    }

    /// Begin a new session. Valid only from Idle; fully re-zeros detector,
    /// estimator, and filter state so nothing leaks across the boundary.
    /// The export log is retained until consumed or `reset()`.
    pub fn start(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Measuring {
            tracing::warn!("start() while measuring; ignored");
            return Err(PipelineError::State("start while measuring").into());
        }
        self.zero_session_state();
        self.phase = SessionPhase::Measuring;
        tracing::info!(mode = self.mode.name(), "session started");
        Ok(())
    }

    /// End the session. Valid only from Measuring.
    pub fn stop(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Idle {
            tracing::warn!("stop() while idle; ignored");
            return Err(PipelineError::State("stop while idle").into());
        }
        self.phase = SessionPhase::Idle;
        tracing::info!(
            steps = self.step_count,
            records = self.records.len(),
            "session stopped"
        );
        Ok(())
    }

    /// Select the pipeline for the next session. Rejected while measuring:
    /// mode is fixed for the duration of a session.
    pub fn set_mode(&mut self, mode: PipelineMode) -> Result<()> {
        if self.phase == SessionPhase::Measuring {
            tracing::warn!(requested = mode.name(), "set_mode() while measuring; ignored");
            return Err(PipelineError::State("set_mode while measuring").into());
        }
        self.mode = mode;
        Ok(())
    }

    /// Return to Idle and re-zero everything, export log included.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.zero_session_state();
        self.records.clear();
    }

    /// Ingest one sample and return the updated snapshot.
    ///
    /// Dropped (with a warning) while Idle. Malformed samples (non-finite
    /// axis values) are dropped and counted rather than clamped, so NaN can
    /// never reach filter state. The first sample of a session establishes
    /// the zero point and is otherwise discarded.
    pub fn ingest(&mut self, sample: Sample) -> SessionSnapshot {
        if self.phase != SessionPhase::Measuring {
            tracing::warn!("sample ingested while idle; dropped");
            return self.snapshot();
        }
        if let Err(e) = check_finite(&sample) {
            self.dropped_samples += 1;
            tracing::warn!(error = %e, dropped = self.dropped_samples, "sample dropped");
            return self.snapshot();
        }

        let t_ns = sample.timestamp_ns();
        let Some(start_ns) = self.session_start_ns else {
            self.session_start_ns = Some(t_ns);
            self.cadence_ref_ns = t_ns;
            return self.snapshot();
        };
        let rel_ns = t_ns - start_ns;

        match sample {
            Sample::Accelerometer { t_ns, v } => self.on_accelerometer(t_ns, rel_ns, v),
            Sample::Gyroscope { t_ns, v } => self.on_gyroscope(t_ns, rel_ns, v),
            Sample::Gravity { v, .. } => self.on_gravity(rel_ns, v),
            Sample::HardwareStep { t_ns } => self.on_hardware_step(t_ns, rel_ns),
        }

        self.snapshot()
    }

    /// Immutable value copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            measuring: self.phase == SessionPhase::Measuring,
            mode: self.mode,
            step_count: self.step_count,
            cadence_spm: self.cadence.current(),
            impact: self.impact,
            latest_accel: self.latest_accel,
            latest_gyro: self.latest_gyro,
            latest_gravity: self.latest_gravity,
            latest_angle_deg: self.latest_angle_deg,
            history: self.history.to_vec(),
            dropped_samples: self.dropped_samples,
        }
    }

    /// The export log accumulated so far (relative timestamps).
    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    /// Clear the export log. Called by the export collaborator only after a
    /// confirmed successful write.
    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    fn on_accelerometer(&mut self, t_ns: i64, rel_ns: i64, v: Vec3) {
        self.latest_accel = v;
        let magnitude = v.magnitude();
        match self.mode {
            PipelineMode::Step(StepAlgorithm::Custom) => {
                if let Some(impact_mag) = self.detector.detect(v, self.latest_gyro, t_ns) {
                    self.confirm_step(t_ns);
                    let level = impact::classify(&self.impact_cfg, impact_mag);
                    self.impact.record(level);
                    self.push_metric(rel_ns, magnitude, MetricKind::Step);
                } else {
                    self.push_metric(rel_ns, magnitude, MetricKind::Raw);
                }
            }
            // Other pipelines only track the raw magnitude on this channel.
            _ => self.push_metric(rel_ns, magnitude, MetricKind::Raw),
        }
    }

    fn on_gyroscope(&mut self, t_ns: i64, rel_ns: i64, v: Vec3) {
        self.latest_gyro = v;
        if self.mode == PipelineMode::Orientation(OrientationAlgorithm::ComplementaryFusion) {
            if let Some(prev_ns) = self.last_gyro_ns {
                let dt_sec = (t_ns.saturating_sub(prev_ns)) as f32 / 1e9;
                // Single-axis pitch rate; the gyroscope reports rad/s.
                let rate_dps = v.x.to_degrees();
                let angle = self.fusion.calculate(
                    self.latest_accel.y,
                    self.latest_accel.z,
                    rate_dps,
                    dt_sec,
                );
                self.latest_angle_deg = Some(angle);
                self.push_metric(rel_ns, angle, MetricKind::Angle);
            }
            self.last_gyro_ns = Some(t_ns);
        }
    }

    fn on_gravity(&mut self, rel_ns: i64, v: Vec3) {
        self.latest_gravity = v;
        if self.mode == PipelineMode::Orientation(OrientationAlgorithm::Ewma) {
            let angle = self.ewma.calculate(v.y, v.z);
            self.latest_angle_deg = Some(angle);
            self.push_metric(rel_ns, angle, MetricKind::Angle);
        }
    }

    fn on_hardware_step(&mut self, t_ns: i64, rel_ns: i64) {
        if self.mode != PipelineMode::Step(StepAlgorithm::Hardware) {
            return;
        }
        // No impact classification on this channel.
        self.confirm_step(t_ns);
        self.push_metric(rel_ns, self.cadence.current(), MetricKind::Step);
    }

    /// Count a confirmed step and try a cadence update. The reference point
    /// advances only when the interval qualifies.
    fn confirm_step(&mut self, t_ns: i64) {
        self.step_count += 1;
        if let Some(spm) = self.cadence.update(t_ns, self.cadence_ref_ns) {
            self.cadence_ref_ns = t_ns;
            // Status surface for the lifecycle host, one line per accepted
            // cadence update.
            tracing::info!(steps = self.step_count, spm, "step");
        }
    }

    fn push_metric(&mut self, rel_ns: i64, value: f32, metric: MetricKind) {
        self.history.push(value);
        self.records.push(MeasurementRecord {
            t_ns: rel_ns,
            value,
            metric,
        });
    }

    fn zero_session_state(&mut self) {
        self.session_start_ns = None;
        self.cadence_ref_ns = 0;
        self.detector.reset();
        self.cadence.reset();
        self.ewma.reset();
        self.fusion.reset();
        self.last_gyro_ns = None;
        self.step_count = 0;
        self.impact = ImpactCounts::default();
        self.latest_accel = Vec3::default();
        self.latest_gyro = Vec3::default();
        self.latest_gravity = Vec3::default();
        self.latest_angle_deg = None;
        self.history.clear();
        self.dropped_samples = 0;
    }
}

/// Builder for `SessionAggregator`. Config is validated on `build()`.
#[derive(Default)]
pub struct SessionAggregatorBuilder {
    mode: Option<PipelineMode>,
    cfg: Option<SessionCfg>,
}

impl SessionAggregatorBuilder {
    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_cfg(mut self, cfg: SessionCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    pub fn build(self) -> Result<SessionAggregator> {
        let mode = self.mode.unwrap_or(PipelineMode::Step(StepAlgorithm::Custom));
        let cfg = self.cfg.unwrap_or_default();

        if cfg.history_capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "history_capacity must be >= 1",
            )));
        }
        if !(cfg.detector.smoothing_alpha > 0.0 && cfg.detector.smoothing_alpha <= 1.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "detector smoothing_alpha must be in (0.0, 1.0]",
            )));
        }
        if !cfg.detector.step_threshold.is_finite() || cfg.detector.step_threshold <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "detector step_threshold must be finite and > 0",
            )));
        }
        if !cfg.detector.gyro_gate_rps.is_finite() || cfg.detector.gyro_gate_rps < 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "detector gyro_gate_rps must be finite and >= 0",
            )));
        }
        if cfg.detector.refractory_ns < 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "detector refractory_ns must be >= 0",
            )));
        }
        if !(cfg.cadence.blend > 0.0 && cfg.cadence.blend <= 1.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "cadence blend must be in (0.0, 1.0]",
            )));
        }
        if !cfg.cadence.min_interval_s.is_finite() || cfg.cadence.min_interval_s < 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "cadence min_interval_s must be finite and >= 0",
            )));
        }
        if cfg.impact.low_below >= cfg.impact.medium_below {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "impact low_below must be < medium_below",
            )));
        }
        if !(cfg.orientation.ewma_alpha > 0.0 && cfg.orientation.ewma_alpha <= 1.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "orientation ewma_alpha must be in (0.0, 1.0]",
            )));
        }
        if !(cfg.orientation.fusion_beta >= 0.0 && cfg.orientation.fusion_beta < 1.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "orientation fusion_beta must be in [0.0, 1.0)",
            )));
        }

        Ok(SessionAggregator {
            mode,
            impact_cfg: cfg.impact,
            phase: SessionPhase::Idle,
            session_start_ns: None,
            cadence_ref_ns: 0,
            detector: StepDetector::new(cfg.detector),
            cadence: CadenceEstimator::new(cfg.cadence),
            ewma: EwmaAngleFilter::new(&cfg.orientation),
            fusion: ComplementaryFusionFilter::new(&cfg.orientation),
            last_gyro_ns: None,
            step_count: 0,
            impact: ImpactCounts::default(),
            latest_accel: Vec3::default(),
            latest_gyro: Vec3::default(),
            latest_gravity: Vec3::default(),
            latest_angle_deg: None,
            history: MetricRing::new(cfg.history_capacity),
            records: Vec::new(),
            dropped_samples: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_samples_map_to_a_typed_error() {
        let bad = Sample::Accelerometer {
            t_ns: 0,
            v: Vec3::new(f32::NAN, 0.0, 0.0),
        };
        assert!(matches!(
            check_finite(&bad),
            Err(PipelineError::MalformedSample(_))
        ));
        assert!(check_finite(&Sample::HardwareStep { t_ns: 0 }).is_ok());
    }
}
