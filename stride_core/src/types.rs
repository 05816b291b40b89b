//! Shared pipeline types: modes, impact buckets, records, snapshots.

pub use stride_traits::{Sample, Vec3};

/// Step-counting pipeline family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAlgorithm {
    /// Adaptive peak detector over smoothed acceleration magnitude.
    Custom,
    /// Dedicated hardware step-event channel; no impact classification.
    Hardware,
}

/// Orientation pipeline family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationAlgorithm {
    /// Exponentially-weighted smoothing of the gravity-derived angle.
    Ewma,
    /// Gyro integration corrected by the accelerometer tilt estimate.
    ComplementaryFusion,
}

/// Pipeline selected at session start. A session runs exactly one family;
/// the two are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Step(StepAlgorithm),
    Orientation(OrientationAlgorithm),
}

impl PipelineMode {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineMode::Step(StepAlgorithm::Custom) => "custom-step",
            PipelineMode::Step(StepAlgorithm::Hardware) => "hardware-step",
            PipelineMode::Orientation(OrientationAlgorithm::Ewma) => "ewma-orientation",
            PipelineMode::Orientation(OrientationAlgorithm::ComplementaryFusion) => {
                "fusion-orientation"
            }
        }
    }
}

/// Per-step impact severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// Running impact bucket counts. Monotonically non-decreasing within a
/// session; the sum equals the custom-algorithm step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImpactCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl ImpactCounts {
    pub fn record(&mut self, level: ImpactLevel) {
        match level {
            ImpactLevel::Low => self.low += 1,
            ImpactLevel::Medium => self.medium += 1,
            ImpactLevel::High => self.high += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high
    }
}

/// Export label for a measurement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Raw acceleration magnitude, no step confirmed.
    Raw,
    /// A confirmed step.
    Step,
    /// An orientation angle estimate (degrees).
    Angle,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Raw => "Raw",
            MetricKind::Step => "Step",
            MetricKind::Angle => "Angle",
        }
    }
}

impl core::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the unbounded export log. Timestamps are nanoseconds
/// relative to session start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRecord {
    pub t_ns: i64,
    pub value: f32,
    pub metric: MetricKind,
}

/// Immutable value copy of the session state, safe to hand to concurrent
/// readers. Produced per `ingest` and on demand; never aliases the
/// aggregator's mutable buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub measuring: bool,
    pub mode: PipelineMode,
    pub step_count: u32,
    pub cadence_spm: f32,
    pub impact: ImpactCounts,
    pub latest_accel: Vec3,
    pub latest_gyro: Vec3,
    pub latest_gravity: Vec3,
    pub latest_angle_deg: Option<f32>,
    /// Most recent metric values, oldest first, bounded by the ring capacity.
    pub history: Vec<f32>,
    /// Malformed samples dropped so far (drop-and-report policy).
    pub dropped_samples: u64,
}
