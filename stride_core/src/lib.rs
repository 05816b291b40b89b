#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motion-metrics pipeline (hardware-agnostic).
//!
//! Derives higher-level motion metrics from a raw sensor-sample stream in
//! real time: detected steps, cadence (steps per minute), per-step impact
//! classification, and limb/body orientation angle. Sample acquisition goes
//! through the `stride_traits::ImuSource` trait; this crate never touches
//! hardware.
//!
//! ## Architecture
//!
//! - **Detection**: adaptive peak detector over a smoothed acceleration
//!   magnitude, gyro-gated with a refractory timer (`detector` module)
//! - **Cadence**: smoothed steps/minute from inter-step deltas (`cadence`)
//! - **Impact**: three-bucket severity classification (`impact`)
//! - **Orientation**: EWMA and complementary-fusion angle filters
//!   (`orientation`)
//! - **Session**: `SessionAggregator` state machine routing samples per the
//!   selected pipeline, bounded history ring, export log (`session`)
//! - **Export**: delimited-text artifact of the measurement log (`export`)
//! - **Acquisition**: background `SampleFeed` thread over a bounded channel
//!   (`feed`)
//!
//! The pipeline is deterministic, allocation-bounded, and logically
//! single-threaded per session: one producer ingests, concurrent readers get
//! immutable `SessionSnapshot` value copies.

// Module declarations
pub mod cadence;
pub mod detector;
pub mod error;
pub mod export;
pub mod feed;
pub mod history;
pub mod impact;
pub mod mocks;
pub mod orientation;
pub mod session;
pub mod types;
pub mod util;

pub use cadence::{CadenceCfg, CadenceEstimator};
pub use detector::{DetectorCfg, StepDetector};
pub use error::{BuildError, PipelineError, Result};
pub use export::{ExportOutcome, export_session_csv, format_relative_ns, render_csv};
pub use feed::SampleFeed;
pub use history::{DEFAULT_HISTORY_CAPACITY, MetricRing};
pub use impact::{ImpactCfg, classify};
pub use orientation::{ComplementaryFusionFilter, EwmaAngleFilter, OrientationCfg};
pub use session::{SessionAggregator, SessionCfg, SessionPhase};
pub use types::{
    ImpactCounts, ImpactLevel, MeasurementRecord, MetricKind, OrientationAlgorithm, PipelineMode,
    Sample, SessionSnapshot, StepAlgorithm, Vec3,
};
