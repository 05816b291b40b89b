#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the stride motion-metrics pipeline.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. Every
//! table is optional; defaults reproduce the reference tuning of the
//! detector, estimators, and filters.
use serde::Deserialize;

/// Step detector tuning.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DetectorCfg {
    /// Smoothed-magnitude threshold a rising edge must cross (m/s²).
    pub step_threshold: f32,
    /// Single-pole low-pass smoothing factor for the magnitude, in (0.0, 1.0].
    pub smoothing_alpha: f32,
    /// Gyroscope magnitude gate (rad/s); below this the body is considered
    /// stationary and peaks are rejected.
    pub gyro_gate_rps: f32,
    /// Minimum time between confirmed steps (ms).
    pub refractory_ms: u64,
    /// Seed for the smoothed magnitude at reset (one earth-gravity).
    pub rest_magnitude: f32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            step_threshold: 11.0,
            smoothing_alpha: 0.1,
            gyro_gate_rps: 0.5,
            refractory_ms: 250,
            rest_magnitude: 9.8,
        }
    }
}

/// Cadence estimator tuning.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CadenceCfg {
    /// Inter-step intervals at or below this are rejected as double-triggers (s).
    pub min_interval_s: f32,
    /// Exponential blend weight applied to the new steps/minute value, in (0.0, 1.0].
    pub blend: f32,
}

impl Default for CadenceCfg {
    fn default() -> Self {
        Self {
            min_interval_s: 0.25,
            blend: 0.5,
        }
    }
}

/// Impact classification bucket bounds (smoothed magnitude, m/s²).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ImpactCfg {
    /// Below this is Low.
    pub low_below: f32,
    /// Below this (and >= low_below) is Medium; at or above is High.
    pub medium_below: f32,
}

impl Default for ImpactCfg {
    fn default() -> Self {
        Self {
            low_below: 13.0,
            medium_below: 16.0,
        }
    }
}

/// Orientation filter tuning.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct OrientationCfg {
    /// EWMA weight on the newest gravity-derived angle, in (0.0, 1.0].
    pub ewma_alpha: f32,
    /// Complementary filter weight on the integrated gyro angle, in [0.0, 1.0).
    pub fusion_beta: f32,
}

impl Default for OrientationCfg {
    fn default() -> Self {
        Self {
            ewma_alpha: 0.2,
            fusion_beta: 0.98,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct HistoryCfg {
    /// Bounded metric ring capacity; oldest entries are evicted when full.
    pub capacity: usize,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Simulated IMU source parameters (used when no hardware is attached).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Simulation {
    /// Per-channel sampling rate (Hz).
    pub sample_rate_hz: u32,
    /// Target cadence of the synthetic walker (steps per minute).
    pub cadence_spm: f32,
    /// Peak acceleration magnitude above rest at each heel strike (m/s²).
    pub impact_amplitude: f32,
    /// Additive noise amplitude (m/s²).
    pub noise_amplitude: f32,
    /// PRNG seed for reproducible runs.
    pub seed: u32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            cadence_spm: 160.0,
            impact_amplitude: 5.0,
            noise_amplitude: 0.2,
            seed: 0xC0FFEE,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorCfg,
    pub cadence: CadenceCfg,
    pub impact: ImpactCfg,
    pub orientation: OrientationCfg,
    pub history: HistoryCfg,
    pub logging: Logging,
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Detector
        if !self.detector.step_threshold.is_finite() || self.detector.step_threshold <= 0.0 {
            eyre::bail!("detector.step_threshold must be finite and > 0");
        }
        if !(self.detector.smoothing_alpha > 0.0 && self.detector.smoothing_alpha <= 1.0) {
            eyre::bail!("detector.smoothing_alpha must be in (0.0, 1.0]");
        }
        if !self.detector.gyro_gate_rps.is_finite() || self.detector.gyro_gate_rps < 0.0 {
            eyre::bail!("detector.gyro_gate_rps must be finite and >= 0");
        }
        if !self.detector.rest_magnitude.is_finite() || self.detector.rest_magnitude < 0.0 {
            eyre::bail!("detector.rest_magnitude must be finite and >= 0");
        }

        // Cadence
        if !self.cadence.min_interval_s.is_finite() || self.cadence.min_interval_s < 0.0 {
            eyre::bail!("cadence.min_interval_s must be finite and >= 0");
        }
        if !(self.cadence.blend > 0.0 && self.cadence.blend <= 1.0) {
            eyre::bail!("cadence.blend must be in (0.0, 1.0]");
        }

        // Impact buckets must be ordered
        if !self.impact.low_below.is_finite() || !self.impact.medium_below.is_finite() {
            eyre::bail!("impact bounds must be finite");
        }
        if self.impact.low_below >= self.impact.medium_below {
            eyre::bail!("impact.low_below must be < impact.medium_below");
        }

        // Orientation
        if !(self.orientation.ewma_alpha > 0.0 && self.orientation.ewma_alpha <= 1.0) {
            eyre::bail!("orientation.ewma_alpha must be in (0.0, 1.0]");
        }
        if !(self.orientation.fusion_beta >= 0.0 && self.orientation.fusion_beta < 1.0) {
            eyre::bail!("orientation.fusion_beta must be in [0.0, 1.0)");
        }

        // History
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }

        // Simulation
        if self.simulation.sample_rate_hz == 0 {
            eyre::bail!("simulation.sample_rate_hz must be > 0");
        }
        if !self.simulation.cadence_spm.is_finite() || self.simulation.cadence_spm <= 0.0 {
            eyre::bail!("simulation.cadence_spm must be finite and > 0");
        }
        if !self.simulation.impact_amplitude.is_finite() || self.simulation.impact_amplitude < 0.0 {
            eyre::bail!("simulation.impact_amplitude must be finite and >= 0");
        }
        if !self.simulation.noise_amplitude.is_finite() || self.simulation.noise_amplitude < 0.0 {
            eyre::bail!("simulation.noise_amplitude must be finite and >= 0");
        }

        Ok(())
    }
}
