//! Adaptive step detection over smoothed acceleration magnitude.

use crate::types::Vec3;

/// Step detector tuning. Defaults match the reference tuning: threshold one
/// tenth above rest gravity, 250 ms refractory, gyro-gated.
#[derive(Debug, Clone, Copy)]
pub struct DetectorCfg {
    /// Smoothed-magnitude threshold a rising edge must cross (m/s²).
    pub step_threshold: f32,
    /// Single-pole low-pass factor for the magnitude, in (0.0, 1.0].
    pub smoothing_alpha: f32,
    /// Gyroscope magnitude below this means stationary; peaks are rejected.
    pub gyro_gate_rps: f32,
    /// Minimum time between confirmed steps (ns).
    pub refractory_ns: i64,
    /// Seed for the smoothed magnitude at reset.
    pub rest_magnitude: f32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            step_threshold: 11.0,
            smoothing_alpha: 0.1,
            gyro_gate_rps: 0.5,
            refractory_ns: 250_000_000,
            rest_magnitude: 9.8,
        }
    }
}

impl From<&stride_config::DetectorCfg> for DetectorCfg {
    fn from(c: &stride_config::DetectorCfg) -> Self {
        Self {
            step_threshold: c.step_threshold,
            smoothing_alpha: c.smoothing_alpha,
            gyro_gate_rps: c.gyro_gate_rps,
            refractory_ns: (c.refractory_ms as i64).saturating_mul(1_000_000),
            rest_magnitude: c.rest_magnitude,
        }
    }
}

/// Stateful peak detector over a smoothed acceleration-magnitude signal,
/// gated by gyroscope motion intensity and a refractory timer.
///
/// A step fires on a rising edge of the smoothed magnitude through the
/// threshold, not while the level stays above it. Known limitation: a signal
/// that oscillates rapidly around the threshold just after the refractory
/// window can suppress a genuine step until it falls below the threshold and
/// rises again.
#[derive(Debug, Clone)]
pub struct StepDetector {
    cfg: DetectorCfg,
    smoothed: f32,
    prev_smoothed: f32,
    last_step_ns: i64,
}

impl StepDetector {
    pub fn new(cfg: DetectorCfg) -> Self {
        Self {
            cfg,
            smoothed: cfg.rest_magnitude,
            prev_smoothed: 0.0,
            last_step_ns: 0,
        }
    }

    /// Feed one accelerometer reading with the latest cached gyro reading.
    /// Returns the smoothed magnitude as impact when a step is confirmed.
    ///
    /// Inputs must be finite 3-axis vectors; the caller enforces that
    /// contract (NaN in the EWMA state is permanently sticky).
    pub fn detect(&mut self, accel: Vec3, gyro: Vec3, t_ns: i64) -> Option<f32> {
        let raw_magnitude = accel.magnitude();
        self.smoothed += self.cfg.smoothing_alpha * (raw_magnitude - self.smoothed);

        let dynamic_motion = gyro.magnitude() > self.cfg.gyro_gate_rps;

        let mut impact = None;
        if dynamic_motion
            && self.smoothed > self.cfg.step_threshold
            && self.prev_smoothed <= self.cfg.step_threshold
            && t_ns.saturating_sub(self.last_step_ns) > self.cfg.refractory_ns
        {
            self.last_step_ns = t_ns;
            impact = Some(self.smoothed);
            tracing::debug!(
                smoothed = self.smoothed,
                raw = raw_magnitude,
                t_ns,
                "step confirmed"
            );
        }
        self.prev_smoothed = self.smoothed;
        impact
    }

    /// Re-zero edge and refractory state and reseed the smoothed magnitude.
    /// Stale filter memory must never cross a session boundary.
    pub fn reset(&mut self) {
        self.prev_smoothed = 0.0;
        self.last_step_ns = 0;
        self.smoothed = self.cfg.rest_magnitude;
    }
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(DetectorCfg::default())
    }
}
