//! Deterministic synthetic walker.
//!
//! Generates an interleaved accelerometer / gyroscope / gravity / step-event
//! stream that looks like a person walking at a fixed cadence: a half-sine
//! acceleration pulse at each heel strike on top of rest gravity, a swinging
//! gyroscope, and a slowly tilting gravity vector. Timestamps are synthetic
//! (strictly increasing per channel), so a run is reproducible from the seed
//! alone and never depends on wall-clock time.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::time::Duration;

use stride_config::Simulation;
use stride_traits::{ImuSource, Sample, Vec3};

/// Fraction of the step period occupied by the heel-strike pulse.
const PULSE_FRACTION: f32 = 0.3;
/// Rest acceleration magnitude (one earth-gravity, m/s²).
const GRAVITY: f32 = 9.81;
/// Peak gyro swing amplitude while walking (rad/s).
const GYRO_SWING: f32 = 1.4;
/// Tilt oscillation amplitude of the gravity channel (degrees).
const TILT_AMPLITUDE_DEG: f32 = 15.0;
/// Tilt oscillation period (s).
const TILT_PERIOD_S: f32 = 4.0;

// tiny PRNG
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_f32(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32) / (u32::MAX as f32 + 1.0)
    }

    /// Uniform in [-amp, +amp].
    fn next_signed(&mut self, amp: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * amp
    }
}

pub struct SimulatedImu {
    period_ns: i64,
    step_period_s: f32,
    impact_amplitude: f32,
    noise_amplitude: f32,
    rng: XorShift32,
    tick: u64,
    last_step_idx: u64,
    pending: VecDeque<Sample>,
}

impl SimulatedImu {
    pub fn new(cfg: &Simulation) -> Self {
        tracing::debug!(
            sample_rate_hz = cfg.sample_rate_hz,
            cadence_spm = cfg.cadence_spm,
            seed = cfg.seed,
            "simulated imu ready"
        );
        Self {
            period_ns: 1_000_000_000 / i64::from(cfg.sample_rate_hz.max(1)),
            step_period_s: 60.0 / cfg.cadence_spm,
            impact_amplitude: cfg.impact_amplitude,
            noise_amplitude: cfg.noise_amplitude,
            rng: XorShift32::new(cfg.seed),
            tick: 0,
            last_step_idx: 0,
            pending: VecDeque::new(),
        }
    }

    /// Acceleration magnitude of the walking waveform at step phase
    /// `phase` in [0, 1): rest gravity plus a half-sine heel-strike pulse.
    fn accel_magnitude(&mut self, phase: f32) -> f32 {
        let pulse = if phase < PULSE_FRACTION {
            self.impact_amplitude * (PI * phase / PULSE_FRACTION).sin()
        } else {
            0.0
        };
        GRAVITY + pulse + self.rng.next_signed(self.noise_amplitude)
    }

    /// Produce every sample for the current tick, then advance.
    fn generate_tick(&mut self) {
        let t_ns = self.tick as i64 * self.period_ns;
        let t_sec = t_ns as f32 / 1e9;
        let phase = (t_sec / self.step_period_s).fract();

        // One hardware step event per heel strike, at the tick where the
        // walker crosses into a new step period.
        let step_idx = (t_sec / self.step_period_s) as u64;
        if step_idx > self.last_step_idx {
            self.last_step_idx = step_idx;
            self.pending.push_back(Sample::HardwareStep { t_ns });
        }

        // Gyro before accel so a gated detector sees the swing that belongs
        // to this instant. The y/z baseline keeps the magnitude above typical
        // stationarity gates for the whole cycle.
        let gyro = Vec3 {
            x: GYRO_SWING * (2.0 * PI * phase).sin() + self.rng.next_signed(self.noise_amplitude),
            y: 0.5,
            z: 0.4,
        };
        self.pending.push_back(Sample::Gyroscope { t_ns, v: gyro });

        let m = self.accel_magnitude(phase);
        let x = self.rng.next_signed(self.noise_amplitude);
        let y = self.rng.next_signed(self.noise_amplitude);
        let z = (m * m - x * x - y * y).max(0.0).sqrt();
        self.pending
            .push_back(Sample::Accelerometer { t_ns, v: Vec3 { x, y, z } });

        // Gravity tilts back and forth slowly; tilt_angle(−y, z) recovers
        // theta exactly.
        let theta = (TILT_AMPLITUDE_DEG * (2.0 * PI * t_sec / TILT_PERIOD_S).sin()).to_radians();
        let gravity = Vec3 {
            x: 0.0,
            y: -GRAVITY * theta.sin(),
            z: GRAVITY * theta.cos(),
        };
        self.pending.push_back(Sample::Gravity { t_ns, v: gravity });

        self.tick += 1;
    }
}

impl ImuSource for SimulatedImu {
    fn next_sample(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>> {
        if self.pending.is_empty() {
            self.generate_tick();
        }
        Ok(self.pending.pop_front())
    }
}
