//! Orientation angle estimators.
//!
//! Two independent stateful filters convert raw axis readings into an angle
//! estimate in degrees:
//! - `EwmaAngleFilter`: single-pole smoothing of the gravity-derived angle.
//! - `ComplementaryFusionFilter`: gyro integration corrected by the
//!   accelerometer tilt estimate.

#[derive(Debug, Clone, Copy)]
pub struct OrientationCfg {
    /// EWMA weight on the newest gravity-derived angle, in (0.0, 1.0].
    pub ewma_alpha: f32,
    /// Complementary weight on the integrated gyro angle, in [0.0, 1.0).
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

impl From<&stride_config::OrientationCfg> for OrientationCfg {
    fn from(c: &stride_config::OrientationCfg) -> Self {
        Self {
            ewma_alpha: c.ewma_alpha,
            fusion_beta: c.fusion_beta,
        }
    }
}

/// Angle in degrees from a gravity (or accelerometer) y/z pair.
#[inline]
fn tilt_angle_deg(y: f32, z: f32) -> f32 {
    (-y).atan2(z).to_degrees()
}

/// Single-axis EWMA filter over the gravity-derived angle. Driven by
/// gravity-channel samples only; uses neither gyroscope nor time delta.
#[derive(Debug, Clone)]
pub struct EwmaAngleFilter {
    alpha: f32,
    filtered: f32,
}

impl EwmaAngleFilter {
    pub fn new(cfg: &OrientationCfg) -> Self {
        Self {
            alpha: cfg.ewma_alpha,
            filtered: 0.0,
        }
    }

    pub fn calculate(&mut self, gravity_y: f32, gravity_z: f32) -> f32 {
        let raw_angle = tilt_angle_deg(gravity_y, gravity_z);
        self.filtered = self.alpha * raw_angle + (1.0 - self.alpha) * self.filtered;
        self.filtered
    }

    pub fn reset(&mut self) {
        self.filtered = 0.0;
    }
}

impl Default for EwmaAngleFilter {
    fn default() -> Self {
        Self::new(&OrientationCfg::default())
    }
}

/// Complementary fusion: trusts integrated gyro short-term and corrects
/// long-term drift with the accelerometer tilt estimate.
///
/// Gyroscope and accelerometer arrive as separate channel events, so the
/// caller caches the most recent accelerometer reading and supplies it on
/// every gyroscope tick together with the true elapsed time since the
/// previous gyroscope sample.
#[derive(Debug, Clone)]
pub struct ComplementaryFusionFilter {
    beta: f32,
    fused: f32,
}

impl ComplementaryFusionFilter {
    pub fn new(cfg: &OrientationCfg) -> Self {
        Self {
            beta: cfg.fusion_beta,
            fused: 0.0,
        }
    }

    /// `gyro_rate_dps` is degrees/second. A non-positive or non-finite `dt_sec`
    /// is a caller error: the update is skipped and the fused angle returned
    /// unchanged.
    pub fn calculate(&mut self, acc_y: f32, acc_z: f32, gyro_rate_dps: f32, dt_sec: f32) -> f32 {
        if !(dt_sec > 0.0) || !dt_sec.is_finite() {
            return self.fused;
        }
        let acc_angle = tilt_angle_deg(acc_y, acc_z);
        let gyro_angle = self.fused + gyro_rate_dps * dt_sec;
        self.fused = self.beta * gyro_angle + (1.0 - self.beta) * acc_angle;
        self.fused
    }

    pub fn current(&self) -> f32 {
        self.fused
    }

    pub fn reset(&mut self) {
        self.fused = 0.0;
    }
}

impl Default for ComplementaryFusionFilter {
    fn default() -> Self {
        Self::new(&OrientationCfg::default())
    }
}
