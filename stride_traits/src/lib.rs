pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// A 3-axis sensor reading. Units depend on the channel: m/s² for
/// accelerometer and gravity, rad/s for gyroscope.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the vector.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One timestamped sensor reading, tagged by channel.
///
/// Timestamps are monotonic nanoseconds from the producing clock domain.
/// Ordering within a channel is the producer's contract; consumers never
/// re-sort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Accelerometer { t_ns: i64, v: Vec3 },
    Gyroscope { t_ns: i64, v: Vec3 },
    Gravity { t_ns: i64, v: Vec3 },
    /// Step event from a dedicated hardware step channel. May be absent on
    /// some devices; an absent channel simply yields no events.
    HardwareStep { t_ns: i64 },
}

impl Sample {
    #[inline]
    pub fn timestamp_ns(&self) -> i64 {
        match *self {
            Sample::Accelerometer { t_ns, .. }
            | Sample::Gyroscope { t_ns, .. }
            | Sample::Gravity { t_ns, .. }
            | Sample::HardwareStep { t_ns } => t_ns,
        }
    }

    /// True when every axis value carried by the sample is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        match self {
            Sample::Accelerometer { v, .. }
            | Sample::Gyroscope { v, .. }
            | Sample::Gravity { v, .. } => v.is_finite(),
            Sample::HardwareStep { .. } => true,
        }
    }
}

/// Pull-based sample acquisition.
///
/// `Ok(None)` means no sample became available within `timeout` — an idle or
/// absent channel, not an error. Producers must deliver per-channel
/// timestamps in strictly increasing order.
pub trait ImuSource {
    fn next_sample(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>>;
}
