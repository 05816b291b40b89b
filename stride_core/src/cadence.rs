//! Smoothed steps-per-minute from inter-step time deltas.

#[derive(Debug, Clone, Copy)]
pub struct CadenceCfg {
    /// Intervals at or below this are rejected as noise/double-triggers (s).
    pub min_interval_s: f32,
    /// Exponential blend weight on the new steps/minute value, in (0.0, 1.0].
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

impl From<&stride_config::CadenceCfg> for CadenceCfg {
    fn from(c: &stride_config::CadenceCfg) -> Self {
        Self {
            min_interval_s: c.min_interval_s,
            blend: c.blend,
        }
    }
}

/// Converts inter-step deltas into a smoothed cadence.
///
/// The caller owns the reference timestamp and must advance it only when an
/// update is accepted: rejected intervals do not move the reference point,
/// and the step is still counted elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CadenceEstimator {
    cfg: CadenceCfg,
    smoothed_spm: Option<f32>,
}

impl CadenceEstimator {
    pub fn new(cfg: CadenceCfg) -> Self {
        Self {
            cfg,
            smoothed_spm: None,
        }
    }

    /// Smoothed cadence if the interval qualifies, None on rejection.
    pub fn update(&mut self, event_ns: i64, prior_event_ns: i64) -> Option<f32> {
        let dt_sec = (event_ns.saturating_sub(prior_event_ns)) as f32 / 1e9;
        if dt_sec <= self.cfg.min_interval_s {
            return None;
        }
        let spm = 60.0 / dt_sec;
        let smoothed = match self.smoothed_spm {
            None => spm,
            Some(prev) => (1.0 - self.cfg.blend) * prev + self.cfg.blend * spm,
        };
        self.smoothed_spm = Some(smoothed);
        Some(smoothed)
    }

    /// Current smoothed cadence; 0 until the first qualifying interval.
    pub fn current(&self) -> f32 {
        self.smoothed_spm.unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.smoothed_spm = None;
    }
}
