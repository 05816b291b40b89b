//! Three-bucket impact severity classification.

use crate::types::ImpactLevel;

#[derive(Debug, Clone, Copy)]
pub struct ImpactCfg {
    /// Magnitudes below this are Low.
    pub low_below: f32,
    /// Magnitudes below this (and >= low_below) are Medium; the rest High.
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

impl From<&stride_config::ImpactCfg> for ImpactCfg {
    fn from(c: &stride_config::ImpactCfg) -> Self {
        Self {
            low_below: c.low_below,
            medium_below: c.medium_below,
        }
    }
}

/// Map a step's impact magnitude to a severity bucket. Pure; the caller
/// accumulates counts.
pub fn classify(cfg: &ImpactCfg, magnitude: f32) -> ImpactLevel {
    if magnitude < cfg.low_below {
        ImpactLevel::Low
    } else if magnitude < cfg.medium_below {
        ImpactLevel::Medium
    } else {
        ImpactLevel::High
    }
}
