//! Session execution: config loading, source assembly, the ingest loop, and
//! export handling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use stride_config::Config;
use stride_core::{
    ExportOutcome, PipelineError, SampleFeed, SessionAggregator, SessionCfg, export_session_csv,
};
use stride_sensors::SimulatedImu;
use stride_traits::{ImuSource, MonotonicClock};

use crate::cli::Mode;

/// The simulated walker emits one gyro, accel, and gravity sample per tick
/// (plus occasional step events), so a paced feed pulls that many times per
/// sample period.
const SAMPLES_PER_TICK: u32 = 3;
const FEED_TIMEOUT: Duration = Duration::from_millis(100);

/// Final figures for one run, printed pretty or as JSON.
pub struct Summary {
    pub mode: &'static str,
    pub duration_s: f32,
    pub samples: u64,
    pub steps: u32,
    pub cadence_spm: f32,
    pub impact_low: u32,
    pub impact_medium: u32,
    pub impact_high: u32,
    pub angle_deg: Option<f32>,
    pub dropped: u64,
    pub exported: Option<(PathBuf, usize)>,
}

impl Summary {
    pub fn print_pretty(&self) {
        println!("Session complete ({}, {:.1}s simulated)", self.mode, self.duration_s);
        println!("  samples:  {}", self.samples);
        println!("  steps:    {}", self.steps);
        println!("  cadence:  {:.1} spm", self.cadence_spm);
        println!(
            "  impact:   low={} medium={} high={}",
            self.impact_low, self.impact_medium, self.impact_high
        );
        if let Some(angle) = self.angle_deg {
            println!("  angle:    {angle:.2} deg");
        }
        if self.dropped > 0 {
            println!("  dropped:  {}", self.dropped);
        }
        if let Some((path, n)) = &self.exported {
            println!("  exported: {n} records to {}", path.display());
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.mode,
            "duration_s": self.duration_s,
            "samples": self.samples,
            "steps": self.steps,
            "cadence_spm": self.cadence_spm,
            "impact": {
                "low": self.impact_low,
                "medium": self.impact_medium,
                "high": self.impact_high,
            },
            "angle_deg": self.angle_deg,
            "dropped": self.dropped,
            "exported": self.exported.as_ref().map(|(path, n)| serde_json::json!({
                "path": path.display().to_string(),
                "records": *n,
            })),
        })
    }
}

/// Load and validate the config file, or fall back to built-in defaults.
pub fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg = stride_config::load_toml(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

#[allow(clippy::too_many_arguments)]
pub fn run_session(
    cfg: &Config,
    mode: Mode,
    duration_s: f32,
    export: Option<&Path>,
    seed: Option<u32>,
    paced: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<Summary> {
    let mut sim_cfg = cfg.simulation;
    if let Some(seed) = seed {
        sim_cfg.seed = seed;
    }
    let source = SimulatedImu::new(&sim_cfg);

    let pipeline = mode.to_pipeline();
    let mut agg = SessionAggregator::builder()
        .with_mode(pipeline)
        .with_cfg(SessionCfg::from_config(cfg))
        .build()?;
    agg.start()?;
    tracing::info!(
        mode = pipeline.name(),
        duration_s,
        seed = sim_cfg.seed,
        paced,
        "run start"
    );

    let limit_ns = (f64::from(duration_s) * 1e9) as i64;

    let samples = if paced {
        let feed = SampleFeed::spawn(
            source,
            sim_cfg.sample_rate_hz * SAMPLES_PER_TICK,
            FEED_TIMEOUT,
            MonotonicClock::new(),
        );
        let mut n: u64 = 0;
        while !shutdown.load(Ordering::Relaxed) {
            let Some(sample) = feed.recv_timeout(FEED_TIMEOUT) else {
                continue;
            };
            if sample.timestamp_ns() > limit_ns {
                break;
            }
            n += 1;
            agg.ingest(sample);
        }
        n
    } else {
        let mut source = source;
        drain_source(&mut source, &mut agg, limit_ns, shutdown)?
    };

    agg.stop()?;
    let snap = agg.snapshot();

    let exported = match export {
        Some(path) => match export_session_csv(&mut agg, path)? {
            ExportOutcome::Written { path, records } => Some((path, records)),
            ExportOutcome::NoData => {
                tracing::warn!("nothing to export; log was empty");
                None
            }
        },
        None => None,
    };

    Ok(Summary {
        mode: pipeline.name(),
        duration_s,
        samples,
        steps: snap.step_count,
        cadence_spm: snap.cadence_spm,
        impact_low: snap.impact.low,
        impact_medium: snap.impact.medium,
        impact_high: snap.impact.high,
        angle_deg: snap.latest_angle_deg,
        dropped: snap.dropped_samples,
        exported,
    })
}

/// Pull samples straight off the source until the simulated time limit or a
/// stop signal. A source failure is fatal here (unlike the feed thread,
/// which logs and keeps polling) and surfaces as `PipelineError::Sensor`.
fn drain_source<S: ImuSource>(
    source: &mut S,
    agg: &mut SessionAggregator,
    limit_ns: i64,
    shutdown: &AtomicBool,
) -> eyre::Result<u64> {
    let mut samples: u64 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        let sample = match source.next_sample(Duration::ZERO) {
            Ok(Some(s)) => s,
            Ok(None) => continue,
            Err(e) => return Err(eyre::Report::new(PipelineError::Sensor(e.to_string()))),
        };
        if sample.timestamp_ns() > limit_ns {
            break;
        }
        samples += 1;
        agg.ingest(sample);
    }
    Ok(samples)
}

/// Build the default pipeline and push one simulated second through it.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let summary = run_session(cfg, Mode::CustomStep, 1.0, None, None, false, &shutdown)?;
    println!(
        "self-check: ok ({} samples, {} steps)",
        summary.samples, summary.steps
    );
    Ok(())
}
