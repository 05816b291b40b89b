//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;
use stride_core::{OrientationAlgorithm, PipelineMode, StepAlgorithm};

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stride", version, about = "Stride motion-metrics CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Which pipeline to run for the session.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Software step detection over the accelerometer + gyroscope
    CustomStep,
    /// Count steps from the dedicated hardware step channel
    HardwareStep,
    /// Tilt angle from the gravity channel (EWMA filter)
    EwmaOrientation,
    /// Tilt angle fusing accelerometer and gyroscope
    FusionOrientation,
}

impl Mode {
    pub fn to_pipeline(self) -> PipelineMode {
        match self {
            Mode::CustomStep => PipelineMode::Step(StepAlgorithm::Custom),
            Mode::HardwareStep => PipelineMode::Step(StepAlgorithm::Hardware),
            Mode::EwmaOrientation => PipelineMode::Orientation(OrientationAlgorithm::Ewma),
            Mode::FusionOrientation => {
                PipelineMode::Orientation(OrientationAlgorithm::ComplementaryFusion)
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a measuring session against the simulated walker
    Run {
        /// Pipeline to run
        #[arg(long, value_enum, default_value = "custom-step")]
        mode: Mode,
        /// Session length in simulated seconds
        #[arg(long, value_name = "SECS", default_value_t = 10.0)]
        duration: f32,
        /// Export the measurement log to this file on completion
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
        /// Override the simulation PRNG seed
        #[arg(long, value_name = "SEED")]
        seed: Option<u32>,
        /// Pace acquisition at the configured sample rate instead of
        /// replaying as fast as possible
        #[arg(long, action = ArgAction::SetTrue)]
        paced: bool,
    },
    /// Quick health check (pipeline builds and processes one second of data)
    SelfCheck,
}
