use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PipelineError {
    #[error("invalid state: {0}")]
    State(&'static str),
    #[error("malformed sample: {0}")]
    MalformedSample(&'static str),
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
