//! Delimited-text export of the session measurement log.
//!
//! Schema: header `Timestamp;Value;MetricType`, one row per record,
//! `HH:mm:ss.mmm` timestamps and fixed 4-decimal values with a period as
//! decimal separator. The in-memory log is cleared only after the artifact
//! is durably written.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::session::SessionAggregator;
use crate::types::MeasurementRecord;
use crate::util::{NANOS_PER_MILLI, write_atomic};

/// Outcome of an export request. "No data" is distinct from a write failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, records: usize },
    NoData,
}

/// Format a session-relative nanosecond timestamp as `HH:mm:ss.mmm`,
/// truncated to millisecond resolution and wrapped modulo 24 hours.
/// A negative timestamp is a formatting error and renders as zero.
pub fn format_relative_ns(t_ns: i64) -> String {
    if t_ns < 0 {
        return "00:00:00.000".to_string();
    }
    let total_millis = t_ns / NANOS_PER_MILLI;
    let hours = (total_millis / (1000 * 60 * 60)) % 24;
    let minutes = (total_millis % (1000 * 60 * 60)) / (1000 * 60);
    let seconds = (total_millis % (1000 * 60)) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Render the log as delimited text, header included. Infallible for
/// in-memory writers; kept separate from file I/O for testability.
pub fn render_csv(records: &[MeasurementRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    wtr.write_record(["Timestamp", "Value", "MetricType"])
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    for rec in records {
        wtr.write_record([
            format_relative_ns(rec.t_ns),
            format!("{:.4}", rec.value),
            rec.metric.as_str().to_string(),
        ])
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::Io(e.to_string()).into())
}

/// Drain the aggregator's measurement log into a delimited artifact at
/// `path`. An empty log yields `NoData` and writes nothing; the log is
/// cleared only after the file has been written and renamed into place.
pub fn export_session_csv(agg: &mut SessionAggregator, path: &Path) -> Result<ExportOutcome> {
    let records = agg.records();
    if records.is_empty() {
        tracing::info!("export requested with empty log; nothing to export");
        return Ok(ExportOutcome::NoData);
    }
    let n = records.len();
    let body = render_csv(records)?;
    write_atomic(path, body.as_bytes()).map_err(|e| PipelineError::Io(e.to_string()))?;
    agg.clear_records();
    tracing::info!(records = n, path = %path.display(), "export written");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        records: n,
    })
}
