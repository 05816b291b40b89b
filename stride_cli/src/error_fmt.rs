//! Human-readable error descriptions and structured JSON error formatting.

use stride_core::error::{BuildError, PipelineError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        let BuildError::InvalidConfig(msg) = be;
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
        );
    }

    if let Some(pe) = err.downcast_ref::<PipelineError>() {
        return match pe {
            PipelineError::State(what) => format!(
                "What happened: Invalid session transition ({what}).\nLikely causes: A second start without a stop, or a stop while idle.\nHow to fix: Finish or reset the current session first."
            ),
            PipelineError::MalformedSample(what) => format!(
                "What happened: Malformed sensor sample ({what}).\nLikely causes: A source delivering NaN/infinite axis values.\nHow to fix: Check the sensor backend; malformed samples are dropped and counted."
            ),
            PipelineError::Sensor(msg) => format!(
                "What happened: Sensor source failed ({msg}).\nLikely causes: Device disconnected or the backend timed out.\nHow to fix: Check the device connection, then rerun."
            ),
            PipelineError::Io(msg) => format!(
                "What happened: File I/O failed ({msg}).\nLikely causes: Missing directory, permissions, or a full disk.\nHow to fix: Verify the export path is writable and rerun."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error family; generic errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    if let Some(pe) = err.downcast_ref::<PipelineError>() {
        return match pe {
            PipelineError::State(_) => 3,
            PipelineError::Io(_) => 4,
            PipelineError::Sensor(_) => 5,
            PipelineError::MalformedSample(_) => 6,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let reason = if err.downcast_ref::<BuildError>().is_some() {
        "InvalidConfig"
    } else if let Some(pe) = err.downcast_ref::<PipelineError>() {
        match pe {
            PipelineError::State(_) => "State",
            PipelineError::MalformedSample(_) => "MalformedSample",
            PipelineError::Sensor(_) => "Sensor",
            PipelineError::Io(_) => "Io",
        }
    } else {
        "Error"
    };
    serde_json::json!({ "reason": reason, "message": humanize(err) }).to_string()
}
