//! Output operations for response envelopes and generated workbooks.
//!
//! Envelopes go to stdout unless an output path is given. Logs never share
//! stdout with an envelope.

use std::io::Write;
use std::path::Path;

use campus_metrics_core::Result;
use campus_metrics_core::error::CampusMetricsError;
use serde::Serialize;

/// Serializes `value` as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CampusMetricsError::serialization("JSON serialization", e))
}

/// Writes JSON text to `output_path`, or to stdout when no path is given.
pub fn write_json(json_data: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => save_json(json_data, path),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json_data)
                .map_err(|e| CampusMetricsError::io("Failed to write to stdout", e))
        }
    }
}

/// Saves JSON text to a file, creating parent directories as needed.
pub fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CampusMetricsError::io(format!("Failed to create {}", parent.display()), e)
        })?;
    }
    std::fs::write(output_path, json_data).map_err(|e| {
        CampusMetricsError::io(format!("Failed to write to {}", output_path.display()), e)
    })?;
    tracing::info!("Wrote {}", output_path.display());
    Ok(())
}
