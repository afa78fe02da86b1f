//! JSON results file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::types::RunReport;
use super::ReportError;

/// Write the report as pretty JSON to `path`.
///
/// The document is written to a temporary file next to `path` and moved
/// into place once complete, so a failed write leaves no partial file.
pub fn write_results(path: &Path, report: &RunReport) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ReportError::io(dir, e))?;
    serde_json::to_writer_pretty(&mut tmp, report)?;
    tmp.write_all(b"\n").map_err(|e| ReportError::io(path, e))?;
    tmp.persist(path).map_err(|e| ReportError::io(path, e.error))?;

    debug!(path = %path.display(), "Results file written");
    Ok(())
}

/// Read a results file written by [`write_results`].
pub fn read_results(path: &Path) -> Result<RunReport, ReportError> {
    let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
