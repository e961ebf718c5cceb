//! Run report file.
//!
//! A small properties-style record that monitoring can poll to see whether the
//! last cleanup succeeded and when it finished.

use crate::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;

const REPORT_HEADER: &str = "Janitor Report | Do not modify, please";
const FINISHED_FORMAT: &str = "%Y-%m-%d %H\\:%M\\:%S";

/// Render the report content.
pub fn render_report(success: bool, finished: DateTime<Local>) -> String {
    format!(
        "#{}\n#{}\nsuccess={}\nfinished={}\nfinishedStr={}\n",
        REPORT_HEADER,
        finished.to_rfc2822(),
        success,
        finished.timestamp(),
        finished.format(FINISHED_FORMAT)
    )
}

/// Write the report for a finished run, replacing any previous one.
pub fn write_report(path: &Path, success: bool, finished: DateTime<Local>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, render_report(success, finished))?;
    tracing::info!("Report saved to {}", path.display());
    Ok(())
}
