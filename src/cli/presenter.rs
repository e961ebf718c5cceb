//! Terminal output for profile runs.

use crate::core::janitor::{CandidateRow, ProfileRun, SelectionReason};
use crate::models::profile::Profile;
use crate::Error;
use colored::Colorize;
use indicatif::HumanBytes;
use serde::Serialize;

/// Banner printed before a profile is processed.
pub fn print_profile_header(profile: &Profile) {
    println!(
        "{} {}",
        "[PROFILE]".bold().cyan(),
        profile.name.bold()
    );
    println!("  {} {}", "Path:".bold(), profile.path.display());
    println!("  {} {}", "Unit:".bold(), profile.storage_unit);
    println!("  {} {}", "Keep:".bold(), profile.keep_items_quantity);
    println!("  {} {}", "Action:".bold(), profile.clean_action);
    println!();
}

/// Candidates of a run as a table.
pub fn print_run(run: &ProfileRun) {
    println!(
        "  {} {} items, {} valid, {} to clean up",
        "Index:".bold(),
        run.index.len(),
        run.valid_count(),
        run.candidates.len()
    );

    let rows = run.candidate_rows();
    if rows.is_empty() {
        println!("  {}", "Nothing to clean up".green());
        println!();
        return;
    }

    println!();
    for row in &rows {
        println!("{}", format_row(row));
    }
    println!();
}

fn format_row(row: &CandidateRow) -> String {
    let reason = match &row.reason {
        SelectionReason::Invalid(_) => row.reason.to_string().red(),
        SelectionReason::OutsideRetention => row.reason.to_string().yellow(),
    };

    format!(
        "  {} {:<40} {:>10} {:>6} files  {}",
        row.last_modified.format("%Y-%m-%d %H:%M"),
        row.name,
        HumanBytes(row.size).to_string(),
        row.file_count,
        reason
    )
}

/// Failure of a whole profile.
pub fn print_profile_error(profile: &Profile, err: &Error) {
    println!(
        "{} {}: {}",
        format!("[{}]", err.kind()).red().bold(),
        profile.name.bold(),
        err
    );
    println!();
}

/// One profile in the JSON dry run output.
#[derive(Debug, Serialize)]
pub struct ProfileReport {
    pub profile: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<usize>,
    pub candidates: Vec<CandidateRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileReport {
    pub fn from_run(profile: &Profile, run: &ProfileRun) -> Self {
        Self {
            profile: profile.name.clone(),
            path: profile.path.display().to_string(),
            items: Some(run.index.len()),
            valid: Some(run.valid_count()),
            candidates: run.candidate_rows(),
            error: None,
        }
    }

    pub fn from_error(profile: &Profile, message: String) -> Self {
        Self {
            profile: profile.name.clone(),
            path: profile.path.display().to_string(),
            items: None,
            valid: None,
            candidates: Vec::new(),
            error: Some(message),
        }
    }
}

/// Print reports as pretty JSON.
pub fn print_json(reports: &[ProfileReport]) -> crate::Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_row_shows_human_readable_size() {
        let row = CandidateRow {
            name: "2024-01-01.zip".to_string(),
            path: "/backups/2024-01-01.zip".into(),
            valid: true,
            last_modified: Utc.with_ymd_and_hms(2024, 1, 1, 3, 30, 0).unwrap(),
            file_count: 1,
            size: 1536,
            reason: SelectionReason::OutsideRetention,
        };

        let line = format_row(&row);
        assert!(line.contains("2024-01-01 03:30"));
        assert!(line.contains(&HumanBytes(1536).to_string()));
        assert!(line.contains("outside retention window"));
    }

    #[test]
    fn test_error_report_serialization() {
        let profile = Profile::new("nightly", "/backups/nightly");
        let report = ProfileReport::from_error(&profile, "MISCONFIGURATION: keep".to_string());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["profile"], "nightly");
        assert_eq!(json["error"], "MISCONFIGURATION: keep");
        assert!(json.get("items").is_none());
        assert_eq!(json["candidates"].as_array().unwrap().len(), 0);
    }
}
