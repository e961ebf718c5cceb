//! Dry run command implementation.
//!
//! Indexes, validates and selects every profile, then shows the candidates.
//! Nothing on disk is changed.

use super::{preflight_passed, run_profile, select_profiles};
use crate::cli::args::OutputFormat;
use crate::cli::presenter::{self, ProfileReport};
use crate::core::janitor::Janitor;
use crate::models::config::AppConfig;
use crate::services::command::CommandRunner;
use crate::Result;
use colored::Colorize;

/// Execute the dry-run command.
pub fn dry_run(
    config: &AppConfig,
    runner: &dyn CommandRunner,
    profile: Option<&str>,
    format: OutputFormat,
    skip_preflight: bool,
) -> Result<()> {
    let profiles = select_profiles(config, profile)?;
    let janitor = Janitor::new(runner);
    let table = format == OutputFormat::Table;

    if table {
        println!("{}", "[DRY RUN] Nothing will be removed".bold().cyan());
        println!();
    }

    let mut reports = Vec::with_capacity(profiles.len());

    for profile in profiles {
        if table {
            presenter::print_profile_header(profile);
        }

        if !preflight_passed(profile, skip_preflight, !table) {
            reports.push(ProfileReport::from_error(
                profile,
                "preflight checks failed".to_string(),
            ));
            continue;
        }

        match run_profile(&janitor, profile, table) {
            Ok(run) => {
                if table {
                    presenter::print_run(&run);
                }
                reports.push(ProfileReport::from_run(profile, &run));
            }
            Err(e) => {
                tracing::error!("Profile '{}' failed: {}", profile.name, e);
                if table {
                    presenter::print_profile_error(profile, &e);
                }
                reports.push(ProfileReport::from_error(
                    profile,
                    format!("{}: {}", e.kind(), e),
                ));
            }
        }
    }

    if !table {
        presenter::print_json(&reports)?;
    }

    Ok(())
}
