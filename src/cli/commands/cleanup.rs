//! Cleanup command implementation.
//!
//! Runs every profile and erases the candidates of `remove` profiles.
//! A report file records whether the whole run succeeded.

use super::{preflight_passed, run_profile, select_profiles};
use crate::cli::presenter;
use crate::core::janitor::Janitor;
use crate::models::config::AppConfig;
use crate::models::profile::CleanAction;
use crate::services::command::CommandRunner;
use crate::services::report;
use crate::Result;
use chrono::Local;
use colored::Colorize;

/// Execute the cleanup command. Returns whether every profile succeeded.
pub fn cleanup(
    config: &AppConfig,
    runner: &dyn CommandRunner,
    profile: Option<&str>,
    skip_preflight: bool,
) -> Result<bool> {
    let profiles = select_profiles(config, profile)?;
    let janitor = Janitor::new(runner);
    let mut success = true;

    println!("{}", "[CLEANUP] Cleaning up backups...".bold().cyan());
    println!();

    for profile in profiles {
        presenter::print_profile_header(profile);

        if !preflight_passed(profile, skip_preflight, false) {
            success = false;
            continue;
        }

        let run = match run_profile(&janitor, profile, true) {
            Ok(run) => run,
            Err(e) => {
                tracing::error!("Profile '{}' failed: {}", profile.name, e);
                presenter::print_profile_error(profile, &e);
                success = false;
                continue;
            }
        };

        presenter::print_run(&run);

        match profile.clean_action {
            CleanAction::Remove => {
                let result = janitor.clean(&run);
                result.print_summary();
                println!();
                success &= result.is_success();
            }
            CleanAction::Notify | CleanAction::Compress => {
                if !run.candidates.is_empty() {
                    println!(
                        "  {} action is '{}', nothing was removed",
                        "[NOTE]".yellow(),
                        profile.clean_action
                    );
                    println!();
                }
            }
        }
    }

    report::write_report(&config.report_file, success, Local::now())?;

    if success {
        println!("{}", "[OK] Cleanup finished".bold().green());
    } else {
        println!("{}", "[WARNING] Cleanup finished with errors".bold().yellow());
    }

    Ok(success)
}
