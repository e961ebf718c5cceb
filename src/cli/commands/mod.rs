//! CLI command implementations.

pub mod cleanup;
pub mod dry_run;

use crate::core::janitor::{Janitor, ProfileRun};
use crate::models::config::AppConfig;
use crate::models::item::Item;
use crate::models::profile::Profile;
use crate::preflight;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Profiles to run: one by name, or all of them in file order.
pub fn select_profiles<'c>(config: &'c AppConfig, name: Option<&str>) -> Result<Vec<&'c Profile>> {
    match name {
        Some(name) => config
            .profile(name)
            .map(|profile| vec![profile])
            .ok_or_else(|| Error::InvalidConfigFile(format!("no profile named '{}'", name))),
        None => Ok(config.profiles.iter().collect()),
    }
}

/// Run preflight checks for a profile. Returns whether the profile may run.
pub(crate) fn preflight_passed(profile: &Profile, skip: bool, quiet: bool) -> bool {
    if skip {
        return true;
    }

    let results = preflight::run_preflight_checks(profile);
    if !quiet {
        preflight::print_results(&results);
        println!();
    }

    let passed = preflight::all_passed(&results);
    if !passed {
        tracing::warn!("Profile '{}' skipped: preflight checks failed", profile.name);
    }
    passed
}

/// Index and validate a profile with a progress bar over the validation.
pub(crate) fn run_profile(janitor: &Janitor, profile: &Profile, show_progress: bool) -> Result<ProfileRun> {
    let index = janitor.index(profile)?;
    let pb = validation_bar(index.len(), show_progress);

    let run = janitor.assess(profile, index, |_, item| advance(&pb, item));

    pb.finish_and_clear();
    run
}

fn validation_bar(len: usize, visible: bool) -> ProgressBar {
    let pb = if visible {
        ProgressBar::new(len as u64)
    } else {
        ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::hidden())
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}

/// Called once an item has been validated.
fn advance(pb: &ProgressBar, item: &Item) {
    pb.set_message(item.name().to_string());
    pb.inc(1);
}
