//! Per-profile cleanup pipeline.
//!
//! index -> validate -> select. The outcome is a [`ProfileRun`] that the
//! caller either displays (dry run) or hands to the eraser.

use crate::core::eraser::{self, EraseResult};
use crate::core::indexer;
use crate::core::retention;
use crate::core::validator::{ItemValidator, Verdict};
use crate::models::item::{Item, PathIndex};
use crate::models::profile::Profile;
use crate::services::command::CommandRunner;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Why an item was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionReason {
    /// The item failed validation.
    Invalid(String),
    /// The item is valid but older than the retained generations.
    OutsideRetention,
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionReason::Invalid(reason) => write!(f, "invalid: {}", reason),
            SelectionReason::OutsideRetention => write!(f, "outside retention window"),
        }
    }
}

/// One cleanup candidate as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    pub name: String,
    pub path: PathBuf,
    pub valid: bool,
    pub last_modified: DateTime<Utc>,
    pub file_count: usize,
    pub size: u64,
    pub reason: SelectionReason,
}

/// Outcome of validating and selecting one profile.
#[derive(Debug)]
pub struct ProfileRun {
    /// Validated index.
    pub index: PathIndex,
    /// Verdict per index position.
    pub verdicts: Vec<Verdict>,
    /// Items selected for cleanup, in index order.
    pub candidates: Vec<Item>,
}

impl ProfileRun {
    /// Number of valid items in the index.
    pub fn valid_count(&self) -> usize {
        self.index.items.iter().filter(|i| i.is_valid()).count()
    }

    /// Candidates paired with the reason they were selected.
    pub fn candidate_rows(&self) -> Vec<CandidateRow> {
        let verdicts: HashMap<&Path, &Verdict> = self
            .index
            .items
            .iter()
            .map(|item| item.path())
            .zip(&self.verdicts)
            .collect();

        self.candidates
            .iter()
            .map(|item| {
                let reason = match verdicts.get(item.path()) {
                    Some(verdict) if !verdict.is_valid() => {
                        SelectionReason::Invalid(verdict.to_string())
                    }
                    _ => SelectionReason::OutsideRetention,
                };
                CandidateRow {
                    name: item.name().to_string(),
                    path: item.path().to_path_buf(),
                    valid: item.is_valid(),
                    last_modified: item.modified(),
                    file_count: item.file_count(),
                    size: item.size(),
                    reason,
                }
            })
            .collect()
    }
}

/// Runs the cleanup pipeline for profiles.
pub struct Janitor<'a> {
    validator: ItemValidator<'a>,
}

impl<'a> Janitor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            validator: ItemValidator::new(runner),
        }
    }

    /// Build the index of a profile.
    ///
    /// A zero keep quantity is rejected before touching the filesystem.
    pub fn index(&self, profile: &Profile) -> Result<PathIndex> {
        if profile.keep_items_quantity == 0 {
            tracing::error!("Profile '{}': keep-items-quantity equals zero", profile.name);
            return Err(Error::misconfiguration(format!(
                "profile '{}': keep-items-quantity must be greater than 0",
                profile.name
            )));
        }

        indexer::build_profile_index(profile)
    }

    /// Validate an index and select the cleanup candidates.
    pub fn assess<F>(&self, profile: &Profile, mut index: PathIndex, progress: F) -> Result<ProfileRun>
    where
        F: FnMut(usize, &Item),
    {
        let verdicts = self
            .validator
            .validate_with_progress(&mut index, profile, progress);

        let candidates = retention::select(
            &index.items,
            profile.keep_items_quantity,
            &profile.clean_up_policy,
        )?;

        Ok(ProfileRun {
            index,
            verdicts,
            candidates,
        })
    }

    /// Index, validate and select in one go.
    pub fn plan(&self, profile: &Profile) -> Result<ProfileRun> {
        tracing::info!("Profile '{}': {}", profile.name, profile.path.display());
        let index = self.index(profile)?;
        self.assess(profile, index, |_, _| {})
    }

    /// Delete the candidates of a run.
    pub fn clean(&self, run: &ProfileRun) -> EraseResult {
        eraser::erase_items(&run.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::command::ExecutionResult;
    use std::time::Duration;
    use tempfile::TempDir;

    struct UnreachableRunner;

    impl CommandRunner for UnreachableRunner {
        fn execute(&self, command: &str, _: &Path, _: Duration) -> Result<ExecutionResult> {
            panic!("unexpected command: {}", command);
        }
    }

    #[test]
    fn test_zero_keep_fails_before_indexing() {
        let mut profile = Profile::new("broken", "/nonexistent/backups");
        profile.keep_items_quantity = 0;

        let janitor = Janitor::new(&UnreachableRunner);
        let err = janitor.plan(&profile).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Misconfiguration);
    }

    #[test]
    fn test_missing_root_is_error() {
        let profile = Profile::new("missing", "/nonexistent/backups");
        let janitor = Janitor::new(&UnreachableRunner);

        let err = janitor.plan(&profile).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Error);
    }

    #[test]
    fn test_candidate_reasons() {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in [("1.bin", "aaaa"), ("2.bin", "aa"), ("3.bin", "aaaa"), ("4.bin", "aaaaa")] {
            std::fs::write(temp_dir.path().join(name), content).unwrap();
        }

        let mut profile = Profile::new("sizes", temp_dir.path());
        profile.file_validation = crate::models::profile::FileValidationConfig {
            size_at_least_as_previous: true,
            ..crate::models::profile::FileValidationConfig::disabled()
        };
        profile.keep_items_quantity = 1;

        let janitor = Janitor::new(&UnreachableRunner);
        let run = janitor.plan(&profile).unwrap();

        assert_eq!(run.valid_count(), 3);
        let rows = run.candidate_rows();
        let reasons: Vec<(&str, &SelectionReason)> =
            rows.iter().map(|r| (r.name.as_str(), &r.reason)).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(reasons[0], ("1.bin", &SelectionReason::OutsideRetention));
        assert_eq!(
            reasons[1],
            (
                "2.bin",
                &SelectionReason::Invalid("size at least as previous failed".to_string())
            )
        );
        assert_eq!(reasons[2], ("3.bin", &SelectionReason::OutsideRetention));
    }
}
