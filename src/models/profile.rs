//! Cleanup profile model.

use crate::models::item::StorageUnit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default wait for a custom validator process.
pub const DEFAULT_VALIDATOR_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Name pattern that matches everything.
pub const MATCH_ALL_PATTERN: &str = ".*";

/// What to do with the items selected for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanAction {
    /// Only show the candidates.
    #[default]
    Notify,
    /// Delete the candidates.
    Remove,
    /// Reserved for compressing candidates; reported like `Notify`.
    Compress,
}

impl std::fmt::Display for CleanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanAction::Notify => write!(f, "notify"),
            CleanAction::Remove => write!(f, "remove"),
            CleanAction::Compress => write!(f, "compress"),
        }
    }
}

/// Per-file integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidationConfig {
    /// Expect size >= previous generation.
    pub size_at_least_as_previous: bool,
    /// Expect a `<file>.md5` companion matching the content hash.
    pub hash_check: bool,
    /// Expect the file to open as a zip archive.
    pub archive_integrity_check: bool,
    /// Expect a non-empty `.log` companion.
    pub log_companion_required: bool,
    /// Run `custom_validator_command` for each file.
    pub use_custom_validator: bool,
    /// Command to run; `${filename}` is replaced by the file name.
    pub custom_validator_command: String,
    /// Maximum time to wait for the custom validator.
    pub custom_validator_timeout: Duration,
}

impl FileValidationConfig {
    /// A config with every check switched off.
    pub fn disabled() -> Self {
        Self {
            size_at_least_as_previous: false,
            hash_check: false,
            archive_integrity_check: false,
            log_companion_required: false,
            use_custom_validator: false,
            custom_validator_command: String::new(),
            custom_validator_timeout: DEFAULT_VALIDATOR_TIMEOUT,
        }
    }
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        Self {
            size_at_least_as_previous: true,
            hash_check: true,
            archive_integrity_check: true,
            log_companion_required: true,
            ..Self::disabled()
        }
    }
}

/// Per-directory checks, applied before the per-file checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryValidationConfig {
    /// Expect total size >= previous directory.
    pub size_at_least_as_previous: bool,
    /// Expect file count >= previous directory.
    pub file_count_at_least_as_previous: bool,
    /// Expect each file size >= same-named file in previous directory.
    pub file_size_at_least_as_previous: bool,
}

impl DirectoryValidationConfig {
    pub fn disabled() -> Self {
        Self {
            size_at_least_as_previous: false,
            file_count_at_least_as_previous: false,
            file_size_at_least_as_previous: false,
        }
    }
}

impl Default for DirectoryValidationConfig {
    fn default() -> Self {
        Self {
            file_count_at_least_as_previous: true,
            ..Self::disabled()
        }
    }
}

/// Which invalid items get selected for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanUpPolicy {
    /// Everything outside the newest `keep` valid items.
    pub all_invalid_items: bool,
    /// Only items older than the window holding the newest `keep` valid items.
    pub invalid_items_beyond_keep_quantity: bool,
}

impl Default for CleanUpPolicy {
    fn default() -> Self {
        Self {
            all_invalid_items: true,
            invalid_items_beyond_keep_quantity: false,
        }
    }
}

/// A named cleanup profile.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Directory holding the generations.
    pub path: PathBuf,
    /// What one generation is.
    pub storage_unit: StorageUnit,
    /// Whole-name pattern for generation files.
    pub file_name_filter: Regex,
    /// Whole-name pattern for generation directories.
    pub directory_name_filter: Regex,
    /// Number of valid generations to keep.
    pub keep_items_quantity: usize,
    /// File checks.
    pub file_validation: FileValidationConfig,
    /// Directory checks.
    pub directory_validation: DirectoryValidationConfig,
    /// Selection policy.
    pub clean_up_policy: CleanUpPolicy,
    /// Action for the selected items.
    pub clean_action: CleanAction,
}

impl Profile {
    /// Create a profile for `path` with default settings.
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            storage_unit: StorageUnit::default(),
            file_name_filter: name_filter(MATCH_ALL_PATTERN)
                .expect("match-all pattern is a valid regex"),
            directory_name_filter: name_filter(MATCH_ALL_PATTERN)
                .expect("match-all pattern is a valid regex"),
            keep_items_quantity: 7,
            file_validation: FileValidationConfig::default(),
            directory_validation: DirectoryValidationConfig::default(),
            clean_up_policy: CleanUpPolicy::default(),
            clean_action: CleanAction::default(),
        }
    }

    /// Whether building the index should hash every file up front.
    pub fn hash_required(&self) -> bool {
        self.file_validation.hash_check
    }
}

/// Compile a pattern that must match the whole name.
pub fn name_filter(pattern: &str) -> crate::Result<Regex> {
    Ok(Regex::new(&format!("^(?:{})$", pattern))?)
}

/// The pattern a filter was compiled from.
pub fn filter_pattern(filter: &Regex) -> &str {
    let anchored = filter.as_str();
    anchored
        .strip_prefix("^(?:")
        .and_then(|p| p.strip_suffix(")$"))
        .unwrap_or(anchored)
}
