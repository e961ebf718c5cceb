//! Configuration model.
//!
//! Profiles are read from a TOML file. Every profile field falls back to the
//! `[defaults]` table and then to the built-in defaults:
//!
//! ```toml
//! report-file = "janitor-report.properties"
//!
//! [defaults]
//! keep-items-quantity = 7
//!
//! [[profiles]]
//! name = "mysite"
//! path = "/var/backups/mysite"
//! storage-unit = "directory"
//! directory-name-filter = '\d{4}-\d{2}-\d{2}'
//! clean-action = "remove"
//!
//! [profiles.file-validation]
//! hash-check = true
//! ```

use crate::models::item::StorageUnit;
use crate::models::profile::{
    name_filter, CleanAction, CleanUpPolicy, DirectoryValidationConfig, FileValidationConfig,
    Profile, MATCH_ALL_PATTERN,
};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "janitor.toml";

/// Default report file name.
pub const REPORT_FILE_NAME: &str = "janitor-report.properties";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Profiles in file order.
    pub profiles: Vec<Profile>,
    /// Where the run report is written.
    pub report_file: PathBuf,
}

impl AppConfig {
    /// Find a profile by name.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// Raw file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    report_file: Option<PathBuf>,
    #[serde(default)]
    defaults: ProfileSection,
    #[serde(default)]
    profiles: Vec<ProfileSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ProfileSection {
    name: Option<String>,
    path: Option<PathBuf>,
    storage_unit: Option<StorageUnit>,
    file_name_filter: Option<String>,
    directory_name_filter: Option<String>,
    keep_items_quantity: Option<i64>,
    clean_action: Option<CleanAction>,
    #[serde(default)]
    file_validation: FileValidationSection,
    #[serde(default)]
    directory_validation: DirectoryValidationSection,
    #[serde(default)]
    clean_up_policy: CleanUpPolicySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FileValidationSection {
    size_at_least_as_previous: Option<bool>,
    hash_check: Option<bool>,
    archive_integrity_check: Option<bool>,
    log_companion_required: Option<bool>,
    use_custom_validator: Option<bool>,
    custom_validator_command: Option<String>,
    custom_validator_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DirectoryValidationSection {
    size_at_least_as_previous: Option<bool>,
    file_count_at_least_as_previous: Option<bool>,
    file_size_at_least_as_previous: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CleanUpPolicySection {
    all_invalid_items: Option<bool>,
    invalid_items_beyond_keep_quantity: Option<bool>,
}

impl FileValidationSection {
    fn resolve(&self, fallback: &FileValidationSection) -> FileValidationConfig {
        let builtin = FileValidationConfig::default();
        FileValidationConfig {
            size_at_least_as_previous: self
                .size_at_least_as_previous
                .or(fallback.size_at_least_as_previous)
                .unwrap_or(builtin.size_at_least_as_previous),
            hash_check: self
                .hash_check
                .or(fallback.hash_check)
                .unwrap_or(builtin.hash_check),
            archive_integrity_check: self
                .archive_integrity_check
                .or(fallback.archive_integrity_check)
                .unwrap_or(builtin.archive_integrity_check),
            log_companion_required: self
                .log_companion_required
                .or(fallback.log_companion_required)
                .unwrap_or(builtin.log_companion_required),
            use_custom_validator: self
                .use_custom_validator
                .or(fallback.use_custom_validator)
                .unwrap_or(builtin.use_custom_validator),
            custom_validator_command: self
                .custom_validator_command
                .clone()
                .or_else(|| fallback.custom_validator_command.clone())
                .unwrap_or(builtin.custom_validator_command),
            custom_validator_timeout: self
                .custom_validator_timeout_secs
                .or(fallback.custom_validator_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(builtin.custom_validator_timeout),
        }
    }
}

impl DirectoryValidationSection {
    fn resolve(&self, fallback: &DirectoryValidationSection) -> DirectoryValidationConfig {
        let builtin = DirectoryValidationConfig::default();
        DirectoryValidationConfig {
            size_at_least_as_previous: self
                .size_at_least_as_previous
                .or(fallback.size_at_least_as_previous)
                .unwrap_or(builtin.size_at_least_as_previous),
            file_count_at_least_as_previous: self
                .file_count_at_least_as_previous
                .or(fallback.file_count_at_least_as_previous)
                .unwrap_or(builtin.file_count_at_least_as_previous),
            file_size_at_least_as_previous: self
                .file_size_at_least_as_previous
                .or(fallback.file_size_at_least_as_previous)
                .unwrap_or(builtin.file_size_at_least_as_previous),
        }
    }
}

impl CleanUpPolicySection {
    fn resolve(&self, fallback: &CleanUpPolicySection) -> CleanUpPolicy {
        let builtin = CleanUpPolicy::default();
        CleanUpPolicy {
            all_invalid_items: self
                .all_invalid_items
                .or(fallback.all_invalid_items)
                .unwrap_or(builtin.all_invalid_items),
            invalid_items_beyond_keep_quantity: self
                .invalid_items_beyond_keep_quantity
                .or(fallback.invalid_items_beyond_keep_quantity)
                .unwrap_or(builtin.invalid_items_beyond_keep_quantity),
        }
    }
}

impl ProfileSection {
    fn resolve(&self, defaults: &ProfileSection, position: usize) -> Result<Profile> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| Error::InvalidConfigFile(format!("profile #{} has no name", position + 1)))?;

        let path = self
            .path
            .clone()
            .or_else(|| defaults.path.clone())
            .ok_or_else(|| Error::InvalidConfigFile(format!("profile '{}' has no path", name)))?;

        let file_pattern = self
            .file_name_filter
            .as_deref()
            .or(defaults.file_name_filter.as_deref())
            .unwrap_or(MATCH_ALL_PATTERN);
        let directory_pattern = self
            .directory_name_filter
            .as_deref()
            .or(defaults.directory_name_filter.as_deref())
            .unwrap_or(MATCH_ALL_PATTERN);

        let builtin = Profile::new(&name, path.clone());

        // Negative quantities are kept as zero so selection reports them.
        let keep_items_quantity = self
            .keep_items_quantity
            .or(defaults.keep_items_quantity)
            .map(|q| usize::try_from(q).unwrap_or(0))
            .unwrap_or(builtin.keep_items_quantity);

        Ok(Profile {
            name,
            path,
            storage_unit: self
                .storage_unit
                .or(defaults.storage_unit)
                .unwrap_or(builtin.storage_unit),
            file_name_filter: name_filter(file_pattern)?,
            directory_name_filter: name_filter(directory_pattern)?,
            keep_items_quantity,
            file_validation: self.file_validation.resolve(&defaults.file_validation),
            directory_validation: self
                .directory_validation
                .resolve(&defaults.directory_validation),
            clean_up_policy: self.clean_up_policy.resolve(&defaults.clean_up_policy),
            clean_action: self
                .clean_action
                .or(defaults.clean_action)
                .unwrap_or(builtin.clean_action),
        })
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backup-janitor")
}

/// Config file used when none is given on the command line.
///
/// `janitor.toml` in the working directory wins over the user config directory.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs_config_path().join(CONFIG_FILE_NAME)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content)?;

    if file.profiles.is_empty() {
        return Err(Error::InvalidConfigFile("no profiles defined".to_string()));
    }

    let mut names = HashSet::new();
    let mut profiles = Vec::with_capacity(file.profiles.len());

    for (position, section) in file.profiles.iter().enumerate() {
        let profile = section.resolve(&file.defaults, position)?;
        if !names.insert(profile.name.clone()) {
            return Err(Error::InvalidConfigFile(format!(
                "duplicate profile name '{}'",
                profile.name
            )));
        }
        tracing::debug!(
            "Loaded profile '{}' ({}, keep {})",
            profile.name,
            profile.storage_unit,
            profile.keep_items_quantity
        );
        profiles.push(profile);
    }

    Ok(AppConfig {
        profiles,
        report_file: file
            .report_file
            .unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME)),
    })
}

/// Load configuration from file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.display().to_string()));
    }

    tracing::info!("Reading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
