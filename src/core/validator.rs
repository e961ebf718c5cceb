//! Item validator module.
//!
//! Decides whether a generation is intact, optionally comparing it with the
//! generation right before it. File checks run in a fixed order and stop at
//! the first enabled check that fails:
//! 1. hash companion (`<file>.md5`)
//! 2. size at least as the previous generation
//! 3. log companion (`<stem>.log` or `<file>.log`)
//! 4. zip archive integrity
//! 5. custom validator command

use crate::models::item::{DirectoryItem, FileItem, Item, PathIndex};
use crate::models::profile::{DirectoryValidationConfig, FileValidationConfig, Profile};
use crate::services::command::{self, CommandRunner};
use crate::utils::{fs as fs_utils, hash};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::{self, File};

/// A single file check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileCheck {
    Hash,
    SizeAtLeastAsPrevious,
    LogCompanion,
    ArchiveIntegrity,
    CustomValidator,
}

/// Evaluation order of the file checks.
pub const FILE_CHECK_ORDER: [FileCheck; 5] = [
    FileCheck::Hash,
    FileCheck::SizeAtLeastAsPrevious,
    FileCheck::LogCompanion,
    FileCheck::ArchiveIntegrity,
    FileCheck::CustomValidator,
];

impl FileCheck {
    /// Whether this check is switched on in `config`.
    pub fn is_enabled(self, config: &FileValidationConfig) -> bool {
        match self {
            FileCheck::Hash => config.hash_check,
            FileCheck::SizeAtLeastAsPrevious => config.size_at_least_as_previous,
            FileCheck::LogCompanion => config.log_companion_required,
            FileCheck::ArchiveIntegrity => config.archive_integrity_check,
            FileCheck::CustomValidator => config.use_custom_validator,
        }
    }
}

impl std::fmt::Display for FileCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileCheck::Hash => write!(f, "hash check"),
            FileCheck::SizeAtLeastAsPrevious => write!(f, "size at least as previous"),
            FileCheck::LogCompanion => write!(f, "log companion"),
            FileCheck::ArchiveIntegrity => write!(f, "archive integrity"),
            FileCheck::CustomValidator => write!(f, "custom validator"),
        }
    }
}

/// Why an item is (in)valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum Verdict {
    Valid,
    /// The path disappeared after indexing.
    NotFound,
    /// A directory with no files or zero total size.
    Empty,
    /// A file check failed.
    FailedCheck { check: FileCheck },
    /// A directory holds fewer files than the previous one.
    FileCountBelowPrevious,
    /// A directory is smaller than the previous one.
    SizeBelowPrevious,
    /// A file inside a directory failed validation.
    InvalidFile { name: String, check: Option<FileCheck> },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::NotFound => write!(f, "not found"),
            Verdict::Empty => write!(f, "empty directory"),
            Verdict::FailedCheck { check } => write!(f, "{} failed", check),
            Verdict::FileCountBelowPrevious => write!(f, "fewer files than previous"),
            Verdict::SizeBelowPrevious => write!(f, "smaller than previous"),
            Verdict::InvalidFile { name, check: Some(check) } => {
                write!(f, "'{}': {} failed", name, check)
            }
            Verdict::InvalidFile { name, check: None } => write!(f, "'{}': not found", name),
        }
    }
}

/// Validates files and directories.
pub struct ItemValidator<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ItemValidator<'a> {
    /// Create a validator that runs custom validator commands through `runner`.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Validate a file against its previous generation.
    pub fn check_file(
        &self,
        item: &FileItem,
        previous: Option<&FileItem>,
        config: &FileValidationConfig,
    ) -> Verdict {
        tracing::debug!("Validating file {}", item.path.display());

        if !item.path.exists() {
            tracing::warn!("File not found: {}", item.path.display());
            return Verdict::NotFound;
        }

        for check in FILE_CHECK_ORDER {
            if !check.is_enabled(config) {
                continue;
            }

            let passed = self.run_check(check, item, previous, config);
            tracing::debug!("- {}: {}", check, if passed { "ok" } else { "failed" });

            if !passed {
                return Verdict::FailedCheck { check };
            }
        }

        Verdict::Valid
    }

    /// Whether a file is valid against its previous generation.
    pub fn is_file_valid(
        &self,
        item: &FileItem,
        previous: Option<&FileItem>,
        config: &FileValidationConfig,
    ) -> bool {
        self.check_file(item, previous, config).is_valid()
    }

    fn run_check(
        &self,
        check: FileCheck,
        item: &FileItem,
        previous: Option<&FileItem>,
        config: &FileValidationConfig,
    ) -> bool {
        match check {
            FileCheck::Hash => hash_matches_companion(item),
            FileCheck::SizeAtLeastAsPrevious => {
                previous.map_or(true, |previous| item.size >= previous.size)
            }
            FileCheck::LogCompanion => has_log_companion(item),
            FileCheck::ArchiveIntegrity => is_archive_readable(item),
            FileCheck::CustomValidator => self.custom_validator_succeeds(item, config),
        }
    }

    fn custom_validator_succeeds(&self, item: &FileItem, config: &FileValidationConfig) -> bool {
        let Some(work_dir) = item.path.parent() else {
            return false;
        };
        let command_line = command::render_command(&config.custom_validator_command, &item.name);

        match self
            .runner
            .execute(&command_line, work_dir, config.custom_validator_timeout)
        {
            Ok(result) => result.is_success(),
            Err(e) => {
                tracing::warn!("Custom validator failed for {}: {}", item.path.display(), e);
                false
            }
        }
    }

    /// Validate a directory against the previous generation directory.
    ///
    /// The file-count and size gates run first and only one of them is
    /// evaluated. Files are only inspected once the gate passes, each against
    /// the same-named file of the previous directory.
    pub fn check_directory(
        &self,
        item: &DirectoryItem,
        previous: Option<&DirectoryItem>,
        directory_config: &DirectoryValidationConfig,
        file_config: &FileValidationConfig,
    ) -> Verdict {
        tracing::debug!("Validating directory {}", item.path.display());

        if !item.path.is_dir() {
            tracing::warn!("Directory not found: {}", item.path.display());
            return Verdict::NotFound;
        }
        if item.size == 0 || item.files.is_empty() {
            return Verdict::Empty;
        }

        if let Some(previous) = previous {
            if directory_config.file_count_at_least_as_previous {
                tracing::debug!(
                    "- files: {} (previous: {})",
                    item.files.len(),
                    previous.files.len()
                );
                if item.files.len() < previous.files.len() {
                    return Verdict::FileCountBelowPrevious;
                }
            } else if directory_config.size_at_least_as_previous {
                tracing::debug!("- size: {} (previous: {})", item.size, previous.size);
                if item.size < previous.size {
                    return Verdict::SizeBelowPrevious;
                }
            }
        }

        let file_config = if directory_config.file_size_at_least_as_previous {
            Cow::Owned(FileValidationConfig {
                size_at_least_as_previous: true,
                ..file_config.clone()
            })
        } else {
            Cow::Borrowed(file_config)
        };

        for file in &item.files {
            let previous_file = previous.and_then(|p| p.file(&file.name));
            match self.check_file(file, previous_file, &file_config) {
                Verdict::Valid => {}
                Verdict::FailedCheck { check } => {
                    return Verdict::InvalidFile {
                        name: file.name.clone(),
                        check: Some(check),
                    }
                }
                _ => {
                    return Verdict::InvalidFile {
                        name: file.name.clone(),
                        check: None,
                    }
                }
            }
        }

        Verdict::Valid
    }

    /// Whether a directory is valid against the previous generation directory.
    pub fn is_directory_valid(
        &self,
        item: &DirectoryItem,
        previous: Option<&DirectoryItem>,
        directory_config: &DirectoryValidationConfig,
        file_config: &FileValidationConfig,
    ) -> bool {
        self.check_directory(item, previous, directory_config, file_config)
            .is_valid()
    }

    /// Validate one item of an index against the item before it.
    pub fn check_item(&self, item: &Item, previous: Option<&Item>, profile: &Profile) -> Verdict {
        match item {
            Item::File(file) => {
                let previous = match previous {
                    Some(Item::File(previous)) => Some(previous),
                    _ => None,
                };
                self.check_file(file, previous, &profile.file_validation)
            }
            Item::Directory(directory) => {
                let previous = match previous {
                    Some(Item::Directory(previous)) => Some(previous),
                    _ => None,
                };
                self.check_directory(
                    directory,
                    previous,
                    &profile.directory_validation,
                    &profile.file_validation,
                )
            }
        }
    }

    /// Validate every item of an index and store the outcome in its `valid` flag.
    pub fn validate(&self, index: &mut PathIndex, profile: &Profile) -> Vec<Verdict> {
        self.validate_with_progress(index, profile, |_, _| {})
    }

    /// Like [`validate`](Self::validate), calling `progress` after each item.
    pub fn validate_with_progress<F>(
        &self,
        index: &mut PathIndex,
        profile: &Profile,
        mut progress: F,
    ) -> Vec<Verdict>
    where
        F: FnMut(usize, &Item),
    {
        let mut verdicts = Vec::with_capacity(index.len());

        for position in 0..index.len() {
            let verdict = self.check_item(&index.items[position], index.previous(position), profile);
            tracing::info!("{}: {}", index.items[position].name(), verdict);
            verdicts.push(verdict);
            progress(position, &index.items[position]);
        }

        for (item, verdict) in index.items.iter_mut().zip(&verdicts) {
            item.set_valid(verdict.is_valid());
        }

        verdicts
    }
}

/// Compare the `.md5` companion with the content hash.
fn hash_matches_companion(item: &FileItem) -> bool {
    let companion = fs_utils::hash_companion(&item.path);

    let expected = match fs::read_to_string(&companion) {
        Ok(content) => content,
        Err(_) => {
            tracing::debug!("Hash companion not found: {}", companion.display());
            return false;
        }
    };

    let actual = match &item.content_hash {
        Some(hash) => Cow::Borrowed(hash.as_str()),
        None => match hash::md5_file(&item.path) {
            Ok(hash) => Cow::Owned(hash),
            Err(e) => {
                tracing::warn!("Unable to hash {}: {}", item.path.display(), e);
                return false;
            }
        },
    };

    let matches = expected.trim() == actual;
    if !matches {
        tracing::debug!("Hash mismatch: '{}' vs companion '{}'", actual, expected.trim());
    }
    matches
}

/// Look for a non-empty `.log` companion.
fn has_log_companion(item: &FileItem) -> bool {
    fs_utils::log_companions(&item.path).iter().any(|candidate| {
        fs::metadata(candidate)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    })
}

/// Check that the file opens as a zip archive.
fn is_archive_readable(item: &FileItem) -> bool {
    let file = match File::open(&item.path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Unable to open {}: {}", item.path.display(), e);
            return false;
        }
    };

    match zip::ZipArchive::new(file) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Archive is corrupted: {} ({})", item.path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::command::ExecutionResult;
    use crate::Result;
    use chrono::Utc;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fails the test if a command is ever run.
    struct UnreachableRunner;

    impl CommandRunner for UnreachableRunner {
        fn execute(&self, command: &str, _: &Path, _: Duration) -> Result<ExecutionResult> {
            panic!("custom validator must not run: {}", command);
        }
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> FileItem {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        FileItem {
            path,
            name: name.to_string(),
            size: content.len() as u64,
            modified: Utc::now(),
            content_hash: None,
            valid: false,
        }
    }

    #[test]
    fn test_no_checks_enabled_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let item = write_file(temp_dir.path(), "a.bin", "data");
        let validator = ItemValidator::new(&UnreachableRunner);

        assert!(validator.is_file_valid(&item, None, &FileValidationConfig::disabled()));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let item = write_file(temp_dir.path(), "a.bin", "data");
        std::fs::remove_file(&item.path).unwrap();
        let validator = ItemValidator::new(&UnreachableRunner);

        assert_eq!(
            validator.check_file(&item, None, &FileValidationConfig::disabled()),
            Verdict::NotFound
        );
    }

    #[test]
    fn test_hash_computed_on_demand() {
        let temp_dir = TempDir::new().unwrap();
        let item = write_file(temp_dir.path(), "a.bin", "abc");
        std::fs::write(
            temp_dir.path().join("a.bin.md5"),
            "900150983cd24fb0d6963f7d28e17f72\n",
        )
        .unwrap();
        let config = FileValidationConfig {
            hash_check: true,
            ..FileValidationConfig::disabled()
        };
        let validator = ItemValidator::new(&UnreachableRunner);

        assert!(item.content_hash.is_none());
        assert!(validator.is_file_valid(&item, None, &config));
    }

    #[test]
    fn test_failing_check_stops_the_chain() {
        let temp_dir = TempDir::new().unwrap();
        // Not a zip and no companions: every check after the first would fail too.
        let item = write_file(temp_dir.path(), "a.zip", "not an archive");
        let config = FileValidationConfig {
            size_at_least_as_previous: true,
            hash_check: true,
            archive_integrity_check: true,
            log_companion_required: true,
            use_custom_validator: true,
            custom_validator_command: "exit 1".to_string(),
            ..FileValidationConfig::disabled()
        };
        let validator = ItemValidator::new(&UnreachableRunner);

        assert_eq!(
            validator.check_file(&item, None, &config),
            Verdict::FailedCheck {
                check: FileCheck::Hash
            }
        );
    }

    #[test]
    fn test_size_against_previous() {
        let temp_dir = TempDir::new().unwrap();
        let previous = write_file(temp_dir.path(), "1.bin", "some-data");
        let current = write_file(temp_dir.path(), "2.bin", "some-d");
        let config = FileValidationConfig {
            size_at_least_as_previous: true,
            ..FileValidationConfig::disabled()
        };
        let validator = ItemValidator::new(&UnreachableRunner);

        assert!(!validator.is_file_valid(&current, Some(&previous), &config));
        assert!(validator.is_file_valid(&previous, None, &config));
        assert!(validator.is_file_valid(&previous, Some(&current), &config));
    }

    #[test]
    fn test_log_companion_forms() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileValidationConfig {
            log_companion_required: true,
            ..FileValidationConfig::disabled()
        };
        let validator = ItemValidator::new(&UnreachableRunner);

        let stem_form = write_file(temp_dir.path(), "a.zip", "x");
        std::fs::write(temp_dir.path().join("a.log"), "done").unwrap();
        assert!(validator.is_file_valid(&stem_form, None, &config));

        let full_form = write_file(temp_dir.path(), "b.zip", "x");
        std::fs::write(temp_dir.path().join("b.zip.log"), "done").unwrap();
        assert!(validator.is_file_valid(&full_form, None, &config));

        let empty_log = write_file(temp_dir.path(), "c.zip", "x");
        std::fs::write(temp_dir.path().join("c.zip.log"), "").unwrap();
        assert!(!validator.is_file_valid(&empty_log, None, &config));

        let no_log = write_file(temp_dir.path(), "d.zip", "x");
        assert!(!validator.is_file_valid(&no_log, None, &config));
    }

    #[test]
    fn test_verdict_display() {
        let verdict = Verdict::InvalidFile {
            name: "db.sql.gz".to_string(),
            check: Some(FileCheck::Hash),
        };
        assert_eq!(verdict.to_string(), "'db.sql.gz': hash check failed");
        assert_eq!(Verdict::FileCountBelowPrevious.to_string(), "fewer files than previous");
    }

    // Archive, custom validator and directory tests live in tests/validator_tests.rs
}
