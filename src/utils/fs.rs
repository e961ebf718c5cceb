//! File system utilities.

use crate::Result;
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Extensions of companion files that are never indexed as generations.
pub const COMPANION_EXTENSIONS: &[&str] = &["md5", "log"];

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a `.md5` or `.log` companion.
pub fn is_companion_file(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| COMPANION_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Append a suffix to the full path (`a.zip` + `.md5` -> `a.zip.md5`).
pub fn with_appended_extension(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Path of the hash companion: `<path>.md5`.
pub fn hash_companion(path: &Path) -> PathBuf {
    with_appended_extension(path, ".md5")
}

/// Candidate paths of the log companion, in lookup order:
/// `<path-without-extension>.log`, then `<path>.log`.
pub fn log_companions(path: &Path) -> [PathBuf; 2] {
    [path.with_extension("log"), with_appended_extension(path, ".log")]
}

/// Last modification time, falling back to now when the platform has none.
pub fn modified_time(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Leaf name of a path as a string.
pub fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_companion_file() {
        assert!(is_companion_file(Path::new("backup.zip.md5")));
        assert!(is_companion_file(Path::new("backup.LOG")));
        assert!(!is_companion_file(Path::new("backup.zip")));
        assert!(!is_companion_file(Path::new("md5")));
    }

    #[test]
    fn test_hash_companion() {
        assert_eq!(
            hash_companion(Path::new("/b/2024-01-01.zip")),
            PathBuf::from("/b/2024-01-01.zip.md5")
        );
    }

    #[test]
    fn test_log_companions() {
        let [stem, full] = log_companions(Path::new("/b/site.tar.gz"));
        assert_eq!(stem, PathBuf::from("/b/site.tar.log"));
        assert_eq!(full, PathBuf::from("/b/site.tar.gz.log"));
    }

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name(Path::new("/b/2024-01-01")), "2024-01-01");
    }
}
