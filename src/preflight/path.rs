//! Backup root preflight check.

use super::CheckResult;
use crate::models::profile::Profile;

/// Check that the profile root exists and is a directory.
pub fn check(profile: &Profile) -> CheckResult {
    let path = &profile.path;

    if !path.exists() {
        CheckResult::fail(
            "path",
            &format!("{} not found", path.display()),
            "Fix the profile 'path' or create the directory",
        )
    } else if !path.is_dir() {
        CheckResult::fail(
            "path",
            &format!("{} is not a directory", path.display()),
            "Point 'path' at the directory holding the backups",
        )
    } else {
        CheckResult::ok("path", &path.display().to_string())
    }
}
