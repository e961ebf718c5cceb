//! Keep quantity preflight check.

use super::CheckResult;
use crate::models::profile::Profile;

/// Check that at least one generation is kept.
pub fn check(profile: &Profile) -> CheckResult {
    if profile.keep_items_quantity == 0 {
        CheckResult::fail(
            "keep-items-quantity",
            "must be greater than 0",
            "Set 'keep-items-quantity' to the number of valid backups to keep",
        )
    } else {
        CheckResult::ok(
            "keep-items-quantity",
            &profile.keep_items_quantity.to_string(),
        )
    }
}
