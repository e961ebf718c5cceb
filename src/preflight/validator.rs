//! Custom validator preflight check.

use super::CheckResult;
use crate::models::profile::Profile;
use crate::services::command;

/// Check that the custom validator program can be found, when enabled.
pub fn check(profile: &Profile) -> Option<CheckResult> {
    let config = &profile.file_validation;
    if !config.use_custom_validator {
        return None;
    }

    let result = if command::is_resolvable(&config.custom_validator_command) {
        CheckResult::ok("custom validator", &config.custom_validator_command)
    } else {
        CheckResult::fail(
            "custom validator",
            &format!("'{}' not found", config.custom_validator_command),
            "Install the program or fix 'custom-validator-command'",
        )
    };

    Some(result)
}
