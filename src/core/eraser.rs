//! Storage eraser module.
//!
//! Deletes the generations selected for cleanup. Deletion is best effort:
//! a failure is recorded and the remaining items are still processed.
//! Items that are already gone count as skipped, not failed.

use crate::models::item::Item;
use crate::Result;
use colored::Colorize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Result of an erase pass.
#[derive(Debug, Default)]
pub struct EraseResult {
    /// Number of deleted items.
    pub removed_count: usize,
    /// Number of items that no longer existed.
    pub skip_count: usize,
    /// Number of items that could not be deleted.
    pub error_count: usize,
    /// Error messages.
    pub errors: Vec<String>,
}

impl EraseResult {
    /// Check if every item was deleted or already gone.
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }

    /// Print summary.
    pub fn print_summary(&self) {
        println!("{}", "[Cleanup Summary]".bold().green());
        println!("  {} {}", "Removed:".bold(), self.removed_count);
        println!("  {} {}", "Already gone:".bold(), self.skip_count);
        println!("  {} {}", "Failed:".bold(), self.error_count);

        if !self.errors.is_empty() {
            println!();
            println!("{}", "[Errors]".bold().red());
            for error in &self.errors {
                println!("  - {}", error);
            }
        }
    }
}

/// Delete a single item. Returns `false` when it was already gone.
fn erase_item(item: &Item) -> std::io::Result<bool> {
    let path = item.path();

    if !is_present(path) {
        tracing::debug!("Already removed, skipping: {}", path.display());
        return Ok(false);
    }

    let removed = match item {
        Item::Directory(_) => fs::remove_dir_all(path),
        Item::File(_) => fs::remove_file(path),
    };

    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Delete every item, collecting failures.
pub fn erase_items(items: &[Item]) -> EraseResult {
    tracing::info!("Cleaning up {} items", items.len());

    let mut result = EraseResult::default();

    for item in items {
        tracing::info!("Removing {}", item.path().display());

        match erase_item(item) {
            Ok(true) => {
                tracing::info!("Removed: {}", item.path().display());
                result.removed_count += 1;
            }
            Ok(false) => result.skip_count += 1,
            Err(e) => {
                let error_msg = format!("{}: {}", item.path().display(), e);
                tracing::error!("Unable to remove {}", error_msg);
                result.errors.push(error_msg);
                result.error_count += 1;
            }
        }
    }

    if result.is_success() {
        tracing::info!("All items have been removed");
    } else {
        tracing::error!(
            "Cleanup finished with {} errors out of {} items",
            result.error_count,
            items.len()
        );
    }

    result
}

/// Delete every item. Returns `true` when no deletion failed.
pub fn erase(items: &[Item]) -> Result<bool> {
    Ok(erase_items(items).is_success())
}

/// Whether an erase target is still present on disk.
pub fn is_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
