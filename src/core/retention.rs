//! Retention selector module.
//!
//! Given a validated index, picks the generations that may be cleaned up.
//! The newest `keep` valid generations are always retained.

use crate::models::item::Item;
use crate::models::profile::CleanUpPolicy;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Positions of the newest `keep` valid items, ordered by modification time.
///
/// Ties keep index order, so the later generation wins.
pub fn retained_positions(items: &[Item], keep: usize) -> Vec<usize> {
    let mut valid: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_valid())
        .map(|(position, _)| position)
        .collect();

    // Stable sort: equal timestamps stay in index order.
    valid.sort_by_key(|&position| items[position].modified());

    let skip = valid.len().saturating_sub(keep);
    valid.split_off(skip)
}

/// Length of the protected suffix under the keep-window policy.
///
/// Walks from the newest item backwards. Every item is protected until `keep`
/// valid items have been seen; the walk stops at the first item after that.
pub fn protected_suffix_len(items: &[Item], keep: usize) -> usize {
    let mut valid_seen = 0;
    let mut protected = 0;

    for item in items.iter().rev() {
        if valid_seen >= keep {
            break;
        }
        if item.is_valid() {
            valid_seen += 1;
        }
        protected += 1;
    }

    protected
}

/// Every item that is not among the retained valid items.
fn select_all_invalid(items: &[Item], keep: usize) -> Vec<Item> {
    let retained: HashSet<&Path> = retained_positions(items, keep)
        .into_iter()
        .map(|position| items[position].path())
        .collect();

    items
        .iter()
        .filter(|item| !retained.contains(item.path()))
        .cloned()
        .collect()
}

/// Every item older than the window holding the newest `keep` valid items.
fn select_beyond_keep_window(items: &[Item], keep: usize) -> Vec<Item> {
    let boundary = items.len() - protected_suffix_len(items, keep);
    items[..boundary].to_vec()
}

/// Select the items to clean up.
///
/// `all_invalid_items` takes precedence when both policy flags are set; with
/// neither flag set nothing is selected. The result keeps index order.
///
/// # Errors
/// `Error::Misconfiguration` if `keep` is zero.
pub fn select(items: &[Item], keep: usize, policy: &CleanUpPolicy) -> Result<Vec<Item>> {
    if keep == 0 {
        tracing::error!("Misconfiguration: keep-items-quantity must be greater than 0");
        return Err(Error::misconfiguration(
            "keep-items-quantity must be greater than 0",
        ));
    }

    let selected = if policy.all_invalid_items {
        select_all_invalid(items, keep)
    } else if policy.invalid_items_beyond_keep_quantity {
        select_beyond_keep_window(items, keep)
    } else {
        Vec::new()
    };

    tracing::info!(
        "Selected {} of {} items for cleanup (keep {})",
        selected.len(),
        items.len(),
        keep
    );

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::item::FileItem;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::PathBuf;

    const ALL_INVALID: CleanUpPolicy = CleanUpPolicy {
        all_invalid_items: true,
        invalid_items_beyond_keep_quantity: false,
    };

    const BEYOND_KEEP: CleanUpPolicy = CleanUpPolicy {
        all_invalid_items: false,
        invalid_items_beyond_keep_quantity: true,
    };

    /// Items named by position, one hour apart, oldest first.
    fn items(validity: &[bool]) -> Vec<Item> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        validity
            .iter()
            .enumerate()
            .map(|(i, &valid)| {
                let name = format!("2024-01-01-{:02}.zip", i);
                Item::File(FileItem {
                    path: PathBuf::from("/backups").join(&name),
                    name,
                    size: 100,
                    modified: start + Duration::hours(i as i64),
                    content_hash: None,
                    valid,
                })
            })
            .collect()
    }

    fn names(items: &[Item]) -> Vec<String> {
        items.iter().map(|i| i.name().to_string()).collect()
    }

    #[test]
    fn test_zero_keep_is_misconfiguration() {
        let err = select(&items(&[true, false]), 0, &ALL_INVALID).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Misconfiguration);
    }

    #[test]
    fn test_no_policy_selects_nothing() {
        let policy = CleanUpPolicy {
            all_invalid_items: false,
            invalid_items_beyond_keep_quantity: false,
        };
        assert!(select(&items(&[false, false, true]), 1, &policy)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_all_invalid_keeps_newest_valid() {
        let index = items(&[true, false, true, false, true]);
        let selected = select(&index, 2, &ALL_INVALID).unwrap();

        assert_eq!(
            names(&selected),
            vec![
                "2024-01-01-00.zip",
                "2024-01-01-01.zip",
                "2024-01-01-03.zip"
            ]
        );
    }

    #[test]
    fn test_all_invalid_is_idempotent() {
        let index = items(&[false, true, true, false, true, false]);
        let first = select(&index, 2, &ALL_INVALID).unwrap();
        let second = select(&index, 2, &ALL_INVALID).unwrap();
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_retained_uses_modification_time() {
        let mut index = items(&[true, true, true]);
        // The oldest name was modified last.
        if let Item::File(file) = &mut index[0] {
            file.modified = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        }

        assert_eq!(retained_positions(&index, 1), vec![0]);
        let selected = select(&index, 1, &ALL_INVALID).unwrap();
        assert_eq!(names(&selected), vec!["2024-01-01-01.zip", "2024-01-01-02.zip"]);
    }

    #[test]
    fn test_retained_ties_follow_index_order() {
        let mut index = items(&[true, true, true]);
        let same = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        for item in &mut index {
            if let Item::File(file) = item {
                file.modified = same;
            }
        }
        assert_eq!(retained_positions(&index, 2), vec![1, 2]);
    }

    #[test]
    fn test_beyond_keep_window() {
        // valid, invalid, valid, invalid, valid (oldest -> newest)
        let index = items(&[true, false, true, false, true]);

        assert_eq!(protected_suffix_len(&index, 2), 3);
        let selected = select(&index, 2, &BEYOND_KEEP).unwrap();
        assert_eq!(names(&selected), vec!["2024-01-01-00.zip", "2024-01-01-01.zip"]);
    }

    #[test]
    fn test_beyond_keep_window_protects_recent_invalid() {
        // 3 valid, 2 invalid, 2 valid, 1 invalid
        let index = items(&[true, true, true, false, false, true, true, false]);
        let selected = select(&index, 2, &BEYOND_KEEP).unwrap();
        assert_eq!(selected.len(), 5);

        let both = CleanUpPolicy {
            all_invalid_items: true,
            invalid_items_beyond_keep_quantity: true,
        };
        assert_eq!(select(&index, 2, &both).unwrap().len(), 6);
    }

    #[test]
    fn test_beyond_keep_window_not_enough_valid() {
        let index = items(&[false, true, false]);
        assert_eq!(protected_suffix_len(&index, 3), 3);
        assert!(select(&index, 3, &BEYOND_KEEP).unwrap().is_empty());
    }

    #[test]
    fn test_empty_index() {
        assert!(select(&[], 3, &ALL_INVALID).unwrap().is_empty());
        assert!(select(&[], 3, &BEYOND_KEEP).unwrap().is_empty());
    }
}
