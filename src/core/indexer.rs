//! Path indexer module.
//!
//! Lists the backup generations found directly under a root path, either
//! loose files or sub-directories, sorted by name. Because generations are
//! named with sortable dates, name order is also chronological order.

use crate::models::item::{DirectoryItem, FileItem, Item, PathIndex, StorageUnit};
use crate::models::profile::Profile;
use crate::utils::{fs as fs_utils, hash};
use crate::Result;
use regex::Regex;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// List the direct children of `path`, sorted by file name.
fn direct_children(path: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

/// Create a FileItem from a directory entry.
fn create_file_item(entry: &DirEntry, hash_required: bool) -> Result<FileItem> {
    let path = entry.path();
    let metadata = entry.metadata().map_err(std::io::Error::from)?;

    let content_hash = if hash_required {
        Some(hash::md5_file(path)?)
    } else {
        None
    };

    Ok(FileItem {
        path: path.to_path_buf(),
        name: fs_utils::leaf_name(path),
        size: metadata.len(),
        modified: fs_utils::modified_time(&metadata),
        content_hash,
        valid: false,
    })
}

/// Index the regular files directly inside `path`.
///
/// Companion files (`.md5`, `.log`) and names not matching `file_name_filter`
/// are skipped.
fn index_files(path: &Path, file_name_filter: &Regex, hash_required: bool) -> Result<Vec<FileItem>> {
    let mut files = Vec::new();

    for entry in direct_children(path) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.path_is_symlink() {
            tracing::debug!("Skipping symlink: {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let entry_path = entry.path();
        if fs_utils::is_companion_file(entry_path) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !file_name_filter.is_match(&name) {
            tracing::debug!("Skipping file not matching filter: {}", entry_path.display());
            continue;
        }

        files.push(create_file_item(&entry, hash_required)?);
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Index the sub-directories directly inside `path` and their files.
///
/// Any failure while indexing one directory fails the whole index.
fn index_directories(
    path: &Path,
    directory_name_filter: &Regex,
    file_name_filter: &Regex,
    hash_required: bool,
) -> Result<Vec<DirectoryItem>> {
    let mut directories = Vec::new();

    for entry in direct_children(path) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.path_is_symlink() {
            tracing::debug!("Skipping symlink: {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !directory_name_filter.is_match(&name) {
            tracing::debug!("Skipping directory not matching filter: {}", entry.path().display());
            continue;
        }

        let files = index_files(entry.path(), file_name_filter, hash_required).map_err(|e| {
            tracing::error!("Unable to index directory {}: {}", entry.path().display(), e);
            e
        })?;
        let metadata = entry.metadata().map_err(std::io::Error::from)?;

        directories.push(DirectoryItem {
            path: entry.path().to_path_buf(),
            name,
            size: files.iter().map(|f| f.size).sum(),
            modified: fs_utils::modified_time(&metadata),
            files,
            valid: false,
        });
    }

    directories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(directories)
}

/// Build an index of the generations under `root`.
///
/// # Arguments
/// * `root` - Directory holding the generations
/// * `unit` - Whether generations are files or directories
/// * `directory_name_filter` - Whole-name pattern for generation directories
/// * `file_name_filter` - Whole-name pattern for files
/// * `hash_required` - Compute content hashes while indexing
///
/// # Returns
/// A `PathIndex` with item paths made absolute, or an error if `root` does
/// not exist or any part of it cannot be read.
pub fn build_index(
    root: &Path,
    unit: StorageUnit,
    directory_name_filter: &Regex,
    file_name_filter: &Regex,
    hash_required: bool,
) -> Result<PathIndex> {
    fs_utils::ensure_directory(root)?;
    let root = root.canonicalize()?;

    tracing::info!("Indexing {} (storage unit: {})", root.display(), unit);

    let items: Vec<Item> = match unit {
        StorageUnit::File => index_files(&root, file_name_filter, hash_required)?
            .into_iter()
            .map(Item::File)
            .collect(),
        StorageUnit::Directory => {
            index_directories(&root, directory_name_filter, file_name_filter, hash_required)?
                .into_iter()
                .map(Item::Directory)
                .collect()
        }
    };

    tracing::info!("Indexed {} items in {}", items.len(), root.display());

    Ok(PathIndex { root, unit, items })
}

/// Build the index described by a profile.
pub fn build_profile_index(profile: &Profile) -> Result<PathIndex> {
    build_index(
        &profile.path,
        profile.storage_unit,
        &profile.directory_name_filter,
        &profile.file_name_filter,
        profile.hash_required(),
    )
}
