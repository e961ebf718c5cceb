//! Storage item data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage unit of a profile: what one backup generation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageUnit {
    /// One file per generation.
    #[default]
    File,
    /// One sub-directory per generation.
    Directory,
}

impl std::fmt::Display for StorageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageUnit::File => write!(f, "file"),
            StorageUnit::Directory => write!(f, "directory"),
        }
    }
}

/// A single file found in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without path.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// Last modified time.
    pub modified: DateTime<Utc>,
    /// Hex digest of the content, only present when hashing was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Whether the file passed validation.
    pub valid: bool,
}

/// A generation directory and the files directly inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryItem {
    /// Full path to the directory.
    pub path: PathBuf,
    /// Directory name without path.
    pub name: String,
    /// Sum of the sizes of `files`.
    pub size: u64,
    /// Last modified time.
    pub modified: DateTime<Utc>,
    /// Files inside the directory, sorted by name.
    pub files: Vec<FileItem>,
    /// Whether the directory passed validation.
    pub valid: bool,
}

impl DirectoryItem {
    /// Find a file item by its name.
    pub fn file(&self, name: &str) -> Option<&FileItem> {
        self.files.iter().find(|f| f.name == name)
    }
}

/// An indexed backup generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    File(FileItem),
    Directory(DirectoryItem),
}

impl Item {
    pub fn path(&self) -> &Path {
        match self {
            Item::File(f) => &f.path,
            Item::Directory(d) => &d.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::File(f) => &f.name,
            Item::Directory(d) => &d.name,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Item::File(f) => f.size,
            Item::Directory(d) => d.size,
        }
    }

    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            Item::File(f) => f.modified,
            Item::Directory(d) => d.modified,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Item::File(f) => f.valid,
            Item::Directory(d) => d.valid,
        }
    }

    pub fn set_valid(&mut self, valid: bool) {
        match self {
            Item::File(f) => f.valid = valid,
            Item::Directory(d) => d.valid = valid,
        }
    }

    /// Number of files in this generation (1 for a file item).
    pub fn file_count(&self) -> usize {
        match self {
            Item::File(_) => 1,
            Item::Directory(d) => d.files.len(),
        }
    }
}

/// Ordered index of the generations found directly under a root path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathIndex {
    /// Root path that was scanned.
    pub root: PathBuf,
    /// Storage unit the index was built for.
    pub unit: StorageUnit,
    /// Items sorted by name (oldest generation first).
    pub items: Vec<Item>,
}

impl PathIndex {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The generation preceding position `index`, if any.
    pub fn previous(&self, index: usize) -> Option<&Item> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }
}
