//! Backup registry
//!
//! The ordered list of configured backups. Insertion order is both display
//! order and copy order; names and paths may repeat.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Name given to a freshly staged entry
pub const DEFAULT_ENTRY_NAME: &str = "New Backup";

/// One configured (name, source, destination) backup pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub name: String,
    pub source: String,
    pub destination: String,
}

impl BackupEntry {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Entry pre-filled for the add window: default name and both paths at
    /// the user's home directory.
    pub fn staged() -> Self {
        let home = dirs::home_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::new(DEFAULT_ENTRY_NAME, home.clone(), home)
    }

    pub fn source_path(&self) -> &Path {
        Path::new(&self.source)
    }

    /// Directory the source is copied into: destination joined with the name.
    ///
    /// Only the plain components of the name are used, so roots, drive
    /// prefixes and `..` cannot move the target out of the destination.
    pub fn target_dir(&self) -> PathBuf {
        let mut target = PathBuf::from(&self.destination);
        for component in Path::new(&self.name).components() {
            if let Component::Normal(part) = component {
                target.push(part);
            }
        }
        target
    }
}

/// Ordered list of backups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<BackupEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<BackupEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry at the end of the list
    pub fn add(&mut self, entry: BackupEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `index`, shifting later entries down by one
    pub fn remove(&mut self, index: usize) -> Option<BackupEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&BackupEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BackupEntry> {
        self.entries.get_mut(index)
    }

    /// First entry with the given name
    pub fn find(&self, name: &str) -> Option<&BackupEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[BackupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
