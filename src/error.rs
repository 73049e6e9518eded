//! Error types for EzBackup
//!
//! One error enum shared by the registry, the save file and the copier.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for EzBackup operations
#[derive(Error, Debug)]
pub enum EzBackupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source path '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to copy '{}': {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Save file sentinel mismatch (found {0:?})")]
    BadSentinel(Option<u64>),

    #[error("Unsupported save file version {0}")]
    UnsupportedVersion(u64),

    #[error("Malformed save file: {0}")]
    Malformed(String),

    #[error("Position {index} out of range (have {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{failed} of {total} backup(s) failed")]
    BackupFailed { failed: usize, total: usize },

    #[error("No backup named '{0}'")]
    NoSuchEntry(String),

    #[error("GUI error: {0}")]
    Gui(String),
}

/// Result type alias for EzBackup operations
pub type Result<T> = std::result::Result<T, EzBackupError>;

impl EzBackupError {
    /// Attach a path to a raw copy failure
    pub fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EzBackupError::Copy {
            path: path.into(),
            source,
        }
    }
}
