//! Save file handling
//!
//! The backup list is stored as a small JSON document:
//!
//! ```json
//! { "AName": 3854221577, "version": 2,
//!   "backups": [ { "name": "Docs", "source": "/a", "destination": "/b" } ] }
//! ```
//!
//! `AName` carries a fixed sentinel that identifies the file. Older files
//! without a `version` use a flat layout (`Info` holds the entry count and
//! every field lives under `backupName<i>`, `backupOriginalPt<i>` and
//! `backupBackupPt<i>`). Those are still read; saving always writes the
//! current layout.

use crate::error::{EzBackupError, Result};
use crate::registry::{BackupEntry, Registry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Magic value stored under `AName`
pub const SENTINEL: u64 = 0xE5BA_C109;

/// Layout version written by [`save`]
pub const FORMAT_VERSION: u64 = 2;

const SENTINEL_KEY: &str = "AName";
const LEGACY_COUNT_KEY: &str = "Info";
const LEGACY_NAME_PREFIX: &str = "backupName";
const LEGACY_SOURCE_PREFIX: &str = "backupOriginalPt";
const LEGACY_DESTINATION_PREFIX: &str = "backupBackupPt";

#[derive(Serialize)]
struct SaveDocumentRef<'a> {
    #[serde(rename = "AName")]
    magic: u64,
    version: u64,
    backups: &'a [BackupEntry],
}

#[derive(Deserialize)]
struct SaveDocument {
    backups: Vec<BackupEntry>,
}

/// Result of a lenient load
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file was read and validated
    Loaded(Registry),
    /// No save file exists yet
    Missing,
    /// The file exists but could not be used
    Invalid(EzBackupError),
}

impl LoadOutcome {
    /// Registry to start from; anything but a good file yields an empty list
    pub fn into_registry(self) -> Registry {
        match self {
            LoadOutcome::Loaded(registry) => registry,
            LoadOutcome::Missing | LoadOutcome::Invalid(_) => Registry::new(),
        }
    }
}

/// Load the backup list, treating every failure as "no data".
///
/// Problems are logged; nothing is surfaced to the user.
pub fn load(path: &Path) -> LoadOutcome {
    log::info!(target: "store", "Loading backups from {}", path.display());

    match read_document(path) {
        Ok(entries) => {
            log::info!(target: "store", "Loaded {} backup(s)", entries.len());
            LoadOutcome::Loaded(Registry::from_entries(entries))
        }
        Err(EzBackupError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            log::info!(target: "store", "No save file at {}", path.display());
            LoadOutcome::Missing
        }
        Err(e) => {
            log::warn!(target: "store", "Ignoring save file {}: {}", path.display(), e);
            LoadOutcome::Invalid(e)
        }
    }
}

/// Read and validate a save file, returning its entries in order
pub fn read_document(path: &Path) -> Result<Vec<BackupEntry>> {
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

/// Parse a save document in either layout
pub fn parse_document(text: &str) -> Result<Vec<BackupEntry>> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value
        .as_object()
        .ok_or_else(|| EzBackupError::Malformed("top level is not an object".into()))?;

    let magic = obj.get(SENTINEL_KEY).and_then(Value::as_u64);
    if magic != Some(SENTINEL) {
        return Err(EzBackupError::BadSentinel(magic));
    }

    let version = match obj.get("version") {
        None => None,
        Some(v) => Some(
            v.as_u64()
                .ok_or_else(|| EzBackupError::Malformed("version is not an integer".into()))?,
        ),
    };

    match version {
        Some(v) if v > FORMAT_VERSION => Err(EzBackupError::UnsupportedVersion(v)),
        Some(FORMAT_VERSION) => {
            let doc: SaveDocument = serde_json::from_value(value)?;
            Ok(doc.backups)
        }
        _ => parse_legacy(obj),
    }
}

fn parse_legacy(obj: &Map<String, Value>) -> Result<Vec<BackupEntry>> {
    let count = obj
        .get(LEGACY_COUNT_KEY)
        .ok_or_else(|| EzBackupError::Malformed(format!("missing '{}'", LEGACY_COUNT_KEY)))?
        .as_u64()
        .ok_or_else(|| {
            EzBackupError::Malformed(format!("'{}' is not a non-negative integer", LEGACY_COUNT_KEY))
        })?;

    let field = |prefix: &str, i: u64| -> Result<String> {
        let key = format!("{}{}", prefix, i);
        obj.get(&key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| EzBackupError::Malformed(format!("missing string field '{}'", key)))
    };

    let mut entries = Vec::new();
    for i in 0..count {
        entries.push(BackupEntry {
            name: field(LEGACY_NAME_PREFIX, i)?,
            source: field(LEGACY_SOURCE_PREFIX, i)?,
            destination: field(LEGACY_DESTINATION_PREFIX, i)?,
        });
    }
    Ok(entries)
}

/// Render the current-layout document for a registry
pub fn render_document(registry: &Registry) -> Result<String> {
    let doc = SaveDocumentRef {
        magic: SENTINEL,
        version: FORMAT_VERSION,
        backups: registry.entries(),
    };
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    Ok(text)
}

/// Write the registry to `path`, creating parent directories as needed.
///
/// The document is written to a sibling temp file and renamed into place.
pub fn save(path: &Path, registry: &Registry) -> Result<()> {
    let text = render_document(registry)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;

    log::info!(target: "store", "Saved {} backup(s) to {}", registry.len(), path.display());
    Ok(())
}
