//! EzBackup - folder-copy backups with a small native GUI
//!
//! Keeps an ordered list of named (source, destination) folder pairs and
//! copies each source into `destination/name`, only rewriting files that
//! changed. The list is stored as JSON and edited through an egui window or
//! the command line.
//!
//! # Example
//!
//! ```no_run
//! use ezbackup::{copier, store, BackupEntry, Registry};
//! use std::path::Path;
//!
//! fn main() -> ezbackup::Result<()> {
//!     let path = Path::new("save.json");
//!
//!     let mut registry = store::load(path).into_registry();
//!     registry.add(BackupEntry::new("Docs", "/home/me/Documents", "/mnt/backup"));
//!     store::save(path, &registry)?;
//!
//!     for outcome in copier::copy_all(registry.entries(), |_, _| {}) {
//!         match outcome.result {
//!             Ok(report) => println!("{}: {} files copied", outcome.name, report.files_copied),
//!             Err(e) => eprintln!("{}: {}", outcome.name, e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod copier;
pub mod error;
pub mod gui;
pub mod logging;
pub mod registry;
pub mod store;

// Re-export main types
pub use config::AppConfig;
pub use copier::{CopyReport, EntryOutcome};
pub use error::{EzBackupError, Result};
pub use registry::{BackupEntry, Registry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
