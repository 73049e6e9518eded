//! File logging for EzBackup
//!
//! A process-wide logger behind the `log` facade. Every record goes to the log
//! file (truncated at startup); warnings and errors are mirrored to stderr so
//! they remain visible when the app is started from a terminal.

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Global logger instance
static LOGGER: OnceLock<EzBackupLogger> = OnceLock::new();

/// Main logger struct
pub struct EzBackupLogger {
    file: Mutex<Option<File>>,
    path: Option<PathBuf>,
    min_level: LevelFilter,
}

impl EzBackupLogger {
    fn new(path: Option<&Path>, min_level: LevelFilter) -> Self {
        let file = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Start fresh each run
                .open(p)
                .ok()
        });

        Self {
            path: file.as_ref().and(path.map(Path::to_path_buf)),
            file: Mutex::new(file),
            min_level,
        }
    }

    fn format_line(record: &Record) -> String {
        format!(
            "[{}] [{:5}] [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for EzBackupLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record);

        if record.level() <= Level::Warn {
            eprint!("{}", line);
        }

        if let Ok(mut guard) = self.file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

/// Initialize the global logger.
///
/// Calling this more than once keeps the first logger; later calls are ignored.
pub fn init(path: Option<&Path>, level: LevelFilter) {
    let mut fresh = false;
    let logger = LOGGER.get_or_init(|| {
        fresh = true;
        EzBackupLogger::new(path, level)
    });

    if fresh && log::set_logger(logger).is_ok() {
        log::set_max_level(level);
        if let Some(p) = &logger.path {
            log::debug!(target: "logging", "Logging to {}", p.display());
        }
    }
}

/// Path of the active log file, if one could be opened
pub fn log_path() -> Option<&'static Path> {
    LOGGER.get().and_then(|l| l.path.as_deref())
}

/// Flush the log file
pub fn flush() {
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    log::info!(target: "---", "========== {} ==========", label);
}
