//! Application configuration

use log::LevelFilter;
use std::path::PathBuf;

/// Application name, used for the window title and the data directory
pub const APP_NAME: &str = "EzBackup";

/// File name of the persisted backup list
pub const SAVE_FILE_NAME: &str = "save.json";

/// File name of the log file
pub const LOG_FILE_NAME: &str = "ezbackup.log";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the backup list is loaded from and saved to
    pub save_path: PathBuf,
    /// Log file location (None disables file logging)
    pub log_path: Option<PathBuf>,
    /// Minimum level written to the log
    pub log_level: LevelFilter,
    /// Run every backup as soon as a non-empty list is loaded
    pub backup_on_startup: bool,
    /// Run every backup once, then close the window
    pub autostart: bool,
    /// Initial window size
    pub window_size: [f32; 2],
    /// Minimum window size
    pub min_window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            save_path: data_dir.join(SAVE_FILE_NAME),
            log_path: Some(data_dir.join(LOG_FILE_NAME)),
            log_level: LevelFilter::Info,
            backup_on_startup: true,
            autostart: false,
            window_size: [640.0, 720.0],
            min_window_size: [420.0, 360.0],
        }
    }
}

impl AppConfig {
    /// Override the save file location
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    /// Override the log file location
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }
}

/// Per-user data directory (`<config dir>/EzBackup`), falling back to the
/// working directory when the platform has no config dir.
pub fn data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_share_one_data_dir() {
        let config = AppConfig::default();
        assert_eq!(config.save_path.parent(), config.log_path.as_deref().and_then(|p| p.parent()));
        assert!(config.save_path.ends_with("EzBackup/save.json"));
        assert!(config.backup_on_startup);
        assert!(!config.autostart);
    }

    #[test]
    fn overrides_replace_paths() {
        let config = AppConfig::default()
            .with_save_path("/tmp/x/list.json")
            .with_log_path("/tmp/x/run.log");
        assert_eq!(config.save_path, PathBuf::from("/tmp/x/list.json"));
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/x/run.log")));
    }
}
