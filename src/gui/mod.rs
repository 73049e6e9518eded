pub mod app;
pub mod dialogs;
pub mod session;
pub mod shell;
pub mod views;

pub use app::BackupApp;
pub use shell::{Shell, ShellApp, ShellState};

use crate::config::{AppConfig, APP_NAME};
use crate::error::EzBackupError;

/// Entry point: launch the native GUI window
pub fn run(config: AppConfig) -> crate::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        persist_window: true,
        ..Default::default()
    };

    log::info!(target: "gui", "Opening window");

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| {
            let app = BackupApp::new(cc, config);
            Ok(Box::new(Shell::new(ShellState::new(APP_NAME), app)))
        }),
    )
    .map_err(|e| EzBackupError::Gui(e.to_string()))
}
