use eframe::egui;
use std::path::{Path, PathBuf};

// ============================================================================
// Unsaved changes dialog
// ============================================================================

/// Answer to the unsaved-changes prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Returns the user's choice, or `None` while the dialog is still open.
pub fn show_unsaved_changes_dialog(ctx: &egui::Context) -> Option<CloseChoice> {
    let mut result: Option<CloseChoice> = None;
    let mut open = true;

    egui::Window::new("Unsaved changes")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label("The backup list has unsaved changes. Save before closing?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    result = Some(CloseChoice::Save);
                }
                if ui.button("Discard").clicked() {
                    result = Some(CloseChoice::Discard);
                }
                if ui.button("Cancel").clicked() {
                    result = Some(CloseChoice::Cancel);
                }
            });
        });

    if !open {
        return Some(CloseChoice::Cancel);
    }
    result
}

// ============================================================================
// About dialog
// ============================================================================

/// Version banner plus a grid of `(label, value)` rows.
///
/// Returns false once the dialog has been dismissed.
pub fn show_about_dialog(ctx: &egui::Context, details: &[(&str, String)]) -> bool {
    let mut open = true;
    let mut dismissed = false;

    egui::Window::new(format!("About {}", crate::config::APP_NAME))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.heading(format!("{} {}", crate::config::APP_NAME, crate::VERSION));
            ui.label("Copies each source folder into destination/name, rewriting only changed files.");
            ui.add_space(6.0);

            egui::Grid::new("about_details")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for (label, value) in details {
                        ui.strong(*label);
                        ui.label(value.as_str());
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                dismissed = true;
            }
        });

    open && !dismissed
}

// ============================================================================
// Native folder picker
// ============================================================================

/// Open the OS folder picker, starting at `start` when it exists.
///
/// Blocks until the user picks a folder or cancels.
pub fn pick_folder(start: &str) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new().set_title("Select folder");
    let start = Path::new(start);
    if start.is_dir() {
        dialog = dialog.set_directory(start);
    }
    dialog.pick_folder()
}
