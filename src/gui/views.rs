//! Frame rendering
//!
//! Each view draws one part of the window and returns the [`Action`]s the
//! user triggered. Text fields edit entries in place; everything else goes
//! through actions.

use super::session::{Action, EditTarget, PathField, Session};
use crate::registry::{BackupEntry, Registry};
use eframe::egui;

const WIDE_BUTTON: egui::Vec2 = egui::vec2(300.0, 36.0);

/// Status line shown at the bottom of the window
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Name/source/destination fields with Browse buttons. Returns true when a
/// text field changed this frame.
fn entry_fields(
    ui: &mut egui::Ui,
    id_salt: impl std::hash::Hash,
    entry: &mut BackupEntry,
    target: EditTarget,
    actions: &mut Vec<Action>,
) -> bool {
    let mut changed = false;

    egui::Grid::new(id_salt)
        .num_columns(3)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Name");
            changed |= ui.text_edit_singleline(&mut entry.name).changed();
            ui.end_row();

            ui.label("Source folder");
            changed |= ui.text_edit_singleline(&mut entry.source).changed();
            if ui.button("Browse...").clicked() {
                actions.push(Action::Browse(target, PathField::Source));
            }
            ui.end_row();

            ui.label("Backup folder");
            changed |= ui.text_edit_singleline(&mut entry.destination).changed();
            if ui.button("Browse...").clicked() {
                actions.push(Action::Browse(target, PathField::Destination));
            }
            ui.end_row();
        });

    changed
}

/// Top button column: close, backup all, save, add
pub fn toolbar(ui: &mut egui::Ui, session: &Session, busy: bool) -> Vec<Action> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            if ui.add(egui::Button::new("Close").min_size(WIDE_BUTTON)).clicked() {
                actions.push(Action::Close);
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Backup all").min_size(WIDE_BUTTON))
                .clicked()
            {
                actions.push(Action::BackupAll);
            }
            if ui.add(egui::Button::new("Save").min_size(WIDE_BUTTON)).clicked() {
                actions.push(Action::Save);
            }
            if ui
                .add_enabled(
                    !session.is_adding(),
                    egui::Button::new("Add backup").min_size(WIDE_BUTTON),
                )
                .clicked()
            {
                actions.push(Action::BeginAdd);
            }
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
            if ui.small_button("About").clicked() {
                actions.push(Action::ShowAbout);
            }
        });
    });

    actions
}

/// The backup list; the selected entry is expanded for editing
pub fn backup_list(
    ui: &mut egui::Ui,
    registry: &mut Registry,
    session: &Session,
    busy: bool,
) -> Vec<Action> {
    let mut actions = Vec::new();

    ui.separator();
    ui.heading("Backups");

    if registry.is_empty() {
        ui.weak("No backups yet. Use \"Add backup\" to create one.");
        return actions;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for i in 0..registry.len() {
                let is_selected = session.selected == Some(i);
                let Some(entry) = registry.get_mut(i) else {
                    continue;
                };

                let header = format!("{}. {}", i + 1, entry.name);
                if ui
                    .selectable_label(is_selected, egui::RichText::new(header).strong())
                    .clicked()
                {
                    actions.push(Action::Select(i));
                }

                if !is_selected {
                    continue;
                }

                ui.indent(("entry", i), |ui| {
                    if entry_fields(ui, ("entry_fields", i), entry, EditTarget::Entry(i), &mut actions) {
                        actions.push(Action::Edited);
                    }
                    ui.weak(format!("Copies into {}", entry.target_dir().display()));
                    ui.horizontal(|ui| {
                        if ui.button("Remove").clicked() {
                            actions.push(Action::Remove(i));
                        }
                        if ui.add_enabled(!busy, egui::Button::new("Backup")).clicked() {
                            actions.push(Action::Backup(i));
                        }
                        if ui.button("Open backup folder").clicked() {
                            actions.push(Action::OpenDestination(i));
                        }
                    });
                });
                ui.add_space(6.0);
            }
        });

    actions
}

/// Floating window editing the staged entry
pub fn add_window(ctx: &egui::Context, staging: &mut BackupEntry) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut open = true;

    egui::Window::new("Add Backup")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            entry_fields(ui, "staging_fields", staging, EditTarget::Staging, &mut actions);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Add").clicked() {
                    actions.push(Action::ConfirmAdd);
                }
                if ui.button("Cancel").clicked() {
                    actions.push(Action::CancelAdd);
                }
            });
        });

    if !open {
        actions.push(Action::CancelAdd);
    }
    actions
}

/// Bottom status bar
pub fn status_bar(ctx: &egui::Context, status: &StatusLine, progress: Option<&str>) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if let Some(progress) = progress {
                ui.spinner();
                ui.label(progress);
            } else if status.is_error {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), &status.message);
            } else {
                ui.label(&status.message);
            }
        });
    });
}
