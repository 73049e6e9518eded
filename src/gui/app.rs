//! Main EzBackup application

use super::dialogs::{self, CloseChoice};
use super::session::{Action, EditTarget, Effect, Session};
use super::shell::{ShellApp, ShellState};
use super::views::{self, StatusLine};
use crate::config::AppConfig;
use crate::copier::{self, CopyReport, EntryOutcome};
use crate::registry::{BackupEntry, Registry};
use crate::store::{self, LoadOutcome};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// Message types for background copy jobs
pub enum BackgroundMessage {
    Started {
        name: String,
        position: usize,
        total: usize,
    },
    EntryDone(EntryOutcome),
    Finished,
}

/// Main application state
pub struct BackupApp {
    config: AppConfig,
    registry: Registry,
    session: Session,
    /// Unsaved registry edits
    dirty: bool,
    status: StatusLine,
    /// Channel for background messages
    bg_receiver: Option<Receiver<BackgroundMessage>>,
    /// Progress text while a copy job runs
    progress: Option<String>,
    /// Totals for the running job
    job_report: CopyReport,
    job_failures: usize,
    /// Most recent per-entry failure of the running job
    last_failure: Option<String>,
    /// Close as soon as no copy job is running
    close_when_idle: bool,
    show_close_prompt: bool,
    show_about: bool,
}

impl BackupApp {
    /// Create the app, load the save file and run the startup backup
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self::with_config(config);
        app.startup();
        app
    }

    /// Create the app with the saved registry but without side effects
    pub fn with_config(config: AppConfig) -> Self {
        let (registry, status) = match store::load(&config.save_path) {
            LoadOutcome::Loaded(registry) => {
                let status = StatusLine::info(format!("Loaded {} backup(s)", registry.len()));
                (registry, status)
            }
            LoadOutcome::Missing => (Registry::new(), StatusLine::info("No saved backups")),
            LoadOutcome::Invalid(e) => (
                Registry::new(),
                StatusLine::error(format!("Ignored save file: {}", e)),
            ),
        };

        Self {
            config,
            registry,
            session: Session::new(),
            dirty: false,
            status,
            bg_receiver: None,
            progress: None,
            job_report: CopyReport::default(),
            job_failures: 0,
            last_failure: None,
            close_when_idle: false,
            show_close_prompt: false,
            show_about: false,
        }
    }

    fn startup(&mut self) {
        if self.config.autostart {
            log::info!(target: "gui", "Autostart: backing up {} entries", self.registry.len());
            self.close_when_idle = true;
            if !self.registry.is_empty() {
                self.start_backup(self.registry.entries().to_vec());
            }
        } else if self.registry.is_empty() {
            self.session.begin_add();
        } else if self.config.backup_on_startup {
            self.start_backup(self.registry.entries().to_vec());
        }
    }

    pub fn is_busy(&self) -> bool {
        self.bg_receiver.is_some()
    }

    /// Autostart runs show only the progress, never the list
    fn shows_list(&self) -> bool {
        !self.config.autostart
    }

    /// Start copying entries on a worker thread
    fn start_backup(&mut self, entries: Vec<BackupEntry>) {
        if self.is_busy() || entries.is_empty() {
            return;
        }

        crate::logging::separator(&format!("BACKUP START: {} entries", entries.len()));
        self.job_report = CopyReport::default();
        self.job_failures = 0;
        self.last_failure = None;
        self.progress = Some("Starting backup...".to_string());

        let (tx, rx) = channel();
        self.bg_receiver = Some(rx);

        thread::spawn(move || {
            let total = entries.len();
            copier::copy_each(
                &entries,
                |position, entry| {
                    let _ = tx.send(BackgroundMessage::Started {
                        name: entry.name.clone(),
                        position,
                        total,
                    });
                },
                |outcome| {
                    let _ = tx.send(BackgroundMessage::EntryDone(outcome));
                },
            );
            let _ = tx.send(BackgroundMessage::Finished);
        });
    }

    /// Process background messages
    fn process_messages(&mut self) {
        let Some(rx) = &self.bg_receiver else {
            return;
        };

        let mut finished = false;
        let mut worker_lost = false;
        loop {
            match rx.try_recv() {
                Ok(BackgroundMessage::Started {
                    name,
                    position,
                    total,
                }) => {
                    self.progress = Some(format!("Backing up '{}' ({}/{})", name, position, total));
                }
                Ok(BackgroundMessage::EntryDone(outcome)) => match outcome.result {
                    Ok(report) => self.job_report.merge(&report),
                    Err(e) => {
                        self.job_failures += 1;
                        let message = format!("'{}' failed: {}", outcome.name, e);
                        self.status = StatusLine::error(message.clone());
                        self.last_failure = Some(message);
                    }
                },
                Ok(BackgroundMessage::Finished) => finished = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    worker_lost = !finished;
                    finished = true;
                    break;
                }
            }
        }

        if worker_lost {
            log::error!(target: "gui", "Backup worker stopped before finishing");
            self.job_failures += 1;
            self.last_failure = Some("backup stopped before finishing".to_string());
        }
        if finished {
            self.finish_job();
        }
    }

    fn finish_job(&mut self) {
        self.bg_receiver = None;
        self.progress = None;

        let summary = format!(
            "{} file(s) copied ({}), {} up to date",
            self.job_report.files_copied,
            humansize::format_size(self.job_report.bytes_copied, humansize::DECIMAL),
            self.job_report.files_skipped
        );
        log::info!(target: "gui", "Backup finished: {}, {} failure(s)", summary, self.job_failures);
        crate::logging::flush();

        if self.job_failures == 0 {
            self.status = StatusLine::info(format!("Backup finished: {}", summary));
        } else {
            let last = self.last_failure.take().unwrap_or_default();
            self.status = StatusLine::error(format!(
                "Backup finished with {} failure(s), last {}; {}",
                self.job_failures, last, summary
            ));
        }
    }

    /// Save the registry; returns true on success
    fn save(&mut self) -> bool {
        match store::save(&self.config.save_path, &self.registry) {
            Ok(()) => {
                self.dirty = false;
                self.status = StatusLine::info(format!(
                    "Saved {} backup(s) to {}",
                    self.registry.len(),
                    self.config.save_path.display()
                ));
                true
            }
            Err(e) => {
                log::error!(target: "gui", "Save failed: {}", e);
                self.status = StatusLine::error(format!("Save failed: {}", e));
                false
            }
        }
    }

    /// Close once an autostart job has nothing left to do
    fn close_if_done(&self, shell: &mut ShellState) {
        if self.close_when_idle && !self.is_busy() && !shell.is_closing() {
            log::info!(target: "gui", "Autostart finished, closing");
            shell.request_close();
        }
    }

    fn try_close(&mut self, shell: &mut ShellState) {
        if self.is_busy() {
            self.status = StatusLine::error("Wait for the running backup to finish");
            return;
        }
        shell.request_close();
    }

    fn handle_effect(&mut self, effect: Effect, shell: &mut ShellState) {
        match effect {
            Effect::None => {}
            Effect::Changed => self.dirty = true,
            Effect::Backup(entries) => self.start_backup(entries),
            Effect::Save => {
                self.save();
            }
            Effect::Close => {
                if self.save() {
                    self.try_close(shell);
                }
            }
            Effect::OpenFolder(path) => {
                if let Err(e) = open::that(&path) {
                    log::warn!(target: "gui", "Could not open {}: {}", path.display(), e);
                    self.status = StatusLine::error(format!("Could not open {}: {}", path.display(), e));
                }
            }
            Effect::Browse(target, field, start) => {
                if let Some(path) = dialogs::pick_folder(&start) {
                    let path = path.display().to_string();
                    if self.session.set_path(&mut self.registry, target, field, path)
                        && target != EditTarget::Staging
                    {
                        self.dirty = true;
                    }
                }
            }
            Effect::ShowAbout => self.show_about = true,
        }
    }

    fn apply_actions(&mut self, actions: Vec<Action>, shell: &mut ShellState) {
        for action in actions {
            let effect = self.session.apply(&mut self.registry, action);
            self.handle_effect(effect, shell);
        }
    }

    fn render_close_prompt(&mut self, ctx: &egui::Context, shell: &mut ShellState) {
        if !self.show_close_prompt {
            return;
        }
        match dialogs::show_unsaved_changes_dialog(ctx) {
            Some(CloseChoice::Save) => {
                self.show_close_prompt = false;
                if self.save() {
                    self.try_close(shell);
                }
            }
            Some(CloseChoice::Discard) => {
                self.show_close_prompt = false;
                self.try_close(shell);
            }
            Some(CloseChoice::Cancel) => self.show_close_prompt = false,
            None => {}
        }
    }

    fn render_about_dialog(&mut self, ctx: &egui::Context) {
        if self.show_about {
            let log_file = crate::logging::log_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "disabled".to_string());
            let details = [
                ("Save file", self.config.save_path.display().to_string()),
                ("Log file", log_file),
                ("Backups", self.registry.len().to_string()),
            ];
            self.show_about = dialogs::show_about_dialog(ctx, &details);
        }
    }
}

impl ShellApp for BackupApp {
    fn update(&mut self, ctx: &egui::Context, shell: &mut ShellState) {
        self.process_messages();

        if shell.take_close_attempt() {
            if self.dirty {
                self.show_close_prompt = true;
            } else {
                self.try_close(shell);
            }
        }

        self.close_if_done(shell);

        let busy = self.is_busy();
        let mut actions = Vec::new();

        views::status_bar(ctx, &self.status, self.progress.as_deref());

        if !self.shows_list() {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("Running scheduled backups. The window closes when they finish.");
                });
            });
            shell.set_title("Autostart");
            shell.set_asterisk(false);
            if busy {
                ctx.request_repaint();
            }
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            actions.extend(views::toolbar(ui, &self.session, busy));
            actions.extend(views::backup_list(ui, &mut self.registry, &self.session, busy));
        });

        if let Some(staging) = self.session.staging.as_mut() {
            actions.extend(views::add_window(ctx, staging));
        }

        self.apply_actions(actions, shell);
        self.render_close_prompt(ctx, shell);
        self.render_about_dialog(ctx);

        shell.set_title(&self.config.save_path.display().to_string());
        shell.set_asterisk(self.dirty);

        if self.is_busy() {
            ctx.request_repaint();
        }
    }
}
