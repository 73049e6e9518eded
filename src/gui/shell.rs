//! Application shell
//!
//! Wraps the eframe window: keeps the title bar in sync, turns OS close
//! requests into a flag the hosted app can inspect, and closes the window
//! once the hosted app asks for it. Each frame is delegated to
//! [`ShellApp::update`].

use eframe::egui;

/// Per-frame hook implemented by the hosted application
pub trait ShellApp {
    fn update(&mut self, ctx: &egui::Context, shell: &mut ShellState);
}

/// Window state owned by the shell and handed to the hosted app every frame
#[derive(Debug, Clone)]
pub struct ShellState {
    app_name: String,
    title: String,
    asterisk: bool,
    title_pending: bool,
    attempt_to_close: bool,
    time_to_close: bool,
}

impl ShellState {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            title: String::new(),
            asterisk: false,
            title_pending: true,
            attempt_to_close: false,
            time_to_close: false,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.title_pending = true;
        }
    }

    /// Mark the title as having unsaved changes
    pub fn set_asterisk(&mut self, flag: bool) {
        if self.asterisk != flag {
            self.asterisk = flag;
            self.title_pending = true;
        }
    }

    /// `<title><*> - <app name>`
    pub fn window_title(&self) -> String {
        let star = if self.asterisk { "*" } else { "" };
        if self.title.is_empty() {
            format!("{}{}", self.app_name, star)
        } else {
            format!("{}{} - {}", self.title, star, self.app_name)
        }
    }

    /// Ask the shell to close the window at the end of this frame
    pub fn request_close(&mut self) {
        self.time_to_close = true;
    }

    pub fn is_closing(&self) -> bool {
        self.time_to_close
    }

    /// Returns true once per intercepted window-close request
    pub fn take_close_attempt(&mut self) -> bool {
        std::mem::take(&mut self.attempt_to_close)
    }

    fn intercept_close(&mut self) {
        self.attempt_to_close = true;
    }

    fn take_pending_title(&mut self) -> Option<String> {
        if std::mem::take(&mut self.title_pending) {
            Some(self.window_title())
        } else {
            None
        }
    }
}

/// eframe adapter driving a [`ShellApp`]
pub struct Shell<A> {
    state: ShellState,
    app: A,
}

impl<A: ShellApp> Shell<A> {
    pub fn new(state: ShellState, app: A) -> Self {
        Self { state, app }
    }
}

impl<A: ShellApp> eframe::App for Shell<A> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.state.is_closing() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.state.intercept_close();
        }

        self.app.update(ctx, &mut self.state);

        if let Some(title) = self.state.take_pending_title() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }

        if self.state.is_closing() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_with_and_without_asterisk() {
        let mut shell = ShellState::new("EzBackup");
        assert_eq!(shell.window_title(), "EzBackup");

        shell.set_title("save.json");
        assert_eq!(shell.window_title(), "save.json - EzBackup");

        shell.set_asterisk(true);
        assert_eq!(shell.window_title(), "save.json* - EzBackup");

        shell.set_title("");
        assert_eq!(shell.window_title(), "EzBackup*");
    }

    #[test]
    fn title_is_pushed_only_when_changed() {
        let mut shell = ShellState::new("EzBackup");
        assert_eq!(shell.take_pending_title().as_deref(), Some("EzBackup"));
        assert!(shell.take_pending_title().is_none());

        shell.set_asterisk(false);
        assert!(shell.take_pending_title().is_none());

        shell.set_asterisk(true);
        assert_eq!(shell.take_pending_title().as_deref(), Some("EzBackup*"));
    }

    #[test]
    fn close_attempt_is_reported_once() {
        let mut shell = ShellState::new("EzBackup");
        assert!(!shell.take_close_attempt());
        shell.intercept_close();
        assert!(shell.take_close_attempt());
        assert!(!shell.take_close_attempt());
        assert!(!shell.is_closing());
        shell.request_close();
        assert!(shell.is_closing());
    }
}
