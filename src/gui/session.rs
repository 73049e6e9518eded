//! Per-session UI state and the actions views emit
//!
//! Views never touch the registry structure directly. They return
//! [`Action`]s, which [`Session::apply`] turns into registry mutations or
//! into an [`Effect`] the app carries out (copying, saving, dialogs).

use crate::registry::{BackupEntry, Registry};
use std::path::PathBuf;

/// Which path field a folder picker should fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathField {
    Source,
    Destination,
}

/// Entry a folder picker result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Staging,
    Entry(usize),
}

/// Intent produced by a view during one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Toggle the expanded entry
    Select(usize),
    BeginAdd,
    ConfirmAdd,
    CancelAdd,
    Remove(usize),
    /// A text field of an existing entry was edited in place
    Edited,
    Backup(usize),
    BackupAll,
    Save,
    /// Save, then close the window
    Close,
    OpenDestination(usize),
    Browse(EditTarget, PathField),
    ShowAbout,
}

/// Work left for the app after an action was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The registry changed and has unsaved edits
    Changed,
    Backup(Vec<BackupEntry>),
    Save,
    Close,
    OpenFolder(PathBuf),
    Browse(EditTarget, PathField, String),
    ShowAbout,
}

/// Transient UI state: the expanded entry and the add-window scratch slot
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selected: Option<usize>,
    pub staging: Option<BackupEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_adding(&self) -> bool {
        self.staging.is_some()
    }

    /// Stage a fresh entry; an entry already being added is kept
    pub fn begin_add(&mut self) {
        if self.staging.is_none() {
            self.staging = Some(BackupEntry::staged());
        }
    }

    /// Append the staged entry; returns false when nothing was staged
    pub fn confirm_add(&mut self, registry: &mut Registry) -> bool {
        match self.staging.take() {
            Some(entry) => {
                log::info!(target: "gui", "Added backup '{}'", entry.name);
                registry.add(entry);
                true
            }
            None => false,
        }
    }

    pub fn cancel_add(&mut self) {
        self.staging = None;
    }

    pub fn toggle_select(&mut self, index: usize) {
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    /// Remove an entry and keep the selection pointing at the same entry
    pub fn remove(&mut self, registry: &mut Registry, index: usize) -> Option<BackupEntry> {
        let removed = registry.remove(index)?;
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        log::info!(target: "gui", "Removed backup '{}' at {}", removed.name, index);
        Some(removed)
    }

    /// Store a picked folder into the addressed field
    pub fn set_path(
        &mut self,
        registry: &mut Registry,
        target: EditTarget,
        field: PathField,
        path: String,
    ) -> bool {
        let entry = match target {
            EditTarget::Staging => self.staging.as_mut(),
            EditTarget::Entry(i) => registry.get_mut(i),
        };
        match entry {
            Some(entry) => {
                match field {
                    PathField::Source => entry.source = path,
                    PathField::Destination => entry.destination = path,
                }
                true
            }
            None => false,
        }
    }

    fn current_path(&self, registry: &Registry, target: EditTarget, field: PathField) -> Option<String> {
        let entry = match target {
            EditTarget::Staging => self.staging.as_ref(),
            EditTarget::Entry(i) => registry.get(i),
        }?;
        Some(match field {
            PathField::Source => entry.source.clone(),
            PathField::Destination => entry.destination.clone(),
        })
    }

    /// Apply an action to the session and registry
    pub fn apply(&mut self, registry: &mut Registry, action: Action) -> Effect {
        match action {
            Action::Select(i) => {
                self.toggle_select(i);
                Effect::None
            }
            Action::BeginAdd => {
                self.begin_add();
                Effect::None
            }
            Action::ConfirmAdd => {
                if self.confirm_add(registry) {
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            Action::CancelAdd => {
                self.cancel_add();
                Effect::None
            }
            Action::Remove(i) => match self.remove(registry, i) {
                Some(_) => Effect::Changed,
                None => Effect::None,
            },
            Action::Edited => Effect::Changed,
            Action::Backup(i) => match registry.get(i) {
                Some(entry) => Effect::Backup(vec![entry.clone()]),
                None => Effect::None,
            },
            Action::BackupAll => {
                if registry.is_empty() {
                    Effect::None
                } else {
                    Effect::Backup(registry.entries().to_vec())
                }
            }
            Action::Save => Effect::Save,
            Action::Close => Effect::Close,
            Action::OpenDestination(i) => match registry.get(i) {
                Some(entry) => Effect::OpenFolder(entry.target_dir()),
                None => Effect::None,
            },
            Action::Browse(target, field) => match self.current_path(registry, target, field) {
                Some(start) => Effect::Browse(target, field, start),
                None => Effect::None,
            },
            Action::ShowAbout => Effect::ShowAbout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> Registry {
        Registry::from_entries(
            names
                .iter()
                .map(|n| BackupEntry::new(*n, format!("/src/{}", n), "/dst"))
                .collect(),
        )
    }

    #[test]
    fn add_flow_appends_and_clears_staging() {
        let mut reg = Registry::new();
        let mut session = Session::new();

        assert_eq!(session.apply(&mut reg, Action::ConfirmAdd), Effect::None);
        session.apply(&mut reg, Action::BeginAdd);
        session.staging.as_mut().unwrap().name = "Docs".into();
        // a second BeginAdd keeps the edits
        session.apply(&mut reg, Action::BeginAdd);
        assert_eq!(session.staging.as_ref().unwrap().name, "Docs");

        assert_eq!(session.apply(&mut reg, Action::ConfirmAdd), Effect::Changed);
        assert!(!session.is_adding());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(0).unwrap().name, "Docs");
    }

    #[test]
    fn cancel_discards_staging() {
        let mut reg = Registry::new();
        let mut session = Session::new();
        session.begin_add();
        session.apply(&mut reg, Action::CancelAdd);
        assert!(!session.is_adding());
        assert!(reg.is_empty());
    }

    #[test]
    fn removing_selected_clears_selection() {
        let mut reg = registry(&["a", "b", "c"]);
        let mut session = Session::new();
        session.apply(&mut reg, Action::Select(1));
        assert_eq!(session.apply(&mut reg, Action::Remove(1)), Effect::Changed);
        assert_eq!(session.selected, None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn removing_earlier_entry_shifts_selection() {
        let mut reg = registry(&["a", "b", "c"]);
        let mut session = Session::new();
        session.toggle_select(2);
        session.remove(&mut reg, 0);
        assert_eq!(session.selected, Some(1));
        assert_eq!(reg.get(1).unwrap().name, "c");

        session.remove(&mut reg, 1);
        assert_eq!(session.selected, None);
    }

    #[test]
    fn removing_later_entry_keeps_selection() {
        let mut reg = registry(&["a", "b", "c"]);
        let mut session = Session::new();
        session.toggle_select(0);
        session.remove(&mut reg, 2);
        assert_eq!(session.selected, Some(0));
        assert_eq!(session.apply(&mut reg, Action::Remove(7)), Effect::None);
    }

    #[test]
    fn select_toggles() {
        let mut session = Session::new();
        session.toggle_select(3);
        assert_eq!(session.selected, Some(3));
        session.toggle_select(3);
        assert_eq!(session.selected, None);
    }

    #[test]
    fn backup_actions_snapshot_entries() {
        let mut reg = registry(&["a", "b"]);
        let mut session = Session::new();
        assert_eq!(
            session.apply(&mut reg, Action::Backup(1)),
            Effect::Backup(vec![reg.get(1).unwrap().clone()])
        );
        assert_eq!(
            session.apply(&mut reg, Action::BackupAll),
            Effect::Backup(reg.entries().to_vec())
        );
        assert_eq!(session.apply(&mut reg, Action::Backup(5)), Effect::None);
        assert_eq!(session.apply(&mut Registry::new(), Action::BackupAll), Effect::None);
    }

    #[test]
    fn browse_and_set_path() {
        let mut reg = registry(&["a"]);
        let mut session = Session::new();
        session.begin_add();

        let effect = session.apply(&mut reg, Action::Browse(EditTarget::Entry(0), PathField::Source));
        assert_eq!(
            effect,
            Effect::Browse(EditTarget::Entry(0), PathField::Source, "/src/a".into())
        );

        assert!(session.set_path(&mut reg, EditTarget::Entry(0), PathField::Destination, "/new".into()));
        assert_eq!(reg.get(0).unwrap().destination, "/new");

        assert!(session.set_path(&mut reg, EditTarget::Staging, PathField::Source, "/picked".into()));
        assert_eq!(session.staging.as_ref().unwrap().source, "/picked");

        assert!(!session.set_path(&mut reg, EditTarget::Entry(4), PathField::Source, "/x".into()));
    }

    #[test]
    fn open_destination_points_at_target_dir() {
        let mut reg = registry(&["a"]);
        let mut session = Session::new();
        assert_eq!(
            session.apply(&mut reg, Action::OpenDestination(0)),
            Effect::OpenFolder(PathBuf::from("/dst/a"))
        );
    }
}
