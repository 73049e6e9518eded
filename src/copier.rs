//! Update-existing recursive copy
//!
//! Copies a source tree into a backup's target directory. A file is written
//! only when it is missing at the destination, differs in length, or the
//! source was modified more recently. Files that exist only at the
//! destination are left alone.

use crate::error::{EzBackupError, Result};
use crate::registry::BackupEntry;
use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Source mtimes within this window of the destination's count as equal.
/// FAT and exFAT store timestamps with 2 second resolution.
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// Counters for one copy run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub files_copied: u64,
    pub files_skipped: u64,
    pub bytes_copied: u64,
    pub dirs_created: u64,
}

impl CopyReport {
    /// Add another report's counters to this one
    pub fn merge(&mut self, other: &CopyReport) {
        self.files_copied += other.files_copied;
        self.files_skipped += other.files_skipped;
        self.bytes_copied += other.bytes_copied;
        self.dirs_created += other.dirs_created;
    }
}

/// Result of copying one entry as part of a batch
#[derive(Debug)]
pub struct EntryOutcome {
    pub name: String,
    pub target: PathBuf,
    pub result: Result<CopyReport>,
}

impl EntryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Copy one backup entry into `destination/name`
pub fn copy_entry(entry: &BackupEntry) -> Result<CopyReport> {
    let target = entry.target_dir();
    log::info!(
        target: "copier",
        "Backup '{}': {} -> {}",
        entry.name,
        entry.source,
        target.display()
    );

    let report = copy_tree(entry.source_path(), &target)?;

    log::info!(
        target: "copier",
        "Backup '{}' done: {} copied, {} up to date, {} bytes",
        entry.name,
        report.files_copied,
        report.files_skipped,
        report.bytes_copied
    );
    Ok(report)
}

/// Copy every entry in list order, handing each outcome to `on_done` as
/// soon as it is known.
///
/// `on_start` is called with the 1-based position before each entry runs. A
/// failing entry is logged and reported; the remaining entries still run.
pub fn copy_each<S, D>(entries: &[BackupEntry], mut on_start: S, mut on_done: D)
where
    S: FnMut(usize, &BackupEntry),
    D: FnMut(EntryOutcome),
{
    for (i, entry) in entries.iter().enumerate() {
        on_start(i + 1, entry);
        let result = copy_entry(entry);
        if let Err(e) = &result {
            log::error!(target: "copier", "Backup '{}' failed: {}", entry.name, e);
        }
        on_done(EntryOutcome {
            name: entry.name.clone(),
            target: entry.target_dir(),
            result,
        });
    }
}

/// Copy every entry in list order and collect the outcomes
pub fn copy_all<F>(entries: &[BackupEntry], on_start: F) -> Vec<EntryOutcome>
where
    F: FnMut(usize, &BackupEntry),
{
    let mut outcomes = Vec::with_capacity(entries.len());
    copy_each(entries, on_start, |outcome| outcomes.push(outcome));
    outcomes
}

/// Recursively copy `source` into `target` with update-existing semantics.
///
/// `target` is created if needed. When `source` is a regular file it is
/// copied into `target` under its own file name.
pub fn copy_tree(source: &Path, target: &Path) -> Result<CopyReport> {
    let source_meta = fs::metadata(source).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EzBackupError::SourceMissing(source.to_path_buf()),
        _ => EzBackupError::copy(source, e),
    })?;

    let mut report = CopyReport::default();
    if !target.is_dir() {
        fs::create_dir_all(target).map_err(|e| EzBackupError::copy(target, e))?;
        report.dirs_created += 1;
    }

    if !source_meta.is_dir() {
        let file_name = source
            .file_name()
            .ok_or_else(|| EzBackupError::SourceMissing(source.to_path_buf()))?;
        copy_file_if_newer(source, &source_meta, &target.join(file_name), &mut report)?;
        return Ok(report);
    }

    // Walk canonical paths so a target nested inside the source can be skipped
    let source = fs::canonicalize(source).map_err(|e| EzBackupError::copy(source, e))?;
    let target_canon = fs::canonicalize(target).map_err(|e| EzBackupError::copy(target, e))?;

    let walker = WalkDir::new(&source)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(&target_canon));

    for item in walker {
        let item = item.map_err(walk_error)?;
        let rel = match item.path().strip_prefix(&source) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let dest = target.join(rel);
        let file_type = item.file_type();

        if file_type.is_dir() {
            if !dest.is_dir() {
                fs::create_dir_all(&dest).map_err(|e| EzBackupError::copy(&dest, e))?;
                report.dirs_created += 1;
            }
        } else if file_type.is_file() {
            let meta = item.metadata().map_err(walk_error)?;
            copy_file_if_newer(item.path(), &meta, &dest, &mut report)?;
        } else {
            log::debug!(target: "copier", "Skipping special file {}", item.path().display());
        }
    }

    Ok(report)
}

/// Whether `dest` must be (re)written from a source with `source_meta`
pub fn needs_update(source_meta: &Metadata, dest: &Path) -> bool {
    let dest_meta = match fs::metadata(dest) {
        Ok(m) => m,
        Err(_) => return true,
    };
    if dest_meta.len() != source_meta.len() {
        return true;
    }
    match (source_meta.modified(), dest_meta.modified()) {
        (Ok(src), Ok(dst)) => dst
            .checked_add(MTIME_TOLERANCE)
            .is_some_and(|limit| src > limit),
        _ => true,
    }
}

fn copy_file_if_newer(
    source: &Path,
    source_meta: &Metadata,
    dest: &Path,
    report: &mut CopyReport,
) -> Result<()> {
    if !needs_update(source_meta, dest) {
        report.files_skipped += 1;
        return Ok(());
    }

    let bytes = fs::copy(source, dest).map_err(|e| EzBackupError::copy(dest, e))?;
    report.files_copied += 1;
    report.bytes_copied += bytes;

    // Carry the source mtime over so an unchanged tree is skipped next time
    if let Ok(mtime) = source_meta.modified() {
        let stamped = File::options()
            .write(true)
            .open(dest)
            .and_then(|f| f.set_modified(mtime));
        if let Err(e) = stamped {
            log::debug!(target: "copier", "Could not set mtime on {}: {}", dest.display(), e);
        }
    }
    Ok(())
}

fn walk_error(err: walkdir::Error) -> EzBackupError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let io = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(ErrorKind::Other, "filesystem loop"));
    EzBackupError::copy(path, io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn source_tree(root: &Path) {
        write(&root.join("a.txt"), "alpha");
        write(&root.join("nested/b.txt"), "bravo");
        write(&root.join("nested/deeper/c.txt"), "charlie");
        fs::create_dir_all(root.join("empty")).unwrap();
    }

    #[test]
    fn copies_tree_into_named_target() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        source_tree(&src);
        let entry = BackupEntry::new(
            "Docs",
            src.display().to_string(),
            tmp.path().join("dst").display().to_string(),
        );

        let report = copy_entry(&entry).unwrap();
        let target = tmp.path().join("dst/Docs");

        assert_eq!(report.files_copied, 3);
        assert_eq!(report.bytes_copied, 5 + 5 + 7);
        assert_eq!(read(&target.join("a.txt")), "alpha");
        assert_eq!(read(&target.join("nested/deeper/c.txt")), "charlie");
        assert!(target.join("empty").is_dir());
    }

    #[test]
    fn second_run_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        source_tree(&src);

        copy_tree(&src, &dst).unwrap();
        let first = read(&dst.join("nested/b.txt"));

        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files_copied, 0);
        assert_eq!(report.files_skipped, 3);
        assert_eq!(report.dirs_created, 0);
        assert_eq!(read(&dst.join("nested/b.txt")), first);
    }

    #[test]
    fn newer_or_resized_source_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        source_tree(&src);
        copy_tree(&src, &dst).unwrap();

        // same length, newer timestamp
        write(&src.join("a.txt"), "ALPHA");
        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(src.join("a.txt"))
            .unwrap()
            .set_modified(later)
            .unwrap();
        // different length
        write(&src.join("nested/b.txt"), "bravo two");

        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files_copied, 2);
        assert_eq!(read(&dst.join("a.txt")), "ALPHA");
        assert_eq!(read(&dst.join("nested/b.txt")), "bravo two");
    }

    #[test]
    fn coarse_destination_timestamp_is_up_to_date() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write(&src.join("a.txt"), "alpha");
        write(&dst.join("a.txt"), "alpha");

        // destination clock rounded down, as a FAT drive would store it
        let modified = SystemTime::now() - Duration::from_secs(3600);
        let set_mtime = |path: &Path, time: SystemTime| {
            File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(time)
                .unwrap();
        };
        set_mtime(&src.join("a.txt"), modified);
        set_mtime(&dst.join("a.txt"), modified - Duration::from_millis(1500));

        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files_copied, 0);
        assert_eq!(report.files_skipped, 1);
    }

    #[test]
    fn newer_destination_is_kept() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write(&src.join("a.txt"), "old!!");
        write(&dst.join("a.txt"), "new!!");
        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(dst.join("a.txt"))
            .unwrap()
            .set_modified(later)
            .unwrap();

        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files_skipped, 1);
        assert_eq!(read(&dst.join("a.txt")), "new!!");
    }

    #[test]
    fn extra_destination_files_are_untouched() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        source_tree(&src);
        write(&dst.join("only-here.txt"), "keep me");

        copy_tree(&src, &dst).unwrap();
        assert_eq!(read(&dst.join("only-here.txt")), "keep me");
    }

    #[test]
    fn single_file_source_lands_in_target() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("notes.md");
        write(&file, "# notes");
        let dst = tmp.path().join("dst");

        let report = copy_tree(&file, &dst).unwrap();
        assert_eq!(report.files_copied, 1);
        assert_eq!(read(&dst.join("notes.md")), "# notes");
    }

    #[test]
    fn missing_source_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = copy_tree(&tmp.path().join("gone"), &tmp.path().join("dst")).unwrap_err();
        assert!(matches!(err, EzBackupError::SourceMissing(_)));
        assert!(!tmp.path().join("dst").exists());
    }

    #[test]
    fn target_inside_source_is_not_recursed() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        source_tree(&src);
        let dst = src.join("backup");

        copy_tree(&src, &dst).unwrap();
        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files_copied, 0);
        assert!(!dst.join("backup").exists());
    }

    #[test]
    fn copy_all_continues_after_failure() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        source_tree(&src);
        let dst = tmp.path().join("dst").display().to_string();
        let entries = vec![
            BackupEntry::new("Broken", tmp.path().join("missing").display().to_string(), dst.clone()),
            BackupEntry::new("Good", src.display().to_string(), dst),
        ];

        let mut started = Vec::new();
        let outcomes = copy_all(&entries, |pos, e| started.push((pos, e.name.clone())));
        assert_eq!(started, vec![(1, "Broken".to_string()), (2, "Good".to_string())]);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        assert!(tmp.path().join("dst/Good/a.txt").exists());
    }

    #[test]
    fn copy_each_reports_outcomes_as_they_finish() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        source_tree(&src);
        let dst = tmp.path().join("dst").display().to_string();
        let entries = vec![
            BackupEntry::new("First", src.display().to_string(), dst.clone()),
            BackupEntry::new("Second", tmp.path().join("missing").display().to_string(), dst),
        ];

        let events = RefCell::new(Vec::new());
        copy_each(
            &entries,
            |pos, e| events.borrow_mut().push(format!("start {} {}", pos, e.name)),
            |outcome| {
                events
                    .borrow_mut()
                    .push(format!("done {} {}", outcome.name, outcome.is_ok()))
            },
        );
        assert_eq!(
            events.into_inner(),
            ["start 1 First", "done First true", "start 2 Second", "done Second false"]
        );
    }

    #[test]
    fn merge_adds_counters() {
        let mut total = CopyReport::default();
        total.merge(&CopyReport {
            files_copied: 2,
            files_skipped: 1,
            bytes_copied: 10,
            dirs_created: 1,
        });
        total.merge(&CopyReport {
            files_copied: 1,
            files_skipped: 0,
            bytes_copied: 5,
            dirs_created: 0,
        });
        assert_eq!(total.files_copied, 3);
        assert_eq!(total.bytes_copied, 15);
    }
}
