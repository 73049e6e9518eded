//! EzBackup CLI
//!
//! Launches the GUI by default. Subcommands work on the same save file
//! without opening a window.

use clap::{Parser, Subcommand};
use console::style;
use ezbackup::{
    copier, gui, logging, store, AppConfig, BackupEntry, CopyReport, EzBackupError, Registry,
};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// EzBackup - folder-copy backups
///
/// Copies each configured source folder into `<destination>/<name>`,
/// rewriting only files that changed.
#[derive(Parser)]
#[command(name = "ezbackup")]
#[command(author = "EzBackup Contributors")]
#[command(version)]
#[command(about = "Folder-copy backup tool", long_about = None)]
struct Cli {
    /// Save file holding the backup list
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log file (default: next to the save file)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run every backup once, then close the window
    #[arg(long)]
    autostart: bool,

    /// Do not run the backups when the window opens
    #[arg(long)]
    no_startup_backup: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run backups without opening the window
    Backup {
        /// Only run the backup with this name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List configured backups
    List {
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a backup and save the list
    Add {
        /// Name, also the folder created under the destination
        #[arg(short, long)]
        name: String,

        /// Folder to back up
        #[arg(short, long)]
        source: String,

        /// Folder the backup is written into
        #[arg(short, long)]
        destination: String,
    },

    /// Remove the backup at a position (as shown by `list`) and save the list
    Remove {
        /// 1-based position
        position: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = build_config(&cli);

    logging::init(config.log_path.as_deref(), config.log_level);
    log::info!(target: "main", "EzBackup {} starting up", ezbackup::VERSION);

    let result = match cli.command {
        None => gui::run(config),
        Some(Commands::Backup { name }) => cmd_backup(&config, name.as_deref()),
        Some(Commands::List { json }) => cmd_list(&config, json),
        Some(Commands::Add {
            name,
            source,
            destination,
        }) => cmd_add(&config, BackupEntry::new(name, source, destination)),
        Some(Commands::Remove { position }) => cmd_remove(&config, position),
    };

    logging::flush();

    if let Err(e) = result {
        log::error!(target: "main", "{}", e);
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(path) = &cli.config {
        config = config.with_save_path(path);
        // keep the log beside an explicitly chosen save file
        if let Some(parent) = path.parent() {
            config = config.with_log_path(parent.join(ezbackup::config::LOG_FILE_NAME));
        }
    }
    if let Some(path) = &cli.log_file {
        config = config.with_log_path(path);
    }
    if cli.verbose {
        config.log_level = LevelFilter::Debug;
    }
    config.autostart = cli.autostart;
    config.backup_on_startup = !cli.no_startup_backup;
    config
}

/// Backup command implementation
fn cmd_backup(config: &AppConfig, name: Option<&str>) -> ezbackup::Result<()> {
    let registry = store::load(&config.save_path).into_registry();

    let entries: Vec<BackupEntry> = match name {
        Some(name) => vec![registry
            .find(name)
            .cloned()
            .ok_or_else(|| EzBackupError::NoSuchEntry(name.to_string()))?],
        None => registry.entries().to_vec(),
    };

    if entries.is_empty() {
        println!("{} No backups configured", style("!").yellow().bold());
        return Ok(());
    }

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(spinner);
    }
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcomes = copier::copy_all(&entries, |position, entry| {
        pb.set_message(format!("Backing up {} ({}/{})", entry.name, position, entries.len()));
    });
    pb.finish_and_clear();

    let mut total = CopyReport::default();
    let failures = outcomes.iter().filter(|o| !o.is_ok()).count();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                total.merge(report);
                println!(
                    "{} {} {} copied ({}), {} up to date",
                    style("✓").green().bold(),
                    style(&outcome.name).bold(),
                    report.files_copied,
                    humansize::format_size(report.bytes_copied, humansize::DECIMAL),
                    report.files_skipped
                );
            }
            Err(e) => {
                println!(
                    "{} {} {}",
                    style("✗").red().bold(),
                    style(&outcome.name).bold(),
                    e
                );
            }
        }
    }

    println!();
    println!(
        "{} {} backup(s) in {}: {} file(s), {}",
        style("→").cyan().bold(),
        entries.len(),
        style(HumanDuration(start.elapsed())).cyan(),
        total.files_copied,
        style(humansize::format_size(total.bytes_copied, humansize::DECIMAL)).yellow()
    );

    if failures > 0 {
        return Err(EzBackupError::BackupFailed {
            failed: failures,
            total: entries.len(),
        });
    }
    Ok(())
}

/// Read the save file for commands that rewrite it; a missing file is an
/// empty list but a damaged one is an error so it is not overwritten.
fn read_entries(config: &AppConfig) -> ezbackup::Result<Vec<BackupEntry>> {
    match store::read_document(&config.save_path) {
        Ok(entries) => Ok(entries),
        Err(EzBackupError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// List command implementation
fn cmd_list(config: &AppConfig, json: bool) -> ezbackup::Result<()> {
    let entries = read_entries(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No backups in {}", config.save_path.display());
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {}  {} {} {}",
            i + 1,
            style(&entry.name).bold(),
            entry.source,
            style("→").cyan(),
            entry.target_dir().display()
        );
    }
    Ok(())
}

/// Add command implementation
fn cmd_add(config: &AppConfig, entry: BackupEntry) -> ezbackup::Result<()> {
    let mut registry = Registry::from_entries(read_entries(config)?);
    let line = format!(
        "{} Added {} ({} → {})",
        style("✓").green().bold(),
        style(&entry.name).bold(),
        entry.source,
        entry.target_dir().display()
    );
    registry.add(entry);
    store::save(&config.save_path, &registry)?;
    println!("{}", line);
    Ok(())
}

/// Remove command implementation
fn cmd_remove(config: &AppConfig, position: usize) -> ezbackup::Result<()> {
    let mut registry = Registry::from_entries(read_entries(config)?);
    let len = registry.len();
    let removed = position
        .checked_sub(1)
        .and_then(|i| registry.remove(i))
        .ok_or(EzBackupError::IndexOutOfRange {
            index: position,
            len,
        })?;
    store::save(&config.save_path, &registry)?;
    println!("{} Removed {}", style("✓").green().bold(), style(&removed.name).bold());
    Ok(())
}
