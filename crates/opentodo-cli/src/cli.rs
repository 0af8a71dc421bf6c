use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use opentodo_core::{locale::Locale, theme::ThemeMode};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "opentodo",
    about = "Local-first personal task manager",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Browse the profile in a terminal view (q or Esc to exit, d toggles deleted items).
    Tui,
    /// Print version and exit.
    Version,
    /// Check that the slot storage can be written, read and cleared.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Whole-profile operations: show, export, import, reset.
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Task lists inside a project.
    #[command(subcommand)]
    List(ListCommand),
    /// Task groups inside a list.
    #[command(subcommand)]
    Group(GroupCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    /// Background image.
    #[command(subcommand)]
    Background(BackgroundCommand),
    /// Locale and theme preferences.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    /// Print the project tree.
    Show {
        /// Include soft-deleted groups and tasks.
        #[arg(long)]
        deleted: bool,
    },
    /// Change the user name.
    Rename { name: String },
    /// Write a pretty-printed backup file.
    Export {
        /// Target directory (defaults to `export_dir` from config, then the current directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the profile with a backup file.
    Import {
        file: PathBuf,
        /// Apply without asking.
        #[arg(long)]
        yes: bool,
    },
    /// Delete all data.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

/// Title/description edit shared by lists and groups.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TitleEdit {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long, conflicts_with = "no_description")]
    pub description: Option<String>,
    /// Remove the description.
    #[arg(long)]
    pub no_description: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProjectCommand {
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    List,
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long, conflicts_with = "no_description")]
        description: Option<String>,
        #[arg(long)]
        no_description: bool,
    },
    /// Delete a project with all its lists and tasks.
    Rm { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Add {
        project_id: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        edit: TitleEdit,
    },
    /// Delete a list with all its groups and tasks.
    Rm { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum GroupCommand {
    Add {
        list_id: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        edit: TitleEdit,
    },
    /// Move a group and its tasks to the trash.
    Rm { id: String },
    Restore { id: String },
    /// Delete a group for good.
    Purge { id: String },
}

/// Schedule fields accepted by `task add` and `task update`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Progress in percent, clamped to 0..=100.
    #[arg(long)]
    pub progress: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<NaiveDate>,
    /// HH:MM:SS
    #[arg(long)]
    pub start_time: Option<NaiveTime>,
    /// HH:MM:SS
    #[arg(long)]
    pub due_time: Option<NaiveTime>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TaskCommand {
    Add {
        list_id: String,
        title: String,
        /// Put the task in this group instead of the ungrouped tasks.
        #[arg(long)]
        group: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        schedule: Schedule,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "no_description")]
        description: Option<String>,
        /// Remove the description.
        #[arg(long)]
        no_description: bool,
        #[command(flatten)]
        schedule: Schedule,
        /// Remove start/due dates and times.
        #[arg(long)]
        clear_schedule: bool,
    },
    /// Mark completed.
    Done { id: String },
    /// Mark not completed.
    Undo { id: String },
    /// Set progress in percent, clamped to 0..=100.
    Progress {
        id: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Move to the trash.
    Rm { id: String },
    Restore { id: String },
    /// Delete for good.
    Purge { id: String },
    /// Move to another list, or into a group of it.
    Move {
        id: String,
        list_id: String,
        #[arg(long)]
        group: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackgroundCommand {
    /// Use an image file (PNG, JPEG, GIF, WebP, BMP or SVG).
    Set { file: PathBuf },
    Clear,
    /// Write the stored image back to a file.
    Export { file: PathBuf },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    Show,
    /// en-US or zh-CN
    Locale { locale: Locale },
    /// light, dark or auto
    Theme { mode: ThemeMode },
}
