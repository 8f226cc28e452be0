use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rename and delete files by editing their names in a text editor.
#[derive(Parser)]
#[command(name = "massren", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile directory holding config and history.
    #[arg(long, global = true)]
    pub profile_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Edit the names of matching files, then rename or delete them.
    Rename(RenameArgs),
    /// Restore the previous names of renamed files.
    Undo(UndoArgs),
    /// List, set or delete configuration values.
    Config(ConfigArgs),
    /// Show or clear the rename history.
    History(HistoryArgs),
}

#[derive(Args, Default)]
pub struct RenameArgs {
    /// Don't rename anything but show the operations that would be performed.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output structured JSON to stdout.
    #[arg(long)]
    pub json: bool,

    /// Include directories in the listing.
    #[arg(short = 'd', long)]
    pub include_dirs: bool,

    /// Files or glob patterns (defaults to everything in the current directory).
    pub patterns: Vec<String>,
}

#[derive(Args, Default)]
pub struct UndoArgs {
    /// Show what would be restored without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output structured JSON to stdout.
    #[arg(long)]
    pub json: bool,

    /// Renamed files or glob patterns to restore.
    pub patterns: Vec<String>,
}

#[derive(Args, Default)]
pub struct ConfigArgs {
    /// Key to set or delete. Lists all values when omitted.
    pub name: Option<String>,

    /// New value. Deletes the key when omitted.
    pub value: Option<String>,
}

#[derive(Args, Default)]
pub struct HistoryArgs {
    /// Delete every history entry.
    #[arg(long)]
    pub clear: bool,
}
