//! `massren` - bulk rename files from a text editor.
//!
//! See `README.md` for user documentation and `DESIGN.md` for architecture.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use massren::cli::{Cli, Command};
use massren::profile::Profile;

const LOG_ENV: &str = "MASSREN_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "massren=debug" } else { "massren=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let profile = Profile::open(cli.profile_dir).context("failed to open profile")?;
    let result = match cli.command {
        Command::Rename(args) => massren::engine::rename(&profile, args),
        Command::Undo(args) => massren::engine::undo(&profile, args),
        Command::Config(args) => massren::engine::config(&profile, args),
        Command::History(args) => massren::engine::history(&profile, args),
    };
    massren::engine::prune_history(&profile);
    std::process::exit(result?);
}
