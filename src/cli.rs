//! CLI struct definitions for the siteprep command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "siteprep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Guided provisioning for a managed site root",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Managed site root to operate on.
    #[clap(long, global = true, default_value = ".")]
    pub root: PathBuf,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunCli {
    /// Wizard step to run (1-4). Unmet prerequisites clamp the request down.
    #[clap(long, default_value_t = 1)]
    pub step: u8,
    /// TOML answers file for steps 2 and 3.
    #[clap(long)]
    pub answers: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Run one wizard step
    Run(RunCli),
    /// Run the environment requirement checks and report
    Check,
    /// Show durable installation progress and known modules
    Status,
    /// Print the siteprep version
    Version,
}
