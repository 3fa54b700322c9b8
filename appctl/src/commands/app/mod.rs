//! `appctl app ...` commands.

pub mod run;

use clap::Subcommand;

/// App subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommand {
    /// Host a Wasm app with the given configuration
    #[command(after_help = "Example:\n  appctl app run -d ./apps -p ToAddress=example@example.com -p Subject=\"Alert!\"")]
    Run(run::RunArgs),
}
