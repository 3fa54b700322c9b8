//! Command-line surface and dispatch.

pub mod app;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::host::AppHost;
use crate::tracing_support::{TracingConfig, TracingFormat};
use anstyle::{AnsiColor, Color, Style};
use app::AppCommand;
use clap::builder::Styles;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

fn styles() -> Styles {
    let accent = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    Styles::styled()
        .header(accent.underline())
        .usage(accent)
        .literal(Style::new().bold())
        .placeholder(Style::new().italic())
}

/// Configure and host Wasm apps
#[derive(Debug, Parser)]
#[command(name = "appctl", version, about, styles = styles())]
pub struct Cli {
    /// Configuration file; defaults to the platform config directory
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<tracing::Level>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = TracingFormat::Compact)]
    pub log_format: TracingFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging settings requested on the command line.
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            level: self.log_level,
            format: self.log_format,
            ..Default::default()
        }
    }
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Work with apps
    #[command(subcommand)]
    App(AppCommand),

    /// Show build information
    Version,
}

/// Ambient inputs shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: CliConfig,
    pub current_dir: PathBuf,
}

impl Context {
    /// Read the configuration file and the process working directory.
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        Ok(Self {
            config: CliConfig::load(config_path)?,
            current_dir: std::env::current_dir()?,
        })
    }
}

/// Run an `app` command and return the process exit code.
///
/// `version` is handled by the binary before any context or host exists.
pub async fn execute<H>(command: AppCommand, context: &Context, host: &H) -> CliResult<i32>
where
    H: AppHost + ?Sized,
{
    match command {
        AppCommand::Run(args) => app::run::run(args, context, host).await,
    }
}
