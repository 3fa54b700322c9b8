//! # appctl
//!
//! Command-line tool for configuring and hosting Wasm apps.
//!
//! `appctl app run` turns its options into a [`RunConfiguration`] and hands
//! it to an [`AppHost`], relaying the host's exit code:
//!
//! ```text
//! appctl app run -d ./apps -p ToAddress=example@example.com -p Subject=Alert!
//! ```
//!
//! ## Exit codes
//!
//! - whatever the host returns, verbatim, once it has been invoked
//! - `2` for usage errors, including repeated `-p` names
//! - `101` when the configuration file can't be read

pub mod argument;
pub mod build_info;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod tracing_support;

pub use commands::app::run::{RunArgs, RunConfiguration};
pub use commands::app::AppCommand;
pub use commands::{execute, Cli, Commands, Context};
pub use config::{CliConfig, ConnectionConfig};
pub use error::{CliError, CliResult};
pub use host::AppHost;
