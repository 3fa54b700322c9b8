//! `appctl app run`: host a Wasm app once.
//!
//! Every occurrence of every option is collected in order, then folded into a
//! [`RunConfiguration`] on top of the defaults. The configuration is handed to
//! the [`AppHost`] exactly once and the host's exit code becomes ours.

use crate::argument::last_normalized;
use crate::commands::Context;
use crate::config::ConnectionConfig;
use crate::error::{CliError, CliResult};
use crate::host::AppHost;
use clap::Args;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default `--id`.
pub const DEFAULT_APP_INSTANCE_ID: &str = "appinstance-0";

/// Default `--title`.
pub const DEFAULT_APP_INSTANCE_TITLE: &str = "Test Instance";

/// Raw options for `app run`.
///
/// Blank values for any option except `-p` are ignored, so the field keeps
/// whatever an earlier occurrence or the default gave it. The token after an
/// option is always its value, even when it starts with `-`.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// The directory containing app modules; defaults to the current directory
    #[arg(short = 'd', long = "directory", value_name = "PATH", allow_hyphen_values = true)]
    pub directory: Vec<String>,

    /// The app type name; defaults to the single app found in the directory
    #[arg(long = "type", value_name = "NAME", allow_hyphen_values = true)]
    pub type_name: Vec<String>,

    /// Name/value settings for the app, e.g. `-p ToAddress=example@example.com -p Subject="Alert!"`
    #[arg(short = 'p', long = "property", value_name = "NAME=VALUE", allow_hyphen_values = true, value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// A directory in which app-specific data can be stored; defaults to the current directory
    #[arg(long = "storage", value_name = "PATH", allow_hyphen_values = true)]
    pub storage: Vec<String>,

    /// The server URL, used only for app configuration (no connection is made); defaults to `connection.serverUrl`
    #[arg(short = 's', long = "server", value_name = "URL", allow_hyphen_values = true)]
    pub server: Vec<String>,

    /// The server instance name, used only for app configuration; defaults to none
    #[arg(long = "server-instance", value_name = "NAME", allow_hyphen_values = true)]
    pub server_instance: Vec<String>,

    /// The app instance title, used only for app configuration; defaults to a placeholder title
    #[arg(short = 't', long = "title", value_name = "TEXT", allow_hyphen_values = true)]
    pub title: Vec<String>,

    /// The app instance id, used only for app configuration; defaults to a placeholder id
    #[arg(long = "id", value_name = "TEXT", allow_hyphen_values = true)]
    pub id: Vec<String>,
}

/// Split `name=value` at the first `=`.
///
/// Both halves are trimmed and a missing value becomes `""`. An empty name is
/// kept as-is and is subject to the same duplicate check as any other.
fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    Ok((name.trim().to_string(), value.trim().to_string()))
}

/// Everything the host needs to run an app once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub directory: PathBuf,
    pub type_name: Option<String>,
    pub settings: BTreeMap<String, String>,
    pub storage_directory: PathBuf,
    pub app_instance_id: String,
    pub app_instance_title: String,
    pub server_url: Option<String>,
    pub server_instance_name: Option<String>,
}

impl RunConfiguration {
    /// Configuration used when no options are given.
    pub fn defaults(connection: &ConnectionConfig, current_dir: &Path) -> Self {
        Self {
            directory: current_dir.to_path_buf(),
            type_name: None,
            settings: BTreeMap::new(),
            storage_directory: current_dir.to_path_buf(),
            app_instance_id: DEFAULT_APP_INSTANCE_ID.to_string(),
            app_instance_title: DEFAULT_APP_INSTANCE_TITLE.to_string(),
            server_url: crate::argument::normalize(&connection.server_url),
            server_instance_name: None,
        }
    }

    /// Fold parsed options over this configuration.
    ///
    /// Fails on the first repeated setting name; nothing is partially applied.
    pub fn apply(self, args: RunArgs) -> CliResult<Self> {
        let settings = args
            .properties
            .into_iter()
            .try_fold(self.settings, |mut settings, (name, value)| {
                if settings.contains_key(&name) {
                    return Err(CliError::DuplicateSetting { name });
                }
                settings.insert(name, value);
                Ok(settings)
            })?;

        Ok(Self {
            directory: last_normalized(&args.directory)
                .map(PathBuf::from)
                .unwrap_or(self.directory),
            type_name: last_normalized(&args.type_name).or(self.type_name),
            settings,
            storage_directory: last_normalized(&args.storage)
                .map(PathBuf::from)
                .unwrap_or(self.storage_directory),
            app_instance_id: last_normalized(&args.id).unwrap_or(self.app_instance_id),
            app_instance_title: last_normalized(&args.title).unwrap_or(self.app_instance_title),
            server_url: last_normalized(&args.server).or(self.server_url),
            server_instance_name: last_normalized(&args.server_instance)
                .or(self.server_instance_name),
        })
    }
}

/// Resolve the configuration and run the app.
///
/// Returns the host's exit code unchanged.
pub async fn run<H>(args: RunArgs, context: &Context, host: &H) -> CliResult<i32>
where
    H: AppHost + ?Sized,
{
    let configuration =
        RunConfiguration::defaults(&context.config.connection, &context.current_dir)
            .apply(args)?;

    tracing::debug!(
        directory = %configuration.directory.display(),
        type_name = ?configuration.type_name,
        settings = configuration.settings.len(),
        "Invoking app host"
    );

    Ok(host.run(configuration).await)
}
