//! Single-shot app hosting
//!
//! Finds the requested app in a directory, hands it its configuration and
//! reports the exit code it returns.

use crate::discovery::{AppScanner, DiscoveryError, SelectionError};
use crate::{AppLoader, LoaderError};
use appctl_api::{AppContext, AppInstance, HostInfo};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported for every failure inside the host
pub const HOST_FAILURE_EXIT_CODE: i32 = 1;

/// Errors that prevent an app from running to completion
#[derive(Debug, Error)]
pub enum HostError {
    #[error("App host could not start: {0}")]
    Startup(#[source] LoaderError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Could not choose an app in {directory}: {source}")]
    Selection {
        directory: PathBuf,
        #[source]
        source: SelectionError,
    },

    #[error("Storage directory {path} is not usable: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("App '{type_name}' failed: {source}")]
    App {
        type_name: String,
        #[source]
        source: LoaderError,
    },
}

impl HostError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        HOST_FAILURE_EXIT_CODE
    }
}

/// Everything the host needs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Directory containing app modules
    pub directory: PathBuf,

    /// Settings passed to the app by name
    pub settings: BTreeMap<String, String>,

    /// Directory in which the app can store data
    pub storage_directory: PathBuf,

    /// Server URL, used only for app configuration
    pub server_url: Option<String>,

    pub app_instance_id: String,
    pub app_instance_title: String,

    /// Server instance name, used only for app configuration
    pub server_instance_name: Option<String>,

    /// App type to run; `None` picks the only app in `directory`
    pub type_name: Option<String>,
}

impl RunRequest {
    fn context(&self) -> AppContext {
        AppContext {
            app: AppInstance {
                id: self.app_instance_id.clone(),
                title: self.app_instance_title.clone(),
                settings: self.settings.clone(),
            },
            host: HostInfo {
                server_url: self.server_url.clone(),
                instance_name: self.server_instance_name.clone(),
            },
            storage_directory: self.storage_directory.display().to_string(),
        }
    }
}

/// Hosts Wasm apps found on disk
pub struct WasmAppHost {
    scanner: AppScanner,
}

impl WasmAppHost {
    /// Create a host with the default loader
    pub fn new() -> Result<Self, HostError> {
        let loader = AppLoader::new().map_err(HostError::Startup)?;
        Ok(Self::with_loader(loader))
    }

    /// Create with an existing loader
    pub fn with_loader(loader: AppLoader) -> Self {
        Self {
            scanner: AppScanner::with_loader(loader),
        }
    }

    /// Load the requested app and run it once.
    ///
    /// Returns the app's own exit code.
    pub fn run(&self, request: &RunRequest) -> Result<i32, HostError> {
        let discovered = self.scanner.scan_directory(&request.directory)?;
        tracing::debug!(
            directory = %request.directory.display(),
            found = discovered.total_found(),
            failed = discovered.failures.len(),
            "Scanned app directory"
        );

        let mut app = discovered
            .select(request.type_name.as_deref())
            .map_err(|source| HostError::Selection {
                directory: request.directory.clone(),
                source,
            })?;

        std::fs::create_dir_all(&request.storage_directory).map_err(|source| {
            HostError::Storage {
                path: request.storage_directory.clone(),
                source,
            }
        })?;

        let type_name = app.manifest.type_name.clone();
        tracing::info!(
            type_name = %type_name,
            instance_id = %request.app_instance_id,
            settings = request.settings.len(),
            "Running app"
        );

        let exit_code = app
            .instance
            .run(&request.context())
            .map_err(|source| HostError::App {
                type_name: type_name.clone(),
                source,
            })?;

        tracing::info!(type_name = %type_name, exit_code, "App finished");
        Ok(exit_code)
    }
}
