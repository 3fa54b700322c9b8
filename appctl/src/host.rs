//! The app host seam.
//!
//! Commands only ever see [`AppHost`]; `main` wires in [`WasmAppHost`] and
//! tests substitute a recording double.

use crate::commands::app::run::RunConfiguration;
use appctl_host::{RunRequest, WasmAppHost};
use async_trait::async_trait;

/// Something that can run an app with a resolved configuration.
///
/// The returned value is the process-style exit code reported by the host,
/// including for failures the host detects itself.
#[async_trait]
pub trait AppHost: Send + Sync {
    async fn run(&self, configuration: RunConfiguration) -> i32;
}

#[async_trait]
impl AppHost for WasmAppHost {
    async fn run(&self, configuration: RunConfiguration) -> i32 {
        let request = RunRequest::from(configuration);
        match WasmAppHost::run(self, &request) {
            Ok(exit_code) => exit_code,
            Err(e) => {
                eprintln!("Error: {}", e);
                e.exit_code()
            }
        }
    }
}

impl From<RunConfiguration> for RunRequest {
    fn from(configuration: RunConfiguration) -> Self {
        RunRequest {
            directory: configuration.directory,
            settings: configuration.settings,
            storage_directory: configuration.storage_directory,
            server_url: configuration.server_url,
            app_instance_id: configuration.app_instance_id,
            app_instance_title: configuration.app_instance_title,
            server_instance_name: configuration.server_instance_name,
            type_name: configuration.type_name,
        }
    }
}
