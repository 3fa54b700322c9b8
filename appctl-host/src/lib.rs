//! appctl-host: Wasm app host runtime for appctl
//!
//! This crate loads a Wasm app from a directory and runs it once with the
//! configuration supplied by the caller.

pub mod discovery;
pub mod host;
pub mod loader;

pub use discovery::{AppScanner, DiscoveryError, DiscoveryResult, SelectionError};
pub use host::{HostError, RunRequest, WasmAppHost, HOST_FAILURE_EXIT_CODE};
pub use loader::{AppInstance, AppLoader, LoadedApp, LoaderError, DEFAULT_FUEL_LIMIT};
pub use appctl_api::{AppContext, AppManifest, HostInfo, API_VERSION};
