//! App discovery and selection
//!
//! Scans a directory for `.wasm` app modules and picks the one to run.

use crate::{AppLoader, LoadedApp, LoaderError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during app discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory: {0}")]
    ReadDirectory(#[source] std::io::Error),

    #[error("Failed to read app {path}: {source}")]
    ReadApp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load app {path}: {source}")]
    LoadApp {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },
}

/// Errors that can occur when choosing an app from a scan
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No app modules were found")]
    NoAppsFound,

    #[error("App type '{0}' was not found")]
    TypeNotFound(String),

    #[error("Multiple app types were found ({}); specify one with --type", .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// Result of app discovery
pub struct DiscoveryResult {
    /// Successfully loaded apps
    pub apps: Vec<LoadedApp>,

    /// Modules that failed to load (with errors)
    pub failures: Vec<(PathBuf, DiscoveryError)>,
}

impl DiscoveryResult {
    /// Returns true if all modules loaded successfully
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of module files found
    pub fn total_found(&self) -> usize {
        self.apps.len() + self.failures.len()
    }

    /// Type names of the loaded apps, in scan order
    pub fn type_names(&self) -> Vec<String> {
        self.apps
            .iter()
            .map(|app| app.manifest.type_name.clone())
            .collect()
    }

    /// Choose the app to run.
    ///
    /// With a type name, the app declaring exactly that name is chosen.
    /// Without one, the scan must have found exactly one app.
    pub fn select(mut self, type_name: Option<&str>) -> Result<LoadedApp, SelectionError> {
        match type_name {
            Some(name) => {
                let index = self
                    .apps
                    .iter()
                    .position(|app| app.manifest.type_name == name)
                    .ok_or_else(|| SelectionError::TypeNotFound(name.to_string()))?;
                Ok(self.apps.swap_remove(index))
            }
            None => match self.apps.len() {
                0 => Err(SelectionError::NoAppsFound),
                1 => Ok(self.apps.remove(0)),
                _ => Err(SelectionError::Ambiguous(self.type_names())),
            },
        }
    }
}

/// App directory scanner
pub struct AppScanner {
    loader: AppLoader,
}

impl AppScanner {
    /// Create a new app scanner
    pub fn new() -> Result<Self, LoaderError> {
        Ok(Self {
            loader: AppLoader::new()?,
        })
    }

    /// Create with an existing loader
    pub fn with_loader(loader: AppLoader) -> Self {
        Self { loader }
    }

    /// Scan a directory for .wasm app modules
    pub fn scan_directory(&self, dir: impl AsRef<Path>) -> Result<DiscoveryResult, DiscoveryError> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(DiscoveryError::DirectoryNotFound(dir.to_path_buf()));
        }

        let entries = std::fs::read_dir(dir).map_err(DiscoveryError::ReadDirectory)?;

        let mut paths = Vec::new();
        let mut failures = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.extension().map(|e| e == "wasm").unwrap_or(false) {
                        paths.push(path);
                    }
                }
                Err(e) => failures.push((dir.to_path_buf(), DiscoveryError::ReadDirectory(e))),
            }
        }

        // Directory order is platform-dependent
        paths.sort();

        let mut apps = Vec::new();
        for path in paths {
            match self.load_app(&path) {
                Ok(app) => apps.push(app),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping app module");
                    failures.push((path, e));
                }
            }
        }

        Ok(DiscoveryResult { apps, failures })
    }

    fn load_app(&self, path: &Path) -> Result<LoadedApp, DiscoveryError> {
        let wasm_bytes = std::fs::read(path).map_err(|e| DiscoveryError::ReadApp {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.loader
            .load(&wasm_bytes)
            .map_err(|e| DiscoveryError::LoadApp {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
