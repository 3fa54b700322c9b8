//! appctl-api: Shared types for appctl Wasm apps
//!
//! This crate defines the protocol between the app host and a guest module.
//! Communication uses MessagePack serialization.
//!
//! ## Guest ABI
//!
//! A guest module exports:
//!
//! - `memory`: linear memory shared with the host
//! - `app_alloc(size: i32) -> i32` / `app_dealloc(ptr: i32, size: i32)`
//! - `app_manifest() -> i64`: packed `(ptr << 32) | len` of an [`AppManifest`]
//! - `app_run(ptr: i32, len: i32) -> i32`: receives an [`AppContext`],
//!   returns a process-style exit code

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API version for compatibility checking
pub const API_VERSION: u32 = 1;

/// Export names every guest module must provide
pub mod exports {
    pub const MEMORY: &str = "memory";
    pub const ALLOC: &str = "app_alloc";
    pub const DEALLOC: &str = "app_dealloc";
    pub const MANIFEST: &str = "app_manifest";
    pub const RUN: &str = "app_run";
}

/// Manifest returned by the guest's `app_manifest()` export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppManifest {
    /// API version for compatibility
    pub api_version: u32,

    /// App type name, matched against `--type`
    pub type_name: String,

    /// Short description
    #[serde(default)]
    pub about: String,
}

impl AppManifest {
    /// Create a manifest for the current API version.
    ///
    /// Guest-facing: apps build the manifest they serialize from
    /// `app_manifest`. The host only deserializes it.
    pub fn new(type_name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION,
            type_name: type_name.into(),
            about: about.into(),
        }
    }
}

/// Configuration context handed to the guest's `app_run()` export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppContext {
    /// The app instance being run
    pub app: AppInstance,

    /// The server the instance is notionally attached to
    pub host: HostInfo,

    /// Directory in which app-specific data can be stored
    pub storage_directory: String,
}

/// App instance identity and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInstance {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

/// Server details, used only for app configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default)]
    pub instance_name: Option<String>,
}

/// Pack a pointer and length into the i64 returned by `app_manifest`.
///
/// Guest-facing; the host only needs [`unpack_ptr_len`].
#[inline]
pub fn pack_ptr_len(ptr: i32, len: i32) -> i64 {
    ((ptr as i64) << 32) | (len as i64 & 0xFFFFFFFF)
}

/// Unpack ptr and len from a packed i64
#[inline]
pub fn unpack_ptr_len(packed: i64) -> (i32, i32) {
    let ptr = (packed >> 32) as i32;
    let len = (packed & 0xFFFFFFFF) as i32;
    (ptr, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serialization() {
        let manifest = AppManifest::new("email", "Sends alerts by email");

        let bytes = rmp_serde::to_vec(&manifest).unwrap();
        let decoded: AppManifest = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded.api_version, API_VERSION);
        assert_eq!(decoded.type_name, "email");
        assert_eq!(decoded.about, "Sends alerts by email");
    }

    #[test]
    fn test_manifest_decodes_from_compact_array() {
        // fixarray(3): 1, "hello", ""
        let bytes = [0x93, 0x01, 0xa5, b'h', b'e', b'l', b'l', b'o', 0xa0];
        let decoded: AppManifest = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded, AppManifest::new("hello", ""));
    }

    #[test]
    fn test_context_serialization_keeps_settings() {
        let mut settings = BTreeMap::new();
        settings.insert("ToAddress".to_string(), "example@example.com".to_string());
        settings.insert("Subject".to_string(), String::new());

        let context = AppContext {
            app: AppInstance {
                id: "appinstance-0".to_string(),
                title: "Test Instance".to_string(),
                settings,
            },
            host: HostInfo {
                server_url: Some("http://localhost:5341".to_string()),
                instance_name: None,
            },
            storage_directory: "/tmp/storage".to_string(),
        };

        let bytes = rmp_serde::to_vec_named(&context).unwrap();
        let decoded: AppContext = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded, context);
        assert_eq!(decoded.app.settings["Subject"], "");
    }

    #[test]
    fn test_pack_unpack() {
        let ptr = 0x12345678_i32;
        let len = 0x00000100_i32;
        let (up, ul) = unpack_ptr_len(pack_ptr_len(ptr, len));
        assert_eq!(up, ptr);
        assert_eq!(ul, len);
    }
}
