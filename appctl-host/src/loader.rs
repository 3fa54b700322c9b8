//! App loader using wasmtime
//!
//! Compiles Wasm app modules, reads their manifest and runs them with fuel
//! metering.

use appctl_api::{exports, unpack_ptr_len, AppContext, AppManifest, API_VERSION};
use thiserror::Error;
use wasmtime::*;

/// Fuel granted to a guest for each exported call.
pub const DEFAULT_FUEL_LIMIT: u64 = 10_000_000;

/// Errors that can occur while loading or running an app module
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Engine creation failed: {0}")]
    EngineCreation(#[source] anyhow::Error),

    #[error("Module compilation failed: {0}")]
    ModuleCompilation(#[source] anyhow::Error),

    #[error("Instantiation failed: {0}")]
    Instantiation(#[source] anyhow::Error),

    #[error("Export not found: {0}")]
    ExportNotFound(&'static str),

    #[error("Function call failed: {function} - {source}")]
    FunctionCall {
        function: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("API version mismatch: expected {expected}, got {actual}")]
    ApiVersionMismatch { expected: u32, actual: u32 },

    #[error("Serialization failed: {0}")]
    Serialization(#[source] rmp_serde::encode::Error),

    #[error("Deserialization failed: {0}")]
    Deserialization(#[source] rmp_serde::decode::Error),

    #[error("Memory access error: {0}")]
    MemoryAccess(String),

    #[error("Fuel exhausted (CPU limit exceeded)")]
    FuelExhausted,
}

/// App loader with a shared wasmtime engine
pub struct AppLoader {
    engine: Engine,
    fuel_limit: u64,
}

/// An app module ready to run
pub struct LoadedApp {
    /// Manifest reported by the module
    pub manifest: AppManifest,

    /// Instance for running the app
    pub instance: AppInstance,
}

/// Instantiated app module
pub struct AppInstance {
    store: Store<()>,
    instance: Instance,
    memory: Memory,
    alloc_fn: TypedFunc<i32, i32>,
    dealloc_fn: TypedFunc<(i32, i32), ()>,
    fuel_limit: u64,
}

fn call_error(function: &'static str, source: anyhow::Error) -> LoaderError {
    if matches!(source.downcast_ref::<Trap>(), Some(Trap::OutOfFuel)) {
        LoaderError::FuelExhausted
    } else {
        LoaderError::FunctionCall { function, source }
    }
}

impl AppLoader {
    /// Create a new loader with the default fuel limit
    pub fn new() -> Result<Self, LoaderError> {
        let mut config = Config::new();
        config.consume_fuel(true);
        config.wasm_memory64(false);

        let engine = Engine::new(&config).map_err(LoaderError::EngineCreation)?;

        Ok(Self {
            engine,
            fuel_limit: DEFAULT_FUEL_LIMIT,
        })
    }

    /// Override the fuel granted to each guest call
    pub fn with_fuel_limit(mut self, fuel_limit: u64) -> Self {
        self.fuel_limit = fuel_limit;
        self
    }

    /// Load an app from Wasm bytes (binary or text format)
    pub fn load(&self, wasm_bytes: &[u8]) -> Result<LoadedApp, LoaderError> {
        let module =
            Module::new(&self.engine, wasm_bytes).map_err(LoaderError::ModuleCompilation)?;

        let mut store = Store::new(&self.engine, ());
        store
            .set_fuel(self.fuel_limit)
            .map_err(LoaderError::EngineCreation)?;

        // Apps get no host imports
        let linker = Linker::new(&self.engine);
        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(LoaderError::Instantiation)?;

        let memory = instance
            .get_memory(&mut store, exports::MEMORY)
            .ok_or(LoaderError::ExportNotFound(exports::MEMORY))?;

        let alloc_fn = instance
            .get_typed_func::<i32, i32>(&mut store, exports::ALLOC)
            .map_err(|_| LoaderError::ExportNotFound(exports::ALLOC))?;

        let dealloc_fn = instance
            .get_typed_func::<(i32, i32), ()>(&mut store, exports::DEALLOC)
            .map_err(|_| LoaderError::ExportNotFound(exports::DEALLOC))?;

        let manifest_fn = instance
            .get_typed_func::<(), i64>(&mut store, exports::MANIFEST)
            .map_err(|_| LoaderError::ExportNotFound(exports::MANIFEST))?;

        let packed = manifest_fn
            .call(&mut store, ())
            .map_err(|e| call_error(exports::MANIFEST, e))?;
        let (ptr, len) = unpack_ptr_len(packed);

        let manifest_bytes = read_memory(&store, &memory, ptr, len)?;
        let manifest: AppManifest =
            rmp_serde::from_slice(&manifest_bytes).map_err(LoaderError::Deserialization)?;

        if manifest.api_version != API_VERSION {
            return Err(LoaderError::ApiVersionMismatch {
                expected: API_VERSION,
                actual: manifest.api_version,
            });
        }

        dealloc_fn
            .call(&mut store, (ptr, len))
            .map_err(|e| call_error(exports::DEALLOC, e))?;

        tracing::debug!(type_name = %manifest.type_name, "App module loaded");

        Ok(LoadedApp {
            manifest,
            instance: AppInstance {
                store,
                instance,
                memory,
                alloc_fn,
                dealloc_fn,
                fuel_limit: self.fuel_limit,
            },
        })
    }
}

fn read_memory(
    store: &Store<()>,
    memory: &Memory,
    ptr: i32,
    len: i32,
) -> Result<Vec<u8>, LoaderError> {
    let data = memory.data(store);
    let (start, len) = match (usize::try_from(ptr), usize::try_from(len)) {
        (Ok(start), Ok(len)) => (start, len),
        _ => {
            return Err(LoaderError::MemoryAccess(format!(
                "Negative pointer or length: ptr={}, len={}",
                ptr, len
            )))
        }
    };
    if start + len > data.len() {
        return Err(LoaderError::MemoryAccess(format!(
            "Out of bounds: ptr={}, len={}, memory_size={}",
            start,
            len,
            data.len()
        )));
    }
    Ok(data[start..start + len].to_vec())
}

impl AppInstance {
    /// Run the app with the given configuration context.
    ///
    /// Returns the exit code reported by the guest.
    pub fn run(&mut self, context: &AppContext) -> Result<i32, LoaderError> {
        let context_bytes = rmp_serde::to_vec_named(context).map_err(LoaderError::Serialization)?;
        let context_len = i32::try_from(context_bytes.len()).map_err(|_| {
            LoaderError::MemoryAccess(format!(
                "Context too large: {} bytes",
                context_bytes.len()
            ))
        })?;

        let context_ptr = self
            .alloc_fn
            .call(&mut self.store, context_len)
            .map_err(|e| call_error(exports::ALLOC, e))?;

        self.memory
            .write(&mut self.store, context_ptr as usize, &context_bytes)
            .map_err(|e| LoaderError::MemoryAccess(format!("Failed to write context: {}", e)))?;

        let run_fn = self
            .instance
            .get_typed_func::<(i32, i32), i32>(&mut self.store, exports::RUN)
            .map_err(|_| LoaderError::ExportNotFound(exports::RUN))?;

        self.store
            .set_fuel(self.fuel_limit)
            .map_err(LoaderError::EngineCreation)?;

        let exit_code = run_fn
            .call(&mut self.store, (context_ptr, context_len))
            .map_err(|e| call_error(exports::RUN, e))?;

        // The exit code stands even if the guest fails to free the context
        if let Err(e) = self
            .dealloc_fn
            .call(&mut self.store, (context_ptr, context_len))
        {
            tracing::debug!(error = %e, "Guest failed to free context buffer");
        }

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_APP: &str = r#"
        (module
          (memory (export "memory") 1)
          (global $next (mut i32) (i32.const 1024))
          (data (i32.const 16) "\93\01\a5hello\a0")
          (func (export "app_alloc") (param $size i32) (result i32)
            (local $ptr i32)
            global.get $next
            local.set $ptr
            global.get $next
            local.get $size
            i32.add
            global.set $next
            local.get $ptr)
          (func (export "app_dealloc") (param i32 i32))
          (func (export "app_manifest") (result i64)
            (i64.or
              (i64.shl (i64.const 16) (i64.const 32))
              (i64.const 9)))
          (func (export "app_run") (param i32 i32) (result i32)
            i32.const 0))
    "#;

    #[test]
    fn test_loader_creation() {
        let loader = AppLoader::new();
        assert!(loader.is_ok());
    }

    #[test]
    fn test_load_reads_manifest() {
        let loader = AppLoader::new().unwrap();
        let app = loader.load(MINIMAL_APP.as_bytes()).unwrap();

        assert_eq!(app.manifest.type_name, "hello");
        assert_eq!(app.manifest.api_version, API_VERSION);
    }

    #[test]
    fn test_load_rejects_missing_exports() {
        let loader = AppLoader::new().unwrap();
        let result = loader.load(br#"(module (memory (export "memory") 1))"#);

        assert!(matches!(
            result,
            Err(LoaderError::ExportNotFound("app_alloc"))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_module() {
        let loader = AppLoader::new().unwrap();
        let result = loader.load(b"not a wasm module");

        assert!(matches!(result, Err(LoaderError::ModuleCompilation(_))));
    }

    #[test]
    fn test_run_keeps_exit_code_when_context_free_traps() {
        // Frees below the context buffer (the manifest) succeed, later ones trap
        let wat = MINIMAL_APP
            .replace(
                r#"(func (export "app_dealloc") (param i32 i32))"#,
                r#"(func (export "app_dealloc") (param $ptr i32) (param i32)
                     local.get $ptr
                     i32.const 1024
                     i32.ge_u
                     if
                       unreachable
                     end)"#,
            )
            .replace("i32.const 0))", "i32.const 5))");
        let loader = AppLoader::new().unwrap();
        let mut instance = loader.load(wat.as_bytes()).unwrap().instance;

        let context = AppContext {
            app: appctl_api::AppInstance {
                id: "appinstance-0".to_string(),
                title: "Test Instance".to_string(),
                settings: Default::default(),
            },
            host: Default::default(),
            storage_directory: "/tmp".to_string(),
        };

        assert_eq!(instance.run(&context).unwrap(), 5);
    }

    #[test]
    fn test_read_memory_bounds() {
        let loader = AppLoader::new().unwrap();
        let app = loader.load(MINIMAL_APP.as_bytes()).unwrap();
        let instance = app.instance;

        let result = read_memory(&instance.store, &instance.memory, 65_530, 100);
        assert!(matches!(result, Err(LoaderError::MemoryAccess(_))));

        let result = read_memory(&instance.store, &instance.memory, -1, 4);
        assert!(matches!(result, Err(LoaderError::MemoryAccess(_))));
    }
}
