/// Context - owner of a backend and of the resources shared across subsystems
///
/// Instead of global singletons, the application creates one `Context` per
/// backend and passes it to the subsystems that need it. The backend sits
/// behind an `RwLock`: resource creation takes the read side and may run on
/// any number of threads, submission takes the write side and is serialized.

use std::any::Any;
use std::sync::{Mutex, RwLock, RwLockReadGuard};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::rhi::{BackendRegistry, CommandBuffer, ExecutionReport, Rhi, RhiConfig};
use crate::{engine_debug, engine_info, engine_warn};

// ===== SHARED RESOURCE CACHE =====

struct SharedEntry {
    value: Box<dyn Any + Send + Sync>,
    holders: u32,
}

/// Keyed cache of resources used by several independent owners
///
/// An entry is created by the first `acquire` of its key and destroyed by
/// the `release` that drops its holder count to zero. Values are usually
/// resource handles (`Ptr<dyn ...>`) or tuples of them.
#[derive(Default)]
pub struct SharedResourceCache {
    entries: Mutex<FxHashMap<&'static str, SharedEntry>>,
}

impl SharedResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `key`, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `key` already holds a value of another type (`InvalidResource`)
    /// - `create` returns `None` (`InitializationFailed`)
    pub fn acquire<T, F>(&self, key: &'static str, create: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Option<T>,
    {
        let mut entries = self.lock()?;

        if let Some(entry) = entries.get_mut(key) {
            let value = entry.value.downcast_ref::<T>().ok_or_else(|| {
                Error::InvalidResource(format!(
                    "Shared resource '{}' holds another type than {}",
                    key,
                    std::any::type_name::<T>()
                ))
            })?;
            entry.holders += 1;
            return Ok(value.clone());
        }

        let value = create()
            .ok_or_else(|| Error::InitializationFailed(format!("Shared resource '{}' could not be created", key)))?;
        entries.insert(
            key,
            SharedEntry {
                value: Box::new(value.clone()),
                holders: 1,
            },
        );
        engine_debug!("galaxy3d::SharedResourceCache", "Created shared resource '{}'", key);
        Ok(value)
    }

    /// Drop one holder of `key`
    ///
    /// Returns `true` when this was the last holder and the entry was destroyed.
    pub fn release(&self, key: &str) -> Result<bool> {
        let mut entries = self.lock()?;

        let entry = entries
            .get_mut(key)
            .ok_or_else(|| Error::InvalidResource(format!("Shared resource '{}' is not held", key)))?;
        entry.holders -= 1;
        if entry.holders > 0 {
            return Ok(false);
        }

        entries.remove(key);
        engine_debug!("galaxy3d::SharedResourceCache", "Destroyed shared resource '{}'", key);
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().map(|entries| entries.contains_key(key)).unwrap_or(false)
    }

    /// Number of holders of `key` (0 if absent)
    pub fn holders(&self, key: &str) -> u32 {
        self.lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|entry| entry.holders))
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroy every entry regardless of its holders
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.lock()?;
        if !entries.is_empty() {
            engine_info!(
                "galaxy3d::SharedResourceCache",
                "Destroying {} shared resource(s) still held",
                entries.len()
            );
        }
        entries.clear();
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FxHashMap<&'static str, SharedEntry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::BackendError("Shared resource cache lock poisoned".to_string()))
    }
}

// ===== CONTEXT =====

/// Backend plus shared resource cache
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_rhi::galaxy3d::{Context, Result};
/// use galaxy_3d_rhi::galaxy3d::rhi::{BackendRegistry, RhiConfig};
///
/// # fn run(registry: &BackendRegistry) -> Result<()> {
/// let context = Context::from_registry(registry, "Null", RhiConfig::default())?;
/// let name = context.rhi()?.name().to_string();
/// # Ok(())
/// # }
/// ```
pub struct Context {
    rhi: RwLock<Box<dyn Rhi>>,
    shared: SharedResourceCache,
}

impl Context {
    pub fn new(rhi: Box<dyn Rhi>) -> Self {
        engine_info!("galaxy3d::Context", "Context created on backend '{}'", rhi.name());
        Self {
            rhi: RwLock::new(rhi),
            shared: SharedResourceCache::new(),
        }
    }

    /// Create the backend registered under `name`
    pub fn from_registry(registry: &BackendRegistry, name: &str, config: RhiConfig) -> Result<Self> {
        let rhi = registry.create(name, config)?;
        Ok(Self::new(rhi))
    }

    /// Shared access to the backend (resource creation, capabilities)
    pub fn rhi(&self) -> Result<RwLockReadGuard<'_, Box<dyn Rhi>>> {
        self.rhi
            .read()
            .map_err(|_| Error::BackendError("Rhi lock poisoned".to_string()))
    }

    /// Submit a command buffer, waiting for other submissions to finish
    pub fn submit(&self, command_buffer: &CommandBuffer) -> Result<ExecutionReport> {
        let mut rhi = self
            .rhi
            .write()
            .map_err(|_| Error::BackendError("Rhi lock poisoned".to_string()))?;
        rhi.submit_command_buffer(command_buffer)
    }

    /// Get or create a shared resource; see `SharedResourceCache::acquire`
    pub fn acquire_shared<T, F>(&self, key: &'static str, create: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&dyn Rhi) -> Option<T>,
    {
        let rhi = self.rhi()?;
        self.shared.acquire(key, || create(&**rhi))
    }

    /// Drop one holder of a shared resource; `true` if it was destroyed
    pub fn release_shared(&self, key: &str) -> Result<bool> {
        self.shared.release(key)
    }

    pub fn shared_resources(&self) -> &SharedResourceCache {
        &self.shared
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Shared resources go before the backend that created them
        if let Err(error) = self.shared.clear() {
            engine_warn!("galaxy3d::Context", "Shared resources not released: {}", error);
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
