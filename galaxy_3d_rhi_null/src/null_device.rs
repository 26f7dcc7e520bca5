/// NullDevice - Table of fake native objects shared by all Null resources
///
/// Every Null resource owns one entry of this table for its lifetime. Handles
/// are versioned slot map keys, so a handle whose object was destroyed stays
/// detectably stale even after its slot is reused.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{NativeHandle, Resource, ResourceType};
use galaxy_3d_rhi::{engine_error, engine_trace};
use slotmap::{new_key_type, Key, KeyData, SlotMap};

new_key_type! {
    /// Key of a native object
    pub struct NativeKey;
}

/// Bookkeeping for one live native object
struct NativeObject {
    resource_type: ResourceType,
    debug_name: String,
}

/// Shared native object table (one per `NullRhi`)
///
/// Shared (via `Arc`) by the backend and every resource it created, so
/// resources may outlive the backend itself.
pub struct NullDevice {
    objects: Mutex<SlotMap<NativeKey, NativeObject>>,
    /// Simulated device removal, makes submissions and presents fail
    lost: AtomicBool,
    /// Native calls left before the device is lost, `u64::MAX` for never
    calls_until_lost: AtomicU64,
    /// Frames presented by every swap chain of the device
    presents: AtomicU64,
    /// Check native handles during command translation
    pub(crate) validation: bool,
}

impl NullDevice {
    pub fn new(validation: bool) -> Self {
        Self {
            objects: Mutex::new(SlotMap::with_key()),
            lost: AtomicBool::new(false),
            calls_until_lost: AtomicU64::new(u64::MAX),
            presents: AtomicU64::new(0),
            validation,
        }
    }

    /// Create a native object, returns its handle
    pub fn allocate(&self, resource_type: ResourceType, debug_name: &str) -> Result<NativeHandle> {
        let mut objects = self.lock()?;
        let key = objects.insert(NativeObject {
            resource_type,
            debug_name: debug_name.to_string(),
        });
        let handle = NativeHandle::new(key.data().as_ffi());
        engine_trace!("galaxy3d::null::NullDevice", "Created {:?} '{}' ({:#x})", resource_type, debug_name, handle.raw());
        Ok(handle)
    }

    /// Destroy a native object
    ///
    /// Releasing an unknown or already destroyed handle is logged, never fatal.
    pub fn release(&self, handle: NativeHandle) {
        let removed = match self.objects.lock() {
            Ok(mut objects) => objects.remove(Self::key(handle)),
            Err(_) => return,
        };
        match removed {
            Some(object) => engine_trace!(
                "galaxy3d::null::NullDevice",
                "Destroyed {:?} '{}' ({:#x})",
                object.resource_type,
                object.debug_name,
                handle.raw()
            ),
            None => engine_error!(
                "galaxy3d::null::NullDevice",
                "Native object {:#x} destroyed twice",
                handle.raw()
            ),
        }
    }

    pub fn is_alive(&self, handle: NativeHandle) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(Self::key(handle)))
            .unwrap_or(false)
    }

    /// Fail with `InvalidResource` if `resource` lost its native object
    pub fn check_alive<R: Resource + ?Sized>(&self, resource: &R) -> Result<()> {
        if !self.validation || self.is_alive(resource.native_handle()) {
            return Ok(());
        }
        Err(Error::InvalidResource(format!(
            "{:?} '{}' used after its native object {:#x} was destroyed",
            resource.resource_type(),
            resource.debug_name(),
            resource.native_handle().raw()
        )))
    }

    pub fn live_count(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Live native objects grouped by resource type
    pub fn live_by_type(&self) -> BTreeMap<ResourceType, usize> {
        let mut counts = BTreeMap::new();
        if let Ok(objects) = self.objects.lock() {
            for object in objects.values() {
                *counts.entry(object.resource_type).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Debug names of the live native objects, sorted
    pub fn live_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.objects.lock() {
            Ok(objects) => objects.values().map(|object| object.debug_name.clone()).collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn record_present(&self) {
        self.presents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn presented_frames(&self) -> u64 {
        self.presents.load(Ordering::Relaxed)
    }

    pub fn lose(&self) {
        self.lost.store(true, Ordering::Release);
    }

    /// Lose the device once `native_calls` more native calls were made
    pub fn lose_after(&self, native_calls: u64) {
        if native_calls == 0 {
            self.lose();
        } else {
            self.calls_until_lost.store(native_calls, Ordering::Release);
        }
    }

    /// Count one native call against the pending device removal
    pub fn record_native_call(&self) {
        let previous = self
            .calls_until_lost
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| match remaining {
                0 | u64::MAX => None,
                remaining => Some(remaining - 1),
            });
        if previous == Ok(1) {
            self.lose();
        }
    }

    /// `Err(DeviceLost)` once the device was lost
    pub fn check_device(&self) -> Result<()> {
        if self.lost.load(Ordering::Acquire) {
            return Err(Error::DeviceLost("Null device was removed".to_string()));
        }
        Ok(())
    }

    fn key(handle: NativeHandle) -> NativeKey {
        KeyData::from_ffi(handle.raw()).into()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SlotMap<NativeKey, NativeObject>>> {
        self.objects
            .lock()
            .map_err(|_| Error::BackendError("Native object table lock poisoned".to_string()))
    }
}

/// Implement `Resource` for a Null resource holding `base` and `device`
///
/// The native object is destroyed when the last reference goes away.
macro_rules! impl_null_resource {
    ($type:ty, $resource_type:expr) => {
        impl galaxy_3d_rhi::galaxy3d::rhi::Resource for $type {
            fn resource_base(&self) -> &galaxy_3d_rhi::galaxy3d::rhi::ResourceBase {
                &self.base
            }

            fn resource_type(&self) -> galaxy_3d_rhi::galaxy3d::rhi::ResourceType {
                $resource_type
            }

            fn self_destruct(&self) {
                self.device.release(self.base.native_handle());
            }
        }
    };
}
