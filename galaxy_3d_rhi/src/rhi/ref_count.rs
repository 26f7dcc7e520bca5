/// Intrusive reference counting and the `Ptr` smart handle

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::rhi::Resource;

/// Lock-free reference counter embedded in every resource
#[derive(Debug, Default)]
pub struct RefCount {
    count: AtomicU32,
}

impl RefCount {
    /// Counter starting at zero
    pub const fn new() -> Self {
        Self { count: AtomicU32::new(0) }
    }

    /// Current count
    pub fn get(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Increment, returns the new count
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement, returns the remaining count
    ///
    /// # Panics
    ///
    /// Panics on underflow. A release without a matching reference is a
    /// programming error, the counter is left untouched.
    pub fn decrement(&self) -> u32 {
        match self.count.fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1)) {
            Ok(previous) => previous - 1,
            Err(_) => panic!("reference count underflow (release without matching reference)"),
        }
    }
}

/// Counted smart handle to a resource
///
/// Creating or cloning a `Ptr` adds a reference, dropping it releases one.
/// The resource self-destructs when the last reference goes away; the memory
/// is freed once the last `Ptr` is gone.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_rhi::galaxy3d::rhi::{Ptr, Buffer};
///
/// fn keep_alive(buffer: &Ptr<dyn Buffer>) -> Ptr<dyn Buffer> {
///     // +1 reference, released when the returned handle is dropped
///     buffer.clone()
/// }
/// ```
pub struct Ptr<T: ?Sized + Resource> {
    resource: Arc<T>,
}

impl<T: Resource> Ptr<T> {
    /// Wrap a freshly created resource
    pub fn new(resource: T) -> Self {
        Self::from_arc(Arc::new(resource))
    }
}

impl<T: ?Sized + Resource> Ptr<T> {
    /// Wrap a shared resource, adding one reference
    ///
    /// Backends use this to hand out trait-object handles:
    /// `Ptr::from_arc(Arc::new(buffer) as Arc<dyn Buffer>)`.
    pub fn from_arc(resource: Arc<T>) -> Self {
        resource.add_reference();
        Self { resource }
    }

    /// Current number of references on the resource
    pub fn reference_count(&self) -> u32 {
        self.resource.reference_count()
    }

    /// Whether both handles refer to the same resource
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.resource, &b.resource)
    }

    /// Underlying shared pointer
    pub fn as_arc(&self) -> &Arc<T> {
        &self.resource
    }
}

impl<T: ?Sized + Resource> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self::from_arc(Arc::clone(&self.resource))
    }
}

impl<T: ?Sized + Resource> Drop for Ptr<T> {
    fn drop(&mut self) {
        self.resource.release_reference();
    }
}

impl<T: ?Sized + Resource> Deref for Ptr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.resource
    }
}

impl<T: ?Sized + Resource> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ptr")
            .field("type", &self.resource.resource_type())
            .field("name", &self.resource.debug_name())
            .field("native", &self.resource.native_handle())
            .field("references", &self.resource.reference_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "ref_count_tests.rs"]
mod tests;
