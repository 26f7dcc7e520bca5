//! Unit tests for RefCount and Ptr

use crate::rhi::{RefCount, Ptr, Resource, ResourceBase, ResourceType, NativeHandle};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Resource that counts how many times it self-destructed
struct ProbeResource {
    base: ResourceBase,
    destroyed: Arc<AtomicU32>,
}

impl ProbeResource {
    fn new(destroyed: Arc<AtomicU32>) -> Self {
        Self {
            base: ResourceBase::new(NativeHandle::new(7), "probe"),
            destroyed,
        }
    }
}

impl Resource for ProbeResource {
    fn resource_base(&self) -> &ResourceBase {
        &self.base
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Buffer
    }

    fn self_destruct(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// REFCOUNT TESTS
// ============================================================================

#[test]
fn test_ref_count_starts_at_zero() {
    let count = RefCount::new();
    assert_eq!(count.get(), 0);
}

#[test]
fn test_ref_count_increment_decrement() {
    let count = RefCount::new();
    assert_eq!(count.increment(), 1);
    assert_eq!(count.increment(), 2);
    assert_eq!(count.decrement(), 1);
    assert_eq!(count.decrement(), 0);
}

#[test]
#[should_panic(expected = "reference count underflow")]
fn test_ref_count_underflow_panics() {
    let count = RefCount::new();
    count.decrement();
}

#[test]
fn test_ref_count_concurrent_increments() {
    let count = Arc::new(RefCount::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let count = Arc::clone(&count);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    count.increment();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(count.get(), 8000);
}

// ============================================================================
// PTR TESTS
// ============================================================================

#[test]
fn test_ptr_new_takes_first_reference() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed.clone()));

    assert_eq!(ptr.reference_count(), 1);
    assert_eq!(ptr.debug_name(), "probe");
    assert_eq!(ptr.native_handle(), NativeHandle::new(7));
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ptr_clone_and_drop_balance() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed.clone()));

    let clones: Vec<_> = (0..3).map(|_| ptr.clone()).collect();
    assert_eq!(ptr.reference_count(), 4);

    drop(clones);
    assert_eq!(ptr.reference_count(), 1);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);

    drop(ptr);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_manual_references_keep_resource_alive() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed.clone()));

    assert_eq!(ptr.add_reference(), 2);
    assert_eq!(ptr.add_reference(), 3);
    assert_eq!(ptr.release_reference(), 2);
    assert_eq!(ptr.release_reference(), 1);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);

    drop(ptr);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_self_destruct_runs_exactly_once() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed.clone()));
    let other = ptr.clone();

    drop(ptr);
    drop(other);

    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ptr_from_arc_trait_object() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let arc: Arc<dyn Resource> = Arc::new(ProbeResource::new(destroyed.clone()));
    let ptr: Ptr<dyn Resource> = Ptr::from_arc(arc);

    assert_eq!(ptr.resource_type(), ResourceType::Buffer);
    assert_eq!(ptr.reference_count(), 1);

    drop(ptr);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ptr_eq_identity() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let a = Ptr::new(ProbeResource::new(destroyed.clone()));
    let b = a.clone();
    let c = Ptr::new(ProbeResource::new(destroyed.clone()));

    assert!(Ptr::ptr_eq(&a, &b));
    assert!(!Ptr::ptr_eq(&a, &c));
}

#[test]
fn test_ptr_shared_across_threads() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let local = ptr.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let extra = local.clone();
                    drop(extra);
                }
                drop(local);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ptr.reference_count(), 1);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ptr_debug_format() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let ptr = Ptr::new(ProbeResource::new(destroyed));
    let text = format!("{:?}", ptr);
    assert!(text.contains("probe"));
    assert!(text.contains("Buffer"));
}
