/// Resource trait - common base of every GPU-owned object

use crate::rhi::RefCount;

/// Kind of a resource, used for diagnostics and leak reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    RootSignature,
    GraphicsProgram,
    VertexArray,
    RenderPass,
    Framebuffer,
    SwapChain,
    Buffer,
    Texture,
    SamplerState,
    VertexShader,
    FragmentShader,
    ComputeShader,
    GraphicsPipelineState,
    ComputePipelineState,
}

/// Opaque backend-assigned native handle
///
/// The value is meaningful only to the backend that produced it. `NativeHandle::NULL`
/// is never assigned to a live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Handle that never refers to a live native object
    pub const NULL: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// State shared by every resource implementation
///
/// Backends embed one `ResourceBase` in each resource type and return it from
/// `Resource::resource_base()`.
#[derive(Debug)]
pub struct ResourceBase {
    ref_count: RefCount,
    native_handle: NativeHandle,
    debug_name: String,
}

impl ResourceBase {
    /// Create the base with a zero reference count
    ///
    /// The first reference is taken by the `Ptr` that wraps the resource.
    pub fn new(native_handle: NativeHandle, debug_name: &str) -> Self {
        Self {
            ref_count: RefCount::new(),
            native_handle,
            debug_name: debug_name.to_string(),
        }
    }

    pub fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.native_handle
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }
}

/// Base trait of every RHI resource
///
/// Resources are intrusively reference counted. `Ptr<T>` drives the counter
/// automatically; `add_reference` / `release_reference` are exposed for code
/// that needs to hold a reference without a handle (e.g. a shared cache
/// counting itself). When the count reaches zero `self_destruct` runs exactly
/// once, which is where backends release their native objects.
pub trait Resource: Send + Sync {
    /// Embedded base (reference count, native handle, debug name)
    fn resource_base(&self) -> &ResourceBase;

    /// Kind of this resource
    fn resource_type(&self) -> ResourceType;

    /// Release backend-native objects; called once when the count reaches zero
    fn self_destruct(&self) {}

    /// Human-readable name attached at creation (diagnostic only)
    fn debug_name(&self) -> &str {
        self.resource_base().debug_name()
    }

    /// Backend-assigned opaque handle
    fn native_handle(&self) -> NativeHandle {
        self.resource_base().native_handle()
    }

    /// Current number of references
    fn reference_count(&self) -> u32 {
        self.resource_base().ref_count().get()
    }

    /// Add a reference, returns the new count
    fn add_reference(&self) -> u32 {
        self.resource_base().ref_count().increment()
    }

    /// Release a reference, returns the remaining count
    ///
    /// # Panics
    ///
    /// Panics when the count is already zero (double release).
    fn release_reference(&self) -> u32 {
        let remaining = self.resource_base().ref_count().decrement();
        if remaining == 0 {
            self.self_destruct();
        }
        remaining
    }
}
