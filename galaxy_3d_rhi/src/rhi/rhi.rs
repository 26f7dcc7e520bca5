/// Rhi trait - backend factory and submission interface

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::rhi::{
    Buffer, BufferDesc, Capabilities, CommandBuffer, ComputePipelineState, ComputePipelineStateDesc,
    ExecutionReport, Framebuffer, FramebufferDesc, GraphicsPipelineState, GraphicsPipelineStateDesc,
    IndexBufferBinding, MisusePolicy, Ptr, RenderPass, RenderPassDesc, ResourceType, RootSignature,
    RootSignatureDesc, SamplerState, SamplerStateDesc, ShaderLanguage, SwapChain, SwapChainDesc,
    Texture, TextureDesc, VertexArray, VertexAttributes,
};
use crate::{engine_error, engine_info};

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhiConfig {
    /// Enable native validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Handling of protocol misuse during submission
    pub misuse_policy: MisusePolicy,
}

impl Default for RhiConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Galaxy3D Application".to_string(),
            misuse_policy: MisusePolicy::default(),
        }
    }
}

/// Backend statistics, accumulated since creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RhiStats {
    pub submitted_command_buffers: u64,
    pub executed_commands: u64,
    pub rejected_commands: u64,
    pub draw_calls: u64,
    pub dispatch_calls: u64,
    pub vertices_drawn: u64,
    /// Resources currently alive
    pub live_resources: u64,
}

impl RhiStats {
    /// Fold a submission report into the counters
    pub fn record_submission(&mut self, report: &ExecutionReport) {
        self.submitted_command_buffers += 1;
        self.executed_commands += report.executed as u64;
        self.rejected_commands += report.rejected as u64;
    }
}

// ============================================================================
// Rhi trait
// ============================================================================

/// Main backend trait
///
/// This is the central factory interface for creating GPU resources and the
/// single point where recorded commands become native calls. Implemented by
/// backend-specific types (e.g., NullRhi).
///
/// Factories take `&self` and can be called from any thread. They never
/// panic: on invalid descriptors or native failures they log a diagnostic and
/// return `None`. Submission takes `&mut self`, so it is serialized per backend
/// instance; it may run on a dedicated render thread.
pub trait Rhi: Send + Sync {
    /// Backend name (e.g. "Null", "Vulkan")
    fn name(&self) -> &str;

    /// Capabilities, valid before any resource creation
    fn capabilities(&self) -> &Capabilities;

    /// The backend's shader language
    fn default_shader_language(&self) -> &dyn ShaderLanguage;

    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor
    /// * `initial_data` - Bytes copied to the start of the buffer
    /// * `name` - Debug name
    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Buffer>>;

    /// Create a texture
    ///
    /// # Arguments
    ///
    /// * `desc` - Texture descriptor
    /// * `initial_data` - Mip level 0 texels
    /// * `name` - Debug name
    fn create_texture(&self, desc: &TextureDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Texture>>;

    fn create_sampler_state(&self, desc: &SamplerStateDesc, name: &str) -> Option<Ptr<dyn SamplerState>>;

    fn create_root_signature(&self, desc: &RootSignatureDesc, name: &str) -> Option<Ptr<dyn RootSignature>>;

    /// Create a graphics pipeline state
    ///
    /// Fails when `desc.validate()` fails.
    fn create_graphics_pipeline_state(
        &self,
        desc: &GraphicsPipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsPipelineState>>;

    fn create_compute_pipeline_state(
        &self,
        desc: &ComputePipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn ComputePipelineState>>;

    /// Create a vertex array
    ///
    /// # Arguments
    ///
    /// * `vertex_attributes` - Layout the buffers follow
    /// * `vertex_buffers` - One buffer per input slot
    /// * `index_buffer` - Optional index buffer
    /// * `name` - Debug name
    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Ptr<dyn Buffer>],
        index_buffer: Option<IndexBufferBinding>,
        name: &str,
    ) -> Option<Ptr<dyn VertexArray>>;

    fn create_render_pass(&self, desc: &RenderPassDesc, name: &str) -> Option<Ptr<dyn RenderPass>>;

    fn create_framebuffer(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &FramebufferDesc,
        name: &str,
    ) -> Option<Ptr<dyn Framebuffer>>;

    fn create_swap_chain(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &SwapChainDesc,
        name: &str,
    ) -> Option<Ptr<dyn SwapChain>>;

    /// Execute a command buffer
    ///
    /// Returns `Err` only for fatal native errors (`Error::DeviceLost`), after
    /// which the backend must be rebuilt.
    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> Result<ExecutionReport>;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;

    /// Get statistics about the backend
    fn stats(&self) -> RhiStats;
}

/// Report a factory failure through the logging channel
pub fn log_creation_failure(source: &str, resource_type: ResourceType, name: &str, error: &Error) {
    engine_error!(source, "Failed to create {:?} '{}': {}", resource_type, name, error);
}

// ============================================================================
// Backend registry
// ============================================================================

/// Backend factory function type
pub type RhiFactory = Box<dyn Fn(RhiConfig) -> Result<Box<dyn Rhi>> + Send + Sync>;

/// Registry of backends selectable by name
///
/// Owned by the application (no global registry); backend crates add
/// themselves through their `register` function.
#[derive(Default)]
pub struct BackendRegistry {
    factories: FxHashMap<&'static str, RhiFactory>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend
    ///
    /// # Arguments
    ///
    /// * `name` - Backend name (e.g., "Null")
    /// * `factory` - Factory function to create the backend
    pub fn register<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(RhiConfig) -> Result<Box<dyn Rhi>> + Send + Sync + 'static,
    {
        if self.factories.insert(name, Box::new(factory)).is_some() {
            engine_info!("galaxy3d::rhi::BackendRegistry", "Backend '{}' registered again, replacing it", name);
        }
    }

    /// Create a backend using a registered factory
    pub fn create(&self, name: &str, config: RhiConfig) -> Result<Box<dyn Rhi>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::InitializationFailed(format!("Backend '{}' not found", name)))?;
        factory(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered backend names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "rhi_tests.rs"]
mod tests;
