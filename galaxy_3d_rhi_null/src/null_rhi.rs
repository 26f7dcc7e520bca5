/// NullRhi - backend without a GPU
///
/// Implements the whole backend contract on top of a table of fake native
/// objects. Every factory validates its descriptor exactly like a native
/// backend would, and every accepted command becomes one line in the native
/// call log. Used for tests, headless tools and as the reference backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use colored::*;
use galaxy_3d_rhi::galaxy3d::Result;
use galaxy_3d_rhi::galaxy3d::rhi::{
    log_creation_failure, Buffer, BufferDesc, Capabilities, CommandBuffer, CommandExecutor, ComputePipelineState,
    ComputePipelineStateDesc, ExecutionReport, Framebuffer, FramebufferDesc, GraphicsPipelineState,
    GraphicsPipelineStateDesc, IndexBufferBinding, NativeHandle, Ptr, RenderPass, RenderPassDesc, Resource,
    ResourceType, Rhi, RhiConfig, RhiFeatures, RhiStats, RootSignature, RootSignatureDesc, SamplerState,
    SamplerStateDesc, ShaderLanguage, SwapChain, SwapChainDesc, Texture, TextureDesc, TextureFormat, VertexArray, VertexAttributes,
};
use galaxy_3d_rhi::{engine_debug, engine_info, engine_warn};

use crate::null_buffer::NullBuffer;
use crate::null_command_translator::NullCommandTranslator;
use crate::null_device::NullDevice;
use crate::null_pipeline_state::{NullComputePipelineState, NullGraphicsPipelineState};
use crate::null_render_pass::{NullFramebuffer, NullRenderPass};
use crate::null_root_signature::NullRootSignature;
use crate::null_shader::NullShaderLanguage;
use crate::null_swap_chain::NullSwapChain;
use crate::null_texture::{NullSamplerState, NullTexture};
use crate::null_vertex_array::NullVertexArray;

const SOURCE: &str = "galaxy3d::null::NullRhi";

/// Null backend implementation
pub struct NullRhi {
    /// Shared native object table
    device: Arc<NullDevice>,
    config: RhiConfig,
    capabilities: Capabilities,
    shader_language: NullShaderLanguage,
    executor: CommandExecutor,
    stats: RhiStats,
    /// Native calls of the last submission
    native_calls: Vec<String>,
}

impl NullRhi {
    /// Create a Null backend
    ///
    /// # Arguments
    ///
    /// * `config` - Backend configuration; `enable_validation` turns on the
    ///   native handle checks during submission
    pub fn new(config: RhiConfig) -> Result<Self> {
        let device = Arc::new(NullDevice::new(config.enable_validation));

        engine_info!(
            SOURCE,
            "Null backend created for '{}' (validation: {}, misuse policy: {:?})",
            config.app_name,
            config.enable_validation,
            config.misuse_policy
        );

        Ok(Self {
            shader_language: NullShaderLanguage::new(device.clone()),
            device,
            capabilities: Capabilities {
                device_name: "Null device".to_string(),
                preferred_swap_chain_color_format: TextureFormat::B8G8R8A8_SRGB,
                preferred_swap_chain_depth_stencil_format: TextureFormat::D32_FLOAT,
                maximum_number_of_viewports: 16,
                maximum_number_of_simultaneous_render_targets: 8,
                maximum_texture_dimension: 16384,
                maximum_uniform_buffer_size: 65536,
                maximum_number_of_bound_resources: 64,
                maximum_number_of_multisamples: 8,
                features: RhiFeatures::all(),
            },
            executor: CommandExecutor::new(config.misuse_policy),
            stats: RhiStats::default(),
            native_calls: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &RhiConfig {
        &self.config
    }

    /// Native calls made by the last submission, in order
    pub fn native_call_log(&self) -> &[String] {
        &self.native_calls
    }

    /// Whether `handle` still refers to a live native object
    pub fn is_native_handle_alive(&self, handle: NativeHandle) -> bool {
        self.device.is_alive(handle)
    }

    /// Live native objects grouped by resource type
    pub fn live_resources_by_type(&self) -> BTreeMap<ResourceType, usize> {
        self.device.live_by_type()
    }

    /// Frames presented by all swap chains of this backend
    pub fn presented_frames(&self) -> u64 {
        self.device.presented_frames()
    }

    /// Make every following submission, present and wait fail with `DeviceLost`
    pub fn simulate_device_lost(&self) {
        engine_warn!(SOURCE, "Simulating device removal");
        self.device.lose();
    }

    /// Lose the device after `native_calls` more native calls, possibly in
    /// the middle of a submission
    pub fn simulate_device_lost_after(&self, native_calls: u64) {
        engine_warn!(SOURCE, "Simulating device removal after {} native calls", native_calls);
        self.device.lose_after(native_calls);
    }

    /// Print a colored summary of the backend statistics
    pub fn print_stats_report(&self) {
        let stats = self.stats();

        println!("\n{}", "=== Null Backend Statistics ===".bright_blue().bold());
        println!("  {} {}", "Command buffers:".white().bold(), stats.submitted_command_buffers);
        println!("  {} {}", "Executed commands:".green(), stats.executed_commands);
        if stats.rejected_commands > 0 {
            println!("  {} {}", "Rejected commands:".red().bold(), stats.rejected_commands);
        }
        println!("  {} {}", "Draw calls:".cyan(), stats.draw_calls);
        println!("  {} {}", "Dispatches:".cyan(), stats.dispatch_calls);
        println!("  {} {}", "Vertices:".cyan(), stats.vertices_drawn);

        let live = self.live_resources_by_type();
        if live.is_empty() {
            println!("  {}", "✓ No live resources".green().bold());
        } else {
            println!("  {} {}", "Live resources:".yellow().bold(), stats.live_resources);
            for (resource_type, count) in &live {
                println!("    {} {}", format!("{:?}:", resource_type).bright_black(), count);
            }
        }

        println!("{}\n", "===============================".bright_blue().bold());
    }

    fn created<T: ?Sized + Resource>(
        resource_type: ResourceType,
        name: &str,
        result: Result<Ptr<T>>,
    ) -> Option<Ptr<T>> {
        match result {
            Ok(resource) => {
                engine_debug!(SOURCE, "Created {:?} '{}'", resource_type, name);
                Some(resource)
            }
            Err(error) => {
                log_creation_failure(SOURCE, resource_type, name, &error);
                None
            }
        }
    }
}

impl Rhi for NullRhi {
    fn name(&self) -> &str {
        "Null"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn default_shader_language(&self) -> &dyn ShaderLanguage {
        &self.shader_language
    }

    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Buffer>> {
        let result = NullBuffer::create(&self.device, &self.capabilities, desc, initial_data, name);
        Self::created(ResourceType::Buffer, name, result)
    }

    fn create_texture(&self, desc: &TextureDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Texture>> {
        let result = NullTexture::create(&self.device, &self.capabilities, desc, initial_data, name);
        Self::created(ResourceType::Texture, name, result)
    }

    fn create_sampler_state(&self, desc: &SamplerStateDesc, name: &str) -> Option<Ptr<dyn SamplerState>> {
        let result = NullSamplerState::create(&self.device, desc, name);
        Self::created(ResourceType::SamplerState, name, result)
    }

    fn create_root_signature(&self, desc: &RootSignatureDesc, name: &str) -> Option<Ptr<dyn RootSignature>> {
        let result = NullRootSignature::create(&self.device, &self.capabilities, desc, name);
        Self::created(ResourceType::RootSignature, name, result)
    }

    fn create_graphics_pipeline_state(
        &self,
        desc: &GraphicsPipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsPipelineState>> {
        let result = NullGraphicsPipelineState::create(&self.device, &self.capabilities, desc, name);
        Self::created(ResourceType::GraphicsPipelineState, name, result)
    }

    fn create_compute_pipeline_state(
        &self,
        desc: &ComputePipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn ComputePipelineState>> {
        let result = NullComputePipelineState::create(&self.device, desc, name);
        Self::created(ResourceType::ComputePipelineState, name, result)
    }

    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Ptr<dyn Buffer>],
        index_buffer: Option<IndexBufferBinding>,
        name: &str,
    ) -> Option<Ptr<dyn VertexArray>> {
        let result = NullVertexArray::create(&self.device, vertex_attributes, vertex_buffers, index_buffer, name);
        Self::created(ResourceType::VertexArray, name, result)
    }

    fn create_render_pass(&self, desc: &RenderPassDesc, name: &str) -> Option<Ptr<dyn RenderPass>> {
        let result = NullRenderPass::create(&self.device, &self.capabilities, desc, name);
        Self::created(ResourceType::RenderPass, name, result)
    }

    fn create_framebuffer(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &FramebufferDesc,
        name: &str,
    ) -> Option<Ptr<dyn Framebuffer>> {
        let result = NullFramebuffer::create(&self.device, render_pass, desc, name);
        Self::created(ResourceType::Framebuffer, name, result)
    }

    fn create_swap_chain(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &SwapChainDesc,
        name: &str,
    ) -> Option<Ptr<dyn SwapChain>> {
        let result = NullSwapChain::create(&self.device, render_pass, desc, name);
        Self::created(ResourceType::SwapChain, name, result)
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> Result<ExecutionReport> {
        self.device.check_device()?;

        let mut translator = NullCommandTranslator::new(&self.device);
        let result = self.executor.execute(command_buffer, &mut translator);
        let (calls, translation) = translator.finish();

        // Calls made before a fatal error still reached the device
        self.stats.draw_calls += translation.draw_calls;
        self.stats.dispatch_calls += translation.dispatch_calls;
        self.stats.vertices_drawn += translation.vertices_drawn;
        self.native_calls = calls;

        let report = result?;
        self.stats.record_submission(&report);
        Ok(report)
    }

    fn wait_idle(&self) -> Result<()> {
        self.device.check_device()
    }

    fn stats(&self) -> RhiStats {
        RhiStats {
            live_resources: self.device.live_count() as u64,
            ..self.stats
        }
    }
}

impl Drop for NullRhi {
    fn drop(&mut self) {
        let live = self.device.live_count();
        if live > 0 {
            // Resources keep the native table alive, this is not a leak yet
            engine_warn!(
                SOURCE,
                "Null backend destroyed with {} live resource(s): {}",
                live,
                self.device.live_names().join(", ")
            );
        } else {
            engine_info!(SOURCE, "Null backend destroyed");
        }
    }
}
