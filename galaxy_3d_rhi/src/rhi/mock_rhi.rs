/// Mock RHI for unit tests (no GPU required)
///
/// Implements the full backend contract on top of a table of fake native
/// handles, so descriptors, reference counting and the command protocol can
/// be tested without a real graphics API.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::rhi::{
    validate_buffer_update, validate_framebuffer, validate_graphics_program, validate_shader_source,
    validate_vertex_array, log_creation_failure,
    BoundResource, Buffer, BufferDesc, Capabilities, ClearValues, CommandBuffer, CommandExecutor,
    CommandTranslator, ComputePipelineState, ComputePipelineStateDesc, CopyableResource, DrawArguments,
    DrawIndexedArguments, ExecutionReport, Framebuffer, FramebufferDesc, GraphicsPipelineState,
    GraphicsPipelineStateBuilder, GraphicsPipelineStateDesc, GraphicsProgram, IndexBufferBinding,
    MisusePolicy, NativeHandle, Ptr, Rect2D, RenderPass, RenderPassDesc, RenderTarget, Resource,
    ResourceBase, ResourceType, Rhi, RhiFeatures, RhiStats, RootSignature, RootSignatureBuilder,
    RootSignatureDesc, SamplerState, SamplerStateDesc, Shader, ShaderLanguage, ShaderStage, SwapChain,
    SwapChainDesc, Texture, TextureDesc, TextureFormat, VertexArray, VertexAttribute,
    VertexAttributeFormat, VertexAttributes, Viewport, BufferUsage,
};

const SOURCE: &str = "galaxy3d::rhi::MockRhi";

// ============================================================================
// Mock device (native handle table)
// ============================================================================

#[derive(Debug, Default)]
pub struct MockDevice {
    next_handle: AtomicU64,
    live: Mutex<FxHashSet<u64>>,
}

impl MockDevice {
    fn allocate(&self) -> NativeHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;
        self.live.lock().unwrap().insert(raw);
        NativeHandle::new(raw)
    }

    fn release(&self, handle: NativeHandle) {
        let removed = self.live.lock().unwrap().remove(&handle.raw());
        assert!(removed, "native handle {:?} released twice", handle);
    }

    pub fn is_alive(&self, handle: NativeHandle) -> bool {
        self.live.lock().unwrap().contains(&handle.raw())
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

macro_rules! impl_mock_resource {
    ($type:ty, $resource_type:expr) => {
        impl Resource for $type {
            fn resource_base(&self) -> &ResourceBase {
                &self.base
            }

            fn resource_type(&self) -> ResourceType {
                $resource_type
            }

            fn self_destruct(&self) {
                self.device.release(self.base.native_handle());
            }
        }
    };
}

// ============================================================================
// Mock resources
// ============================================================================

pub struct MockBuffer {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: BufferDesc,
    pub data: Mutex<Vec<u8>>,
}

impl_mock_resource!(MockBuffer, ResourceType::Buffer);

impl Buffer for MockBuffer {
    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        validate_buffer_update(&self.desc, offset, data.len())?;
        let start = offset as usize;
        self.data.lock().unwrap()[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

pub struct MockTexture {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: TextureDesc,
}

impl_mock_resource!(MockTexture, ResourceType::Texture);

impl Texture for MockTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

pub struct MockSamplerState {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: SamplerStateDesc,
}

impl_mock_resource!(MockSamplerState, ResourceType::SamplerState);

impl SamplerState for MockSamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }
}

pub struct MockRootSignature {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: RootSignatureDesc,
}

impl_mock_resource!(MockRootSignature, ResourceType::RootSignature);

impl RootSignature for MockRootSignature {
    fn desc(&self) -> &RootSignatureDesc {
        &self.desc
    }
}

pub struct MockShader {
    base: ResourceBase,
    device: Arc<MockDevice>,
    stage: ShaderStage,
    vertex_attributes: Option<VertexAttributes>,
}

impl Resource for MockShader {
    fn resource_base(&self) -> &ResourceBase {
        &self.base
    }

    fn resource_type(&self) -> ResourceType {
        self.stage.resource_type()
    }

    fn self_destruct(&self) {
        self.device.release(self.base.native_handle());
    }
}

impl Shader for MockShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn vertex_attributes(&self) -> Option<&VertexAttributes> {
        self.vertex_attributes.as_ref()
    }
}

pub struct MockGraphicsProgram {
    base: ResourceBase,
    device: Arc<MockDevice>,
    root_signature: Ptr<dyn RootSignature>,
    vertex_attributes: VertexAttributes,
    vertex_shader: Option<Ptr<dyn Shader>>,
    fragment_shader: Option<Ptr<dyn Shader>>,
}

impl_mock_resource!(MockGraphicsProgram, ResourceType::GraphicsProgram);

impl GraphicsProgram for MockGraphicsProgram {
    fn root_signature(&self) -> &Ptr<dyn RootSignature> {
        &self.root_signature
    }

    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_shader(&self) -> Option<&Ptr<dyn Shader>> {
        self.vertex_shader.as_ref()
    }

    fn fragment_shader(&self) -> Option<&Ptr<dyn Shader>> {
        self.fragment_shader.as_ref()
    }
}

pub struct MockGraphicsPipelineState {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: GraphicsPipelineStateDesc,
}

impl_mock_resource!(MockGraphicsPipelineState, ResourceType::GraphicsPipelineState);

impl GraphicsPipelineState for MockGraphicsPipelineState {
    fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

pub struct MockComputePipelineState {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: ComputePipelineStateDesc,
}

impl_mock_resource!(MockComputePipelineState, ResourceType::ComputePipelineState);

impl ComputePipelineState for MockComputePipelineState {
    fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}

pub struct MockVertexArray {
    base: ResourceBase,
    device: Arc<MockDevice>,
    vertex_attributes: VertexAttributes,
    vertex_buffers: Vec<Ptr<dyn Buffer>>,
    index_buffer: Option<IndexBufferBinding>,
}

impl_mock_resource!(MockVertexArray, ResourceType::VertexArray);

impl VertexArray for MockVertexArray {
    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_buffers(&self) -> &[Ptr<dyn Buffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&IndexBufferBinding> {
        self.index_buffer.as_ref()
    }
}

pub struct MockRenderPass {
    base: ResourceBase,
    device: Arc<MockDevice>,
    desc: RenderPassDesc,
}

impl_mock_resource!(MockRenderPass, ResourceType::RenderPass);

impl RenderPass for MockRenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

pub struct MockFramebuffer {
    base: ResourceBase,
    device: Arc<MockDevice>,
    render_pass: Ptr<dyn RenderPass>,
    desc: FramebufferDesc,
    width: u32,
    height: u32,
}

impl_mock_resource!(MockFramebuffer, ResourceType::Framebuffer);

impl Framebuffer for MockFramebuffer {
    fn render_pass(&self) -> &Ptr<dyn RenderPass> {
        &self.render_pass
    }

    fn desc(&self) -> &FramebufferDesc {
        &self.desc
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

pub struct MockSwapChain {
    base: ResourceBase,
    device: Arc<MockDevice>,
    render_pass: Ptr<dyn RenderPass>,
    width: AtomicU32,
    height: AtomicU32,
    vsync_interval: AtomicU32,
    pub present_count: AtomicU32,
    /// Makes the next present report a lost device
    pub lose_device: AtomicBool,
}

impl_mock_resource!(MockSwapChain, ResourceType::SwapChain);

impl SwapChain for MockSwapChain {
    fn render_pass(&self) -> &Ptr<dyn RenderPass> {
        &self.render_pass
    }

    fn width(&self) -> u32 {
        self.width.load(Ordering::Acquire)
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }

    fn present(&self) -> Result<()> {
        if self.lose_device.load(Ordering::Acquire) {
            return Err(Error::DeviceLost("mock device removed".to_string()));
        }
        self.present_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn resize_buffers(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource(format!("cannot resize swap chain to {}x{}", width, height)));
        }
        self.width.store(width, Ordering::Release);
        self.height.store(height, Ordering::Release);
        Ok(())
    }

    fn vertical_synchronization_interval(&self) -> u32 {
        self.vsync_interval.load(Ordering::Acquire)
    }

    fn set_vertical_synchronization_interval(&self, interval: u32) {
        self.vsync_interval.store(interval, Ordering::Release);
    }
}

// ============================================================================
// Mock shader language
// ============================================================================

pub struct MockShaderLanguage {
    device: Arc<MockDevice>,
}

impl MockShaderLanguage {
    fn create_shader(
        &self,
        stage: ShaderStage,
        vertex_attributes: Option<&VertexAttributes>,
        source: &str,
        name: &str,
    ) -> Option<Ptr<dyn Shader>> {
        if let Err(error) = validate_shader_source(stage, source) {
            log_creation_failure(SOURCE, stage.resource_type(), name, &error);
            return None;
        }
        let shader = MockShader {
            base: ResourceBase::new(self.device.allocate(), name),
            device: self.device.clone(),
            stage,
            vertex_attributes: vertex_attributes.cloned(),
        };
        Some(Ptr::from_arc(Arc::new(shader) as Arc<dyn Shader>))
    }
}

impl ShaderLanguage for MockShaderLanguage {
    fn name(&self) -> &str {
        "Mock"
    }

    fn create_vertex_shader_from_source(
        &self,
        vertex_attributes: &VertexAttributes,
        source: &str,
        name: &str,
    ) -> Option<Ptr<dyn Shader>> {
        self.create_shader(ShaderStage::Vertex, Some(vertex_attributes), source, name)
    }

    fn create_fragment_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>> {
        self.create_shader(ShaderStage::Fragment, None, source, name)
    }

    fn create_compute_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>> {
        self.create_shader(ShaderStage::Compute, None, source, name)
    }

    fn create_graphics_program(
        &self,
        root_signature: &Ptr<dyn RootSignature>,
        vertex_attributes: &VertexAttributes,
        vertex_shader: Option<&Ptr<dyn Shader>>,
        fragment_shader: Option<&Ptr<dyn Shader>>,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsProgram>> {
        if let Err(error) = validate_graphics_program(vertex_attributes, vertex_shader, fragment_shader) {
            log_creation_failure(SOURCE, ResourceType::GraphicsProgram, name, &error);
            return None;
        }
        let program = MockGraphicsProgram {
            base: ResourceBase::new(self.device.allocate(), name),
            device: self.device.clone(),
            root_signature: root_signature.clone(),
            vertex_attributes: vertex_attributes.clone(),
            vertex_shader: vertex_shader.cloned(),
            fragment_shader: fragment_shader.cloned(),
        };
        Some(Ptr::from_arc(Arc::new(program) as Arc<dyn GraphicsProgram>))
    }
}

// ============================================================================
// Mock command translator
// ============================================================================

/// Records one line per translated command
#[derive(Debug, Default)]
pub struct MockCommandTranslator {
    pub calls: Vec<String>,
    /// Error returned by every draw, to exercise native failures
    pub draw_error: Option<Error>,
}

impl CommandTranslator for MockCommandTranslator {
    fn set_graphics_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()> {
        self.calls.push(format!("set_graphics_root_signature({})", root_signature.debug_name()));
        Ok(())
    }

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &dyn GraphicsPipelineState) -> Result<()> {
        self.calls.push(format!("set_graphics_pipeline_state({})", pipeline_state.debug_name()));
        Ok(())
    }

    fn set_graphics_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()> {
        self.calls.push(format!("set_graphics_resource({}, {})", root_parameter_index, resource.debug_name()));
        Ok(())
    }

    fn set_vertex_array(&mut self, vertex_array: &dyn VertexArray) -> Result<()> {
        self.calls.push(format!("set_vertex_array({})", vertex_array.debug_name()));
        Ok(())
    }

    fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        self.calls.push(format!("set_viewports({})", viewports.len()));
        Ok(())
    }

    fn set_scissor_rectangles(&mut self, rectangles: &[Rect2D]) -> Result<()> {
        self.calls.push(format!("set_scissor_rectangles({})", rectangles.len()));
        Ok(())
    }

    fn set_render_target(&mut self, render_target: Option<&RenderTarget>) -> Result<()> {
        let name = render_target.map(|target| target.debug_name()).unwrap_or("none");
        self.calls.push(format!("set_render_target({})", name));
        Ok(())
    }

    fn clear(&mut self, values: &ClearValues) -> Result<()> {
        self.calls.push(format!("clear({:#x})", values.flags.bits()));
        Ok(())
    }

    fn draw(&mut self, arguments: &DrawArguments) -> Result<()> {
        if let Some(error) = &self.draw_error {
            return Err(error.clone());
        }
        self.calls.push(format!(
            "draw({}, {})",
            arguments.vertex_count_per_instance, arguments.instance_count
        ));
        Ok(())
    }

    fn draw_indexed(&mut self, arguments: &DrawIndexedArguments) -> Result<()> {
        self.calls.push(format!(
            "draw_indexed({}, {})",
            arguments.index_count_per_instance, arguments.instance_count
        ));
        Ok(())
    }

    fn set_compute_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()> {
        self.calls.push(format!("set_compute_root_signature({})", root_signature.debug_name()));
        Ok(())
    }

    fn set_compute_pipeline_state(&mut self, pipeline_state: &dyn ComputePipelineState) -> Result<()> {
        self.calls.push(format!("set_compute_pipeline_state({})", pipeline_state.debug_name()));
        Ok(())
    }

    fn set_compute_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()> {
        self.calls.push(format!("set_compute_resource({}, {})", root_parameter_index, resource.debug_name()));
        Ok(())
    }

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.calls.push(format!("dispatch_compute({}, {}, {})", group_count_x, group_count_y, group_count_z));
        Ok(())
    }

    fn copy_resource(&mut self, destination: &CopyableResource, source: &CopyableResource) -> Result<()> {
        self.calls.push(format!("copy_resource({}, {})", destination.debug_name(), source.debug_name()));
        Ok(())
    }

    fn resolve_multisample_framebuffer(&mut self, destination: &RenderTarget, source: &dyn Framebuffer) -> Result<()> {
        self.calls.push(format!(
            "resolve_multisample_framebuffer({}, {})",
            destination.debug_name(),
            source.debug_name()
        ));
        Ok(())
    }

    fn set_debug_marker(&mut self, name: &str) -> Result<()> {
        self.calls.push(format!("set_debug_marker({})", name));
        Ok(())
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<()> {
        self.calls.push(format!("begin_debug_event({})", name));
        Ok(())
    }

    fn end_debug_event(&mut self) -> Result<()> {
        self.calls.push("end_debug_event".to_string());
        Ok(())
    }
}

// ============================================================================
// Mock RHI
// ============================================================================

pub struct MockRhi {
    device: Arc<MockDevice>,
    capabilities: Capabilities,
    shader_language: MockShaderLanguage,
    executor: CommandExecutor,
    stats: RhiStats,
    /// Translated calls of the last submission
    pub calls: Vec<String>,
}

impl MockRhi {
    /// Mock backend that only logs protocol misuse
    pub fn new() -> Self {
        Self::with_policy(MisusePolicy::Skip)
    }

    pub fn with_policy(policy: MisusePolicy) -> Self {
        let device = Arc::new(MockDevice::default());
        Self {
            shader_language: MockShaderLanguage { device: device.clone() },
            device,
            capabilities: Capabilities {
                device_name: "Mock device".to_string(),
                preferred_swap_chain_color_format: TextureFormat::B8G8R8A8_SRGB,
                preferred_swap_chain_depth_stencil_format: TextureFormat::D32_FLOAT,
                maximum_number_of_viewports: 8,
                maximum_number_of_simultaneous_render_targets: 8,
                maximum_texture_dimension: 16384,
                maximum_uniform_buffer_size: 65536,
                maximum_number_of_bound_resources: 16,
                maximum_number_of_multisamples: 8,
                features: RhiFeatures::all(),
            },
            executor: CommandExecutor::new(policy),
            stats: RhiStats::default(),
            calls: Vec::new(),
        }
    }

    pub fn device(&self) -> &Arc<MockDevice> {
        &self.device
    }

    fn fail<T>(resource_type: ResourceType, name: &str, error: Error) -> Option<T> {
        log_creation_failure(SOURCE, resource_type, name, &error);
        None
    }

    fn base(&self, name: &str) -> ResourceBase {
        ResourceBase::new(self.device.allocate(), name)
    }
}

impl Rhi for MockRhi {
    fn name(&self) -> &str {
        "Mock"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn default_shader_language(&self) -> &dyn ShaderLanguage {
        &self.shader_language
    }

    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Buffer>> {
        if let Err(error) = desc.validate(initial_data) {
            return Self::fail(ResourceType::Buffer, name, error);
        }
        let mut data = vec![0u8; desc.size as usize];
        if let Some(initial) = initial_data {
            data[..initial.len()].copy_from_slice(initial);
        }
        let buffer = MockBuffer {
            base: self.base(name),
            device: self.device.clone(),
            desc: *desc,
            data: Mutex::new(data),
        };
        Some(Ptr::from_arc(Arc::new(buffer) as Arc<dyn Buffer>))
    }

    fn create_texture(&self, desc: &TextureDesc, initial_data: Option<&[u8]>, name: &str) -> Option<Ptr<dyn Texture>> {
        if let Err(error) = desc.validate(initial_data) {
            return Self::fail(ResourceType::Texture, name, error);
        }
        let texture = MockTexture {
            base: self.base(name),
            device: self.device.clone(),
            desc: *desc,
        };
        Some(Ptr::from_arc(Arc::new(texture) as Arc<dyn Texture>))
    }

    fn create_sampler_state(&self, desc: &SamplerStateDesc, name: &str) -> Option<Ptr<dyn SamplerState>> {
        if let Err(error) = desc.validate() {
            return Self::fail(ResourceType::SamplerState, name, error);
        }
        let sampler = MockSamplerState {
            base: self.base(name),
            device: self.device.clone(),
            desc: *desc,
        };
        Some(Ptr::from_arc(Arc::new(sampler) as Arc<dyn SamplerState>))
    }

    fn create_root_signature(&self, desc: &RootSignatureDesc, name: &str) -> Option<Ptr<dyn RootSignature>> {
        if let Err(error) = desc.validate(self.capabilities.maximum_number_of_bound_resources) {
            return Self::fail(ResourceType::RootSignature, name, error);
        }
        let root_signature = MockRootSignature {
            base: self.base(name),
            device: self.device.clone(),
            desc: desc.clone(),
        };
        Some(Ptr::from_arc(Arc::new(root_signature) as Arc<dyn RootSignature>))
    }

    fn create_graphics_pipeline_state(
        &self,
        desc: &GraphicsPipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsPipelineState>> {
        if let Err(error) = desc.validate() {
            return Self::fail(ResourceType::GraphicsPipelineState, name, error);
        }
        let pipeline_state = MockGraphicsPipelineState {
            base: self.base(name),
            device: self.device.clone(),
            desc: desc.clone(),
        };
        Some(Ptr::from_arc(Arc::new(pipeline_state) as Arc<dyn GraphicsPipelineState>))
    }

    fn create_compute_pipeline_state(
        &self,
        desc: &ComputePipelineStateDesc,
        name: &str,
    ) -> Option<Ptr<dyn ComputePipelineState>> {
        if let Err(error) = desc.validate() {
            return Self::fail(ResourceType::ComputePipelineState, name, error);
        }
        let pipeline_state = MockComputePipelineState {
            base: self.base(name),
            device: self.device.clone(),
            desc: desc.clone(),
        };
        Some(Ptr::from_arc(Arc::new(pipeline_state) as Arc<dyn ComputePipelineState>))
    }

    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Ptr<dyn Buffer>],
        index_buffer: Option<IndexBufferBinding>,
        name: &str,
    ) -> Option<Ptr<dyn VertexArray>> {
        if let Err(error) = validate_vertex_array(vertex_attributes, vertex_buffers, index_buffer.as_ref()) {
            return Self::fail(ResourceType::VertexArray, name, error);
        }
        let vertex_array = MockVertexArray {
            base: self.base(name),
            device: self.device.clone(),
            vertex_attributes: vertex_attributes.clone(),
            vertex_buffers: vertex_buffers.to_vec(),
            index_buffer,
        };
        Some(Ptr::from_arc(Arc::new(vertex_array) as Arc<dyn VertexArray>))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc, name: &str) -> Option<Ptr<dyn RenderPass>> {
        if let Err(error) = desc.validate() {
            return Self::fail(ResourceType::RenderPass, name, error);
        }
        let render_pass = MockRenderPass {
            base: self.base(name),
            device: self.device.clone(),
            desc: desc.clone(),
        };
        Some(Ptr::from_arc(Arc::new(render_pass) as Arc<dyn RenderPass>))
    }

    fn create_framebuffer(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &FramebufferDesc,
        name: &str,
    ) -> Option<Ptr<dyn Framebuffer>> {
        let (width, height) = match validate_framebuffer(&**render_pass, desc) {
            Ok(size) => size,
            Err(error) => return Self::fail(ResourceType::Framebuffer, name, error),
        };
        let framebuffer = MockFramebuffer {
            base: self.base(name),
            device: self.device.clone(),
            render_pass: render_pass.clone(),
            desc: desc.clone(),
            width,
            height,
        };
        Some(Ptr::from_arc(Arc::new(framebuffer) as Arc<dyn Framebuffer>))
    }

    fn create_swap_chain(
        &self,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &SwapChainDesc,
        name: &str,
    ) -> Option<Ptr<dyn SwapChain>> {
        if let Err(error) = desc.validate(&**render_pass) {
            return Self::fail(ResourceType::SwapChain, name, error);
        }
        let swap_chain = MockSwapChain {
            base: self.base(name),
            device: self.device.clone(),
            render_pass: render_pass.clone(),
            width: AtomicU32::new(desc.width),
            height: AtomicU32::new(desc.height),
            vsync_interval: AtomicU32::new(desc.vsync_interval),
            present_count: AtomicU32::new(0),
            lose_device: AtomicBool::new(false),
        };
        Some(Ptr::from_arc(Arc::new(swap_chain) as Arc<dyn SwapChain>))
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> Result<ExecutionReport> {
        let mut translator = MockCommandTranslator::default();
        let report = self.executor.execute(command_buffer, &mut translator)?;
        self.stats.record_submission(&report);
        self.calls = translator.calls;
        Ok(report)
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> RhiStats {
        RhiStats {
            live_resources: self.device.live_count() as u64,
            ..self.stats
        }
    }
}

// ============================================================================
// Triangle scene (resources shared by many tests)
// ============================================================================

/// Zero-parameter root signature, one float2 attribute, trivial shaders
pub struct TriangleScene {
    pub root_signature: Ptr<dyn RootSignature>,
    pub vertex_attributes: VertexAttributes,
    pub vertex_shader: Ptr<dyn Shader>,
    pub fragment_shader: Ptr<dyn Shader>,
    pub program: Ptr<dyn GraphicsProgram>,
    pub render_pass: Ptr<dyn RenderPass>,
    pub pipeline_state: Ptr<dyn GraphicsPipelineState>,
    pub vertex_buffer: Ptr<dyn Buffer>,
    pub vertex_array: Ptr<dyn VertexArray>,
}

impl TriangleScene {
    pub fn new(rhi: &dyn Rhi) -> Self {
        let root_signature = rhi
            .create_root_signature(&RootSignatureBuilder::new().build(), "root signature")
            .unwrap();
        let vertex_attributes = VertexAttributes::new(vec![VertexAttribute::per_vertex(
            "Position",
            "POSITION",
            VertexAttributeFormat::Float2,
        )]);
        let language = rhi.default_shader_language();
        let vertex_shader = language
            .create_vertex_shader_from_source(&vertex_attributes, "vertex main", "vertex shader")
            .unwrap();
        let fragment_shader = language
            .create_fragment_shader_from_source("fragment main", "fragment shader")
            .unwrap();
        let program = language
            .create_graphics_program(
                &root_signature,
                &vertex_attributes,
                Some(&vertex_shader),
                Some(&fragment_shader),
                "program",
            )
            .unwrap();
        let render_pass = rhi
            .create_render_pass(&RenderPassDesc::new(&[TextureFormat::R8G8B8A8_UNORM], None), "render pass")
            .unwrap();
        let pipeline_state = rhi
            .create_graphics_pipeline_state(
                &GraphicsPipelineStateBuilder::new(&root_signature, &program, &vertex_attributes, &render_pass).build(),
                "pipeline state",
            )
            .unwrap();
        let vertices: [[f32; 2]; 3] = [[0.0, 0.5], [0.5, -0.5], [-0.5, -0.5]];
        let vertex_buffer = rhi
            .create_buffer(
                &BufferDesc::for_data(&vertices, BufferUsage::VERTEX),
                Some(bytemuck::cast_slice(&vertices)),
                "vertex buffer",
            )
            .unwrap();
        let vertex_array = rhi
            .create_vertex_array(&vertex_attributes, &[vertex_buffer.clone()], None, "vertex array")
            .unwrap();

        Self {
            root_signature,
            vertex_attributes,
            vertex_shader,
            fragment_shader,
            program,
            render_pass,
            pipeline_state,
            vertex_buffer,
            vertex_array,
        }
    }

    /// Color render target matching the scene's render pass
    pub fn framebuffer(&self, rhi: &dyn Rhi, width: u32, height: u32) -> Ptr<dyn Framebuffer> {
        let texture = rhi
            .create_texture(
                &TextureDesc::new_2d(width, height, TextureFormat::R8G8B8A8_UNORM, crate::rhi::TextureFlags::RENDER_TARGET),
                None,
                "color",
            )
            .unwrap();
        let desc = FramebufferDesc {
            color_attachments: vec![crate::rhi::FramebufferAttachment::new(&texture)],
            depth_stencil_attachment: None,
        };
        rhi.create_framebuffer(&self.render_pass, &desc, "framebuffer").unwrap()
    }
}

// ============================================================================
// Capture logger
// ============================================================================

/// Logger keeping entries in memory
///
/// Only entries logged from the thread that created it are kept, so tests
/// running in parallel do not see each other's diagnostics.
#[derive(Clone)]
pub struct CaptureLogger {
    owner: ThreadId,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self {
            owner: thread::current().id(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// True if an entry of `severity` contains `text`
    pub fn contains(&self, severity: LogSeverity, text: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.severity == severity && entry.message.contains(text))
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if thread::current().id() == self.owner {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

#[cfg(test)]
#[path = "mock_rhi_tests.rs"]
mod tests;
