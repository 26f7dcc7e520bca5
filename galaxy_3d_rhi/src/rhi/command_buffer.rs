/// Command buffer - backend-independent recording of GPU work
///
/// Commands are recorded as `Command` values into an append-only list and
/// replayed in order by a backend through the shared `CommandExecutor`. Every
/// command holds counted references to the resources it names, so nothing it
/// uses can be destroyed while the buffer is alive.

use std::sync::Arc;

use bitflags::bitflags;
use glam::Vec4;

use crate::error::{Error, Result};
use crate::rhi::{
    BindingKind, Buffer, ComputePipelineState, ExecutionReport, Framebuffer, GraphicsPipelineState,
    NativeHandle, Ptr, RenderTarget, Resource, Rhi, RootSignature, SamplerState, Texture, VertexArray,
};

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport covering `width` x `height` from the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

bitflags! {
    /// Attachments affected by a clear command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Payload of a clear command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    pub flags: ClearFlags,
    pub color: Vec4,
    pub depth: f32,
    pub stencil: u32,
}

impl ClearValues {
    pub fn color(color: Vec4) -> Self {
        Self {
            flags: ClearFlags::COLOR,
            color,
            depth: 1.0,
            stencil: 0,
        }
    }

    pub fn color_depth(color: Vec4, depth: f32) -> Self {
        Self {
            flags: ClearFlags::COLOR_DEPTH,
            color,
            depth,
            stencil: 0,
        }
    }
}

/// Arguments of a non-indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawArguments {
    pub vertex_count_per_instance: u32,
    pub instance_count: u32,
    pub start_vertex_location: u32,
    pub start_instance_location: u32,
}

impl DrawArguments {
    /// Single instance starting at vertex 0
    pub fn new(vertex_count: u32) -> Self {
        Self {
            vertex_count_per_instance: vertex_count,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        }
    }

    pub fn instanced(vertex_count: u32, instance_count: u32) -> Self {
        Self {
            instance_count,
            ..Self::new(vertex_count)
        }
    }
}

/// Arguments of an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexedArguments {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

impl DrawIndexedArguments {
    pub fn new(index_count: u32) -> Self {
        Self {
            index_count_per_instance: index_count,
            instance_count: 1,
            start_index_location: 0,
            base_vertex_location: 0,
            start_instance_location: 0,
        }
    }

    pub fn instanced(index_count: u32, instance_count: u32) -> Self {
        Self {
            instance_count,
            ..Self::new(index_count)
        }
    }
}

/// Resource bound to a root signature slot
#[derive(Debug, Clone)]
pub enum BoundResource {
    UniformBuffer(Ptr<dyn Buffer>),
    StorageBuffer(Ptr<dyn Buffer>),
    Texture(Ptr<dyn Texture>),
    Sampler(Ptr<dyn SamplerState>),
}

impl BoundResource {
    pub fn kind(&self) -> BindingKind {
        match self {
            BoundResource::UniformBuffer(_) => BindingKind::UniformBuffer,
            BoundResource::StorageBuffer(_) => BindingKind::StorageBuffer,
            BoundResource::Texture(_) => BindingKind::Texture,
            BoundResource::Sampler(_) => BindingKind::Sampler,
        }
    }

    pub fn native_handle(&self) -> NativeHandle {
        match self {
            BoundResource::UniformBuffer(buffer) | BoundResource::StorageBuffer(buffer) => buffer.native_handle(),
            BoundResource::Texture(texture) => texture.native_handle(),
            BoundResource::Sampler(sampler) => sampler.native_handle(),
        }
    }

    pub fn debug_name(&self) -> &str {
        match self {
            BoundResource::UniformBuffer(buffer) | BoundResource::StorageBuffer(buffer) => buffer.debug_name(),
            BoundResource::Texture(texture) => texture.debug_name(),
            BoundResource::Sampler(sampler) => sampler.debug_name(),
        }
    }
}

/// Source or destination of a copy command
#[derive(Debug, Clone)]
pub enum CopyableResource {
    Buffer(Ptr<dyn Buffer>),
    Texture(Ptr<dyn Texture>),
}

impl CopyableResource {
    pub fn native_handle(&self) -> NativeHandle {
        match self {
            CopyableResource::Buffer(buffer) => buffer.native_handle(),
            CopyableResource::Texture(texture) => texture.native_handle(),
        }
    }

    pub fn debug_name(&self) -> &str {
        match self {
            CopyableResource::Buffer(buffer) => buffer.debug_name(),
            CopyableResource::Texture(texture) => texture.debug_name(),
        }
    }
}

impl From<Ptr<dyn Buffer>> for CopyableResource {
    fn from(buffer: Ptr<dyn Buffer>) -> Self {
        CopyableResource::Buffer(buffer)
    }
}

impl From<Ptr<dyn Texture>> for CopyableResource {
    fn from(texture: Ptr<dyn Texture>) -> Self {
        CopyableResource::Texture(texture)
    }
}

/// One recorded command
#[derive(Debug, Clone)]
pub enum Command {
    // Graphics state
    SetGraphicsRootSignature(Ptr<dyn RootSignature>),
    SetGraphicsPipelineState(Ptr<dyn GraphicsPipelineState>),
    SetGraphicsResource {
        root_parameter_index: u32,
        resource: BoundResource,
    },
    SetVertexArray(Ptr<dyn VertexArray>),
    SetViewports(Vec<Viewport>),
    SetScissorRectangles(Vec<Rect2D>),
    /// `None` unbinds the current render target
    SetRenderTarget(Option<RenderTarget>),

    // Operations
    Clear(ClearValues),
    Draw(DrawArguments),
    DrawIndexed(DrawIndexedArguments),

    // Compute
    SetComputeRootSignature(Ptr<dyn RootSignature>),
    SetComputePipelineState(Ptr<dyn ComputePipelineState>),
    SetComputeResource {
        root_parameter_index: u32,
        resource: BoundResource,
    },
    DispatchCompute {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },

    // Resource operations
    CopyResource {
        destination: CopyableResource,
        source: CopyableResource,
    },
    ResolveMultisampleFramebuffer {
        destination: RenderTarget,
        source: Ptr<dyn Framebuffer>,
    },

    // Debug
    SetDebugMarker(String),
    BeginDebugEvent(String),
    EndDebugEvent,

    /// Replay another command buffer inline, sharing the current state
    ExecuteCommandBuffer(Arc<CommandBuffer>),
}

/// Discriminator of a `Command`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    SetGraphicsRootSignature,
    SetGraphicsPipelineState,
    SetGraphicsResource,
    SetVertexArray,
    SetViewports,
    SetScissorRectangles,
    SetRenderTarget,
    Clear,
    Draw,
    DrawIndexed,
    SetComputeRootSignature,
    SetComputePipelineState,
    SetComputeResource,
    DispatchCompute,
    CopyResource,
    ResolveMultisampleFramebuffer,
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
    ExecuteCommandBuffer,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::SetGraphicsRootSignature(_) => CommandKind::SetGraphicsRootSignature,
            Command::SetGraphicsPipelineState(_) => CommandKind::SetGraphicsPipelineState,
            Command::SetGraphicsResource { .. } => CommandKind::SetGraphicsResource,
            Command::SetVertexArray(_) => CommandKind::SetVertexArray,
            Command::SetViewports(_) => CommandKind::SetViewports,
            Command::SetScissorRectangles(_) => CommandKind::SetScissorRectangles,
            Command::SetRenderTarget(_) => CommandKind::SetRenderTarget,
            Command::Clear(_) => CommandKind::Clear,
            Command::Draw(_) => CommandKind::Draw,
            Command::DrawIndexed(_) => CommandKind::DrawIndexed,
            Command::SetComputeRootSignature(_) => CommandKind::SetComputeRootSignature,
            Command::SetComputePipelineState(_) => CommandKind::SetComputePipelineState,
            Command::SetComputeResource { .. } => CommandKind::SetComputeResource,
            Command::DispatchCompute { .. } => CommandKind::DispatchCompute,
            Command::CopyResource { .. } => CommandKind::CopyResource,
            Command::ResolveMultisampleFramebuffer { .. } => CommandKind::ResolveMultisampleFramebuffer,
            Command::SetDebugMarker(_) => CommandKind::SetDebugMarker,
            Command::BeginDebugEvent(_) => CommandKind::BeginDebugEvent,
            Command::EndDebugEvent => CommandKind::EndDebugEvent,
            Command::ExecuteCommandBuffer(_) => CommandKind::ExecuteCommandBuffer,
        }
    }
}

/// Ordered, append-only list of commands
///
/// A buffer is recorded by one thread at a time but is `Send`, so several
/// buffers can be recorded in parallel and handed to a render thread. Submitting
/// never mutates the records; a buffer can be submitted any number of times and
/// reset with `clear()`.
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_rhi::galaxy3d::{Result, rhi::*};
/// # fn record(
/// #     root_signature: &Ptr<dyn RootSignature>,
/// #     pipeline_state: &Ptr<dyn GraphicsPipelineState>,
/// #     vertex_array: &Ptr<dyn VertexArray>,
/// # ) -> Result<CommandBuffer> {
/// let mut command_buffer = CommandBuffer::new();
/// command_buffer.set_graphics_root_signature(root_signature)?;
/// command_buffer.set_graphics_pipeline_state(pipeline_state)?;
/// command_buffer.set_vertex_array(vertex_array)?;
/// command_buffer.draw(DrawArguments::new(3))?;
/// # Ok(command_buffer)
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    ///
    /// Only fails with `Error::OutOfMemory` when the buffer cannot grow.
    pub fn push(&mut self, command: Command) -> Result<()> {
        self.commands.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.commands.push(command);
        Ok(())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every command (and the references they hold) for reuse
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Submit to a backend; shorthand for `rhi.submit_command_buffer(self)`
    pub fn submit_to_rhi(&self, rhi: &mut dyn Rhi) -> Result<ExecutionReport> {
        rhi.submit_command_buffer(self)
    }

    // ===== GRAPHICS STATE =====

    pub fn set_graphics_root_signature(&mut self, root_signature: &Ptr<dyn RootSignature>) -> Result<()> {
        self.push(Command::SetGraphicsRootSignature(root_signature.clone()))
    }

    pub fn set_graphics_pipeline_state(&mut self, pipeline_state: &Ptr<dyn GraphicsPipelineState>) -> Result<()> {
        self.push(Command::SetGraphicsPipelineState(pipeline_state.clone()))
    }

    pub fn set_graphics_resource(&mut self, root_parameter_index: u32, resource: BoundResource) -> Result<()> {
        self.push(Command::SetGraphicsResource { root_parameter_index, resource })
    }

    pub fn set_vertex_array(&mut self, vertex_array: &Ptr<dyn VertexArray>) -> Result<()> {
        self.push(Command::SetVertexArray(vertex_array.clone()))
    }

    pub fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        let mut list = Vec::new();
        list.try_reserve_exact(viewports.len()).map_err(|_| Error::OutOfMemory)?;
        list.extend_from_slice(viewports);
        self.push(Command::SetViewports(list))
    }

    pub fn set_scissor_rectangles(&mut self, rectangles: &[Rect2D]) -> Result<()> {
        let mut list = Vec::new();
        list.try_reserve_exact(rectangles.len()).map_err(|_| Error::OutOfMemory)?;
        list.extend_from_slice(rectangles);
        self.push(Command::SetScissorRectangles(list))
    }

    pub fn set_render_target(&mut self, render_target: impl Into<RenderTarget>) -> Result<()> {
        self.push(Command::SetRenderTarget(Some(render_target.into())))
    }

    pub fn unset_render_target(&mut self) -> Result<()> {
        self.push(Command::SetRenderTarget(None))
    }

    // ===== OPERATIONS =====

    /// Record a clear of the current render target
    pub fn clear_graphics(&mut self, values: ClearValues) -> Result<()> {
        self.push(Command::Clear(values))
    }

    pub fn draw(&mut self, arguments: DrawArguments) -> Result<()> {
        self.push(Command::Draw(arguments))
    }

    pub fn draw_indexed(&mut self, arguments: DrawIndexedArguments) -> Result<()> {
        self.push(Command::DrawIndexed(arguments))
    }

    // ===== COMPUTE =====

    pub fn set_compute_root_signature(&mut self, root_signature: &Ptr<dyn RootSignature>) -> Result<()> {
        self.push(Command::SetComputeRootSignature(root_signature.clone()))
    }

    pub fn set_compute_pipeline_state(&mut self, pipeline_state: &Ptr<dyn ComputePipelineState>) -> Result<()> {
        self.push(Command::SetComputePipelineState(pipeline_state.clone()))
    }

    pub fn set_compute_resource(&mut self, root_parameter_index: u32, resource: BoundResource) -> Result<()> {
        self.push(Command::SetComputeResource { root_parameter_index, resource })
    }

    pub fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.push(Command::DispatchCompute { group_count_x, group_count_y, group_count_z })
    }

    // ===== RESOURCE OPERATIONS =====

    pub fn copy_resource(
        &mut self,
        destination: impl Into<CopyableResource>,
        source: impl Into<CopyableResource>,
    ) -> Result<()> {
        self.push(Command::CopyResource {
            destination: destination.into(),
            source: source.into(),
        })
    }

    pub fn resolve_multisample_framebuffer(
        &mut self,
        destination: impl Into<RenderTarget>,
        source: &Ptr<dyn Framebuffer>,
    ) -> Result<()> {
        self.push(Command::ResolveMultisampleFramebuffer {
            destination: destination.into(),
            source: source.clone(),
        })
    }

    // ===== DEBUG =====

    pub fn set_debug_marker(&mut self, name: &str) -> Result<()> {
        self.push(Command::SetDebugMarker(name.to_string()))
    }

    pub fn begin_debug_event(&mut self, name: &str) -> Result<()> {
        self.push(Command::BeginDebugEvent(name.to_string()))
    }

    pub fn end_debug_event(&mut self) -> Result<()> {
        self.push(Command::EndDebugEvent)
    }

    /// Record a nested command buffer, replayed inline with the current state
    pub fn execute_command_buffer(&mut self, command_buffer: &Arc<CommandBuffer>) -> Result<()> {
        self.push(Command::ExecuteCommandBuffer(Arc::clone(command_buffer)))
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
