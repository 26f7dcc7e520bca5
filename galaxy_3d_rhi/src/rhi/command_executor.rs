/// Command executor - backend-independent replay of command buffers
///
/// Walks a command buffer in recorded order, keeps the sticky state, rejects
/// commands whose prerequisites are missing and forwards the accepted ones to
/// a backend `CommandTranslator`. A rejected command is logged and skipped;
/// it never affects the commands that follow it.

use crate::error::{Error, Result};
use crate::rhi::{
    BoundResource, Buffer, BufferUsage, ClearValues, Command, CommandBuffer, CommandKind, ComputePipelineState,
    CopyableResource, DrawArguments, DrawIndexedArguments, Framebuffer, GraphicsPipelineState,
    Rect2D, RenderTarget, Resource, RootSignature, ShaderVisibility, Texture, TextureFlags, VertexArray, Viewport,
};
use crate::{engine_error, engine_trace, engine_warn};

/// Translation of accepted commands into native calls
///
/// Implemented once per backend. Every method receives a command whose
/// prerequisites have already been checked by the executor. Returning a fatal
/// error (`Error::DeviceLost`) aborts the submission; any other error counts
/// the command as rejected and execution continues.
pub trait CommandTranslator {
    fn set_graphics_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()>;

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &dyn GraphicsPipelineState) -> Result<()>;

    fn set_graphics_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()>;

    fn set_vertex_array(&mut self, vertex_array: &dyn VertexArray) -> Result<()>;

    fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()>;

    fn set_scissor_rectangles(&mut self, rectangles: &[Rect2D]) -> Result<()>;

    fn set_render_target(&mut self, render_target: Option<&RenderTarget>) -> Result<()>;

    fn clear(&mut self, values: &ClearValues) -> Result<()>;

    fn draw(&mut self, arguments: &DrawArguments) -> Result<()>;

    fn draw_indexed(&mut self, arguments: &DrawIndexedArguments) -> Result<()>;

    fn set_compute_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()>;

    fn set_compute_pipeline_state(&mut self, pipeline_state: &dyn ComputePipelineState) -> Result<()>;

    fn set_compute_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()>;

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()>;

    fn copy_resource(&mut self, destination: &CopyableResource, source: &CopyableResource) -> Result<()>;

    fn resolve_multisample_framebuffer(&mut self, destination: &RenderTarget, source: &dyn Framebuffer) -> Result<()>;

    fn set_debug_marker(&mut self, name: &str) -> Result<()>;

    fn begin_debug_event(&mut self, name: &str) -> Result<()>;

    fn end_debug_event(&mut self) -> Result<()>;
}

/// What the executor does with a command that breaks the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisusePolicy {
    /// Log, skip, and `debug_assert!` (panics in debug builds only)
    Assert,
    /// Log and skip
    Skip,
}

impl Default for MisusePolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            MisusePolicy::Assert
        } else {
            MisusePolicy::Skip
        }
    }
}

/// Outcome of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionReport {
    /// Commands translated into native calls
    pub executed: u32,
    /// Commands skipped (protocol misuse or non-fatal native failure)
    pub rejected: u32,
}

/// Sticky state tracked while replaying a buffer
#[derive(Default)]
struct ExecutorState<'b> {
    graphics_root_signature: Option<&'b dyn RootSignature>,
    graphics_pipeline_state: Option<&'b dyn GraphicsPipelineState>,
    vertex_array: Option<&'b dyn VertexArray>,
    render_target: Option<&'b RenderTarget>,
    compute_root_signature: Option<&'b dyn RootSignature>,
    compute_pipeline_state: Option<&'b dyn ComputePipelineState>,
    debug_event_depth: u32,
}

/// Shared replay loop used by every backend
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor {
    policy: MisusePolicy,
}

impl CommandExecutor {
    pub fn new(policy: MisusePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MisusePolicy {
        self.policy
    }

    /// Replay `command_buffer` through `translator`
    ///
    /// Returns `Err` only for fatal native errors; everything else is reported
    /// in the `ExecutionReport`.
    pub fn execute<T: CommandTranslator + ?Sized>(
        &self,
        command_buffer: &CommandBuffer,
        translator: &mut T,
    ) -> Result<ExecutionReport> {
        let mut state = ExecutorState::default();
        let mut report = ExecutionReport::default();

        self.execute_commands(command_buffer, translator, &mut state, &mut report)?;

        if state.debug_event_depth > 0 {
            engine_warn!(
                "galaxy3d::rhi::CommandExecutor",
                "{} debug event(s) left open at the end of the command buffer",
                state.debug_event_depth
            );
        }
        engine_trace!(
            "galaxy3d::rhi::CommandExecutor",
            "Executed {} command(s), rejected {}",
            report.executed,
            report.rejected
        );
        Ok(report)
    }

    fn execute_commands<'b, T: CommandTranslator + ?Sized>(
        &self,
        command_buffer: &'b CommandBuffer,
        translator: &mut T,
        state: &mut ExecutorState<'b>,
        report: &mut ExecutionReport,
    ) -> Result<()> {
        for (index, command) in command_buffer.commands().iter().enumerate() {
            if let Command::ExecuteCommandBuffer(nested) = command {
                self.execute_commands(nested, translator, state, report)?;
                continue;
            }

            if let Err(reason) = check(command, state) {
                self.reject(command.kind(), index, &reason);
                report.rejected += 1;
                continue;
            }

            match translate(command, translator) {
                Ok(()) => {
                    apply(command, state);
                    report.executed += 1;
                }
                Err(error) if error.is_fatal() => {
                    engine_error!(
                        "galaxy3d::rhi::CommandExecutor",
                        "Fatal error in {:?} command #{}: {}",
                        command.kind(),
                        index,
                        error
                    );
                    return Err(error);
                }
                Err(error) => {
                    engine_error!(
                        "galaxy3d::rhi::CommandExecutor",
                        "{:?} command #{} failed: {}",
                        command.kind(),
                        index,
                        error
                    );
                    report.rejected += 1;
                }
            }
        }
        Ok(())
    }

    fn reject(&self, kind: CommandKind, index: usize, reason: &str) {
        engine_error!(
            "galaxy3d::rhi::CommandExecutor",
            "Rejected {:?} command #{}: {}",
            kind,
            index,
            reason
        );
        if self.policy == MisusePolicy::Assert {
            debug_assert!(false, "Rejected {:?} command #{}: {}", kind, index, reason);
        }
    }
}

/// Protocol checks; `Err` carries the rejection reason
fn check(command: &Command, state: &ExecutorState<'_>) -> std::result::Result<(), String> {
    match command {
        Command::SetGraphicsResource { root_parameter_index, resource } => check_binding(
            state.graphics_root_signature,
            *root_parameter_index,
            resource,
            ShaderVisibility::ALL_GRAPHICS,
        ),
        Command::SetComputeResource { root_parameter_index, resource } => check_binding(
            state.compute_root_signature,
            *root_parameter_index,
            resource,
            ShaderVisibility::COMPUTE,
        ),
        Command::SetViewports(viewports) if viewports.is_empty() => Err("empty viewport list".to_string()),
        Command::SetScissorRectangles(rectangles) if rectangles.is_empty() => {
            Err("empty scissor rectangle list".to_string())
        }
        Command::Clear(values) => {
            if state.render_target.is_none() {
                return Err("no render target set".to_string());
            }
            if values.flags.is_empty() {
                return Err("clear flags are empty".to_string());
            }
            Ok(())
        }
        Command::Draw(_) => check_draw(state, false),
        Command::DrawIndexed(_) => check_draw(state, true),
        Command::DispatchCompute { .. } => match state.compute_pipeline_state {
            Some(_) => Ok(()),
            None => Err("no compute pipeline state set".to_string()),
        },
        Command::CopyResource { destination, source } => check_copy(destination, source),
        Command::ResolveMultisampleFramebuffer { destination, source } => {
            if source.sample_count() <= 1 {
                return Err(format!("source framebuffer '{}' is not multisampled", source.debug_name()));
            }
            if destination.sample_count() != 1 {
                return Err(format!("destination '{}' is multisampled", destination.debug_name()));
            }
            if (destination.width(), destination.height()) != (source.width(), source.height()) {
                return Err(format!(
                    "resolve size mismatch ({}x{} into {}x{})",
                    source.width(),
                    source.height(),
                    destination.width(),
                    destination.height()
                ));
            }
            Ok(())
        }
        Command::EndDebugEvent if state.debug_event_depth == 0 => {
            Err("end debug event without matching begin".to_string())
        }
        _ => Ok(()),
    }
}

fn check_binding(
    root_signature: Option<&dyn RootSignature>,
    root_parameter_index: u32,
    resource: &BoundResource,
    stages: ShaderVisibility,
) -> std::result::Result<(), String> {
    let root_signature = root_signature.ok_or_else(|| "no root signature set".to_string())?;
    let parameter = root_signature.parameter(root_parameter_index).ok_or_else(|| {
        format!(
            "root signature '{}' declares no parameter {}",
            root_signature.debug_name(),
            root_parameter_index
        )
    })?;
    if !parameter.accepts(resource.kind()) {
        return Err(format!(
            "root parameter {} does not accept {:?} '{}'",
            root_parameter_index,
            resource.kind(),
            resource.debug_name()
        ));
    }
    if !parameter.visibility().intersects(stages) {
        return Err(format!(
            "root parameter {} is not visible to {:?}",
            root_parameter_index, stages
        ));
    }
    let usage_ok = match resource {
        BoundResource::UniformBuffer(buffer) => buffer.usage().contains(BufferUsage::UNIFORM),
        BoundResource::StorageBuffer(buffer) => buffer.usage().contains(BufferUsage::STORAGE),
        BoundResource::Texture(texture) => texture
            .desc()
            .flags
            .intersects(TextureFlags::SHADER_RESOURCE | TextureFlags::UNORDERED_ACCESS),
        BoundResource::Sampler(_) => true,
    };
    if !usage_ok {
        return Err(format!(
            "'{}' was not created for {:?} binding",
            resource.debug_name(),
            resource.kind()
        ));
    }
    Ok(())
}

fn check_draw(state: &ExecutorState<'_>, indexed: bool) -> std::result::Result<(), String> {
    let pipeline_state = state
        .graphics_pipeline_state
        .ok_or_else(|| "no graphics pipeline state set".to_string())?;
    let attributes = &pipeline_state.desc().vertex_attributes;

    if !attributes.is_empty() || indexed {
        let vertex_array = state.vertex_array.ok_or_else(|| {
            format!(
                "pipeline state '{}' reads vertices but no vertex array is set",
                pipeline_state.debug_name()
            )
        })?;
        if vertex_array.vertex_attributes() != attributes {
            return Err(format!(
                "vertex array '{}' does not match the vertex attributes of pipeline state '{}'",
                vertex_array.debug_name(),
                pipeline_state.debug_name()
            ));
        }
        if indexed && vertex_array.index_buffer().is_none() {
            return Err(format!("vertex array '{}' has no index buffer", vertex_array.debug_name()));
        }
    }
    Ok(())
}

fn check_copy(destination: &CopyableResource, source: &CopyableResource) -> std::result::Result<(), String> {
    if destination.native_handle() == source.native_handle() {
        return Err(format!("'{}' copied onto itself", source.debug_name()));
    }
    match (destination, source) {
        (CopyableResource::Buffer(destination), CopyableResource::Buffer(source)) => {
            if source.size() > destination.size() {
                return Err(format!(
                    "buffer '{}' ({} bytes) does not fit into '{}' ({} bytes)",
                    source.debug_name(),
                    source.size(),
                    destination.debug_name(),
                    destination.size()
                ));
            }
            Ok(())
        }
        (CopyableResource::Texture(destination), CopyableResource::Texture(source)) => {
            let (d, s) = (destination.desc(), source.desc());
            if (d.width, d.height, d.format) != (s.width, s.height, s.format) {
                return Err(format!(
                    "texture '{}' ({}x{} {:?}) differs from '{}' ({}x{} {:?})",
                    source.debug_name(),
                    s.width,
                    s.height,
                    s.format,
                    destination.debug_name(),
                    d.width,
                    d.height,
                    d.format
                ));
            }
            Ok(())
        }
        _ => Err("copy between a buffer and a texture".to_string()),
    }
}

fn translate<T: CommandTranslator + ?Sized>(command: &Command, translator: &mut T) -> Result<()> {
    match command {
        Command::SetGraphicsRootSignature(root_signature) => translator.set_graphics_root_signature(&**root_signature),
        Command::SetGraphicsPipelineState(pipeline_state) => translator.set_graphics_pipeline_state(&**pipeline_state),
        Command::SetGraphicsResource { root_parameter_index, resource } => {
            translator.set_graphics_resource(*root_parameter_index, resource)
        }
        Command::SetVertexArray(vertex_array) => translator.set_vertex_array(&**vertex_array),
        Command::SetViewports(viewports) => translator.set_viewports(viewports),
        Command::SetScissorRectangles(rectangles) => translator.set_scissor_rectangles(rectangles),
        Command::SetRenderTarget(render_target) => translator.set_render_target(render_target.as_ref()),
        Command::Clear(values) => translator.clear(values),
        Command::Draw(arguments) => translator.draw(arguments),
        Command::DrawIndexed(arguments) => translator.draw_indexed(arguments),
        Command::SetComputeRootSignature(root_signature) => translator.set_compute_root_signature(&**root_signature),
        Command::SetComputePipelineState(pipeline_state) => translator.set_compute_pipeline_state(&**pipeline_state),
        Command::SetComputeResource { root_parameter_index, resource } => {
            translator.set_compute_resource(*root_parameter_index, resource)
        }
        Command::DispatchCompute { group_count_x, group_count_y, group_count_z } => {
            translator.dispatch_compute(*group_count_x, *group_count_y, *group_count_z)
        }
        Command::CopyResource { destination, source } => translator.copy_resource(destination, source),
        Command::ResolveMultisampleFramebuffer { destination, source } => {
            translator.resolve_multisample_framebuffer(destination, &**source)
        }
        Command::SetDebugMarker(name) => translator.set_debug_marker(name),
        Command::BeginDebugEvent(name) => translator.begin_debug_event(name),
        Command::EndDebugEvent => translator.end_debug_event(),
        Command::ExecuteCommandBuffer(_) => Err(Error::InvalidResource(
            "nested command buffers are expanded by the executor".to_string(),
        )),
    }
}

/// Sticky state update after a successful translation
fn apply<'b>(command: &'b Command, state: &mut ExecutorState<'b>) {
    match command {
        Command::SetGraphicsRootSignature(root_signature) => state.graphics_root_signature = Some(&**root_signature),
        Command::SetGraphicsPipelineState(pipeline_state) => state.graphics_pipeline_state = Some(&**pipeline_state),
        Command::SetVertexArray(vertex_array) => state.vertex_array = Some(&**vertex_array),
        Command::SetRenderTarget(render_target) => state.render_target = render_target.as_ref(),
        Command::SetComputeRootSignature(root_signature) => state.compute_root_signature = Some(&**root_signature),
        Command::SetComputePipelineState(pipeline_state) => state.compute_pipeline_state = Some(&**pipeline_state),
        Command::BeginDebugEvent(_) => state.debug_event_depth += 1,
        Command::EndDebugEvent => state.debug_event_depth -= 1,
        _ => {}
    }
}

#[cfg(test)]
#[path = "command_executor_tests.rs"]
mod tests;
