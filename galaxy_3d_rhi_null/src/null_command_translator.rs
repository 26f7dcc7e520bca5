/// Command translator - turns accepted commands into Null native calls
///
/// A native call only logs one line and updates the draw counters. When
/// validation is enabled every resource a command references must still own
/// its native object.

use galaxy_3d_rhi::galaxy3d::Result;
use galaxy_3d_rhi::galaxy3d::rhi::{
    BoundResource, ClearValues, CommandTranslator, ComputePipelineState, CopyableResource, DrawArguments,
    DrawIndexedArguments, Framebuffer, GraphicsPipelineState, Rect2D, RenderTarget, Resource, RootSignature,
    VertexArray, Viewport,
};
use galaxy_3d_rhi::engine_trace;

use crate::null_device::NullDevice;

/// Counters of one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub draw_calls: u64,
    pub dispatch_calls: u64,
    pub vertices_drawn: u64,
}

/// Translator used for one submission
pub struct NullCommandTranslator<'a> {
    device: &'a NullDevice,
    /// Native calls in execution order
    calls: Vec<String>,
    stats: TranslationStats,
}

impl<'a> NullCommandTranslator<'a> {
    pub fn new(device: &'a NullDevice) -> Self {
        Self {
            device,
            calls: Vec::new(),
            stats: TranslationStats::default(),
        }
    }

    /// Native calls and counters of the submission
    pub fn finish(self) -> (Vec<String>, TranslationStats) {
        (self.calls, self.stats)
    }

    /// Check the device before any native call
    fn ready(&self) -> Result<()> {
        self.device.check_device()
    }

    fn check_bound(&self, resource: &BoundResource) -> Result<()> {
        match resource {
            BoundResource::UniformBuffer(buffer) | BoundResource::StorageBuffer(buffer) => {
                self.device.check_alive(&**buffer)
            }
            BoundResource::Texture(texture) => self.device.check_alive(&**texture),
            BoundResource::Sampler(sampler) => self.device.check_alive(&**sampler),
        }
    }

    fn check_copyable(&self, resource: &CopyableResource) -> Result<()> {
        match resource {
            CopyableResource::Buffer(buffer) => self.device.check_alive(&**buffer),
            CopyableResource::Texture(texture) => self.device.check_alive(&**texture),
        }
    }

    fn check_target(&self, target: &RenderTarget) -> Result<()> {
        match target {
            RenderTarget::Framebuffer(framebuffer) => self.device.check_alive(&**framebuffer),
            RenderTarget::SwapChain(swap_chain) => self.device.check_alive(&**swap_chain),
        }
    }

    fn record(&mut self, call: String) {
        engine_trace!("galaxy3d::null::NullCommandTranslator", "{}", call);
        self.calls.push(call);
        self.device.record_native_call();
    }
}

impl CommandTranslator for NullCommandTranslator<'_> {
    fn set_graphics_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()> {
        self.ready()?;
        self.device.check_alive(root_signature)?;
        self.record(format!("set_graphics_root_signature({})", root_signature.debug_name()));
        Ok(())
    }

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &dyn GraphicsPipelineState) -> Result<()> {
        self.ready()?;
        self.device.check_alive(pipeline_state)?;
        self.record(format!("set_graphics_pipeline_state({})", pipeline_state.debug_name()));
        Ok(())
    }

    fn set_graphics_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()> {
        self.ready()?;
        self.check_bound(resource)?;
        self.record(format!("set_graphics_resource({}, {})", root_parameter_index, resource.debug_name()));
        Ok(())
    }

    fn set_vertex_array(&mut self, vertex_array: &dyn VertexArray) -> Result<()> {
        self.ready()?;
        self.device.check_alive(vertex_array)?;
        for buffer in vertex_array.vertex_buffers() {
            self.device.check_alive(&**buffer)?;
        }
        if let Some(binding) = vertex_array.index_buffer() {
            self.device.check_alive(&*binding.buffer)?;
        }
        self.record(format!("set_vertex_array({})", vertex_array.debug_name()));
        Ok(())
    }

    fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        self.ready()?;
        self.record(format!("set_viewports({})", viewports.len()));
        Ok(())
    }

    fn set_scissor_rectangles(&mut self, rectangles: &[Rect2D]) -> Result<()> {
        self.ready()?;
        self.record(format!("set_scissor_rectangles({})", rectangles.len()));
        Ok(())
    }

    fn set_render_target(&mut self, target: Option<&RenderTarget>) -> Result<()> {
        self.ready()?;
        match target {
            Some(target) => {
                self.check_target(target)?;
                self.record(format!("set_render_target({})", target.debug_name()));
            }
            None => self.record("set_render_target(none)".to_string()),
        }
        Ok(())
    }

    fn clear(&mut self, values: &ClearValues) -> Result<()> {
        self.ready()?;
        self.record(format!("clear({:#x})", values.flags.bits()));
        Ok(())
    }

    fn draw(&mut self, arguments: &DrawArguments) -> Result<()> {
        self.ready()?;
        self.stats.draw_calls += 1;
        self.stats.vertices_drawn += arguments.vertex_count_per_instance as u64 * arguments.instance_count as u64;
        self.record(format!(
            "draw({}, {})",
            arguments.vertex_count_per_instance, arguments.instance_count
        ));
        Ok(())
    }

    fn draw_indexed(&mut self, arguments: &DrawIndexedArguments) -> Result<()> {
        self.ready()?;
        self.stats.draw_calls += 1;
        self.stats.vertices_drawn += arguments.index_count_per_instance as u64 * arguments.instance_count as u64;
        self.record(format!(
            "draw_indexed({}, {})",
            arguments.index_count_per_instance, arguments.instance_count
        ));
        Ok(())
    }

    fn set_compute_root_signature(&mut self, root_signature: &dyn RootSignature) -> Result<()> {
        self.ready()?;
        self.device.check_alive(root_signature)?;
        self.record(format!("set_compute_root_signature({})", root_signature.debug_name()));
        Ok(())
    }

    fn set_compute_pipeline_state(&mut self, pipeline_state: &dyn ComputePipelineState) -> Result<()> {
        self.ready()?;
        self.device.check_alive(pipeline_state)?;
        self.record(format!("set_compute_pipeline_state({})", pipeline_state.debug_name()));
        Ok(())
    }

    fn set_compute_resource(&mut self, root_parameter_index: u32, resource: &BoundResource) -> Result<()> {
        self.ready()?;
        self.check_bound(resource)?;
        self.record(format!("set_compute_resource({}, {})", root_parameter_index, resource.debug_name()));
        Ok(())
    }

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.ready()?;
        self.stats.dispatch_calls += 1;
        self.record(format!("dispatch_compute({}, {}, {})", group_count_x, group_count_y, group_count_z));
        Ok(())
    }

    fn copy_resource(&mut self, destination: &CopyableResource, source: &CopyableResource) -> Result<()> {
        self.ready()?;
        self.check_copyable(destination)?;
        self.check_copyable(source)?;
        self.record(format!("copy_resource({}, {})", destination.debug_name(), source.debug_name()));
        Ok(())
    }

    fn resolve_multisample_framebuffer(&mut self, destination: &RenderTarget, source: &dyn Framebuffer) -> Result<()> {
        self.ready()?;
        self.check_target(destination)?;
        self.device.check_alive(source)?;
        self.record(format!(
            "resolve_multisample_framebuffer({}, {})",
            destination.debug_name(),
            source.debug_name()
        ));
        Ok(())
    }

    fn set_debug_marker(&mut self, name: &str) -> Result<()> {
        self.ready()?;
        self.record(format!("set_debug_marker({})", name));
        Ok(())
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<()> {
        self.ready()?;
        self.record(format!("begin_debug_event({})", name));
        Ok(())
    }

    fn end_debug_event(&mut self) -> Result<()> {
        self.ready()?;
        self.record("end_debug_event".to_string());
        Ok(())
    }
}
