/// Pipeline states - Null implementations of the graphics and compute pipeline state traits

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{
    Capabilities, ComputePipelineState, ComputePipelineStateDesc, GraphicsPipelineState,
    GraphicsPipelineStateDesc, Ptr, ResourceBase, ResourceType,
};
use std::sync::Arc;

use crate::null_device::NullDevice;

/// Null graphics pipeline state
///
/// The descriptor keeps the root signature, program and render pass alive.
pub struct NullGraphicsPipelineState {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: GraphicsPipelineStateDesc,
}

impl NullGraphicsPipelineState {
    pub fn create(
        device: &Arc<NullDevice>,
        capabilities: &Capabilities,
        desc: &GraphicsPipelineStateDesc,
        name: &str,
    ) -> Result<Ptr<dyn GraphicsPipelineState>> {
        desc.validate()?;

        let render_targets = desc.render_target_formats.len() as u32;
        if render_targets > capabilities.maximum_number_of_simultaneous_render_targets {
            return Err(Error::InvalidDescriptor(format!(
                "{} render targets exceed the device maximum {}",
                render_targets, capabilities.maximum_number_of_simultaneous_render_targets
            )));
        }

        let pipeline_state = NullGraphicsPipelineState {
            base: ResourceBase::new(device.allocate(ResourceType::GraphicsPipelineState, name)?, name),
            device: device.clone(),
            desc: desc.clone(),
        };
        Ok(Ptr::from_arc(Arc::new(pipeline_state) as Arc<dyn GraphicsPipelineState>))
    }
}

impl_null_resource!(NullGraphicsPipelineState, ResourceType::GraphicsPipelineState);

impl GraphicsPipelineState for NullGraphicsPipelineState {
    fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

/// Null compute pipeline state
pub struct NullComputePipelineState {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: ComputePipelineStateDesc,
}

impl NullComputePipelineState {
    pub fn create(
        device: &Arc<NullDevice>,
        desc: &ComputePipelineStateDesc,
        name: &str,
    ) -> Result<Ptr<dyn ComputePipelineState>> {
        desc.validate()?;

        let pipeline_state = NullComputePipelineState {
            base: ResourceBase::new(device.allocate(ResourceType::ComputePipelineState, name)?, name),
            device: device.clone(),
            desc: desc.clone(),
        };
        Ok(Ptr::from_arc(Arc::new(pipeline_state) as Arc<dyn ComputePipelineState>))
    }
}

impl_null_resource!(NullComputePipelineState, ResourceType::ComputePipelineState);

impl ComputePipelineState for NullComputePipelineState {
    fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}
