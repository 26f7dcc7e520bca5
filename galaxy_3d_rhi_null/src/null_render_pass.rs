/// Render pass and framebuffer - Null implementations of the RenderPass and Framebuffer traits

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{
    validate_framebuffer, Capabilities, Framebuffer, FramebufferDesc, Ptr, RenderPass, RenderPassDesc,
    ResourceBase, ResourceType,
};
use std::sync::Arc;

use crate::null_device::NullDevice;

pub struct NullRenderPass {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: RenderPassDesc,
}

impl NullRenderPass {
    pub fn create(
        device: &Arc<NullDevice>,
        capabilities: &Capabilities,
        desc: &RenderPassDesc,
        name: &str,
    ) -> Result<Ptr<dyn RenderPass>> {
        desc.validate()?;

        if desc.color_formats.len() as u32 > capabilities.maximum_number_of_simultaneous_render_targets {
            return Err(Error::InvalidDescriptor(format!(
                "render pass has {} color attachments, device supports {}",
                desc.color_formats.len(),
                capabilities.maximum_number_of_simultaneous_render_targets
            )));
        }
        if desc.sample_count > capabilities.maximum_number_of_multisamples {
            return Err(Error::InvalidDescriptor(format!(
                "render pass sample count {} exceeds the device maximum {}",
                desc.sample_count, capabilities.maximum_number_of_multisamples
            )));
        }

        let render_pass = NullRenderPass {
            base: ResourceBase::new(device.allocate(ResourceType::RenderPass, name)?, name),
            device: device.clone(),
            desc: desc.clone(),
        };
        Ok(Ptr::from_arc(Arc::new(render_pass) as Arc<dyn RenderPass>))
    }
}

impl_null_resource!(NullRenderPass, ResourceType::RenderPass);

impl RenderPass for NullRenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

/// Null framebuffer
///
/// Holds references to its render pass and attachment textures.
pub struct NullFramebuffer {
    base: ResourceBase,
    device: Arc<NullDevice>,
    render_pass: Ptr<dyn RenderPass>,
    desc: FramebufferDesc,
    width: u32,
    height: u32,
}

impl NullFramebuffer {
    pub fn create(
        device: &Arc<NullDevice>,
        render_pass: &Ptr<dyn RenderPass>,
        desc: &FramebufferDesc,
        name: &str,
    ) -> Result<Ptr<dyn Framebuffer>> {
        let (width, height) = validate_framebuffer(&**render_pass, desc)?;

        let framebuffer = NullFramebuffer {
            base: ResourceBase::new(device.allocate(ResourceType::Framebuffer, name)?, name),
            device: device.clone(),
            render_pass: render_pass.clone(),
            desc: desc.clone(),
            width,
            height,
        };
        Ok(Ptr::from_arc(Arc::new(framebuffer) as Arc<dyn Framebuffer>))
    }
}

impl_null_resource!(NullFramebuffer, ResourceType::Framebuffer);

impl Framebuffer for NullFramebuffer {
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
