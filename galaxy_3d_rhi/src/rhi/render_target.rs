/// Framebuffers, swap chains and the render target abstraction over both

use raw_window_handle::RawWindowHandle;

use crate::error::{Error, Result};
use crate::rhi::{NativeHandle, Ptr, RenderPass, Resource, Texture, TextureFlags};

/// One texture attached to a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferAttachment {
    pub texture: Ptr<dyn Texture>,
    pub mip_level: u32,
}

impl FramebufferAttachment {
    pub fn new(texture: &Ptr<dyn Texture>) -> Self {
        Self {
            texture: texture.clone(),
            mip_level: 0,
        }
    }

    /// Size of the attached mip level
    pub fn size(&self) -> (u32, u32) {
        (
            (self.texture.width() >> self.mip_level).max(1),
            (self.texture.height() >> self.mip_level).max(1),
        )
    }
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone, Default)]
pub struct FramebufferDesc {
    pub color_attachments: Vec<FramebufferAttachment>,
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
}

/// Check attachments against the render pass, returns the framebuffer size
pub fn validate_framebuffer(render_pass: &dyn RenderPass, desc: &FramebufferDesc) -> Result<(u32, u32)> {
    if desc.color_attachments.len() != render_pass.color_formats().len() {
        return Err(Error::InvalidDescriptor(format!(
            "framebuffer has {} color attachments, render pass '{}' expects {}",
            desc.color_attachments.len(),
            render_pass.debug_name(),
            render_pass.color_formats().len()
        )));
    }
    if desc.depth_stencil_attachment.is_some() != render_pass.depth_stencil_format().is_some() {
        return Err(Error::InvalidDescriptor(format!(
            "framebuffer depth attachment does not match render pass '{}'",
            render_pass.debug_name()
        )));
    }

    let expected_formats = render_pass
        .color_formats()
        .iter()
        .copied()
        .chain(render_pass.depth_stencil_format());
    let attachments = desc.color_attachments.iter().chain(desc.depth_stencil_attachment.as_ref());

    let mut size = None;
    for (attachment, expected) in attachments.zip(expected_formats) {
        let texture = &attachment.texture;
        if texture.format() != expected {
            return Err(Error::InvalidDescriptor(format!(
                "attachment '{}' has format {:?}, render pass expects {:?}",
                texture.debug_name(),
                texture.format(),
                expected
            )));
        }
        if !texture.desc().flags.contains(TextureFlags::RENDER_TARGET) {
            return Err(Error::InvalidDescriptor(format!(
                "attachment '{}' is not a render target texture",
                texture.debug_name()
            )));
        }
        if texture.desc().sample_count != render_pass.sample_count() {
            return Err(Error::InvalidDescriptor(format!(
                "attachment '{}' has {} samples, render pass expects {}",
                texture.debug_name(),
                texture.desc().sample_count,
                render_pass.sample_count()
            )));
        }
        if attachment.mip_level >= texture.desc().mip_levels {
            return Err(Error::InvalidDescriptor(format!(
                "attachment '{}' mip level {} out of range",
                texture.debug_name(),
                attachment.mip_level
            )));
        }
        let attachment_size = attachment.size();
        match size {
            None => size = Some(attachment_size),
            Some(existing) if existing != attachment_size => {
                return Err(Error::InvalidDescriptor(format!(
                    "attachment '{}' is {}x{}, other attachments are {}x{}",
                    texture.debug_name(),
                    attachment_size.0,
                    attachment_size.1,
                    existing.0,
                    existing.1
                )));
            }
            Some(_) => {}
        }
    }

    size.ok_or_else(|| Error::InvalidDescriptor("framebuffer has no attachment".to_string()))
}

/// Off-screen render target made of textures
pub trait Framebuffer: Resource {
    fn render_pass(&self) -> &Ptr<dyn RenderPass>;

    fn desc(&self) -> &FramebufferDesc;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn sample_count(&self) -> u32 {
        self.render_pass().sample_count()
    }
}

/// Descriptor for creating a swap chain
///
/// The window handle is only read during creation and is not retained.
#[derive(Debug, Clone, Copy)]
pub struct SwapChainDesc {
    pub window: RawWindowHandle,
    pub width: u32,
    pub height: u32,
    /// 0 = present immediately, N = wait for N vertical blanks
    pub vsync_interval: u32,
}

impl SwapChainDesc {
    pub fn new(window: RawWindowHandle, width: u32, height: u32) -> Self {
        Self {
            window,
            width,
            height,
            vsync_interval: 1,
        }
    }

    pub fn validate(&self, render_pass: &dyn RenderPass) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDescriptor(format!(
                "swap chain size {}x{} is empty",
                self.width, self.height
            )));
        }
        if render_pass.color_formats().len() != 1 {
            return Err(Error::InvalidDescriptor(format!(
                "swap chain render pass '{}' must have exactly one color attachment",
                render_pass.debug_name()
            )));
        }
        if render_pass.sample_count() != 1 {
            return Err(Error::InvalidDescriptor("swap chain render pass cannot be multisampled".to_string()));
        }
        Ok(())
    }
}

/// Present-capable render target tied to an on-screen surface
///
/// `resize_buffers` must be called between frames and never while a command
/// buffer targeting the old back buffers is still executing.
pub trait SwapChain: Resource {
    fn render_pass(&self) -> &Ptr<dyn RenderPass>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Swap the back buffer; may block on vertical synchronization
    ///
    /// Returns `Error::DeviceLost` when the native device is gone.
    fn present(&self) -> Result<()>;

    /// Recreate the back buffers at a new size
    fn resize_buffers(&self, width: u32, height: u32) -> Result<()>;

    fn vertical_synchronization_interval(&self) -> u32;

    fn set_vertical_synchronization_interval(&self, interval: u32);
}

/// Anything commands can render into
#[derive(Debug, Clone)]
pub enum RenderTarget {
    Framebuffer(Ptr<dyn Framebuffer>),
    SwapChain(Ptr<dyn SwapChain>),
}

impl RenderTarget {
    pub fn width(&self) -> u32 {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.width(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.height(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.height(),
        }
    }

    pub fn render_pass(&self) -> &Ptr<dyn RenderPass> {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.render_pass(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.render_pass(),
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.render_pass().sample_count()
    }

    pub fn native_handle(&self) -> NativeHandle {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.native_handle(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.native_handle(),
        }
    }

    pub fn debug_name(&self) -> &str {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.debug_name(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.debug_name(),
        }
    }

    pub fn is_swap_chain(&self) -> bool {
        matches!(self, RenderTarget::SwapChain(_))
    }
}

impl From<Ptr<dyn Framebuffer>> for RenderTarget {
    fn from(framebuffer: Ptr<dyn Framebuffer>) -> Self {
        RenderTarget::Framebuffer(framebuffer)
    }
}

impl From<Ptr<dyn SwapChain>> for RenderTarget {
    fn from(swap_chain: Ptr<dyn SwapChain>) -> Self {
        RenderTarget::SwapChain(swap_chain)
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
