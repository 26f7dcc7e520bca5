/// Render pass - attachment formats shared by framebuffers, swap chains and pipelines

use crate::error::{Error, Result};
use crate::rhi::{Resource, TextureFormat, MAX_RENDER_TARGETS};

/// Descriptor for creating a render pass
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassDesc {
    /// Color attachment formats, in attachment order
    pub color_formats: Vec<TextureFormat>,
    /// Optional depth/stencil attachment format
    pub depth_stencil_format: Option<TextureFormat>,
    /// Samples per pixel (1 = no MSAA)
    pub sample_count: u32,
}

impl RenderPassDesc {
    pub fn new(color_formats: &[TextureFormat], depth_stencil_format: Option<TextureFormat>) -> Self {
        Self {
            color_formats: color_formats.to_vec(),
            depth_stencil_format,
            sample_count: 1,
        }
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.color_formats.is_empty() && self.depth_stencil_format.is_none() {
            return Err(Error::InvalidDescriptor("render pass has no attachment".to_string()));
        }
        if self.color_formats.len() > MAX_RENDER_TARGETS {
            return Err(Error::InvalidDescriptor(format!(
                "render pass has {} color attachments, maximum is {}",
                self.color_formats.len(),
                MAX_RENDER_TARGETS
            )));
        }
        if let Some(format) = self.color_formats.iter().find(|format| format.is_depth()) {
            return Err(Error::InvalidDescriptor(format!(
                "depth format {:?} used as a color attachment",
                format
            )));
        }
        if let Some(format) = self.depth_stencil_format {
            if !format.is_depth() {
                return Err(Error::InvalidDescriptor(format!(
                    "color format {:?} used as the depth attachment",
                    format
                )));
            }
        }
        if !matches!(self.sample_count, 1 | 2 | 4 | 8) {
            return Err(Error::InvalidDescriptor(format!(
                "unsupported render pass sample count {}",
                self.sample_count
            )));
        }
        Ok(())
    }
}

/// Render pass resource trait
pub trait RenderPass: Resource {
    fn desc(&self) -> &RenderPassDesc;

    fn color_formats(&self) -> &[TextureFormat] {
        &self.desc().color_formats
    }

    fn depth_stencil_format(&self) -> Option<TextureFormat> {
        self.desc().depth_stencil_format
    }

    fn sample_count(&self) -> u32 {
        self.desc().sample_count
    }
}
