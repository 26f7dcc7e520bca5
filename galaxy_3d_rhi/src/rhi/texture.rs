/// Texture trait, texture formats and texture descriptor

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::rhi::Resource;

/// Texture and render target pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth/stencil formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Whether the format can only be used as a depth/stencil attachment
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// Whether the format carries a stencil component
    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT)
    }

    /// Size in bytes of one texel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::D16_UNORM => 2,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB
            | TextureFormat::R32_SFLOAT
            | TextureFormat::D32_FLOAT
            | TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// Texture can be sampled in shaders
        const SHADER_RESOURCE = 1 << 0;
        /// Texture can be a framebuffer attachment
        const RENDER_TARGET = 1 << 1;
        /// Texture can be written by compute shaders
        const UNORDERED_ACCESS = 1 << 2;
        /// Mip chain is generated from level 0 after upload
        const GENERATE_MIPMAPS = 1 << 3;
    }
}

/// Descriptor for creating a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub flags: TextureFlags,
    /// Number of mip levels (1 = no mipmaps)
    pub mip_levels: u32,
    /// Samples per pixel (1 = no MSAA)
    pub sample_count: u32,
}

impl TextureDesc {
    /// Single-level, single-sample 2D texture
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, flags: TextureFlags) -> Self {
        Self {
            width,
            height,
            format,
            flags,
            mip_levels: 1,
            sample_count: 1,
        }
    }

    /// Full mip chain length for the texture size
    pub fn max_mip_levels(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Size in bytes of mip level 0, `None` if it does not fit in a `u64`
    pub fn level0_size(&self) -> Option<u64> {
        u64::from(self.width)
            .checked_mul(u64::from(self.height))?
            .checked_mul(u64::from(self.format.bytes_per_pixel()))
    }

    /// Check the descriptor and optional level-0 data before any native call
    pub fn validate(&self, initial_data: Option<&[u8]>) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDescriptor(format!(
                "texture size {}x{} is empty",
                self.width, self.height
            )));
        }
        let level0_size = self.level0_size().ok_or_else(|| {
            Error::InvalidDescriptor(format!(
                "texture size {}x{} {:?} overflows",
                self.width, self.height, self.format
            ))
        })?;
        if self.mip_levels == 0 || self.mip_levels > self.max_mip_levels() {
            return Err(Error::InvalidDescriptor(format!(
                "texture mip level count {} outside 1..={}",
                self.mip_levels,
                self.max_mip_levels()
            )));
        }
        if !matches!(self.sample_count, 1 | 2 | 4 | 8) {
            return Err(Error::InvalidDescriptor(format!(
                "unsupported texture sample count {}",
                self.sample_count
            )));
        }
        if self.sample_count > 1 {
            if self.mip_levels > 1 {
                return Err(Error::InvalidDescriptor("multisample textures cannot have mipmaps".to_string()));
            }
            if !self.flags.contains(TextureFlags::RENDER_TARGET) {
                return Err(Error::InvalidDescriptor("multisample textures must be render targets".to_string()));
            }
        }
        if self.format.is_depth() && self.flags.contains(TextureFlags::UNORDERED_ACCESS) {
            return Err(Error::InvalidDescriptor("depth textures cannot be unordered access".to_string()));
        }
        if let Some(data) = initial_data {
            if self.sample_count > 1 {
                return Err(Error::InvalidDescriptor("multisample textures cannot be initialized from data".to_string()));
            }
            if (data.len() as u64) < level0_size {
                return Err(Error::InvalidDescriptor(format!(
                    "initial data ({} bytes) smaller than mip level 0 ({} bytes)",
                    data.len(),
                    level0_size
                )));
            }
        }
        Ok(())
    }
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types (e.g., NullTexture).
pub trait Texture: Resource {
    /// Descriptor the texture was created with
    fn desc(&self) -> &TextureDesc;

    fn width(&self) -> u32 {
        self.desc().width
    }

    fn height(&self) -> u32 {
        self.desc().height
    }

    fn format(&self) -> TextureFormat {
        self.desc().format
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
