/// Sampler state trait and descriptor

use glam::Vec4;

use crate::error::{Error, Result};
use crate::rhi::{CompareOp, Resource};

/// Texel filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel
    Point,
    /// Linear interpolation
    Linear,
}

/// Texture coordinate addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Descriptor for creating a sampler state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerStateDesc {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub mip_filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub mip_lod_bias: f32,
    /// 1 = anisotropic filtering disabled
    pub max_anisotropy: u32,
    /// Comparison sampler when set (shadow maps)
    pub compare_op: Option<CompareOp>,
    pub border_color: Vec4,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerStateDesc {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Linear,
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            address_w: AddressMode::Repeat,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            compare_op: None,
            border_color: Vec4::ZERO,
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

impl SamplerStateDesc {
    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.max_anisotropy) {
            return Err(Error::InvalidDescriptor(format!(
                "sampler max anisotropy {} outside 1..=16",
                self.max_anisotropy
            )));
        }
        if self.min_lod > self.max_lod {
            return Err(Error::InvalidDescriptor(format!(
                "sampler min LOD {} greater than max LOD {}",
                self.min_lod, self.max_lod
            )));
        }
        Ok(())
    }
}

/// Sampler state resource trait
pub trait SamplerState: Resource {
    fn desc(&self) -> &SamplerStateDesc;
}
