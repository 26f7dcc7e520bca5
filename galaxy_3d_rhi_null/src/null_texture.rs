/// Texture and sampler - Null implementations of the Texture and SamplerState traits

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{
    Capabilities, Ptr, ResourceBase, ResourceType, SamplerState, SamplerStateDesc, Texture, TextureDesc,
};
use std::sync::Arc;

use crate::null_device::NullDevice;

/// Null texture
///
/// Only the descriptor is kept, texel data is dropped after validation.
pub struct NullTexture {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: TextureDesc,
}

impl NullTexture {
    /// Validate `desc` against the device limits and create the texture
    pub fn create(
        device: &Arc<NullDevice>,
        capabilities: &Capabilities,
        desc: &TextureDesc,
        initial_data: Option<&[u8]>,
        name: &str,
    ) -> Result<Ptr<dyn Texture>> {
        desc.validate(initial_data)?;

        let largest = desc.width.max(desc.height);
        if largest > capabilities.maximum_texture_dimension {
            return Err(Error::InvalidDescriptor(format!(
                "texture dimension {} exceeds the device maximum {}",
                largest, capabilities.maximum_texture_dimension
            )));
        }
        if desc.sample_count > capabilities.maximum_number_of_multisamples {
            return Err(Error::InvalidDescriptor(format!(
                "texture sample count {} exceeds the device maximum {}",
                desc.sample_count, capabilities.maximum_number_of_multisamples
            )));
        }

        let texture = NullTexture {
            base: ResourceBase::new(device.allocate(ResourceType::Texture, name)?, name),
            device: device.clone(),
            desc: *desc,
        };
        Ok(Ptr::from_arc(Arc::new(texture) as Arc<dyn Texture>))
    }
}

impl_null_resource!(NullTexture, ResourceType::Texture);

impl Texture for NullTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

/// Null sampler state
pub struct NullSamplerState {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: SamplerStateDesc,
}

impl NullSamplerState {
    pub fn create(device: &Arc<NullDevice>, desc: &SamplerStateDesc, name: &str) -> Result<Ptr<dyn SamplerState>> {
        desc.validate()?;

        let sampler = NullSamplerState {
            base: ResourceBase::new(device.allocate(ResourceType::SamplerState, name)?, name),
            device: device.clone(),
            desc: *desc,
        };
        Ok(Ptr::from_arc(Arc::new(sampler) as Arc<dyn SamplerState>))
    }
}

impl_null_resource!(NullSamplerState, ResourceType::SamplerState);

impl SamplerState for NullSamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }
}
