/// Root signature - Null implementation of the RootSignature trait

use galaxy_3d_rhi::galaxy3d::Result;
use galaxy_3d_rhi::galaxy3d::rhi::{Capabilities, Ptr, ResourceBase, ResourceType, RootSignature, RootSignatureDesc};
use std::sync::Arc;

use crate::null_device::NullDevice;

pub struct NullRootSignature {
    base: ResourceBase,
    device: Arc<NullDevice>,
    desc: RootSignatureDesc,
}

impl NullRootSignature {
    /// Validate the layout against the bound resource limit and create it
    pub fn create(
        device: &Arc<NullDevice>,
        capabilities: &Capabilities,
        desc: &RootSignatureDesc,
        name: &str,
    ) -> Result<Ptr<dyn RootSignature>> {
        desc.validate(capabilities.maximum_number_of_bound_resources)?;

        let root_signature = NullRootSignature {
            base: ResourceBase::new(device.allocate(ResourceType::RootSignature, name)?, name),
            device: device.clone(),
            desc: desc.clone(),
        };
        Ok(Ptr::from_arc(Arc::new(root_signature) as Arc<dyn RootSignature>))
    }
}

impl_null_resource!(NullRootSignature, ResourceType::RootSignature);

impl RootSignature for NullRootSignature {
    fn desc(&self) -> &RootSignatureDesc {
        &self.desc
    }
}
