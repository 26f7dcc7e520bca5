/// Buffer - Null implementation of the Buffer trait

use galaxy_3d_rhi::galaxy3d::{Error, Result};
use galaxy_3d_rhi::galaxy3d::rhi::{
    validate_buffer_update, Buffer, BufferDesc, BufferUsage, Capabilities, Ptr, ResourceBase, ResourceType,
};
use std::sync::{Arc, Mutex};

use crate::null_device::NullDevice;

/// Null buffer, backed by host memory
pub struct NullBuffer {
    base: ResourceBase,
    /// Shared native object table
    device: Arc<NullDevice>,
    desc: BufferDesc,
    /// Buffer contents
    data: Mutex<Vec<u8>>,
}

impl NullBuffer {
    /// Validate `desc` and create the buffer with `initial_data` at offset 0
    pub fn create(
        device: &Arc<NullDevice>,
        capabilities: &Capabilities,
        desc: &BufferDesc,
        initial_data: Option<&[u8]>,
        name: &str,
    ) -> Result<Ptr<dyn Buffer>> {
        desc.validate(initial_data)?;
        if desc.usage.contains(BufferUsage::UNIFORM) && desc.size > capabilities.maximum_uniform_buffer_size {
            return Err(Error::InvalidDescriptor(format!(
                "uniform buffer size {} exceeds the device maximum {}",
                desc.size, capabilities.maximum_uniform_buffer_size
            )));
        }

        let length = usize::try_from(desc.size).map_err(|_| Error::OutOfMemory)?;
        let mut data = Vec::new();
        data.try_reserve_exact(length).map_err(|_| Error::OutOfMemory)?;
        data.resize(length, 0u8);
        if let Some(initial) = initial_data {
            data[..initial.len()].copy_from_slice(initial);
        }

        let buffer = NullBuffer {
            base: ResourceBase::new(device.allocate(ResourceType::Buffer, name)?, name),
            device: device.clone(),
            desc: *desc,
            data: Mutex::new(data),
        };
        Ok(Ptr::from_arc(Arc::new(buffer) as Arc<dyn Buffer>))
    }
}

impl_null_resource!(NullBuffer, ResourceType::Buffer);

impl Buffer for NullBuffer {
    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        validate_buffer_update(&self.desc, offset, data.len())?;

        let mut contents = self
            .data
            .lock()
            .map_err(|_| Error::BackendError("Buffer lock poisoned".to_string()))?;
        let start = offset as usize;
        contents[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}
