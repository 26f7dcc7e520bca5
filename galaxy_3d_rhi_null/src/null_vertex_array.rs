/// Vertex array - Null implementation of the VertexArray trait

use galaxy_3d_rhi::galaxy3d::Result;
use galaxy_3d_rhi::galaxy3d::rhi::{
    validate_vertex_array, Buffer, IndexBufferBinding, Ptr, ResourceBase, ResourceType, VertexArray,
    VertexAttributes,
};
use std::sync::Arc;

use crate::null_device::NullDevice;

pub struct NullVertexArray {
    base: ResourceBase,
    device: Arc<NullDevice>,
    vertex_attributes: VertexAttributes,
    /// One buffer per input slot
    vertex_buffers: Vec<Ptr<dyn Buffer>>,
    index_buffer: Option<IndexBufferBinding>,
}

impl NullVertexArray {
    pub fn create(
        device: &Arc<NullDevice>,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Ptr<dyn Buffer>],
        index_buffer: Option<IndexBufferBinding>,
        name: &str,
    ) -> Result<Ptr<dyn VertexArray>> {
        validate_vertex_array(vertex_attributes, vertex_buffers, index_buffer.as_ref())?;

        let vertex_array = NullVertexArray {
            base: ResourceBase::new(device.allocate(ResourceType::VertexArray, name)?, name),
            device: device.clone(),
            vertex_attributes: vertex_attributes.clone(),
            vertex_buffers: vertex_buffers.to_vec(),
            index_buffer,
        };
        Ok(Ptr::from_arc(Arc::new(vertex_array) as Arc<dyn VertexArray>))
    }
}

impl_null_resource!(NullVertexArray, ResourceType::VertexArray);

impl VertexArray for NullVertexArray {
    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_buffers(&self) -> &[Ptr<dyn Buffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&IndexBufferBinding> {
        self.index_buffer.as_ref()
    }
}
