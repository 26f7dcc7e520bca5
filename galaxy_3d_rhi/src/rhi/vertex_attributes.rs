/// Vertex attributes, index buffers and the vertex array resource

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::rhi::{Buffer, BufferUsage, Ptr, Resource};

/// Format of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// One 32-bit float
    Float1,
    /// Two 32-bit floats
    Float2,
    /// Three 32-bit floats
    Float3,
    /// Four 32-bit floats
    Float4,
    /// Four normalized unsigned bytes
    R8G8B8A8Unorm,
    /// Four unsigned bytes
    R8G8B8A8Uint,
    /// Two signed 16-bit integers
    Short2,
    /// Four signed 16-bit integers
    Short4,
    /// One unsigned 32-bit integer
    Uint1,
}

impl VertexAttributeFormat {
    /// Size in bytes of one element
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 => 4,
            VertexAttributeFormat::Float2 => 8,
            VertexAttributeFormat::Float3 => 12,
            VertexAttributeFormat::Float4 => 16,
            VertexAttributeFormat::R8G8B8A8Unorm => 4,
            VertexAttributeFormat::R8G8B8A8Uint => 4,
            VertexAttributeFormat::Short2 => 4,
            VertexAttributeFormat::Short4 => 8,
            VertexAttributeFormat::Uint1 => 4,
        }
    }

    /// Number of components
    pub fn component_count(&self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 | VertexAttributeFormat::Uint1 => 1,
            VertexAttributeFormat::Float2 | VertexAttributeFormat::Short2 => 2,
            VertexAttributeFormat::Float3 => 3,
            VertexAttributeFormat::Float4
            | VertexAttributeFormat::R8G8B8A8Unorm
            | VertexAttributeFormat::R8G8B8A8Uint
            | VertexAttributeFormat::Short4 => 4,
        }
    }
}

/// Description of one vertex attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute format
    pub format: VertexAttributeFormat,
    /// Name of the attribute in the shader source (e.g. "Position")
    pub name: String,
    /// Semantic name (e.g. "POSITION")
    pub semantic_name: String,
    /// Semantic index
    pub semantic_index: u32,
    /// Vertex buffer slot the attribute is read from
    pub input_slot: u32,
    /// Offset in bytes from the start of the element
    pub aligned_byte_offset: u32,
    /// Stride in bytes between consecutive elements of the slot
    pub stride_in_bytes: u32,
    /// 0 = per-vertex data, N = advance once every N instances
    pub instances_per_element: u32,
}

impl VertexAttribute {
    /// Per-vertex attribute in slot 0, tightly packed
    pub fn per_vertex(name: &str, semantic_name: &str, format: VertexAttributeFormat) -> Self {
        Self {
            format,
            name: name.to_string(),
            semantic_name: semantic_name.to_string(),
            semantic_index: 0,
            input_slot: 0,
            aligned_byte_offset: 0,
            stride_in_bytes: format.size_bytes(),
            instances_per_element: 0,
        }
    }

    pub fn with_semantic_index(mut self, semantic_index: u32) -> Self {
        self.semantic_index = semantic_index;
        self
    }

    pub fn with_layout(mut self, input_slot: u32, aligned_byte_offset: u32, stride_in_bytes: u32) -> Self {
        self.input_slot = input_slot;
        self.aligned_byte_offset = aligned_byte_offset;
        self.stride_in_bytes = stride_in_bytes;
        self
    }

    pub fn per_instance(mut self, instances_per_element: u32) -> Self {
        self.instances_per_element = instances_per_element;
        self
    }
}

/// Ordered, immutable list of vertex attributes
///
/// Shared by vertex shader creation, graphics program creation, pipeline state
/// creation and vertex array creation; all of them must agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexAttributes {
    attributes: Vec<VertexAttribute>,
}

impl VertexAttributes {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// No vertex input (e.g. full-screen triangle generated in the shader)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of vertex buffers a vertex array must provide
    pub fn number_of_input_slots(&self) -> u32 {
        self.attributes
            .iter()
            .map(|attribute| attribute.input_slot.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Check the layout: non-empty semantics, attributes inside their stride,
    /// one stride and step rate per slot, unique (semantic, index) pairs, no gaps
    /// in the slot numbering
    pub fn validate(&self) -> Result<()> {
        let mut slots: FxHashMap<u32, (u32, u32)> = FxHashMap::default();
        let mut semantics: FxHashMap<(&str, u32), usize> = FxHashMap::default();

        for (index, attribute) in self.attributes.iter().enumerate() {
            if attribute.semantic_name.is_empty() {
                return Err(Error::InvalidDescriptor(format!(
                    "vertex attribute {} has no semantic name",
                    index
                )));
            }
            let end = u64::from(attribute.aligned_byte_offset) + u64::from(attribute.format.size_bytes());
            if end > u64::from(attribute.stride_in_bytes) {
                return Err(Error::InvalidDescriptor(format!(
                    "vertex attribute '{}' ends at byte {} beyond its stride {}",
                    attribute.name, end, attribute.stride_in_bytes
                )));
            }
            let layout = (attribute.stride_in_bytes, attribute.instances_per_element);
            if let Some(existing) = slots.insert(attribute.input_slot, layout) {
                if existing != layout {
                    return Err(Error::InvalidDescriptor(format!(
                        "vertex attribute '{}' disagrees on stride or step rate of input slot {}",
                        attribute.name, attribute.input_slot
                    )));
                }
            }
            let key = (attribute.semantic_name.as_str(), attribute.semantic_index);
            if let Some(previous) = semantics.insert(key, index) {
                return Err(Error::InvalidDescriptor(format!(
                    "vertex attributes {} and {} share semantic {}{}",
                    previous, index, attribute.semantic_name, attribute.semantic_index
                )));
            }
        }

        if slots.len() as u32 != self.number_of_input_slots() {
            return Err(Error::InvalidDescriptor("vertex input slots are not contiguous".to_string()));
        }
        Ok(())
    }
}

impl From<Vec<VertexAttribute>> for VertexAttributes {
    fn from(attributes: Vec<VertexAttribute>) -> Self {
        Self::new(attributes)
    }
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 16-bit indices (max 65535 vertices)
    U16,
    /// 32-bit indices (max ~4 billion vertices)
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Index buffer attached to a vertex array
#[derive(Debug, Clone)]
pub struct IndexBufferBinding {
    pub buffer: Ptr<dyn Buffer>,
    pub index_type: IndexType,
}

/// Vertex array resource trait
///
/// Bundles the vertex buffers (one per input slot) and the optional index
/// buffer matching a vertex attribute layout. Holds a reference to every buffer.
pub trait VertexArray: Resource {
    fn vertex_attributes(&self) -> &VertexAttributes;

    fn vertex_buffers(&self) -> &[Ptr<dyn Buffer>];

    fn index_buffer(&self) -> Option<&IndexBufferBinding>;
}

/// Check the inputs of a vertex array creation
pub fn validate_vertex_array(
    attributes: &VertexAttributes,
    vertex_buffers: &[Ptr<dyn Buffer>],
    index_buffer: Option<&IndexBufferBinding>,
) -> Result<()> {
    attributes.validate()?;

    let slots = attributes.number_of_input_slots() as usize;
    if vertex_buffers.len() != slots {
        return Err(Error::InvalidDescriptor(format!(
            "vertex array needs {} vertex buffers, got {}",
            slots,
            vertex_buffers.len()
        )));
    }
    for buffer in vertex_buffers {
        if !buffer.usage().contains(BufferUsage::VERTEX) {
            return Err(Error::InvalidDescriptor(format!(
                "buffer '{}' is not a vertex buffer",
                buffer.debug_name()
            )));
        }
    }
    if let Some(binding) = index_buffer {
        if !binding.buffer.usage().contains(BufferUsage::INDEX) {
            return Err(Error::InvalidDescriptor(format!(
                "buffer '{}' is not an index buffer",
                binding.buffer.debug_name()
            )));
        }
        if binding.buffer.size() % binding.index_type.size_bytes() as u64 != 0 {
            return Err(Error::InvalidDescriptor(format!(
                "index buffer '{}' size is not a multiple of {:?}",
                binding.buffer.debug_name(),
                binding.index_type
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "vertex_attributes_tests.rs"]
mod tests;
