/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::rhi::Resource;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Vertex buffer
        const VERTEX = 1 << 0;
        /// Index buffer
        const INDEX = 1 << 1;
        /// Uniform/constant buffer
        const UNIFORM = 1 << 2;
        /// Storage buffer (shader read/write)
        const STORAGE = 1 << 3;
        /// Indirect draw/dispatch arguments
        const INDIRECT = 1 << 4;
        /// Source of a copy command
        const COPY_SOURCE = 1 << 5;
        /// Destination of a copy command
        const COPY_DESTINATION = 1 << 6;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

impl BufferDesc {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self { size, usage }
    }

    /// Descriptor sized to hold exactly `data`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_rhi::galaxy3d::rhi::{BufferDesc, BufferUsage};
    ///
    /// let vertices: [[f32; 2]; 3] = [[0.0, 0.5], [0.5, -0.5], [-0.5, -0.5]];
    /// let desc = BufferDesc::for_data(&vertices, BufferUsage::VERTEX);
    /// assert_eq!(desc.size, 24);
    /// ```
    pub fn for_data<T: Pod>(data: &[T], usage: BufferUsage) -> Self {
        Self {
            size: std::mem::size_of_val(data) as u64,
            usage,
        }
    }

    /// Check the descriptor and optional initial data before any native call
    pub fn validate(&self, initial_data: Option<&[u8]>) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidDescriptor("buffer size is zero".to_string()));
        }
        if self.usage.is_empty() {
            return Err(Error::InvalidDescriptor("buffer has no usage flags".to_string()));
        }
        if let Some(data) = initial_data {
            if data.len() as u64 > self.size {
                return Err(Error::InvalidDescriptor(format!(
                    "initial data ({} bytes) exceeds buffer size ({} bytes)",
                    data.len(),
                    self.size
                )));
            }
        }
        Ok(())
    }
}

/// Check that an update of `length` bytes at `offset` fits inside the buffer
pub fn validate_buffer_update(desc: &BufferDesc, offset: u64, length: usize) -> Result<()> {
    let end = offset.checked_add(length as u64);
    match end {
        Some(end) if end <= desc.size => Ok(()),
        _ => Err(Error::InvalidResource(format!(
            "buffer update out of range (offset {}, {} bytes, buffer size {})",
            offset, length, desc.size
        ))),
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., NullBuffer).
pub trait Buffer: Resource {
    /// Descriptor the buffer was created with
    fn desc(&self) -> &BufferDesc;

    /// Size in bytes
    fn size(&self) -> u64 {
        self.desc().size
    }

    /// Usage flags
    fn usage(&self) -> BufferUsage {
        self.desc().usage
    }

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
