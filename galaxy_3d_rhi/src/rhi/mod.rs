/// RHI module - backend contract, resources, descriptors and command protocol

// Module declarations
pub mod ref_count;
pub mod resource;
pub mod buffer;
pub mod texture;
pub mod sampler;
pub mod vertex_attributes;
pub mod root_signature;
pub mod shader;
pub mod render_pass;
pub mod render_target;
pub mod pipeline_state;
pub mod capabilities;
pub mod command_buffer;
pub mod command_executor;
pub mod rhi;

#[cfg(test)]
pub mod mock_rhi;

// Re-export everything from rhi.rs
pub use rhi::*;

// Re-export from other modules
pub use ref_count::*;
pub use resource::*;
pub use buffer::*;
pub use texture::*;
pub use sampler::*;
pub use vertex_attributes::*;
pub use root_signature::*;
pub use shader::*;
pub use render_pass::*;
pub use render_target::*;
pub use pipeline_state::*;
pub use capabilities::*;
pub use command_buffer::*;
pub use command_executor::*;
