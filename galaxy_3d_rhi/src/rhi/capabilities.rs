/// Backend capabilities, available before any resource creation

use bitflags::bitflags;

use crate::rhi::TextureFormat;

bitflags! {
    /// Optional features a backend may support
    ///
    /// Using an unsupported feature is a caller error; backends do not check.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RhiFeatures: u32 {
        const INSTANCED_DRAWING = 1 << 0;
        const BASE_VERTEX = 1 << 1;
        const COMPUTE_SHADER = 1 << 2;
        const STORAGE_BUFFERS = 1 << 3;
        const MULTISAMPLE_RESOLVE = 1 << 4;
        const ANISOTROPIC_FILTERING = 1 << 5;
        const DEBUG_MARKERS = 1 << 6;
        /// Framebuffer origin is the upper-left corner
        const UPPER_LEFT_ORIGIN = 1 << 7;
        /// Clip space depth is [0, 1] instead of [-1, 1]
        const ZERO_TO_ONE_CLIP_Z = 1 << 8;
    }
}

/// Read-only description of what a backend instance supports
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Human readable device name
    pub device_name: String,
    pub preferred_swap_chain_color_format: TextureFormat,
    pub preferred_swap_chain_depth_stencil_format: TextureFormat,
    pub maximum_number_of_viewports: u32,
    pub maximum_number_of_simultaneous_render_targets: u32,
    pub maximum_texture_dimension: u32,
    pub maximum_uniform_buffer_size: u64,
    /// Maximum number of root signature parameters
    pub maximum_number_of_bound_resources: u32,
    pub maximum_number_of_multisamples: u32,
    pub features: RhiFeatures,
}

impl Capabilities {
    /// Whether every feature in `features` is supported
    pub fn supports(&self, features: RhiFeatures) -> bool {
        self.features.contains(features)
    }
}
