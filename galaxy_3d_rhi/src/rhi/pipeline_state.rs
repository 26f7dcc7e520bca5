/// Pipeline state descriptors, builder and resource traits

use crate::error::{Error, Result};
use crate::rhi::{
    GraphicsProgram, Ptr, RenderPass, Resource, RootSignature, Shader, ShaderStage,
    TextureFormat, VertexAttributes,
};

/// Maximum number of simultaneous color render targets
pub const MAX_RENDER_TARGETS: usize = 8;

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Point list
    PointList,
    /// Line list
    LineList,
    /// Line strip
    LineStrip,
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Number of primitives produced by `vertex_count` vertices
    pub fn primitive_count(&self, vertex_count: u32) -> u32 {
        match self {
            PrimitiveTopology::PointList => vertex_count,
            PrimitiveTopology::LineList => vertex_count / 2,
            PrimitiveTopology::LineStrip => vertex_count.saturating_sub(1),
            PrimitiveTopology::TriangleList => vertex_count / 3,
            PrimitiveTopology::TriangleStrip => vertex_count.saturating_sub(2),
        }
    }
}

// ===== RASTERIZER ENUMS =====

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontFace {
    /// Counter-clockwise vertices define front face
    CounterClockwise,
    /// Clockwise vertices define front face
    Clockwise,
}

/// Polygon fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Fill polygons
    Solid,
    /// Draw edges only
    Wireframe,
}

// ===== DEPTH/STENCIL ENUMS =====

/// Comparison operator for depth, stencil and sampler compare tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Never pass
    Never,
    /// Pass if value < reference
    Less,
    /// Pass if value == reference
    Equal,
    /// Pass if value <= reference
    LessOrEqual,
    /// Pass if value > reference
    Greater,
    /// Pass if value != reference
    NotEqual,
    /// Pass if value >= reference
    GreaterOrEqual,
    /// Always pass
    Always,
}

/// Stencil operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    /// Keep current value
    Keep,
    /// Set to zero
    Zero,
    /// Replace with reference value
    Replace,
    /// Increment and clamp to max
    IncrementAndClamp,
    /// Decrement and clamp to zero
    DecrementAndClamp,
    /// Bitwise invert
    Invert,
    /// Increment and wrap around
    IncrementAndWrap,
    /// Decrement and wrap around
    DecrementAndWrap,
}

// ===== BLEND ENUMS =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    SrcAlphaSaturate,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
    /// result = src * srcFactor + dst * dstFactor
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
    /// result = dst * dstFactor - src * srcFactor
    ReverseSubtract,
    /// result = min(src, dst)
    Min,
    /// result = max(src, dst)
    Max,
}

// ===== RASTERIZER STATE =====

/// Depth bias parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    /// Constant depth offset
    pub constant_factor: f32,
    /// Slope-based depth offset
    pub slope_factor: f32,
    /// Maximum depth bias clamp
    pub clamp: f32,
}

/// Rasterizer fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    /// Depth bias (None = disabled)
    pub depth_bias: Option<DepthBias>,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            depth_bias: None,
            depth_clip_enable: true,
            scissor_enable: false,
        }
    }
}

// ===== DEPTH/STENCIL STATE =====

/// Stencil operation state (per-face)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOpState {
    /// Action on stencil test fail
    pub fail_op: StencilOp,
    /// Action on stencil pass + depth pass
    pub pass_op: StencilOp,
    /// Action on stencil pass + depth fail
    pub depth_fail_op: StencilOp,
    /// Comparison operator
    pub compare_op: CompareOp,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
        }
    }
}

/// Depth and stencil testing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enable: bool,
    /// Bits of stencil buffer read for compare
    pub stencil_read_mask: u8,
    /// Bits of stencil buffer written
    pub stencil_write_mask: u8,
    pub front: StencilOpState,
    pub back: StencilOpState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
            stencil_test_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front: StencilOpState::default(),
            back: StencilOpState::default(),
        }
    }
}

// ===== BLEND STATE =====

/// Color write mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriteMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorWriteMask {
    /// All channels enabled
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
    /// No channels enabled
    pub const NONE: Self = Self { r: false, g: false, b: false, a: false };
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Blending of one render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBlendState {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorWriteMask,
}

impl Default for RenderTargetBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorWriteMask::ALL,
        }
    }
}

impl RenderTargetBlendState {
    /// Classic "over" alpha blending
    pub fn alpha_blending() -> Self {
        Self {
            blend_enable: true,
            src_color_factor: BlendFactor::SrcAlpha,
            dst_color_factor: BlendFactor::OneMinusSrcAlpha,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::OneMinusSrcAlpha,
            ..Self::default()
        }
    }
}

/// Color blending state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    /// When false, `render_targets[0]` applies to every target
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlendState; MAX_RENDER_TARGETS],
}

// ===== GRAPHICS PIPELINE STATE =====

/// Descriptor for creating a graphics pipeline state
#[derive(Debug, Clone)]
pub struct GraphicsPipelineStateDesc {
    pub root_signature: Ptr<dyn RootSignature>,
    pub graphics_program: Ptr<dyn GraphicsProgram>,
    pub vertex_attributes: VertexAttributes,
    pub render_pass: Ptr<dyn RenderPass>,
    pub primitive_topology: PrimitiveTopology,
    pub rasterizer_state: RasterizerState,
    pub depth_stencil_state: DepthStencilState,
    pub blend_state: BlendState,
    pub render_target_formats: Vec<TextureFormat>,
    pub depth_stencil_format: Option<TextureFormat>,
}

impl GraphicsPipelineStateDesc {
    /// Check the descriptor before any native call
    pub fn validate(&self) -> Result<()> {
        if self.render_target_formats.is_empty() {
            return Err(Error::InvalidDescriptor(
                "graphics pipeline state needs at least one render target format".to_string(),
            ));
        }
        if self.render_target_formats.len() > MAX_RENDER_TARGETS {
            return Err(Error::InvalidDescriptor(format!(
                "graphics pipeline state has {} render targets, maximum is {}",
                self.render_target_formats.len(),
                MAX_RENDER_TARGETS
            )));
        }
        if self.render_target_formats.as_slice() != self.render_pass.color_formats() {
            return Err(Error::InvalidDescriptor(format!(
                "render target formats {:?} do not match render pass '{}' ({:?})",
                self.render_target_formats,
                self.render_pass.debug_name(),
                self.render_pass.color_formats()
            )));
        }
        if self.depth_stencil_format != self.render_pass.depth_stencil_format() {
            return Err(Error::InvalidDescriptor(format!(
                "depth stencil format {:?} does not match render pass '{}' ({:?})",
                self.depth_stencil_format,
                self.render_pass.debug_name(),
                self.render_pass.depth_stencil_format()
            )));
        }
        if self.graphics_program.vertex_shader().is_none() {
            return Err(Error::InvalidDescriptor(format!(
                "graphics program '{}' has no vertex shader",
                self.graphics_program.debug_name()
            )));
        }
        if !Ptr::ptr_eq(self.graphics_program.root_signature(), &self.root_signature) {
            return Err(Error::InvalidDescriptor(format!(
                "graphics program '{}' was created for another root signature than '{}'",
                self.graphics_program.debug_name(),
                self.root_signature.debug_name()
            )));
        }
        if self.graphics_program.vertex_attributes() != &self.vertex_attributes {
            return Err(Error::InvalidDescriptor(format!(
                "vertex attributes do not match graphics program '{}'",
                self.graphics_program.debug_name()
            )));
        }
        self.vertex_attributes.validate()
    }
}

/// Builder filling a graphics pipeline state descriptor with defaults
///
/// Defaults: triangle list, back-face culling, counter-clockwise front face,
/// solid fill, depth test `Less` with writes, no blending, render target
/// formats taken from the render pass.
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_rhi::galaxy3d::rhi::*;
/// # fn build(
/// #     root_signature: &Ptr<dyn RootSignature>,
/// #     program: &Ptr<dyn GraphicsProgram>,
/// #     attributes: &VertexAttributes,
/// #     render_pass: &Ptr<dyn RenderPass>,
/// # ) -> GraphicsPipelineStateDesc {
/// GraphicsPipelineStateBuilder::new(root_signature, program, attributes, render_pass)
///     .primitive_topology(PrimitiveTopology::TriangleStrip)
///     .build()
/// # }
/// ```
pub struct GraphicsPipelineStateBuilder {
    desc: GraphicsPipelineStateDesc,
}

impl GraphicsPipelineStateBuilder {
    pub fn new(
        root_signature: &Ptr<dyn RootSignature>,
        graphics_program: &Ptr<dyn GraphicsProgram>,
        vertex_attributes: &VertexAttributes,
        render_pass: &Ptr<dyn RenderPass>,
    ) -> Self {
        Self {
            desc: GraphicsPipelineStateDesc {
                root_signature: root_signature.clone(),
                graphics_program: graphics_program.clone(),
                vertex_attributes: vertex_attributes.clone(),
                render_pass: render_pass.clone(),
                primitive_topology: PrimitiveTopology::TriangleList,
                rasterizer_state: RasterizerState::default(),
                depth_stencil_state: DepthStencilState::default(),
                blend_state: BlendState::default(),
                render_target_formats: render_pass.color_formats().to_vec(),
                depth_stencil_format: render_pass.depth_stencil_format(),
            },
        }
    }

    pub fn primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.desc.primitive_topology = topology;
        self
    }

    pub fn rasterizer_state(mut self, state: RasterizerState) -> Self {
        self.desc.rasterizer_state = state;
        self
    }

    pub fn depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.desc.depth_stencil_state = state;
        self
    }

    pub fn blend_state(mut self, state: BlendState) -> Self {
        self.desc.blend_state = state;
        self
    }

    pub fn render_target_formats(mut self, formats: &[TextureFormat]) -> Self {
        self.desc.render_target_formats = formats.to_vec();
        self
    }

    pub fn depth_stencil_format(mut self, format: Option<TextureFormat>) -> Self {
        self.desc.depth_stencil_format = format;
        self
    }

    pub fn build(self) -> GraphicsPipelineStateDesc {
        self.desc
    }
}

/// Immutable graphics pipeline state
///
/// Holds counted references to its root signature, program and render pass.
pub trait GraphicsPipelineState: Resource {
    fn desc(&self) -> &GraphicsPipelineStateDesc;
}

// ===== COMPUTE PIPELINE STATE =====

/// Descriptor for creating a compute pipeline state
#[derive(Debug, Clone)]
pub struct ComputePipelineStateDesc {
    pub root_signature: Ptr<dyn RootSignature>,
    pub compute_shader: Ptr<dyn Shader>,
}

impl ComputePipelineStateDesc {
    pub fn new(root_signature: &Ptr<dyn RootSignature>, compute_shader: &Ptr<dyn Shader>) -> Self {
        Self {
            root_signature: root_signature.clone(),
            compute_shader: compute_shader.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.compute_shader.stage() != ShaderStage::Compute {
            return Err(Error::InvalidDescriptor(format!(
                "shader '{}' is a {:?} shader, expected Compute",
                self.compute_shader.debug_name(),
                self.compute_shader.stage()
            )));
        }
        Ok(())
    }
}

/// Immutable compute pipeline state
pub trait ComputePipelineState: Resource {
    fn desc(&self) -> &ComputePipelineStateDesc;
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
