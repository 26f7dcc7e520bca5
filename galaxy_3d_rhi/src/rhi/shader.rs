/// Shaders, graphics programs and the shader language factory

use crate::error::{Error, Result};
use crate::rhi::{Ptr, Resource, ResourceType, RootSignature, ShaderVisibility, VertexAttributes};

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment/pixel shader
    Fragment,
    /// Compute shader
    Compute,
}

impl ShaderStage {
    /// Root parameter visibility bit matching the stage
    pub fn visibility(&self) -> ShaderVisibility {
        match self {
            ShaderStage::Vertex => ShaderVisibility::VERTEX,
            ShaderStage::Fragment => ShaderVisibility::FRAGMENT,
            ShaderStage::Compute => ShaderVisibility::COMPUTE,
        }
    }

    /// Resource type of a shader of this stage
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ShaderStage::Vertex => ResourceType::VertexShader,
            ShaderStage::Fragment => ResourceType::FragmentShader,
            ShaderStage::Compute => ResourceType::ComputeShader,
        }
    }
}

/// Shader resource trait
pub trait Shader: Resource {
    fn stage(&self) -> ShaderStage;

    /// Vertex input the shader was compiled against (vertex shaders only)
    fn vertex_attributes(&self) -> Option<&VertexAttributes>;
}

/// Linked set of graphics shaders bound to one root signature
pub trait GraphicsProgram: Resource {
    fn root_signature(&self) -> &Ptr<dyn RootSignature>;

    fn vertex_attributes(&self) -> &VertexAttributes;

    fn vertex_shader(&self) -> Option<&Ptr<dyn Shader>>;

    fn fragment_shader(&self) -> Option<&Ptr<dyn Shader>>;
}

/// Shader language of a backend
///
/// Every `Rhi` exposes exactly one default shader language used to create
/// shader stage objects from source. Source is opaque to the RHI.
pub trait ShaderLanguage: Send + Sync {
    /// Language name (e.g. "GLSL", "HLSL", "Null")
    fn name(&self) -> &str;

    fn create_vertex_shader_from_source(
        &self,
        vertex_attributes: &VertexAttributes,
        source: &str,
        name: &str,
    ) -> Option<Ptr<dyn Shader>>;

    fn create_fragment_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>>;

    fn create_compute_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>>;

    /// Link shaders into a program
    ///
    /// Fails (`None` plus a diagnostic) when the vertex shader is missing, a
    /// shader has the wrong stage, or the vertex shader was compiled against
    /// different vertex attributes.
    fn create_graphics_program(
        &self,
        root_signature: &Ptr<dyn RootSignature>,
        vertex_attributes: &VertexAttributes,
        vertex_shader: Option<&Ptr<dyn Shader>>,
        fragment_shader: Option<&Ptr<dyn Shader>>,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsProgram>>;
}

/// Shared source check used by every shader language
pub fn validate_shader_source(stage: ShaderStage, source: &str) -> Result<()> {
    if source.trim().is_empty() {
        return Err(Error::InvalidDescriptor(format!("{:?} shader source is empty", stage)));
    }
    Ok(())
}

/// Shared program check used by every shader language
pub fn validate_graphics_program(
    vertex_attributes: &VertexAttributes,
    vertex_shader: Option<&Ptr<dyn Shader>>,
    fragment_shader: Option<&Ptr<dyn Shader>>,
) -> Result<()> {
    let vertex_shader = vertex_shader
        .ok_or_else(|| Error::InvalidDescriptor("graphics program has no vertex shader".to_string()))?;

    if vertex_shader.stage() != ShaderStage::Vertex {
        return Err(Error::InvalidDescriptor(format!(
            "shader '{}' is a {:?} shader, expected Vertex",
            vertex_shader.debug_name(),
            vertex_shader.stage()
        )));
    }
    if let Some(fragment_shader) = fragment_shader {
        if fragment_shader.stage() != ShaderStage::Fragment {
            return Err(Error::InvalidDescriptor(format!(
                "shader '{}' is a {:?} shader, expected Fragment",
                fragment_shader.debug_name(),
                fragment_shader.stage()
            )));
        }
    }
    if vertex_shader.vertex_attributes() != Some(vertex_attributes) {
        return Err(Error::InvalidDescriptor(format!(
            "vertex shader '{}' was created for different vertex attributes",
            vertex_shader.debug_name()
        )));
    }
    Ok(())
}
