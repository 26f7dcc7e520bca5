/// Shaders - Null implementation of the Shader, GraphicsProgram and ShaderLanguage traits
///
/// Sources are never compiled: they only have to be non-empty.

use galaxy_3d_rhi::galaxy3d::Result;
use galaxy_3d_rhi::galaxy3d::rhi::{
    log_creation_failure, validate_graphics_program, validate_shader_source, GraphicsProgram, Ptr, Resource,
    ResourceBase, ResourceType, RootSignature, Shader, ShaderLanguage, ShaderStage, VertexAttributes,
};
use std::sync::Arc;

use crate::null_device::NullDevice;

const SOURCE: &str = "galaxy3d::null::NullShaderLanguage";

/// Null shader stage object
pub struct NullShader {
    base: ResourceBase,
    device: Arc<NullDevice>,
    stage: ShaderStage,
    /// Vertex input, vertex shaders only
    vertex_attributes: Option<VertexAttributes>,
}

impl Resource for NullShader {
    fn resource_base(&self) -> &ResourceBase {
        &self.base
    }

    fn resource_type(&self) -> ResourceType {
        self.stage.resource_type()
    }

    fn self_destruct(&self) {
        self.device.release(self.base.native_handle());
    }
}

impl Shader for NullShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn vertex_attributes(&self) -> Option<&VertexAttributes> {
        self.vertex_attributes.as_ref()
    }
}

/// Null linked program
pub struct NullGraphicsProgram {
    base: ResourceBase,
    device: Arc<NullDevice>,
    root_signature: Ptr<dyn RootSignature>,
    vertex_attributes: VertexAttributes,
    vertex_shader: Option<Ptr<dyn Shader>>,
    fragment_shader: Option<Ptr<dyn Shader>>,
}

impl_null_resource!(NullGraphicsProgram, ResourceType::GraphicsProgram);

impl GraphicsProgram for NullGraphicsProgram {
    fn root_signature(&self) -> &Ptr<dyn RootSignature> {
        &self.root_signature
    }

    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_shader(&self) -> Option<&Ptr<dyn Shader>> {
        self.vertex_shader.as_ref()
    }

    fn fragment_shader(&self) -> Option<&Ptr<dyn Shader>> {
        self.fragment_shader.as_ref()
    }
}

/// Shader language of the Null backend
pub struct NullShaderLanguage {
    device: Arc<NullDevice>,
}

impl NullShaderLanguage {
    pub fn new(device: Arc<NullDevice>) -> Self {
        Self { device }
    }

    fn create_shader(
        &self,
        stage: ShaderStage,
        vertex_attributes: Option<&VertexAttributes>,
        source: &str,
        name: &str,
    ) -> Result<Ptr<dyn Shader>> {
        validate_shader_source(stage, source)?;
        if let Some(attributes) = vertex_attributes {
            attributes.validate()?;
        }

        let shader = NullShader {
            base: ResourceBase::new(self.device.allocate(stage.resource_type(), name)?, name),
            device: self.device.clone(),
            stage,
            vertex_attributes: vertex_attributes.cloned(),
        };
        Ok(Ptr::from_arc(Arc::new(shader) as Arc<dyn Shader>))
    }

    fn create_shader_or_log(
        &self,
        stage: ShaderStage,
        vertex_attributes: Option<&VertexAttributes>,
        source: &str,
        name: &str,
    ) -> Option<Ptr<dyn Shader>> {
        self.create_shader(stage, vertex_attributes, source, name)
            .map_err(|error| log_creation_failure(SOURCE, stage.resource_type(), name, &error))
            .ok()
    }
}

impl ShaderLanguage for NullShaderLanguage {
    fn name(&self) -> &str {
        "Null"
    }

    fn create_vertex_shader_from_source(
        &self,
        vertex_attributes: &VertexAttributes,
        source: &str,
        name: &str,
    ) -> Option<Ptr<dyn Shader>> {
        self.create_shader_or_log(ShaderStage::Vertex, Some(vertex_attributes), source, name)
    }

    fn create_fragment_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>> {
        self.create_shader_or_log(ShaderStage::Fragment, None, source, name)
    }

    fn create_compute_shader_from_source(&self, source: &str, name: &str) -> Option<Ptr<dyn Shader>> {
        self.create_shader_or_log(ShaderStage::Compute, None, source, name)
    }

    fn create_graphics_program(
        &self,
        root_signature: &Ptr<dyn RootSignature>,
        vertex_attributes: &VertexAttributes,
        vertex_shader: Option<&Ptr<dyn Shader>>,
        fragment_shader: Option<&Ptr<dyn Shader>>,
        name: &str,
    ) -> Option<Ptr<dyn GraphicsProgram>> {
        let result = validate_graphics_program(vertex_attributes, vertex_shader, fragment_shader)
            .and_then(|()| self.device.allocate(ResourceType::GraphicsProgram, name));

        let handle = match result {
            Ok(handle) => handle,
            Err(error) => {
                log_creation_failure(SOURCE, ResourceType::GraphicsProgram, name, &error);
                return None;
            }
        };

        let program = NullGraphicsProgram {
            base: ResourceBase::new(handle, name),
            device: self.device.clone(),
            root_signature: root_signature.clone(),
            vertex_attributes: vertex_attributes.clone(),
            vertex_shader: vertex_shader.cloned(),
            fragment_shader: fragment_shader.cloned(),
        };
        Some(Ptr::from_arc(Arc::new(program) as Arc<dyn GraphicsProgram>))
    }
}
