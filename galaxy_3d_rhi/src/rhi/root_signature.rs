/// Root signature - resource binding layout consumed by pipeline states

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::rhi::{Resource, SamplerStateDesc};

bitflags! {
    /// Shader stages a root parameter is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderVisibility: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
        const ALL_GRAPHICS = Self::VERTEX.bits() | Self::FRAGMENT.bits();
        const ALL = Self::ALL_GRAPHICS.bits() | Self::COMPUTE.bits();
    }
}

bitflags! {
    /// Root signature layout options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RootSignatureFlags: u32 {
        /// Pipelines using this signature read vertex attributes
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 1 << 0;
        const DENY_VERTEX_SHADER_ROOT_ACCESS = 1 << 1;
        const DENY_FRAGMENT_SHADER_ROOT_ACCESS = 1 << 2;
    }
}

/// Kind of descriptors in a descriptor table range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Uniform/constant buffers
    UniformBuffer,
    /// Read-only textures and storage buffers
    ShaderResource,
    /// Read/write textures and storage buffers
    UnorderedAccess,
    /// Samplers
    Sampler,
}

/// Kind of resource bound by a set-resource command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    StorageBuffer,
    Texture,
    Sampler,
}

impl DescriptorRangeType {
    fn accepts(&self, kind: BindingKind) -> bool {
        match self {
            DescriptorRangeType::UniformBuffer => kind == BindingKind::UniformBuffer,
            DescriptorRangeType::ShaderResource => matches!(kind, BindingKind::Texture | BindingKind::StorageBuffer),
            DescriptorRangeType::UnorderedAccess => matches!(kind, BindingKind::Texture | BindingKind::StorageBuffer),
            DescriptorRangeType::Sampler => kind == BindingKind::Sampler,
        }
    }
}

/// Contiguous run of descriptors inside a descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    pub range_type: DescriptorRangeType,
    pub number_of_descriptors: u32,
    pub base_shader_register: u32,
    pub register_space: u32,
}

impl DescriptorRange {
    pub fn new(range_type: DescriptorRangeType, number_of_descriptors: u32, base_shader_register: u32) -> Self {
        Self {
            range_type,
            number_of_descriptors,
            base_shader_register,
            register_space: 0,
        }
    }
}

/// One parameter slot of a root signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootParameter {
    /// Table of descriptor ranges
    DescriptorTable {
        ranges: Vec<DescriptorRange>,
        visibility: ShaderVisibility,
    },
    /// 32-bit constants written inline
    Constants {
        shader_register: u32,
        number_of_values: u32,
        visibility: ShaderVisibility,
    },
    /// Single uniform buffer bound directly
    UniformBuffer {
        shader_register: u32,
        visibility: ShaderVisibility,
    },
    /// Single read-only texture or storage buffer bound directly
    ShaderResource {
        shader_register: u32,
        visibility: ShaderVisibility,
    },
}

impl RootParameter {
    pub fn visibility(&self) -> ShaderVisibility {
        match self {
            RootParameter::DescriptorTable { visibility, .. }
            | RootParameter::Constants { visibility, .. }
            | RootParameter::UniformBuffer { visibility, .. }
            | RootParameter::ShaderResource { visibility, .. } => *visibility,
        }
    }

    /// Whether a resource of `kind` can be bound to this slot
    ///
    /// Constants slots never accept resources.
    pub fn accepts(&self, kind: BindingKind) -> bool {
        match self {
            RootParameter::DescriptorTable { ranges, .. } => ranges.iter().any(|range| range.range_type.accepts(kind)),
            RootParameter::Constants { .. } => false,
            RootParameter::UniformBuffer { .. } => kind == BindingKind::UniformBuffer,
            RootParameter::ShaderResource { .. } => matches!(kind, BindingKind::Texture | BindingKind::StorageBuffer),
        }
    }
}

/// Sampler baked into the root signature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSampler {
    pub sampler: SamplerStateDesc,
    pub shader_register: u32,
    pub register_space: u32,
    pub visibility: ShaderVisibility,
}

/// Descriptor for creating a root signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
    pub static_samplers: Vec<StaticSampler>,
    pub flags: RootSignatureFlags,
}

impl RootSignatureDesc {
    /// Check the layout against the backend's bound resource limit
    pub fn validate(&self, max_parameters: u32) -> Result<()> {
        if self.parameters.len() as u64 > max_parameters as u64 {
            return Err(Error::InvalidDescriptor(format!(
                "root signature declares {} parameters, backend supports {}",
                self.parameters.len(),
                max_parameters
            )));
        }
        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.visibility().is_empty() {
                return Err(Error::InvalidDescriptor(format!(
                    "root parameter {} is visible to no shader stage",
                    index
                )));
            }
            match parameter {
                RootParameter::DescriptorTable { ranges, .. } => {
                    if ranges.is_empty() {
                        return Err(Error::InvalidDescriptor(format!(
                            "root parameter {} is an empty descriptor table",
                            index
                        )));
                    }
                    if ranges.iter().any(|range| range.number_of_descriptors == 0) {
                        return Err(Error::InvalidDescriptor(format!(
                            "root parameter {} has a zero-sized descriptor range",
                            index
                        )));
                    }
                }
                RootParameter::Constants { number_of_values, .. } if *number_of_values == 0 => {
                    return Err(Error::InvalidDescriptor(format!(
                        "root parameter {} declares zero constants",
                        index
                    )));
                }
                _ => {}
            }
        }
        for sampler in &self.static_samplers {
            sampler.sampler.validate()?;
        }
        Ok(())
    }
}

/// Builder for root signature descriptors
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_rhi::galaxy3d::rhi::{RootSignatureBuilder, RootParameter, ShaderVisibility};
///
/// let desc = RootSignatureBuilder::new()
///     .parameter(RootParameter::UniformBuffer {
///         shader_register: 0,
///         visibility: ShaderVisibility::VERTEX,
///     })
///     .build();
/// assert_eq!(desc.parameters.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RootSignatureBuilder {
    desc: RootSignatureDesc,
}

impl RootSignatureBuilder {
    /// Empty signature that allows vertex input
    pub fn new() -> Self {
        Self {
            desc: RootSignatureDesc {
                parameters: Vec::new(),
                static_samplers: Vec::new(),
                flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
            },
        }
    }

    pub fn parameter(mut self, parameter: RootParameter) -> Self {
        self.desc.parameters.push(parameter);
        self
    }

    pub fn static_sampler(mut self, sampler: StaticSampler) -> Self {
        self.desc.static_samplers.push(sampler);
        self
    }

    pub fn flags(mut self, flags: RootSignatureFlags) -> Self {
        self.desc.flags = flags;
        self
    }

    pub fn build(self) -> RootSignatureDesc {
        self.desc
    }
}

/// Root signature resource trait
pub trait RootSignature: Resource {
    fn desc(&self) -> &RootSignatureDesc;

    /// Parameter declared at `index`, if any
    fn parameter(&self, index: u32) -> Option<&RootParameter> {
        self.desc().parameters.get(index as usize)
    }
}

#[cfg(test)]
#[path = "root_signature_tests.rs"]
mod tests;
