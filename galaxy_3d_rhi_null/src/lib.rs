/*!
# Galaxy 3D RHI - Null Backend

Null implementation of the Galaxy 3D Render Hardware Interface.

This crate provides a backend that implements every galaxy_3d_rhi trait
without touching a GPU. Native objects are entries of an in-memory table, so
resource lifetimes, descriptor validation and the command protocol behave
exactly as on a native backend. Accepted commands are recorded in a native
call log that tests can inspect.

The backend is registered by name and can be selected at runtime.
*/

// Native object table, must come first (defines impl_null_resource!)
#[macro_use]
mod null_device;

// Resource implementations
mod null_buffer;
mod null_texture;
mod null_root_signature;
mod null_shader;
mod null_pipeline_state;
mod null_vertex_array;
mod null_render_pass;
mod null_swap_chain;

// Submission
mod null_command_translator;
mod null_rhi;

use galaxy_3d_rhi::galaxy3d::rhi::{BackendRegistry, Rhi, RhiConfig};

pub use null_command_translator::{NullCommandTranslator, TranslationStats};
pub use null_device::NullDevice;
pub use null_rhi::NullRhi;
pub use null_shader::NullShaderLanguage;

/// Name the backend is registered under
pub const BACKEND_NAME: &str = "Null";

/// Register the Null backend
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_rhi::galaxy3d::Context;
/// use galaxy_3d_rhi::galaxy3d::rhi::{BackendRegistry, RhiConfig};
///
/// let mut registry = BackendRegistry::new();
/// galaxy_3d_rhi_null::register(&mut registry);
///
/// let context = Context::from_registry(&registry, "Null", RhiConfig::default())?;
/// # Ok::<(), galaxy_3d_rhi::galaxy3d::Error>(())
/// ```
pub fn register(registry: &mut BackendRegistry) {
    registry.register(BACKEND_NAME, |config: RhiConfig| {
        Ok(Box::new(NullRhi::new(config)?) as Box<dyn Rhi>)
    });
}
