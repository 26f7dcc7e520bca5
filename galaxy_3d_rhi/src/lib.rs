/*!
# Galaxy 3D RHI

Render Hardware Interface for the Galaxy 3D engine.

This crate provides one API-neutral surface for GPU resources and GPU work using
trait-based dynamic polymorphism. Backend implementations (Null, and native
APIs such as Vulkan or Direct3D) implement the `Rhi` trait and are selected by
name at runtime through a `BackendRegistry`.

## Architecture

- **Rhi**: Factory trait for creating GPU resources and submitting work
- **Resource / Ptr**: Intrusive reference counting with a smart handle
- **Descriptors**: Buffers, textures, samplers, root signatures, pipeline states
- **CommandBuffer**: Backend-independent recording of GPU commands
- **CommandExecutor**: Shared replay loop checking the command protocol
- **Context**: Backend owner with the shared resource cache

Backend implementations provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod rhi;
pub mod context;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging facade
    pub use crate::engine::Engine;

    // Backend owner and shared resources
    pub use crate::context::{Context, SharedResourceCache};

    // Backend factory trait
    pub use crate::rhi::Rhi;

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // RHI sub-module with all resource, descriptor and command types
    pub mod rhi {
        pub use crate::rhi::*;
    }
}

// Re-export math library at crate root
pub use glam;
