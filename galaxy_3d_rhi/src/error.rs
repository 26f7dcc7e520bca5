//! Error types for the Galaxy3D RHI
//!
//! Creation failures never cross the backend boundary as errors: factories
//! return `None` and log a diagnostic. The `Error` enum is used by validation
//! helpers, command recording, submission and presentation.

use std::fmt;

/// Result type for Galaxy3D RHI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D RHI errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Vulkan, Direct3D, OpenGL, Null, ...)
    BackendError(String),

    /// Out of GPU or host memory
    OutOfMemory,

    /// Invalid resource (wrong kind, stale handle, type mismatch)
    InvalidResource(String),

    /// Initialization failed (backend, context, subsystems)
    InitializationFailed(String),

    /// Invalid or incompatible descriptor (pipeline, root signature, render pass, ...)
    InvalidDescriptor(String),

    /// Native device lost or driver crashed, the backend must be rebuilt
    DeviceLost(String),
}

impl Error {
    /// Whether the error is fatal for the backend instance that reported it
    ///
    /// The host application is expected to drop the backend and create a new one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::DeviceLost(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidDescriptor(msg) => write!(f, "Invalid descriptor: {}", msg),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
