//! GPU device seam.
//!
//! The renderer talks to the GPU through two traits:
//! - [`DisplayConnection`]: display, config, surface and context lifecycle
//! - [`GraphicsApi`]: shader/program/texture objects, state and draw calls
//!
//! [`gpu::WgpuBackend`] implements both over wgpu. Tests use a recording
//! mock that shares the same WGSL front end.

mod api;
mod config;
mod display;
mod error;
mod init;
mod session;

pub mod diagnostics;
pub mod reflect;
pub mod gpu;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{
    AttributeLocation, BlendFactor, BlendFunc, GraphicsApi, ImageData, ProgramId, ShaderId,
    ShaderStage, TextureId, TextureOptions, Topology, UniformLocation, VertexAttribute,
};
pub use config::{choose_config, ConfigRequirements};
pub use display::{ConfigCandidate, ConfigId, DisplayConnection, GpuInfo};
pub use error::{GpuError, SurfaceErrorAction};
pub use init::GpuInit;
pub use session::{GpuSession, SessionError};

/// A complete GPU backend.
pub trait Backend: DisplayConnection + GraphicsApi {}

impl<T: DisplayConnection + GraphicsApi> Backend for T {}
