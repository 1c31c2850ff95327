//! Model rendering.
//!
//! A [`Renderer`] owns the GPU session, one [`ShaderProgram`] and the scene's
//! [`Model`]s, and draws them every frame:
//! resize check, projection refresh when stale, rotation update, clear,
//! draw in list order, present.
//!
//! Conventions:
//! - model space is y-up, centered on the origin
//! - no depth test; later models draw over earlier ones
//! - textures are shared between models through `Rc`

mod config;
mod error;
mod model;
mod renderer;
mod shader;
mod texture;

pub use config::{ProjectionConfig, RendererConfig, RotationMode, ShaderConfig};
pub use error::RenderError;
pub use model::{Index, Model, Vertex};
pub use renderer::{Renderer, RotationState};
pub use shader::{ShaderProgram, ROTATION_UNIFORM};
pub use texture::Texture;
