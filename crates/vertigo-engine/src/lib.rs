//! Vertigo engine crate.
//!
//! Renders a small list of textured models, rotating them every frame, into a
//! winit window through wgpu. The renderer is written against the
//! [`device`] traits, so everything above the backend is testable without a
//! GPU.

pub mod device;
pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod window;
