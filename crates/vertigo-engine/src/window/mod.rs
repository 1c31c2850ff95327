//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and drives one [`Renderer`](crate::render::Renderer)
//! per surface lifetime.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
