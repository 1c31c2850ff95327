//! Scene construction.
//!
//! A scene is the ordered model list a renderer draws every frame. It is
//! built once, after the shader program is linked and before the first
//! frame, by a [`SceneBuilder`] handed to [`Renderer::new`](crate::render::Renderer::new).

mod builder;

pub use builder::{SceneBuilder, SceneCtx};
