use thiserror::Error;

use crate::device::ShaderStage;

/// Failures surfaced by the renderer and its resources.
///
/// Every variant is fatal to the operation that produced it. Construction
/// errors leave no GPU objects behind; `Present` ends the session.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No matching config, or display/surface/context creation failed.
    #[error("gpu context initialization failed: {0}")]
    ContextInit(String),

    #[error("{stage:?} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{log}")]
    ShaderLink { log: String },

    /// A required attribute or uniform is absent from the linked program.
    #[error("shader program has no active location named `{name}`")]
    ShaderLocation { name: String },

    #[error("texture creation failed: {0}")]
    Texture(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("failed to present frame: {0}")]
    Present(String),

    /// Raised by a scene builder.
    #[error(transparent)]
    Scene(#[from] anyhow::Error),
}
