use crate::device::ConfigRequirements;

/// Orthographic projection parameters.
///
/// The view spans `±half_height` vertically and `±half_height * aspect`
/// horizontally, where aspect is the surface width over its height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub half_height: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            half_height: 2.0,
            near: -1.0,
            far: 1.0,
        }
    }
}

/// Which axes the per-frame rotation turns around.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RotationMode {
    /// Z only, counter-clockwise on screen.
    ZAxis,
    /// X, Y and Z by the same angle.
    #[default]
    AllAxes,
}

/// Shader sources and the names the renderer resolves in them.
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    pub vertex_source: String,
    pub fragment_source: String,
    pub position_attribute: String,
    pub uv_attribute: String,
    pub projection_uniform: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex_source: include_str!("shaders/model_vertex.wgsl").to_string(),
            fragment_source: include_str!("shaders/model_fragment.wgsl").to_string(),
            position_attribute: "in_position".to_string(),
            uv_attribute: "in_uv".to_string(),
            projection_uniform: "u_projection".to_string(),
        }
    }
}

/// Renderer configuration.
///
/// Defaults reproduce the stock demo: cornflower-blue background, a
/// four-unit-tall orthographic view and one degree of rotation per frame.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// RGBA in 0..=1.
    pub clear_color: [f32; 4],
    pub projection: ProjectionConfig,
    /// Degrees added to the rotation angle every frame.
    pub rotation_step: f32,
    pub rotation_mode: RotationMode,
    pub shaders: ShaderConfig,
    /// Framebuffer the display config must provide.
    pub requirements: ConfigRequirements,
    /// Turn pending GPU errors into `debug_assert!` failures after each frame.
    pub strict_gpu_errors: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [100.0 / 255.0, 149.0 / 255.0, 237.0 / 255.0, 1.0],
            projection: ProjectionConfig::default(),
            rotation_step: 1.0,
            rotation_mode: RotationMode::default(),
            shaders: ShaderConfig::default(),
            requirements: ConfigRequirements::default(),
            strict_gpu_errors: false,
        }
    }
}
