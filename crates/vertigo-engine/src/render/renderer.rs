use std::rc::Rc;

use crate::device::{diagnostics, Backend, BlendFunc, GpuSession};
use crate::math::{self, Mat4};
use crate::scene::{SceneBuilder, SceneCtx};

use super::config::{ProjectionConfig, RendererConfig, RotationMode};
use super::{Model, RenderError, ShaderProgram};

/// Accumulated rotation, in degrees within `[0, 360)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationState {
    angle: f32,
    step: f32,
}

impl RotationState {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances by one step and returns the wrapped angle.
    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + self.step).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative sums.
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
        self.angle
    }

    pub fn matrix(&self, mode: RotationMode) -> Mat4 {
        match mode {
            RotationMode::ZAxis => math::rotation_z(self.angle),
            RotationMode::AllAxes => math::rotation_xyz(self.angle, self.angle, self.angle),
        }
    }
}

/// Draws an ordered list of models with one shader program, rotating them a
/// fixed step every frame.
///
/// Fields drop in declaration order: models (and their textures), then the
/// program, then the session, so GPU objects are released while the context
/// is still current.
pub struct Renderer<B: Backend> {
    models: Vec<Model<B>>,
    program: ShaderProgram<B>,
    session: GpuSession<B>,

    projection: ProjectionConfig,
    rotation_mode: RotationMode,
    strict_gpu_errors: bool,

    /// `None` until the first frame, so that frame always resizes.
    cached_size: Option<(u32, u32)>,
    projection_stale: bool,
    rotation: RotationState,
}

impl<B: Backend> Renderer<B> {
    /// Opens a GPU session on `backend`, links the configured program and
    /// builds the scene.
    ///
    /// Any failure releases everything created so far, in reverse order.
    pub fn new(
        backend: B,
        config: &RendererConfig,
        scene: &mut dyn SceneBuilder<B>,
    ) -> Result<Self, RenderError> {
        let session = GpuSession::open(Rc::new(backend), &config.requirements)
            .map_err(|e| RenderError::ContextInit(e.0))?;
        let gpu = session.display().clone();

        let info = session.info();
        log::info!("GPU vendor: {}", info.vendor);
        log::info!("GPU renderer: {}", info.renderer);
        log::info!("GPU version: {}", info.version);
        log::debug!("GPU features: {}", info.extensions.join(" "));

        let shaders = &config.shaders;
        let program = ShaderProgram::link(
            &gpu,
            &shaders.vertex_source,
            &shaders.fragment_source,
            &shaders.position_attribute,
            &shaders.uv_attribute,
            &shaders.projection_uniform,
        )?;
        program.activate();

        gpu.set_blend(Some(BlendFunc::ALPHA));
        gpu.set_clear_color(config.clear_color);

        let models = scene.build(&SceneCtx::new(gpu))?;
        log::info!("renderer ready with {} models", models.len());

        Ok(Self {
            models,
            program,
            session,
            projection: config.projection,
            rotation_mode: config.rotation_mode,
            strict_gpu_errors: config.strict_gpu_errors,
            cached_size: None,
            projection_stale: true,
            rotation: RotationState::new(config.rotation_step),
        })
    }

    /// Runs one frame and presents it.
    ///
    /// A `Present` error means the session is unusable; drop the renderer.
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        self.check_resize();
        if self.projection_stale {
            self.refresh_projection();
        }

        self.rotation.advance();
        self.program
            .set_rotation_matrix(&self.rotation.matrix(self.rotation_mode));

        let gpu = self.session.display();
        gpu.clear();
        for model in &self.models {
            self.program.draw(model);
        }

        let had_errors = diagnostics::check_and_log_error(&**gpu, false);
        if self.strict_gpu_errors {
            debug_assert!(!had_errors, "gpu errors pending after frame");
        }

        self.session.swap_buffers().map_err(|e| {
            log::error!("present failed: {e}");
            RenderError::Present(e)
        })
    }

    fn check_resize(&mut self) {
        let size = self.session.surface_size();
        if self.cached_size == Some(size) {
            return;
        }

        log::debug!("surface resized to {}x{}", size.0, size.1);
        self.cached_size = Some(size);
        self.session.display().viewport(0, 0, size.0, size.1);
        self.projection_stale = true;
    }

    fn refresh_projection(&mut self) {
        let Some((width, height)) = self.cached_size else {
            return;
        };
        if width == 0 || height == 0 {
            // Minimized; rebuild once the surface has an area again.
            log::trace!("skipping projection for empty surface");
            return;
        }

        let p = self.projection;
        let aspect = width as f32 / height as f32;
        let matrix = math::orthographic(p.half_height, aspect, p.near, p.far);
        self.program.set_projection_matrix(&matrix);
        self.projection_stale = false;
    }

    pub fn models(&self) -> &[Model<B>] {
        &self.models
    }

    pub fn program(&self) -> &ShaderProgram<B> {
        &self.program
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation.angle()
    }

    /// Size seen by the last frame, if any frame ran.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.cached_size
    }

    pub fn gpu(&self) -> &Rc<B> {
        self.session.display()
    }
}

impl<B: Backend> Drop for Renderer<B> {
    fn drop(&mut self) {
        log::debug!("renderer dropping {} models", self.models.len());
    }
}
