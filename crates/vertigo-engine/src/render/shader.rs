use std::rc::Rc;

use crate::device::{
    AttributeLocation, GraphicsApi, ProgramId, ShaderId, ShaderStage, UniformLocation,
    VertexAttribute,
};
use crate::math::Mat4;

use super::{Model, RenderError, Vertex};

/// Uniform the rotation matrix is uploaded to, looked up on every set.
pub const ROTATION_UNIFORM: &str = "u_rotation";

/// Deletes a compiled stage when it goes out of scope.
struct StageGuard<'a, B: GraphicsApi> {
    gpu: &'a B,
    id: ShaderId,
}

impl<B: GraphicsApi> Drop for StageGuard<'_, B> {
    fn drop(&mut self) {
        self.gpu.delete_shader(self.id);
    }
}

/// Deletes a program unless disarmed.
struct ProgramGuard<'a, B: GraphicsApi> {
    gpu: &'a B,
    id: Option<ProgramId>,
}

impl<B: GraphicsApi> ProgramGuard<'_, B> {
    fn disarm(mut self) {
        self.id = None;
    }
}

impl<B: GraphicsApi> Drop for ProgramGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.gpu.delete_program(id);
        }
    }
}

/// A linked vertex/fragment program with its position, uv and projection
/// locations resolved.
pub struct ShaderProgram<B: GraphicsApi> {
    gpu: Rc<B>,
    program: ProgramId,
    position: AttributeLocation,
    uv: AttributeLocation,
    projection: UniformLocation,
}

impl<B: GraphicsApi> ShaderProgram<B> {
    /// Compiles one stage. The compiler log is logged and returned on failure.
    pub fn compile(gpu: &B, stage: ShaderStage, source: &str) -> Result<ShaderId, RenderError> {
        gpu.create_shader(stage, source).map_err(|log| {
            log::error!("{stage:?} shader compile failed:\n{log}");
            RenderError::ShaderCompile { stage, log }
        })
    }

    /// Compiles both stages, links them and resolves the required locations.
    ///
    /// Stage objects are released once linking is done. On any failure the
    /// program object is released as well, so nothing outlives the attempt.
    pub fn link(
        gpu: &Rc<B>,
        vertex_source: &str,
        fragment_source: &str,
        position_name: &str,
        uv_name: &str,
        projection_name: &str,
    ) -> Result<Self, RenderError> {
        let vertex = StageGuard {
            gpu: &**gpu,
            id: Self::compile(gpu, ShaderStage::Vertex, vertex_source)?,
        };
        let fragment = StageGuard {
            gpu: &**gpu,
            id: Self::compile(gpu, ShaderStage::Fragment, fragment_source)?,
        };

        let program = gpu
            .create_program(vertex.id, fragment.id)
            .map_err(|log| {
                log::error!("shader program link failed:\n{log}");
                RenderError::ShaderLink { log }
            })?;
        let guard = ProgramGuard {
            gpu: &**gpu,
            id: Some(program),
        };

        let missing = |name: &str| {
            log::error!("shader program has no active location `{name}`");
            RenderError::ShaderLocation { name: name.to_string() }
        };
        let position = gpu
            .attribute_location(program, position_name)
            .ok_or_else(|| missing(position_name))?;
        let uv = gpu
            .attribute_location(program, uv_name)
            .ok_or_else(|| missing(uv_name))?;
        let projection = gpu
            .uniform_location(program, projection_name)
            .ok_or_else(|| missing(projection_name))?;

        guard.disarm();
        log::debug!(
            "{program:?} linked: position {position:?}, uv {uv:?}, projection {projection:?}"
        );

        Ok(Self {
            gpu: gpu.clone(),
            program,
            position,
            uv,
            projection,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.program
    }

    pub fn activate(&self) {
        self.gpu.use_program(Some(self.program));
    }

    pub fn deactivate(&self) {
        self.gpu.use_program(None);
    }

    /// Requires the program to be active.
    pub fn set_projection_matrix(&self, matrix: &Mat4) {
        self.gpu.uniform_matrix4(self.projection, matrix);
    }

    /// Requires the program to be active. A program without the rotation
    /// uniform ignores the call.
    pub fn set_rotation_matrix(&self, matrix: &Mat4) {
        match self.gpu.uniform_location(self.program, ROTATION_UNIFORM) {
            Some(location) => self.gpu.uniform_matrix4(location, matrix),
            None => log::trace!("{ROTATION_UNIFORM} not active in {:?}", self.program),
        }
    }

    /// Draws `model` with texture unit 0. Both vertex streams are disabled
    /// again before returning.
    pub fn draw(&self, model: &Model<B>) {
        let gpu = &*self.gpu;

        gpu.vertex_attribute(
            self.position,
            VertexAttribute {
                components: 3,
                stride: Vertex::STRIDE,
                offset: Vertex::POSITION_OFFSET,
            },
        );
        gpu.enable_vertex_attribute(self.position);

        gpu.vertex_attribute(
            self.uv,
            VertexAttribute {
                components: 2,
                stride: Vertex::STRIDE,
                offset: Vertex::UV_OFFSET,
            },
        );
        gpu.enable_vertex_attribute(self.uv);

        gpu.bind_texture(0, Some(model.texture().id()));
        gpu.draw_elements(model.topology(), model.vertex_bytes(), model.indices());

        gpu.disable_vertex_attribute(self.position);
        gpu.disable_vertex_attribute(self.uv);
    }
}

impl<B: GraphicsApi> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        self.gpu.delete_program(self.program);
    }
}
