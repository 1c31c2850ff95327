use crate::math::Mat4;

use super::error::GpuError;

/// Handle to a compiled shader stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub u32);

/// Handle to a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub u32);

/// Handle to a GPU texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Vertex input slot resolved from a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AttributeLocation(pub u32);

/// Uniform slot resolved from a program. Only meaningful for that program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// How an index list is assembled into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    /// Every three indices form a filled triangle.
    Triangles,
    /// Every two indices form a line segment.
    Lines,
}

/// Float vertex stream description, relative to the vertex bytes passed to
/// [`GraphicsApi::draw_elements`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Number of `f32` components (1..=4).
    pub components: u8,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the first component within a vertex.
    pub offset: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Blend equation `src * src_factor + dst * dst_factor`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Straight (non-premultiplied) alpha blending.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Decoded RGBA8 pixels, rows `stride` bytes apart.
#[derive(Debug, Copy, Clone)]
pub struct ImageData<'a> {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixels: &'a [u8],
}

/// Sampling state fixed at texture creation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureOptions {
    /// Generate a full mip chain and sample it trilinearly.
    pub mipmaps: bool,
}

/// Object, state and draw calls used by the renderer.
///
/// The shape follows a classic bind-then-draw graphics API: a current program,
/// per-location vertex streams that are enabled and disabled around draws, a
/// texture bound to unit 0, and global blend/clear/viewport state.
///
/// Methods take `&self`; implementations keep their state behind interior
/// mutability. All calls must come from the thread that owns the context.
pub trait GraphicsApi {
    /// Compiles one stage. The error carries the compiler log.
    fn create_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&self, shader: ShaderId);

    /// Links two compiled stages. The error carries the linker log.
    fn create_program(&self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String>;
    fn delete_program(&self, program: ProgramId);

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation>;
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Binds `program` as current, or unbinds with `None`.
    fn use_program(&self, program: Option<ProgramId>);

    /// Uploads a matrix to a uniform of the current program.
    fn uniform_matrix4(&self, location: UniformLocation, matrix: &Mat4);

    fn vertex_attribute(&self, location: AttributeLocation, attribute: VertexAttribute);
    fn enable_vertex_attribute(&self, location: AttributeLocation);
    fn disable_vertex_attribute(&self, location: AttributeLocation);

    fn create_texture(
        &self,
        image: &ImageData<'_>,
        options: TextureOptions,
    ) -> Result<TextureId, String>;
    fn delete_texture(&self, texture: TextureId);
    fn bind_texture(&self, unit: u32, texture: Option<TextureId>);

    /// Indexed draw using the enabled vertex streams over `vertices`.
    fn draw_elements(&self, topology: Topology, vertices: &[u8], indices: &[u16]);

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);
    fn set_clear_color(&self, rgba: [f32; 4]);
    fn set_blend(&self, blend: Option<BlendFunc>);
    /// Clears the color buffer to the current clear color.
    fn clear(&self);

    /// Pops the oldest pending error, if any.
    fn take_error(&self) -> Option<GpuError>;
}
