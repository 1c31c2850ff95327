//! Recording backend for unit tests.
//!
//! Clones share one state, so a test can hand a `MockGpu` to the renderer and
//! keep another handle for inspection after the renderer is gone. Shader
//! compile/link and name lookups go through the real WGSL front end.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use crate::math::Mat4;

use super::api::{
    AttributeLocation, BlendFunc, GraphicsApi, ImageData, ProgramId, ShaderId, ShaderStage,
    TextureId, TextureOptions, Topology, UniformLocation, VertexAttribute,
};
use super::display::{ConfigCandidate, ConfigId, DisplayConnection, GpuInfo};
use super::error::GpuError;
use super::reflect::{self, CompiledStage, LinkedProgram};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize,
    CreateWindowSurface,
    CreateContext,
    MakeCurrent,
    ReleaseCurrent,
    DestroyContext,
    DestroySurface,
    Terminate,
    SwapBuffers,
    CreateShader(ShaderStage),
    DeleteShader(ShaderId),
    CreateProgram,
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    UniformMatrix4(UniformLocation),
    VertexAttribute(AttributeLocation, VertexAttribute),
    EnableVertexAttribute(AttributeLocation),
    DisableVertexAttribute(AttributeLocation),
    CreateTexture,
    DeleteTexture(TextureId),
    BindTexture(u32, Option<TextureId>),
    DrawElements(Topology, usize),
    Viewport(i32, i32, u32, u32),
    SetClearColor([f32; 4]),
    SetBlend(Option<BlendFunc>),
    Clear,
}

impl Call {
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Call::Initialize
                | Call::CreateWindowSurface
                | Call::CreateContext
                | Call::MakeCurrent
                | Call::ReleaseCurrent
                | Call::DestroyContext
                | Call::DestroySurface
                | Call::Terminate
        )
    }
}

#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: Option<ProgramId>,
    pub topology: Topology,
    pub vertex_bytes: usize,
    pub indices: Vec<u16>,
    pub enabled: Vec<AttributeLocation>,
    pub texture: Option<TextureId>,
}

#[derive(Debug)]
struct MockTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    mipmaps: bool,
}

#[derive(Default)]
struct Failures {
    initialize: bool,
    surface: bool,
    context: bool,
    make_current: bool,
    link: bool,
    swap: bool,
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    next_id: u32,
    failures: Failures,
    candidates: Vec<ConfigCandidate>,
    surface_size: (u32, u32),

    shaders: HashMap<ShaderId, CompiledStage>,
    programs: HashMap<ProgramId, LinkedProgram>,
    textures: HashMap<TextureId, MockTexture>,
    shaders_created: usize,
    shaders_deleted: usize,
    programs_created: usize,
    programs_deleted: usize,
    textures_created: usize,
    textures_deleted: usize,

    current_program: Option<ProgramId>,
    attributes: HashMap<AttributeLocation, VertexAttribute>,
    enabled: BTreeSet<AttributeLocation>,
    uniforms: HashMap<(ProgramId, UniformLocation), Mat4>,
    bound_texture: Option<TextureId>,
    draws: Vec<DrawRecord>,
    errors: VecDeque<GpuError>,
}

impl MockState {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone)]
pub struct MockGpu {
    state: Rc<RefCell<MockState>>,
}

impl MockGpu {
    /// The candidate [`ConfigRequirements::default`](super::ConfigRequirements) selects.
    pub const MATCHING_CONFIG: ConfigId = ConfigId(2);

    pub fn new() -> Self {
        let candidate = |id, bits, depth| ConfigCandidate {
            id: ConfigId(id),
            red_bits: bits,
            green_bits: bits,
            blue_bits: bits,
            depth_bits: depth,
            es3_renderable: true,
            window_surface: true,
        };

        let state = MockState {
            candidates: vec![
                candidate(0, 5, 16),
                candidate(1, 8, 0),
                candidate(2, 8, 24),
                candidate(3, 8, 24),
            ],
            surface_size: (640, 480),
            ..Default::default()
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    // ── failure injection ────────────────────────────────────────────────

    pub fn fail_initialize(&self) {
        self.state.borrow_mut().failures.initialize = true;
    }

    pub fn fail_surface(&self) {
        self.state.borrow_mut().failures.surface = true;
    }

    pub fn fail_context(&self) {
        self.state.borrow_mut().failures.context = true;
    }

    pub fn fail_make_current(&self) {
        self.state.borrow_mut().failures.make_current = true;
    }

    pub fn fail_link(&self) {
        self.state.borrow_mut().failures.link = true;
    }

    pub fn fail_swap(&self) {
        self.state.borrow_mut().failures.swap = true;
    }

    pub fn clear_candidates(&self) {
        self.state.borrow_mut().candidates.clear();
    }

    pub fn set_surface_size(&self, width: u32, height: u32) {
        self.state.borrow_mut().surface_size = (width, height);
    }

    pub fn push_error(&self, err: GpuError) {
        self.state.borrow_mut().errors.push_back(err);
    }

    // ── inspection ───────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// `(created, deleted)` shader objects.
    pub fn shader_counts(&self) -> (usize, usize) {
        let s = self.state.borrow();
        (s.shaders_created, s.shaders_deleted)
    }

    /// `(created, deleted)` program objects.
    pub fn program_counts(&self) -> (usize, usize) {
        let s = self.state.borrow();
        (s.programs_created, s.programs_deleted)
    }

    /// `(created, deleted)` texture objects.
    pub fn texture_counts(&self) -> (usize, usize) {
        let s = self.state.borrow();
        (s.textures_created, s.textures_deleted)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    pub fn enabled_attributes(&self) -> Vec<AttributeLocation> {
        self.state.borrow().enabled.iter().copied().collect()
    }

    pub fn uniform(&self, program: ProgramId, location: UniformLocation) -> Option<Mat4> {
        self.state.borrow().uniforms.get(&(program, location)).copied()
    }

    /// Number of uploads to `location` recorded so far.
    pub fn uniform_uploads(&self, location: UniformLocation) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::UniformMatrix4(location))
            .count()
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    pub fn texture_has_mipmaps(&self, texture: TextureId) -> Option<bool> {
        self.state.borrow().textures.get(&texture).map(|t| t.mipmaps)
    }

    /// Texel at `(x, y)` as normalized floats.
    pub fn sample_texel(&self, texture: TextureId, x: u32, y: u32) -> Option<[f32; 4]> {
        let state = self.state.borrow();
        let tex = state.textures.get(&texture)?;
        if x >= tex.width || y >= tex.height {
            return None;
        }
        let at = ((y * tex.width + x) * 4) as usize;
        let px = &tex.pixels[at..at + 4];
        Some([
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ])
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl DisplayConnection for MockGpu {
    fn initialize(&self) -> Result<(), String> {
        self.record(Call::Initialize);
        if self.state.borrow().failures.initialize {
            return Err("no display".into());
        }
        Ok(())
    }

    fn config_candidates(&self) -> Vec<ConfigCandidate> {
        self.state.borrow().candidates.clone()
    }

    fn create_window_surface(&self, _config: ConfigId) -> Result<(), String> {
        self.record(Call::CreateWindowSurface);
        if self.state.borrow().failures.surface {
            return Err("surface rejected".into());
        }
        Ok(())
    }

    fn create_context(&self, _config: ConfigId) -> Result<(), String> {
        self.record(Call::CreateContext);
        if self.state.borrow().failures.context {
            return Err("context rejected".into());
        }
        Ok(())
    }

    fn make_current(&self) -> bool {
        self.record(Call::MakeCurrent);
        !self.state.borrow().failures.make_current
    }

    fn release_current(&self) {
        self.record(Call::ReleaseCurrent);
    }

    fn destroy_context(&self) {
        self.record(Call::DestroyContext);
    }

    fn destroy_surface(&self) {
        self.record(Call::DestroySurface);
    }

    fn terminate(&self) {
        self.record(Call::Terminate);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.state.borrow().surface_size
    }

    fn swap_buffers(&self) -> Result<(), String> {
        self.record(Call::SwapBuffers);
        if self.state.borrow().failures.swap {
            return Err("surface lost".into());
        }
        Ok(())
    }

    fn info(&self) -> GpuInfo {
        GpuInfo {
            vendor: "vertigo".into(),
            renderer: "mock".into(),
            version: "0".into(),
            extensions: vec!["MOCK_recording".into()],
        }
    }
}

impl GraphicsApi for MockGpu {
    fn create_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        self.record(Call::CreateShader(stage));
        let compiled = reflect::compile(stage, source)?;

        let mut s = self.state.borrow_mut();
        let id = ShaderId(s.alloc());
        s.shaders.insert(id, compiled);
        s.shaders_created += 1;
        Ok(id)
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.record(Call::DeleteShader(shader));
        let mut s = self.state.borrow_mut();
        if s.shaders.remove(&shader).is_some() {
            s.shaders_deleted += 1;
        } else {
            s.errors
                .push_back(GpuError::InvalidValue(format!("unknown shader {shader:?}")));
        }
    }

    fn create_program(&self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        self.record(Call::CreateProgram);
        let mut s = self.state.borrow_mut();
        if s.failures.link {
            return Err("link rejected".into());
        }

        let linked = {
            let vs = s.shaders.get(&vertex).ok_or("unknown vertex shader")?;
            let fs = s.shaders.get(&fragment).ok_or("unknown fragment shader")?;
            reflect::link(vs, fs)?
        };

        let id = ProgramId(s.alloc());
        s.programs.insert(id, linked);
        s.programs_created += 1;
        Ok(id)
    }

    fn delete_program(&self, program: ProgramId) {
        self.record(Call::DeleteProgram(program));
        let mut s = self.state.borrow_mut();
        if s.programs.remove(&program).is_some() {
            s.programs_deleted += 1;
            if s.current_program == Some(program) {
                s.current_program = None;
            }
        } else {
            s.errors
                .push_back(GpuError::InvalidValue(format!("unknown program {program:?}")));
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        let s = self.state.borrow();
        s.programs
            .get(&program)?
            .attribute_location(name)
            .map(AttributeLocation)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let s = self.state.borrow();
        s.programs
            .get(&program)?
            .uniform_index(name)
            .map(|i| UniformLocation(i as u32))
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_matrix4(&self, location: UniformLocation, matrix: &Mat4) {
        self.record(Call::UniformMatrix4(location));
        let mut s = self.state.borrow_mut();
        match s.current_program {
            Some(program) => {
                s.uniforms.insert((program, location), *matrix);
            }
            None => s.errors.push_back(GpuError::InvalidOperation(
                "uniform upload without a current program".into(),
            )),
        }
    }

    fn vertex_attribute(&self, location: AttributeLocation, attribute: VertexAttribute) {
        self.record(Call::VertexAttribute(location, attribute));
        self.state.borrow_mut().attributes.insert(location, attribute);
    }

    fn enable_vertex_attribute(&self, location: AttributeLocation) {
        self.record(Call::EnableVertexAttribute(location));
        self.state.borrow_mut().enabled.insert(location);
    }

    fn disable_vertex_attribute(&self, location: AttributeLocation) {
        self.record(Call::DisableVertexAttribute(location));
        self.state.borrow_mut().enabled.remove(&location);
    }

    fn create_texture(
        &self,
        image: &ImageData<'_>,
        options: TextureOptions,
    ) -> Result<TextureId, String> {
        self.record(Call::CreateTexture);
        let row = image.width as usize * 4;
        let stride = image.stride as usize;
        if image.width == 0 || image.height == 0 || stride < row {
            return Err("invalid texture dimensions".into());
        }
        let needed = stride * (image.height as usize - 1) + row;
        if image.pixels.len() < needed {
            return Err("pixel buffer too small".into());
        }

        let pixels = image
            .pixels
            .chunks(stride)
            .take(image.height as usize)
            .flat_map(|r| r[..row].iter().copied())
            .collect();

        let mut s = self.state.borrow_mut();
        let id = TextureId(s.alloc());
        s.textures.insert(
            id,
            MockTexture {
                width: image.width,
                height: image.height,
                pixels,
                mipmaps: options.mipmaps,
            },
        );
        s.textures_created += 1;
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.record(Call::DeleteTexture(texture));
        let mut s = self.state.borrow_mut();
        if s.textures.remove(&texture).is_some() {
            s.textures_deleted += 1;
            if s.bound_texture == Some(texture) {
                s.bound_texture = None;
            }
        } else {
            s.errors
                .push_back(GpuError::InvalidValue(format!("unknown texture {texture:?}")));
        }
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        self.record(Call::BindTexture(unit, texture));
        self.state.borrow_mut().bound_texture = texture;
    }

    fn draw_elements(&self, topology: Topology, vertices: &[u8], indices: &[u16]) {
        self.record(Call::DrawElements(topology, indices.len()));
        let mut s = self.state.borrow_mut();
        let record = DrawRecord {
            program: s.current_program,
            topology,
            vertex_bytes: vertices.len(),
            indices: indices.to_vec(),
            enabled: s.enabled.iter().copied().collect(),
            texture: s.bound_texture,
        };
        if record.program.is_none() {
            s.errors
                .push_back(GpuError::InvalidOperation("draw without a current program".into()));
        }
        s.draws.push(record);
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn set_clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::SetClearColor(rgba));
    }

    fn set_blend(&self, blend: Option<BlendFunc>) {
        self.record(Call::SetBlend(blend));
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn take_error(&self) -> Option<GpuError> {
        self.state.borrow_mut().errors.pop_front()
    }
}
