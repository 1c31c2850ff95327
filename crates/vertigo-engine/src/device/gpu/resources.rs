use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::device::reflect::{self, CompiledStage, LinkedProgram, ResourceKind};
use crate::device::{
    AttributeLocation, BlendFactor, BlendFunc, GpuError, GraphicsApi, ImageData, ProgramId,
    ShaderId, ShaderStage, TextureId, TextureOptions, Topology, UniformLocation, VertexAttribute,
};
use crate::math::Mat4;

use super::frame::{RecordedDraw, Viewport};
use super::{mipmap, WgpuBackend};

/// Live GPU objects, keyed by the handles given out to callers.
#[derive(Default)]
pub(super) struct Objects {
    next_id: u32,
    shaders: HashMap<ShaderId, GpuShader>,
    programs: HashMap<ProgramId, GpuProgram>,
    textures: HashMap<TextureId, GpuTexture>,
}

impl Objects {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

struct GpuShader {
    stage: CompiledStage,
    module: wgpu::ShaderModule,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    topology: Topology,
    streams: Vec<(AttributeLocation, VertexAttribute)>,
    blend: Option<BlendFunc>,
    format: wgpu::TextureFormat,
}

struct GpuProgram {
    linked: LinkedProgram,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    group_layouts: Vec<wgpu::BindGroupLayout>,
    layout: wgpu::PipelineLayout,
    /// One buffer per uniform resource, indexed like `linked.resources()`.
    uniforms: Vec<Option<wgpu::Buffer>>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    bind_groups: HashMap<(u32, Option<TextureId>), wgpu::BindGroup>,
}

struct GpuTexture {
    // Owns the storage behind `view`.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Bind-then-draw state, as last set by the caller.
#[derive(Default)]
pub(super) struct DrawState {
    program: Option<ProgramId>,
    attributes: BTreeMap<AttributeLocation, VertexAttribute>,
    enabled: BTreeSet<AttributeLocation>,
    texture: Option<TextureId>,
    blend: Option<BlendFunc>,
    clear_color: [f32; 4],
    viewport: Option<Viewport>,
}

fn stage_label(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertigo vertex shader",
        ShaderStage::Fragment => "vertigo fragment shader",
    }
}

fn vertex_format(components: u8) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn blend_state(blend: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: blend_factor(blend.src),
        dst_factor: blend_factor(blend.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
    }
}

fn visibility(vertex: bool, fragment: bool) -> wgpu::ShaderStages {
    let mut stages = wgpu::ShaderStages::NONE;
    if vertex {
        stages |= wgpu::ShaderStages::VERTEX;
    }
    if fragment {
        stages |= wgpu::ShaderStages::FRAGMENT;
    }
    stages
}

fn create_group_layout(
    device: &wgpu::Device,
    linked: &LinkedProgram,
    group: u32,
) -> wgpu::BindGroupLayout {
    let entries: Vec<_> = linked
        .resources()
        .iter()
        .filter(|r| r.group == group)
        .map(|r| wgpu::BindGroupLayoutEntry {
            binding: r.binding,
            visibility: visibility(r.vertex, r.fragment),
            ty: match r.kind {
                ResourceKind::Uniform { size } => wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(size as u64),
                },
                ResourceKind::Texture => wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                ResourceKind::Sampler => {
                    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                }
            },
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("vertigo program bgl"),
        entries: &entries,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    program: &GpuProgram,
    key: &PipelineKey,
) -> wgpu::RenderPipeline {
    let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
        .streams
        .iter()
        .map(|(location, attr)| {
            [wgpu::VertexAttribute {
                format: vertex_format(attr.components).unwrap_or(wgpu::VertexFormat::Float32x4),
                offset: attr.offset as u64,
                shader_location: location.0,
            }]
        })
        .collect();

    let buffers: Vec<_> = key
        .streams
        .iter()
        .zip(&attributes)
        .map(|((_, attr), attributes)| wgpu::VertexBufferLayout {
            array_stride: attr.stride as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
        .collect();

    log::debug!(
        "building pipeline: {:?}, {} streams, blend {:?}",
        key.topology,
        key.streams.len(),
        key.blend
    );

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("vertigo model pipeline"),
        layout: Some(&program.layout),

        vertex: wgpu::VertexState {
            module: &program.vertex,
            entry_point: Some(&program.linked.vertex_entry),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &program.fragment,
            entry_point: Some(&program.linked.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: key.blend.map(blend_state),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: primitive_topology(key.topology),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        // No depth test: later draws land on top.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

/// Checks that `indices` only address whole vertices inside `vertices` for
/// every stream.
fn indices_in_bounds(
    streams: &[(AttributeLocation, VertexAttribute)],
    vertices: &[u8],
    indices: &[u16],
) -> bool {
    let Some(&max) = indices.iter().max() else {
        return true;
    };
    streams.iter().all(|(_, a)| {
        let end = max as u64 * a.stride as u64 + a.offset as u64 + a.components as u64 * 4;
        end <= vertices.len() as u64
    })
}

/// Bind group for `group`, built from the program's uniform buffers and, when
/// the group samples, the bound texture. Cached per texture.
fn bind_group(
    device: &wgpu::Device,
    program: &mut GpuProgram,
    textures: &HashMap<TextureId, GpuTexture>,
    group: u32,
    texture: Option<TextureId>,
) -> Result<wgpu::BindGroup, GpuError> {
    let samples = program
        .linked
        .resources()
        .iter()
        .any(|r| r.group == group && !matches!(r.kind, ResourceKind::Uniform { .. }));

    let key = (group, if samples { texture } else { None });
    if let Some(bg) = program.bind_groups.get(&key) {
        return Ok(bg.clone());
    }

    let bound = match key.1 {
        Some(id) => Some(textures.get(&id).ok_or_else(|| {
            GpuError::InvalidOperation(format!("bound texture {id:?} no longer exists"))
        })?),
        None if samples => {
            return Err(GpuError::InvalidOperation(
                "program samples a texture but none is bound".into(),
            ));
        }
        None => None,
    };

    let mut entries = Vec::new();
    for (i, r) in program.linked.resources().iter().enumerate() {
        if r.group != group {
            continue;
        }
        let resource = match (r.kind, bound) {
            (ResourceKind::Uniform { .. }, _) => {
                match program.uniforms.get(i).and_then(Option::as_ref) {
                    Some(buffer) => buffer.as_entire_binding(),
                    None => {
                        return Err(GpuError::Internal(format!(
                            "no uniform buffer behind binding {}",
                            r.binding
                        )));
                    }
                }
            }
            (ResourceKind::Texture, Some(tex)) => wgpu::BindingResource::TextureView(&tex.view),
            (ResourceKind::Sampler, Some(tex)) => wgpu::BindingResource::Sampler(&tex.sampler),
            (_, None) => {
                return Err(GpuError::InvalidOperation("no texture bound".into()));
            }
        };
        entries.push(wgpu::BindGroupEntry {
            binding: r.binding,
            resource,
        });
    }

    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("vertigo program bind group"),
        layout: &program.group_layouts[group as usize],
        entries: &entries,
    });
    program.bind_groups.insert(key, bg.clone());
    Ok(bg)
}

impl WgpuBackend {
    fn record_draw(
        &self,
        topology: Topology,
        vertices: &[u8],
        indices: &[u16],
    ) -> Result<(), GpuError> {
        let (device, _) = self
            .device()
            .ok_or_else(|| GpuError::InvalidOperation("draw without a current context".into()))?;
        let format = self
            .surface_format()
            .ok_or_else(|| GpuError::InvalidOperation("draw without a window surface".into()))?;

        let state = self.state.borrow();
        let program_id = state
            .program
            .ok_or_else(|| GpuError::InvalidOperation("draw without a current program".into()))?;

        let mut objects = self.objects.borrow_mut();
        let Objects {
            programs, textures, ..
        } = &mut *objects;
        let program = programs
            .get_mut(&program_id)
            .ok_or_else(|| GpuError::InvalidOperation(format!("{program_id:?} was deleted")))?;

        let mut streams = Vec::new();
        for location in program.linked.attribute_locations().map(AttributeLocation) {
            let attr = state
                .attributes
                .get(&location)
                .filter(|_| state.enabled.contains(&location))
                .ok_or_else(|| {
                    GpuError::InvalidOperation(format!("vertex input {location:?} is not enabled"))
                })?;
            streams.push((location, *attr));
        }

        if !indices_in_bounds(&streams, vertices, indices) {
            return Err(GpuError::InvalidValue(
                "index addresses a vertex outside the vertex data".into(),
            ));
        }

        let key = PipelineKey {
            topology,
            streams,
            blend: state.blend,
            format,
        };
        if !program.pipelines.contains_key(&key) {
            let pipeline = create_pipeline(&device, program, &key);
            program.pipelines.insert(key.clone(), pipeline);
        }
        let pipeline = program.pipelines[&key].clone();

        let mut bind_groups = Vec::new();
        for group in 0..program.linked.group_count() {
            bind_groups.push(bind_group(&device, program, textures, group, state.texture)?);
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertigo draw vbo"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertigo draw ibo"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.frame.borrow_mut().draws.push(RecordedDraw {
            pipeline,
            bind_groups,
            vertex_buffer,
            streams: key.streams.len() as u32,
            index_buffer,
            index_count: indices.len() as u32,
            viewport: state.viewport,
        });
        Ok(())
    }
}

impl GraphicsApi for WgpuBackend {
    fn create_shader(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let (device, _) = self.device().ok_or("no current context")?;
        let compiled = reflect::compile(stage, source)?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(stage_label(stage)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let mut objects = self.objects.borrow_mut();
        let id = ShaderId(objects.alloc());
        objects.shaders.insert(
            id,
            GpuShader {
                stage: compiled,
                module,
            },
        );
        Ok(id)
    }

    fn delete_shader(&self, shader: ShaderId) {
        if self.objects.borrow_mut().shaders.remove(&shader).is_none() {
            self.push_error(GpuError::InvalidValue(format!("unknown shader {shader:?}")));
        }
    }

    fn create_program(&self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        let (device, _) = self.device().ok_or("no current context")?;
        let mut objects = self.objects.borrow_mut();

        let vs = objects.shaders.get(&vertex).ok_or("unknown vertex shader")?;
        let fs = objects.shaders.get(&fragment).ok_or("unknown fragment shader")?;
        let linked = reflect::link(&vs.stage, &fs.stage)?;
        let (vertex, fragment) = (vs.module.clone(), fs.module.clone());

        let group_layouts: Vec<_> = (0..linked.group_count())
            .map(|g| create_group_layout(&device, &linked, g))
            .collect();
        let layout_refs: Vec<_> = group_layouts.iter().collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vertigo program layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let uniforms = linked
            .resources()
            .iter()
            .map(|r| match r.kind {
                ResourceKind::Uniform { size } => {
                    Some(device.create_buffer(&wgpu::BufferDescriptor {
                        label: r.name.as_deref(),
                        size: size as u64,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }))
                }
                _ => None,
            })
            .collect();

        let id = ProgramId(objects.alloc());
        log::debug!(
            "linked {id:?}: {} -> {}, {} bind groups",
            linked.vertex_entry,
            linked.fragment_entry,
            group_layouts.len()
        );
        objects.programs.insert(
            id,
            GpuProgram {
                linked,
                vertex,
                fragment,
                group_layouts,
                layout,
                uniforms,
                pipelines: HashMap::new(),
                bind_groups: HashMap::new(),
            },
        );
        Ok(id)
    }

    fn delete_program(&self, program: ProgramId) {
        if self.objects.borrow_mut().programs.remove(&program).is_none() {
            self.push_error(GpuError::InvalidValue(format!("unknown program {program:?}")));
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.program == Some(program) {
            state.program = None;
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        self.objects
            .borrow()
            .programs
            .get(&program)?
            .linked
            .attribute_location(name)
            .map(AttributeLocation)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.objects
            .borrow()
            .programs
            .get(&program)?
            .linked
            .uniform_index(name)
            .map(|i| UniformLocation(i as u32))
    }

    fn use_program(&self, program: Option<ProgramId>) {
        if let Some(id) = program {
            if !self.objects.borrow().programs.contains_key(&id) {
                self.push_error(GpuError::InvalidValue(format!("unknown program {id:?}")));
                return;
            }
        }
        self.state.borrow_mut().program = program;
    }

    fn uniform_matrix4(&self, location: UniformLocation, matrix: &Mat4) {
        let Some((_, queue)) = self.device() else {
            self.push_error(GpuError::InvalidOperation("uniform upload without a context".into()));
            return;
        };
        let Some(program) = self.state.borrow().program else {
            self.push_error(GpuError::InvalidOperation(
                "uniform upload without a current program".into(),
            ));
            return;
        };

        let objects = self.objects.borrow();
        let buffer = objects
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get(location.0 as usize))
            .and_then(Option::as_ref)
            .filter(|b| b.size() >= std::mem::size_of::<Mat4>() as u64);

        match buffer {
            Some(buffer) => queue.write_buffer(buffer, 0, bytemuck::cast_slice(&matrix[..])),
            None => {
                drop(objects);
                self.push_error(GpuError::InvalidOperation(format!(
                    "{location:?} is not a mat4 uniform of {program:?}"
                )));
            }
        }
    }

    fn vertex_attribute(&self, location: AttributeLocation, attribute: VertexAttribute) {
        if vertex_format(attribute.components).is_none() || attribute.stride == 0 {
            self.push_error(GpuError::InvalidValue(format!(
                "unsupported vertex attribute {attribute:?}"
            )));
            return;
        }
        self.state.borrow_mut().attributes.insert(location, attribute);
    }

    fn enable_vertex_attribute(&self, location: AttributeLocation) {
        self.state.borrow_mut().enabled.insert(location);
    }

    fn disable_vertex_attribute(&self, location: AttributeLocation) {
        self.state.borrow_mut().enabled.remove(&location);
    }

    fn create_texture(
        &self,
        image: &ImageData<'_>,
        options: TextureOptions,
    ) -> Result<TextureId, String> {
        let (device, queue) = self.device().ok_or("no current context")?;

        let (width, height) = (image.width, image.height);
        let row = width as usize * 4;
        let stride = image.stride as usize;
        if width == 0 || height == 0 {
            return Err(format!("texture has zero size ({width}x{height})"));
        }
        if stride < row {
            return Err(format!("stride {stride} is shorter than a row of {row} bytes"));
        }
        if image.pixels.len() < stride * (height as usize - 1) + row {
            return Err("pixel buffer is shorter than width x height".into());
        }
        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(format!("texture {width}x{height} exceeds the {max} limit"));
        }

        let format = match self.surface_format() {
            Some(f) if f.is_srgb() => wgpu::TextureFormat::Rgba8UnormSrgb,
            _ => wgpu::TextureFormat::Rgba8Unorm,
        };
        let mip_level_count = if options.mipmaps {
            mipmap::level_count(width, height)
        } else {
            1
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vertigo texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let write_level = |level: u32, w: u32, h: u32, data: &[u8], bytes_per_row: u32| {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        };

        let packed = (stride != row || options.mipmaps)
            .then(|| mipmap::pack_rows(image.pixels, stride, row, height as usize));
        let base = packed.as_deref().unwrap_or(image.pixels);
        write_level(0, width, height, base, width * 4);

        if options.mipmaps {
            for (i, level) in mipmap::build_chain(width, height, base).iter().enumerate() {
                let row_bytes = level.width * 4;
                write_level(i as u32 + 1, level.width, level.height, &level.pixels, row_bytes);
            }
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vertigo texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: if options.mipmaps {
                wgpu::MipmapFilterMode::Linear
            } else {
                wgpu::MipmapFilterMode::Nearest
            },
            ..Default::default()
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut objects = self.objects.borrow_mut();
        let id = TextureId(objects.alloc());
        objects.textures.insert(
            id,
            GpuTexture {
                _texture: texture,
                view,
                sampler,
            },
        );
        log::debug!("created {id:?}: {width}x{height}, {mip_level_count} levels, {format:?}");
        Ok(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut objects = self.objects.borrow_mut();
        if objects.textures.remove(&texture).is_none() {
            drop(objects);
            self.push_error(GpuError::InvalidValue(format!("unknown texture {texture:?}")));
            return;
        }
        for program in objects.programs.values_mut() {
            program.bind_groups.retain(|(_, t), _| *t != Some(texture));
        }
        drop(objects);

        let mut state = self.state.borrow_mut();
        if state.texture == Some(texture) {
            state.texture = None;
        }
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        if unit != 0 {
            self.push_error(GpuError::InvalidValue(format!("texture unit {unit} unsupported")));
            return;
        }
        self.state.borrow_mut().texture = texture;
    }

    fn draw_elements(&self, topology: Topology, vertices: &[u8], indices: &[u16]) {
        if indices.is_empty() {
            return;
        }
        if let Err(err) = self.record_draw(topology, vertices, indices) {
            self.push_error(err);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.state.borrow_mut().viewport = Some(Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn set_clear_color(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().clear_color = rgba;
    }

    fn set_blend(&self, blend: Option<BlendFunc>) {
        self.state.borrow_mut().blend = blend;
    }

    fn clear(&self) {
        let [r, g, b, a] = self.state.borrow().clear_color;
        self.frame.borrow_mut().clear(wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        });
    }

    fn take_error(&self) -> Option<GpuError> {
        self.errors.lock().ok()?.pop_front()
    }
}
