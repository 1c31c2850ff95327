use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::device::{GraphicsApi, Topology};

use super::{RenderError, Texture};

/// Index into a model's vertex list.
pub type Index = u16;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// RGBA in 0..=1. Not read by the model shader.
    pub color: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
    pub const POSITION_OFFSET: u32 = 0;
    pub const UV_OFFSET: u32 = 12;

    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            uv,
            color: [1.0; 4],
        }
    }

    pub const fn with_color(position: [f32; 3], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }
}

/// Immutable vertex/index data drawn with one texture.
pub struct Model<B: GraphicsApi> {
    vertices: Vec<Vertex>,
    indices: Vec<Index>,
    texture: Rc<Texture<B>>,
    topology: Topology,
}

impl<B: GraphicsApi> Model<B> {
    /// Checks that every index addresses a vertex and that the index count
    /// forms whole primitives.
    pub fn new(
        vertices: Vec<Vertex>,
        indices: Vec<Index>,
        texture: Rc<Texture<B>>,
        topology: Topology,
    ) -> Result<Self, RenderError> {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::InvalidModel(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let per_primitive = match topology {
            Topology::Triangles => 3,
            Topology::Lines => 2,
        };
        if indices.len() % per_primitive != 0 {
            return Err(RenderError::InvalidModel(format!(
                "{} indices do not form whole {topology:?} primitives",
                indices.len()
            )));
        }

        Ok(Self {
            vertices,
            indices,
            texture,
            topology,
        })
    }

    pub fn triangles(
        vertices: Vec<Vertex>,
        indices: Vec<Index>,
        texture: Rc<Texture<B>>,
    ) -> Result<Self, RenderError> {
        Self::new(vertices, indices, texture, Topology::Triangles)
    }

    pub fn lines(
        vertices: Vec<Vertex>,
        indices: Vec<Index>,
        texture: Rc<Texture<B>>,
    ) -> Result<Self, RenderError> {
        Self::new(vertices, indices, texture, Topology::Lines)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    pub fn texture(&self) -> &Rc<Texture<B>> {
        &self.texture
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Vertex data as uploaded.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
