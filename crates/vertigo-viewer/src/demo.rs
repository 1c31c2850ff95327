//! Demo scenes: a textured quad, or a textured cube under a wireframe.

use std::rc::Rc;

use image::RgbaImage;
use vertigo_engine::device::{Backend, ImageData};
use vertigo_engine::render::{Index, Model, RenderError, Texture, Vertex};
use vertigo_engine::scene::{SceneBuilder, SceneCtx};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SceneKind {
    #[default]
    Quad,
    Cube,
}

pub struct DemoScene {
    kind: SceneKind,
    image: Option<RgbaImage>,
}

impl DemoScene {
    pub fn new(kind: SceneKind, image: Option<RgbaImage>) -> Self {
        Self { kind, image }
    }

    fn surface_texture<B: Backend>(
        &self,
        ctx: &SceneCtx<B>,
    ) -> Result<Rc<Texture<B>>, RenderError> {
        match &self.image {
            Some(image) => ctx.texture_from_image(&ImageData {
                width: image.width(),
                height: image.height(),
                stride: image.width() * 4,
                pixels: image.as_raw(),
            }),
            None => ctx.solid_color(255, 215, 0, 255),
        }
    }
}

impl<B: Backend> SceneBuilder<B> for DemoScene {
    fn build(&mut self, ctx: &SceneCtx<B>) -> Result<Vec<Model<B>>, RenderError> {
        let texture = self.surface_texture(ctx)?;

        match self.kind {
            SceneKind::Quad => {
                let (vertices, indices) = quad();
                Ok(vec![Model::triangles(vertices, indices, texture)?])
            }
            SceneKind::Cube => {
                let (vertices, indices) = cube();
                let (edge_vertices, edge_indices) = cube_edges();
                let white = ctx.solid_color(255, 255, 255, 255)?;
                Ok(vec![
                    Model::triangles(vertices, indices, texture)?,
                    Model::lines(edge_vertices, edge_indices, white)?,
                ])
            }
        }
    }
}

/// ```text
/// 0 --- 1
/// | \   |
/// |  \  |
/// |   \ |
/// 3 --- 2
/// ```
fn quad() -> (Vec<Vertex>, Vec<Index>) {
    let vertices = vec![
        Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0]),
        Vertex::new([-1.0, 1.0, 0.0], [1.0, 0.0]),
        Vertex::new([-1.0, -1.0, 0.0], [1.0, 1.0]),
        Vertex::new([1.0, -1.0, 0.0], [0.0, 1.0]),
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

const CUBE_HALF: f32 = 0.75;

/// Corners of the cube, bit 0/1/2 selecting +x/+y/+z.
fn corner(i: usize) -> [f32; 3] {
    let axis = |bit: usize| if i & bit != 0 { CUBE_HALF } else { -CUBE_HALF };
    [axis(1), axis(2), axis(4)]
}

/// Four vertices per face so every face carries the full texture.
fn cube() -> (Vec<Vertex>, Vec<Index>) {
    // Corner indices per face, counter-clockwise seen from outside.
    const FACES: [[usize; 4]; 6] = [
        [4, 5, 7, 6], // +z
        [1, 0, 2, 3], // -z
        [5, 1, 3, 7], // +x
        [0, 4, 6, 2], // -x
        [6, 7, 3, 2], // +y
        [0, 1, 5, 4], // -y
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in FACES {
        let base = vertices.len() as Index;
        for (&c, uv) in face.iter().zip(UVS) {
            vertices.push(Vertex::new(corner(c), uv));
        }
        indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// The twelve cube edges as line segments over the eight corners.
fn cube_edges() -> (Vec<Vertex>, Vec<Index>) {
    let vertices = (0..8).map(|i| Vertex::new(corner(i), [0.5, 0.5])).collect();

    let mut indices = Vec::with_capacity(24);
    for a in 0..8usize {
        for bit in [1, 2, 4] {
            if a & bit == 0 {
                indices.extend([a as Index, (a | bit) as Index]);
            }
        }
    }
    (vertices, indices)
}
