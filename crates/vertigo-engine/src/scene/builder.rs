use std::rc::Rc;

use crate::device::{Backend, ImageData};
use crate::render::{Model, RenderError, Texture};

/// Handles available while a scene is being built.
pub struct SceneCtx<B: Backend> {
    gpu: Rc<B>,
}

impl<B: Backend> SceneCtx<B> {
    pub(crate) fn new(gpu: Rc<B>) -> Self {
        Self { gpu }
    }

    pub fn gpu(&self) -> &Rc<B> {
        &self.gpu
    }

    /// Uploads decoded RGBA8 pixels. Clone the returned handle to share the
    /// texture between models.
    pub fn texture_from_image(
        &self,
        image: &ImageData<'_>,
    ) -> Result<Rc<Texture<B>>, RenderError> {
        Texture::from_image(&self.gpu, image).map(Rc::new)
    }

    pub fn solid_color(&self, r: u8, g: u8, b: u8, a: u8) -> Result<Rc<Texture<B>>, RenderError> {
        Texture::solid_color(&self.gpu, r, g, b, a).map(Rc::new)
    }
}

/// Produces the models a renderer draws, in draw order.
///
/// Called once per renderer, with the program already active. Errors abort
/// renderer construction; builders with their own error types can return
/// them through [`RenderError::Scene`].
pub trait SceneBuilder<B: Backend> {
    fn build(&mut self, ctx: &SceneCtx<B>) -> Result<Vec<Model<B>>, RenderError>;
}

impl<B, F> SceneBuilder<B> for F
where
    B: Backend,
    F: FnMut(&SceneCtx<B>) -> Result<Vec<Model<B>>, RenderError>,
{
    fn build(&mut self, ctx: &SceneCtx<B>) -> Result<Vec<Model<B>>, RenderError> {
        self(ctx)
    }
}
