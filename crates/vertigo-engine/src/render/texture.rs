use std::rc::Rc;

use crate::device::{GraphicsApi, ImageData, TextureId, TextureOptions};

use super::RenderError;

/// One GPU texture. The handle is released exactly once, on drop.
///
/// Share between models through `Rc<Texture<B>>`; the handle then lives until
/// the last model (or other holder) lets go.
pub struct Texture<B: GraphicsApi> {
    gpu: Rc<B>,
    id: TextureId,
    width: u32,
    height: u32,
}

impl<B: GraphicsApi> Texture<B> {
    /// Uploads decoded RGBA8 pixels with a full mip chain, linear filtering
    /// and clamp-to-edge wrapping.
    pub fn from_image(gpu: &Rc<B>, image: &ImageData<'_>) -> Result<Self, RenderError> {
        validate(image)?;
        let id = gpu
            .create_texture(image, TextureOptions { mipmaps: true })
            .map_err(RenderError::Texture)?;

        log::debug!("texture {id:?} uploaded ({}x{})", image.width, image.height);
        Ok(Self {
            gpu: gpu.clone(),
            id,
            width: image.width,
            height: image.height,
        })
    }

    /// A 1×1 texture of one color.
    pub fn solid_color(gpu: &Rc<B>, r: u8, g: u8, b: u8, a: u8) -> Result<Self, RenderError> {
        let pixel = [r, g, b, a];
        let image = ImageData {
            width: 1,
            height: 1,
            stride: 4,
            pixels: &pixel,
        };
        let id = gpu
            .create_texture(&image, TextureOptions { mipmaps: false })
            .map_err(RenderError::Texture)?;

        Ok(Self {
            gpu: gpu.clone(),
            id,
            width: 1,
            height: 1,
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl<B: GraphicsApi> Drop for Texture<B> {
    fn drop(&mut self) {
        self.gpu.delete_texture(self.id);
    }
}

fn validate(image: &ImageData<'_>) -> Result<(), RenderError> {
    if image.width == 0 || image.height == 0 {
        return Err(RenderError::Texture(format!(
            "image has zero size ({}x{})",
            image.width, image.height
        )));
    }

    let row = image.width as usize * 4;
    if (image.stride as usize) < row {
        return Err(RenderError::Texture(format!(
            "stride {} is shorter than a row of {row} bytes",
            image.stride
        )));
    }

    let needed = image.stride as usize * (image.height as usize - 1) + row;
    if image.pixels.len() < needed {
        return Err(RenderError::Texture(format!(
            "{} pixel bytes for a {}x{} image with stride {} (need {needed})",
            image.pixels.len(),
            image.width,
            image.height,
            image.stride
        )));
    }
    Ok(())
}
