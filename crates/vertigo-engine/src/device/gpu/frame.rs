use crate::device::SurfaceErrorAction;

use super::{surface, WgpuBackend};

/// Viewport rectangle in window pixels, origin at the bottom-left corner.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One indexed draw, captured with everything needed to replay it.
pub(super) struct RecordedDraw {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_groups: Vec<wgpu::BindGroup>,
    pub vertex_buffer: wgpu::Buffer,
    /// Vertex buffer slots, all fed from `vertex_buffer`.
    pub streams: u32,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub viewport: Option<Viewport>,
}

/// Work recorded since the last present.
///
/// Draws are replayed in order inside a single render pass when the frame is
/// presented. A clear drops everything recorded before it.
#[derive(Default)]
pub(super) struct FrameRecording {
    pub clear: Option<wgpu::Color>,
    pub draws: Vec<RecordedDraw>,
}

impl FrameRecording {
    pub fn clear(&mut self, color: wgpu::Color) {
        self.clear = Some(color);
        self.draws.clear();
    }
}

/// Maps a bottom-left-origin viewport onto a `target` of the given size,
/// clipped to its bounds. Returns `None` when nothing remains visible.
pub(super) fn clip_viewport(vp: Viewport, target: (u32, u32)) -> Option<[f32; 4]> {
    let (tw, th) = (target.0 as i64, target.1 as i64);
    let left = (vp.x as i64).max(0);
    let right = (vp.x as i64 + vp.width as i64).min(tw);
    // Flip to a top-left origin.
    let top = (th - (vp.y as i64 + vp.height as i64)).max(0);
    let bottom = (th - vp.y as i64).min(th);

    if right <= left || bottom <= top {
        return None;
    }
    Some([
        left as f32,
        top as f32,
        (right - left) as f32,
        (bottom - top) as f32,
    ])
}

/// Acquires the surface texture, replays the recorded frame and presents it.
///
/// Lost or outdated surfaces are reconfigured and the frame is dropped, as is
/// a frame on a window with no area. Only an out-of-memory surface error is
/// returned to the caller.
pub(super) fn present(backend: &WgpuBackend) -> Result<(), String> {
    let recording = std::mem::take(&mut *backend.frame.borrow_mut());

    if !backend.current.get() {
        return Err("no context is current".into());
    }

    let display = backend.display.borrow();
    let display = display.as_ref().ok_or("display not initialized")?;
    let context = backend.context.borrow();
    let context = context.as_ref().ok_or("no context")?;
    let mut config = backend.surface_config.borrow_mut();
    let config = config.as_mut().ok_or("no window surface")?;

    if !surface::apply_resize(
        &display.surface,
        &context.device,
        config,
        backend.window.inner_size(),
    ) {
        log::trace!("window has no area; frame skipped");
        return Ok(());
    }

    let surface_texture = match display.surface.get_current_texture() {
        Ok(texture) => texture,
        Err(err) => {
            let message = err.to_string();
            return match surface::map_surface_error(&display.surface, &context.device, config, err)
            {
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                    log::warn!("frame skipped: {message}");
                    Ok(())
                }
                SurfaceErrorAction::Fatal => Err(format!("surface error: {message}")),
            };
        }
    };

    let view = surface_texture
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vertigo frame encoder"),
        });

    {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vertigo model pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(recording.clear.unwrap_or(wgpu::Color::BLACK)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for draw in &recording.draws {
            if let Some(vp) = draw.viewport {
                let Some([x, y, w, h]) = clip_viewport(vp, (config.width, config.height)) else {
                    continue;
                };
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);
            }

            rpass.set_pipeline(&draw.pipeline);
            for (i, group) in draw.bind_groups.iter().enumerate() {
                rpass.set_bind_group(i as u32, group, &[]);
            }
            for slot in 0..draw.streams {
                rpass.set_vertex_buffer(slot, draw.vertex_buffer.slice(..));
            }
            rpass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
    }

    context.queue.submit(std::iter::once(encoder.finish()));
    surface_texture.present();

    log::trace!("presented {} draws", recording.draws.len());
    Ok(())
}
