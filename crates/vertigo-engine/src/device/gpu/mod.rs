//! wgpu implementation of the device seam.
//!
//! The lifecycle stages map onto wgpu objects as follows:
//! - `initialize`: instance, window surface, adapter
//! - `create_window_surface`: surface configuration for the chosen format
//! - `create_context`: device and queue, surface configured
//! - `swap_buffers`: replay of the recorded frame, submit, present
//!
//! Draw calls are recorded as they arrive and replayed inside one render pass
//! at present time; uniform uploads go through `Queue::write_buffer`, so the
//! last upload before a present is the one every draw of that frame sees.

mod context;
mod frame;
mod mipmap;
mod resources;
mod surface;

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use winit::window::Window;

use crate::device::{ConfigCandidate, ConfigId, DisplayConnection, GpuError, GpuInfo, GpuInit};

use context::{Context, Display, ErrorQueue};
use frame::FrameRecording;
use resources::{DrawState, Objects};

/// GPU backend bound to one window.
pub struct WgpuBackend {
    window: Arc<Window>,
    init: GpuInit,

    display: RefCell<Option<Display>>,
    /// Surface formats in preference order; `ConfigId(i)` names `formats[i]`.
    formats: RefCell<Vec<wgpu::TextureFormat>>,
    surface_config: RefCell<Option<wgpu::SurfaceConfiguration>>,
    context: RefCell<Option<Context>>,
    current: Cell<bool>,

    objects: RefCell<Objects>,
    state: RefCell<DrawState>,
    frame: RefCell<FrameRecording>,
    errors: ErrorQueue,
}

impl WgpuBackend {
    pub fn new(window: Arc<Window>, init: GpuInit) -> Self {
        Self {
            window,
            init,
            display: RefCell::new(None),
            formats: RefCell::new(Vec::new()),
            surface_config: RefCell::new(None),
            context: RefCell::new(None),
            current: Cell::new(false),
            objects: RefCell::new(Objects::default()),
            state: RefCell::new(DrawState::default()),
            frame: RefCell::new(FrameRecording::default()),
            errors: ErrorQueue::default(),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Format of the configured surface, once a window surface exists.
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.surface_config.borrow().as_ref().map(|c| c.format)
    }

    fn push_error(&self, err: GpuError) {
        log::trace!("gpu error recorded: {err}");
        if let Ok(mut queue) = self.errors.lock() {
            queue.push_back(err);
        }
    }

    /// Device and queue handles while a context is current.
    fn device(&self) -> Option<(wgpu::Device, wgpu::Queue)> {
        if !self.current.get() {
            return None;
        }
        self.context
            .borrow()
            .as_ref()
            .map(|c| (c.device.clone(), c.queue.clone()))
    }
}

impl DisplayConnection for WgpuBackend {
    fn initialize(&self) -> Result<(), String> {
        let display = context::open_display(self.window.clone(), &self.init)?;
        let caps = display.surface.get_capabilities(&display.adapter);
        *self.formats.borrow_mut() = surface::ordered_formats(&caps, self.init.prefer_srgb);
        *self.display.borrow_mut() = Some(display);
        Ok(())
    }

    fn config_candidates(&self) -> Vec<ConfigCandidate> {
        surface::candidates(&self.formats.borrow())
    }

    fn create_window_surface(&self, config: ConfigId) -> Result<(), String> {
        let display = self.display.borrow();
        let display = display.as_ref().ok_or("display not initialized")?;
        let format = self
            .formats
            .borrow()
            .get(config.0 as usize)
            .copied()
            .ok_or_else(|| format!("unknown config {config:?}"))?;

        let caps = display.surface.get_capabilities(&display.adapter);
        let size = self.window.inner_size();

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface::choose_present_mode(&caps, self.init.present_mode),
            alpha_mode: surface::choose_alpha_mode(&caps, self.init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };

        log::debug!(
            "window surface: {:?} {}x{} {:?}",
            surface_config.format,
            surface_config.width,
            surface_config.height,
            surface_config.present_mode
        );
        *self.surface_config.borrow_mut() = Some(surface_config);
        Ok(())
    }

    fn create_context(&self, config: ConfigId) -> Result<(), String> {
        let display = self.display.borrow();
        let display = display.as_ref().ok_or("display not initialized")?;
        let surface_config = self.surface_config.borrow();
        let surface_config = surface_config.as_ref().ok_or("no window surface")?;

        if self.formats.borrow().get(config.0 as usize) != Some(&surface_config.format) {
            return Err(format!("{config:?} does not match the window surface"));
        }

        let context = context::create_device(&display.adapter, &self.init, self.errors.clone())?;
        display.surface.configure(&context.device, surface_config);

        *self.context.borrow_mut() = Some(context);
        Ok(())
    }

    fn make_current(&self) -> bool {
        let ready = self.context.borrow().is_some() && self.surface_config.borrow().is_some();
        self.current.set(ready);
        ready
    }

    fn release_current(&self) {
        self.current.set(false);
        *self.frame.borrow_mut() = FrameRecording::default();
    }

    fn destroy_context(&self) {
        *self.state.borrow_mut() = DrawState::default();
        *self.objects.borrow_mut() = Objects::default();
        *self.context.borrow_mut() = None;
    }

    fn destroy_surface(&self) {
        *self.surface_config.borrow_mut() = None;
    }

    fn terminate(&self) {
        *self.display.borrow_mut() = None;
        self.formats.borrow_mut().clear();
    }

    fn surface_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn swap_buffers(&self) -> Result<(), String> {
        frame::present(self)
    }

    fn info(&self) -> GpuInfo {
        self.display
            .borrow()
            .as_ref()
            .map(|d| context::gpu_info(&d.adapter))
            .unwrap_or_default()
    }
}
