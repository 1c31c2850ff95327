use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::gpu::WgpuBackend;
use crate::device::GpuInit;
use crate::render::{RenderError, Renderer, RendererConfig};
use crate::scene::SceneBuilder;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
    pub renderer: RendererConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vertigo".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            gpu: GpuInit::default(),
            renderer: RendererConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window and renders `scene` into it until the window closes.
    ///
    /// The scene builder runs again every time the surface comes back after a
    /// suspend. Returns an error if a frame failed to present.
    pub fn run<S>(config: RuntimeConfig, scene: S) -> Result<()>
    where
        S: SceneBuilder<WgpuBackend> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct AppState<S> {
    config: RuntimeConfig,
    scene: S,

    window: Option<Arc<Window>>,
    /// Present only between `resumed` and `suspended`, and only if
    /// construction succeeded.
    renderer: Option<Renderer<WgpuBackend>>,
    failure: Option<anyhow::Error>,
}

impl<S> AppState<S>
where
    S: SceneBuilder<WgpuBackend>,
{
    fn new(config: RuntimeConfig, scene: S) -> Self {
        Self {
            config,
            scene,
            window: None,
            renderer: None,
            failure: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        if let Some(window) = &self.window {
            return Ok(window.clone());
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        self.window = Some(window.clone());
        Ok(window)
    }

    fn create_renderer(&mut self, window: Arc<Window>) -> Result<(), RenderError> {
        let backend = WgpuBackend::new(window, self.config.gpu.clone());
        let renderer = Renderer::new(backend, &self.config.renderer, &mut self.scene)?;
        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.renderer = None;
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl<S> ApplicationHandler for AppState<S>
where
    S: SceneBuilder<WgpuBackend>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        let window = match self.ensure_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        // No renderer this cycle; the next resume tries again.
        if let Err(e) = self.create_renderer(window.clone()) {
            log::error!("renderer unavailable: {e}");
            return;
        }
        window.request_redraw();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.renderer.take().is_some() {
            log::info!("surface lost; renderer released");
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation: every frame advances the rotation.
        if self.renderer.is_some() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.renderer = None;
                self.window = None;
                event_loop.exit();
            }

            // The renderer picks up the new size on its next frame.
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                if let Err(e) = renderer.render_frame() {
                    self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer = None;
        self.window = None;
    }
}
