use std::rc::Rc;

use super::config::{choose_config, ConfigRequirements};
use super::display::{ConfigId, DisplayConnection, GpuInfo};

/// Error raised while bringing a session up. Always fatal to the session.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SessionError(pub String);

/// An initialized display with a surface and a current context.
///
/// Teardown runs in reverse creation order and only touches stages that were
/// actually created, so a session that failed halfway never destroys
/// something it never made.
pub struct GpuSession<D: DisplayConnection> {
    display: Rc<D>,
    config: Option<ConfigId>,
    initialized: bool,
    surface: bool,
    context: bool,
    current: bool,
}

impl<D: DisplayConnection> GpuSession<D> {
    pub fn open(display: Rc<D>, requirements: &ConfigRequirements) -> Result<Self, SessionError> {
        let mut session = Self {
            display,
            config: None,
            initialized: false,
            surface: false,
            context: false,
            current: false,
        };

        // Early returns drop `session`, which unwinds whatever was created.
        session
            .display
            .initialize()
            .map_err(|e| SessionError(format!("display initialization failed: {e}")))?;
        session.initialized = true;

        let candidates = session.display.config_candidates();
        log::debug!("display offers {} configs", candidates.len());
        let config = choose_config(&candidates, requirements).ok_or_else(|| {
            SessionError(format!(
                "no config with r{}g{}b{} depth {} es3 window support",
                requirements.red_bits,
                requirements.green_bits,
                requirements.blue_bits,
                requirements.depth_bits
            ))
        })?;
        session.config = Some(config);

        session
            .display
            .create_window_surface(config)
            .map_err(|e| SessionError(format!("window surface creation failed: {e}")))?;
        session.surface = true;

        session
            .display
            .create_context(config)
            .map_err(|e| SessionError(format!("context creation failed: {e}")))?;
        session.context = true;

        if !session.display.make_current() {
            return Err(SessionError("failed to make context current".into()));
        }
        session.current = true;

        log::info!("gpu session ready with {config:?}");
        Ok(session)
    }

    pub fn display(&self) -> &Rc<D> {
        &self.display
    }

    pub fn config(&self) -> Option<ConfigId> {
        self.config
    }

    pub fn info(&self) -> GpuInfo {
        self.display.info()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.display.surface_size()
    }

    pub fn swap_buffers(&self) -> Result<(), String> {
        self.display.swap_buffers()
    }
}

impl<D: DisplayConnection> Drop for GpuSession<D> {
    fn drop(&mut self) {
        if self.current {
            self.display.release_current();
        }
        if self.context {
            self.display.destroy_context();
        }
        if self.surface {
            self.display.destroy_surface();
        }
        if self.initialized {
            self.display.terminate();
        }
        log::debug!("gpu session torn down");
    }
}
