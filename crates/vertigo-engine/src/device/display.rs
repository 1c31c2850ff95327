/// Identifies one framebuffer configuration offered by a display.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ConfigId(pub u32);

/// A framebuffer configuration candidate, in the display's preference order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConfigCandidate {
    pub id: ConfigId,
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub depth_bits: u8,
    /// Can host an OpenGL ES 3 class context.
    pub es3_renderable: bool,
    /// Can back a window surface.
    pub window_surface: bool,
}

/// Adapter/driver strings reported once a context exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub extensions: Vec<String>,
}

/// Connection to the GPU driver for one drawable surface.
///
/// Lifecycle, in order: `initialize` → `create_window_surface` →
/// `create_context` → `make_current` … `release_current` → `destroy_context`
/// → `destroy_surface` → `terminate`. [`GpuSession`](super::GpuSession)
/// enforces the ordering and only tears down what was created.
pub trait DisplayConnection {
    fn initialize(&self) -> Result<(), String>;

    /// Configurations usable with the surface, most preferred first.
    fn config_candidates(&self) -> Vec<ConfigCandidate>;

    fn create_window_surface(&self, config: ConfigId) -> Result<(), String>;
    fn create_context(&self, config: ConfigId) -> Result<(), String>;

    /// Binds the context to the surface on the calling thread.
    fn make_current(&self) -> bool;
    fn release_current(&self);

    fn destroy_context(&self);
    fn destroy_surface(&self);
    fn terminate(&self);

    /// Current drawable size in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Presents the frame. Implies a flush of all pending work.
    fn swap_buffers(&self) -> Result<(), String>;

    fn info(&self) -> GpuInfo;
}
