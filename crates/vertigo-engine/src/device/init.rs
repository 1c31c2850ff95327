/// Parameters for bringing up the wgpu backend: instance, adapter, device and
/// surface configuration.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may choose from.
    pub backends: wgpu::Backends,

    /// Adapter preference when several GPUs are present.
    pub power_preference: wgpu::PowerPreference,

    /// Rank sRGB surface formats ahead of linear ones.
    ///
    /// Off by default: clear colors and texels then reach the screen
    /// unconverted. Textures follow the surface's encoding either way.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and matches a vsync'd buffer swap. Unsupported
    /// modes fall back to FIFO.
    pub present_mode: wgpu::PresentMode,

    /// Compositor alpha mode. `None`, or a mode the surface lacks, picks the
    /// surface's first supported one.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must have. The renderer itself needs none.
    pub required_features: wgpu::Features,

    /// Device limits; texture uploads are checked against
    /// `max_texture_dimension_2d`.
    pub required_limits: wgpu::Limits,

    /// Frames the surface may queue ahead. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
