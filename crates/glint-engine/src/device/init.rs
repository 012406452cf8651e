/// Surface and device preferences for [`super::Gpu::new`].
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: draw colors are written to the target unconverted.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported; frame pacing on top of it is the frame clock's job.
    pub present_mode: wgpu::PresentMode,

    /// Requested compositing alpha mode; falls back to the surface's first
    /// supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
