/// Instance and surface settings of the gpu backend.
///
/// Read once by [`GpuInstance`](super::GpuInstance); surfaces and devices
/// created from it keep their own copy.
#[derive(Debug, Clone)]
pub struct GpuOptions {
    /// Native APIs wgpu may open adapters on.
    pub backends: wgpu::Backends,

    /// Pick an sRGB swapchain format when the display offers one, so the
    /// builtin shaders' linear output is encoded on present.
    pub prefer_srgb: bool,

    /// Swapchain pacing. The frame loop expects one tick per vertical sync,
    /// so `Fifo` is the default and the fallback when the display refuses the
    /// requested mode.
    pub present_mode: wgpu::PresentMode,

    /// Compositing of the cleared, transparent background. `None`, or a mode
    /// the display lacks, takes the first mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must expose; adapter requests fail otherwise.
    pub required_features: wgpu::Features,

    /// Limits the device is opened with. Pipeline layouts are checked
    /// against the limits the device actually grants.
    pub required_limits: wgpu::Limits,

    /// Frames the swapchain may queue ahead of the display.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
