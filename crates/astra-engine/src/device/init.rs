/// Adapter selection hint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

/// Backend-neutral parameters for device acquisition.
///
/// Keep this minimal; API-specific knobs belong to the backend's own options
/// (see [`GpuOptions`](crate::backend::gpu::GpuOptions)).
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Debug label attached to the logical device.
    pub label: String,

    pub power_preference: PowerPreference,

    /// Ask for a software adapter instead of hardware.
    pub force_fallback_adapter: bool,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            label: "astra device".to_owned(),
            power_preference: PowerPreference::HighPerformance,
            force_fallback_adapter: false,
        }
    }
}
