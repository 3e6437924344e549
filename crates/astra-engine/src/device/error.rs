/// Device acquisition failed; rendering cannot start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    /// No adapter was found, or the platform denied access to it.
    #[error("no graphics adapter available")]
    NoAdapterAvailable,

    /// An adapter exists but refused to open a device.
    #[error("adapter `{adapter}` refused to create a device: {reason}")]
    DeviceRefused { adapter: String, reason: String },
}
