/// Failure to obtain a frame image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The display region was destroyed or the device was lost. Only an
    /// external reconfiguration can recover the surface.
    #[error("surface lost")]
    Lost,

    /// A ticket from an earlier acquisition has not been presented yet.
    #[error("a frame ticket is already outstanding")]
    TicketAlreadyOutstanding,

    /// Never configured, or configured with a zero-sized region.
    #[error("surface is not configured")]
    Unconfigured,

    /// The image is temporarily unavailable (timeout, outdated swapchain).
    /// Retrying next frame is expected to succeed.
    #[error("surface image temporarily unavailable")]
    Transient,
}
