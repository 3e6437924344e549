use std::fmt;
use std::time::Duration;

use crate::coords::Extent;

/// Lifecycle of a frame loop. `Stopped` is terminal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    #[error("frame loop cannot start: it is {state}")]
    AlreadyStarted { state: LoopState },
}

/// What a presented frame looked like.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    /// Clamped time since the previous presented frame.
    pub dt: Duration,
    pub size: Extent,
}

/// Result of delivering one tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    Presented(FrameInfo),
    /// The surface had no image this refresh; the next tick is requested.
    Skipped,
    /// The surface is gone; the loop has stopped.
    SurfaceLost,
    /// Stale epoch, loop not running, or no tick was requested.
    Ignored,
}

impl TickOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, Self::Presented(_))
    }
}
