//! Per-refresh frame loop.
//!
//! Each honoured tick acquires the surface image, encodes one render pass
//! that draws the pipeline, submits it and presents. The loop never runs on
//! its own: it asks its [`TickScheduler`] for one tick at a time.

mod frame_loop;
mod outcome;
mod scheduler;

pub use frame_loop::FrameLoop;
pub use outcome::{FrameInfo, LoopError, LoopState, TickOutcome};
pub use scheduler::{Epoch, TickQueue, TickScheduler};
