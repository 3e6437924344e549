//! Presentable surface management.
//!
//! The [`SurfaceManager`] keeps the backend surface configured for the
//! current display region and hands out one [`FrameTicket`] at a time.

mod error;
mod manager;
mod ticket;

pub use error::SurfaceError;
pub use manager::SurfaceManager;
pub use ticket::FrameTicket;
