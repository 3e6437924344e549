//! Adapter scope and device context.
//!
//! Acquisition order: the host selects an adapter once and wraps it in an
//! [`AdapterScope`]; [`DeviceContext::acquire`] then opens the logical device
//! and queue every other engine object depends on.

mod adapter;
mod context;
mod error;
mod init;

pub use adapter::AdapterScope;
pub use context::DeviceContext;
pub use error::AcquireError;
pub use init::{DeviceInit, PowerPreference};
