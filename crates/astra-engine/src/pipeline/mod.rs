//! Render pipeline construction.
//!
//! A pipeline combines a vertex unit, a fragment unit, a primitive topology
//! and an output color format. The layout is resolved explicitly from both
//! stage interfaces before anything is created on the device.

mod builder;
mod error;
mod format;
pub mod layout;

pub use builder::{Pipeline, PipelineBuilder};
pub use error::LinkageError;
pub use format::{ColorFormat, Topology};
pub use layout::{BindGroupLayout, BindingLimits, LayoutEntry, PipelineLayout, StageVisibility};
