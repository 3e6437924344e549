//! Astra engine crate.
//!
//! A minimal real-time renderer meant to be embedded in a host application:
//! it acquires a graphics device, keeps a presentable surface configured,
//! builds one shader pipeline and draws it once per display refresh.
//!
//! The host owns the window and the refresh callback. Everything GPU-facing
//! goes through a [`backend::Backend`]; [`backend::gpu`] renders with wgpu and
//! [`backend::headless`] records instead of drawing.

pub mod backend;
pub mod device;
pub mod engine;
pub mod frame;
pub mod pipeline;
pub mod shader;
pub mod surface;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod time;

pub use engine::{Engine, EngineConfig, FatalError, FatalReason, ShaderSources};
