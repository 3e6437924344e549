//! Engine façade wiring device, surface, pipeline and frame loop together.

mod config;
#[allow(clippy::module_inception)]
mod engine;
mod report;

pub use config::{EngineConfig, ShaderSources};
pub use engine::Engine;
pub use report::{FatalError, FatalReason};
