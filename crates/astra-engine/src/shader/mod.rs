//! Shader unit compilation.
//!
//! WGSL source is parsed and validated with naga (the same front-end wgpu
//! uses), so failures surface as located diagnostics before any GPU object is
//! created, and the stage interface is available for pipeline linkage.

pub mod builtin;
mod error;
mod reflect;
mod unit;

use std::fmt;

pub use error::{CompilationError, Diagnostic, SourceLocation};
pub use reflect::{
    BindingKind, InterfaceVar, Interpolation, IoType, ReflectedKind, ResourceUse, Sampling,
    ScalarKind, StageInterface, TextureDimension, TextureSample,
};
pub use unit::ShaderUnit;

/// Programmable stage a unit is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}
