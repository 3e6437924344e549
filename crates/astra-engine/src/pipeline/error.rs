use crate::backend::ValidationError;
use crate::shader::{IoType, ShaderStage};

use super::ColorFormat;

/// The two stages cannot be combined into one pipeline.
///
/// Everything but [`Rejected`](Self::Rejected) is raised by layout resolution
/// before any GPU object is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkageError {
    #[error("expected a {expected} shader in the {expected} slot, got a {actual} shader")]
    StageMismatch {
        expected: ShaderStage,
        actual: ShaderStage,
    },

    #[error("vertex stage declares @location inputs {locations:?}, but no vertex buffers are bound")]
    VertexInputsUnsupported { locations: Vec<u32> },

    #[error("fragment input @location({location}) is not written by the vertex stage")]
    MissingVertexOutput { location: u32 },

    #[error("@location({location}) is {vertex} in the vertex stage but {fragment} in the fragment stage")]
    TypeMismatch {
        location: u32,
        vertex: IoType,
        fragment: IoType,
    },

    #[error("@location({location}) is interpolated differently in the vertex and fragment stages")]
    InterpolationMismatch { location: u32 },

    #[error("@location({location}) has a type that cannot cross stages")]
    UnresolvedType { location: u32 },

    #[error("fragment stage does not write @location(0)")]
    MissingColorOutput,

    #[error("fragment output {ty} cannot be written to a {format} target")]
    IncompatibleColorOutput { ty: IoType, format: ColorFormat },

    #[error("stages disagree on the resource at @group({group}) @binding({binding})")]
    ConflictingBinding { group: u32, binding: u32 },

    #[error("cannot infer a layout entry for @group({group}) @binding({binding}): {reason}")]
    UnresolvableBinding {
        group: u32,
        binding: u32,
        reason: &'static str,
    },

    #[error("@group({group}) exceeds the device limit of {max} bind groups")]
    BindGroupLimit { group: u32, max: u32 },

    #[error("@group({group}) @binding({binding}) exceeds the device limit of {max} bindings per group")]
    BindingLimit { group: u32, binding: u32, max: u32 },

    #[error(transparent)]
    Rejected(#[from] ValidationError),
}
