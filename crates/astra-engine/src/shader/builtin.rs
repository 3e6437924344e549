//! Default shader sources.
//!
//! Hosts that do not supply their own WGSL get a solid red triangle.

/// Vertex stage synthesising a triangle from `@builtin(vertex_index)`.
///
/// Draw it with exactly 3 vertices and no vertex buffer.
pub const TRIANGLE_VERT: &str = include_str!("shaders/triangle.vert.wgsl");

/// Fragment stage writing opaque red to `@location(0)`.
pub const RED_FRAG: &str = include_str!("shaders/red.frag.wgsl");
