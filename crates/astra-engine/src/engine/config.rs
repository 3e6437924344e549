use crate::device::DeviceInit;
use crate::paint::ClearColor;
use crate::pipeline::{ColorFormat, Topology};
use crate::shader::builtin;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub device: DeviceInit,

    /// Target color format; `None` picks the surface's preferred format.
    pub output_format: Option<ColorFormat>,

    pub topology: Topology,

    pub clear_color: ClearColor,

    /// Vertices per draw; the vertex shader synthesises them from
    /// `@builtin(vertex_index)`.
    pub vertex_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: DeviceInit::default(),
            output_format: None,
            topology: Topology::TriangleList,
            clear_color: ClearColor::TRANSPARENT,
            vertex_count: 3,
        }
    }
}

/// Shader text the host hands to the engine.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,

    /// Entry points to select when a source declares several.
    pub vertex_entry: Option<String>,
    pub fragment_entry: Option<String>,

    /// Prefix for shader and pipeline labels.
    pub label: Option<String>,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            vertex_entry: None,
            fragment_entry: None,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The built-in triangle and solid red fill.
impl Default for ShaderSources {
    fn default() -> Self {
        Self::new(builtin::TRIANGLE_VERT, builtin::RED_FRAG).with_label("builtin")
    }
}
