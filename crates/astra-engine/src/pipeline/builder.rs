use crate::backend::{Backend, PipelineDescriptor, StageDesc};
use crate::device::DeviceContext;
use crate::shader::ShaderUnit;

use super::layout::{self, PipelineLayout};
use super::{ColorFormat, LinkageError, Topology};

/// Assembles a [`Pipeline`] from a vertex and a fragment unit.
///
/// ```ignore
/// let pipeline = PipelineBuilder::new(vertex, fragment)
///     .topology(Topology::TriangleList)
///     .output_format(surface.preferred_format())
///     .build(&device)?;
/// ```
#[derive(Debug)]
pub struct PipelineBuilder {
    vertex: ShaderUnit,
    fragment: ShaderUnit,
    label: Option<String>,
    topology: Topology,
    format: ColorFormat,
}

impl PipelineBuilder {
    /// Defaults: [`Topology::TriangleList`], [`ColorFormat::Bgra8UnormSrgb`].
    pub fn new(vertex: ShaderUnit, fragment: ShaderUnit) -> Self {
        Self {
            vertex,
            fragment,
            label: None,
            topology: Topology::default(),
            format: ColorFormat::Bgra8UnormSrgb,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn output_format(mut self, format: ColorFormat) -> Self {
        self.format = format;
        self
    }

    /// Resolves the layout and creates the backend pipeline.
    ///
    /// On a linkage error nothing is created on the device. A pipeline the
    /// device itself refuses comes back as [`LinkageError::Rejected`].
    pub fn build<B: Backend>(self, device: &DeviceContext<B>) -> Result<Pipeline<B>, LinkageError> {
        let layout = layout::resolve(
            &self.vertex,
            &self.fragment,
            self.format,
            device.binding_limits(),
        )?;

        let vs_module = device.create_shader_module(&self.vertex);
        let fs_module = device.create_shader_module(&self.fragment);

        let raw = device.create_pipeline(&PipelineDescriptor {
            label: self.label.as_deref(),
            vertex: StageDesc {
                module: &vs_module,
                entry_point: self.vertex.entry_point(),
            },
            fragment: StageDesc {
                module: &fs_module,
                entry_point: self.fragment.entry_point(),
            },
            layout: &layout,
            topology: self.topology,
            format: self.format,
        })?;

        log::info!(
            "pipeline `{}` built: {:?} -> {} ({} bind groups)",
            self.label.as_deref().unwrap_or("unnamed"),
            self.topology,
            self.format,
            layout.bind_groups().len()
        );

        Ok(Pipeline {
            raw,
            label: self.label,
            vertex: self.vertex,
            fragment: self.fragment,
            topology: self.topology,
            format: self.format,
            layout,
        })
    }
}

/// Immutable executable pipeline.
///
/// Owns the shader units it was built from. A different topology or output
/// format requires building a new pipeline.
pub struct Pipeline<B: Backend> {
    raw: B::Pipeline,
    label: Option<String>,
    vertex: ShaderUnit,
    fragment: ShaderUnit,
    topology: Topology,
    format: ColorFormat,
    layout: PipelineLayout,
}

impl<B: Backend> Pipeline<B> {
    /// Backend pipeline object.
    pub fn raw(&self) -> &B::Pipeline {
        &self.raw
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn vertex(&self) -> &ShaderUnit {
        &self.vertex
    }

    pub fn fragment(&self) -> &ShaderUnit {
        &self.fragment
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }
}
