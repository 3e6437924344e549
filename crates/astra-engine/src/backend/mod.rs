//! Graphics backend contracts.
//!
//! The engine never talks to a graphics API directly. A backend is a type
//! family ([`Backend`]) naming its concrete objects, plus one role trait per
//! object kind. Two families ship with the crate:
//!
//! - [`gpu`]: wgpu (Vulkan/Metal/DX12/GL/WebGPU)
//! - [`headless`]: no display; records everything it is asked to do

pub mod gpu;
pub mod headless;

use std::future::Future;
use std::ops::Range;

use crate::coords::Extent;
use crate::device::{AcquireError, DeviceInit};
use crate::paint::ClearColor;
use crate::pipeline::{BindingLimits, ColorFormat, PipelineLayout, Topology};
use crate::shader::ShaderUnit;
use crate::surface::SurfaceError;

/// Names the concrete objects of one graphics backend.
pub trait Backend: Sized {
    type Adapter: GraphicsAdapter<Self>;
    type Device: GraphicsDevice<Self>;
    type Queue: SubmissionQueue<Self>;
    type Surface: PresentSurface<Self>;
    type ShaderModule;
    type Pipeline;
    type Image: PresentableImage;
    type CommandSequence: CommandSequence<Self>;
    type CommandBuffer;
}

/// A physical graphics backend able to open logical devices.
pub trait GraphicsAdapter<B: Backend> {
    /// Human-readable adapter name for logs.
    fn name(&self) -> String;

    /// Opens a logical device and its submission queue.
    ///
    /// This is the only engine operation that may suspend.
    fn request_device(
        &self,
        init: &DeviceInit,
    ) -> impl Future<Output = Result<(B::Device, B::Queue), AcquireError>>;
}

/// The backend refused an object the engine asked for.
///
/// Backends capture their validation failures and return them here instead
/// of aborting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{object} rejected by the device: {reason}")]
pub struct ValidationError {
    pub object: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(object: &'static str, reason: impl Into<String>) -> Self {
        Self {
            object,
            reason: reason.into(),
        }
    }
}

/// Logical device: creates every other GPU object.
pub trait GraphicsDevice<B: Backend> {
    /// Bind group limits pipeline layouts are resolved against.
    fn binding_limits(&self) -> BindingLimits;

    fn create_shader_module(&self, unit: &ShaderUnit) -> B::ShaderModule;

    /// Builds a pipeline whose linkage has already been resolved.
    fn create_pipeline(&self, desc: &PipelineDescriptor<'_, B>) -> Result<B::Pipeline, ValidationError>;

    fn create_command_sequence(&self, label: Option<&str>) -> B::CommandSequence;
}

/// Channel finished command buffers are pushed to.
pub trait SubmissionQueue<B: Backend> {
    fn submit(&self, commands: B::CommandBuffer);
}

/// Surface configuration requested by the surface manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub format: ColorFormat,
    /// Never empty.
    pub extent: Extent,
}

/// Presentable target bound to a display region.
pub trait PresentSurface<B: Backend> {
    /// Format the display prefers; used when the host does not pick one.
    fn preferred_format(&self) -> ColorFormat;

    /// Applies `config`; a format or size the display cannot take is
    /// returned as an error and leaves the surface unusable.
    fn configure(&mut self, device: &B::Device, config: &SurfaceConfig) -> Result<(), ValidationError>;

    /// Acquires the next image. Only [`SurfaceError::Lost`] and
    /// [`SurfaceError::Transient`] are expected from backends.
    fn acquire(&mut self) -> Result<B::Image, SurfaceError>;

    fn present(&mut self, image: B::Image);
}

/// Image acquired from a surface for one frame.
pub trait PresentableImage {
    fn size(&self) -> Extent;
}

/// Records passes into a command buffer.
pub trait CommandSequence<B: Backend> {
    fn encode_render_pass(&mut self, target: &B::Image, pass: &RenderPassDesc<'_, B>);

    fn finish(self) -> B::CommandBuffer;
}

/// One programmable stage of a pipeline descriptor.
pub struct StageDesc<'a, B: Backend> {
    pub module: &'a B::ShaderModule,
    pub entry_point: &'a str,
}

/// Everything a backend needs to build a render pipeline.
pub struct PipelineDescriptor<'a, B: Backend> {
    pub label: Option<&'a str>,
    pub vertex: StageDesc<'a, B>,
    pub fragment: StageDesc<'a, B>,
    pub layout: &'a PipelineLayout,
    pub topology: Topology,
    pub format: ColorFormat,
}

/// A non-indexed draw without vertex buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

impl DrawCall {
    /// `count` vertices, one instance.
    pub fn vertices(count: u32) -> Self {
        Self {
            vertices: 0..count,
            instances: 0..1,
        }
    }
}

/// A single render pass: clear the target, bind one pipeline, issue one draw.
pub struct RenderPassDesc<'a, B: Backend> {
    pub label: Option<&'a str>,
    pub clear: ClearColor,
    pub pipeline: &'a B::Pipeline,
    pub draw: DrawCall,
}
