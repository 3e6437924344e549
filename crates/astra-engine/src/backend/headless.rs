//! Display-less backend.
//!
//! Nothing is rasterised. Every device call, submission and presentation is
//! appended to a shared [`Recorder`], which makes this backend the
//! instrumented queue/surface for tests and lets hosts without a display
//! exercise the full engine lifecycle.
//!
//! Single-threaded: all handles share state through `Rc`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::coords::Extent;
use crate::device::{AcquireError, DeviceInit};
use crate::paint::ClearColor;
use crate::pipeline::{BindingLimits, ColorFormat, Topology};
use crate::shader::{ShaderStage, ShaderUnit};
use crate::surface::SurfaceError;

use super::{
    Backend, CommandSequence, DrawCall, GraphicsAdapter, GraphicsDevice, PipelineDescriptor,
    PresentSurface, PresentableImage, RenderPassDesc, SubmissionQueue, SurfaceConfig,
    ValidationError,
};

/// Type family of the headless backend.
#[derive(Debug)]
pub enum Headless {}

impl Backend for Headless {
    type Adapter = HeadlessAdapter;
    type Device = HeadlessDevice;
    type Queue = HeadlessQueue;
    type Surface = HeadlessSurface;
    type ShaderModule = HeadlessShaderModule;
    type Pipeline = HeadlessPipeline;
    type Image = HeadlessImage;
    type CommandSequence = HeadlessCommandSequence;
    type CommandBuffer = HeadlessCommandBuffer;
}

// ── recording ─────────────────────────────────────────────────────────────

/// One render pass as it was encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPass {
    pub label: Option<String>,
    pub target: Extent,
    pub clear: ClearColor,
    pub pipeline: u64,
    pub draws: Vec<DrawCall>,
}

/// One command buffer as it reached the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub label: Option<String>,
    pub passes: Vec<RecordedPass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPipeline {
    pub id: u64,
    pub label: Option<String>,
    pub topology: Topology,
    pub format: ColorFormat,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub bind_groups: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub image: u64,
    pub size: Extent,
}

/// Everything the backend has been asked to do so far.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub devices: u32,
    pub shader_modules: Vec<(ShaderStage, String)>,
    pub pipelines: Vec<RecordedPipeline>,
    pub configurations: Vec<SurfaceConfig>,
    pub submissions: Vec<Submission>,
    pub presentations: Vec<Presentation>,
}

#[derive(Debug, Default)]
struct Shared {
    log: Recording,
    surface_lost: bool,
    device_refusal: Option<String>,
    pipeline_rejection: Option<String>,
    binding_limits: BindingLimits,
}

/// Shared handle onto the recording and the fault switches.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    shared: Rc<RefCell<Shared>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recording at this point.
    pub fn snapshot(&self) -> Recording {
        self.shared.borrow().log.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.shared.borrow().log.submissions.len()
    }

    pub fn presentation_count(&self) -> usize {
        self.shared.borrow().log.presentations.len()
    }

    /// Simulates destruction of the display region: every acquisition fails
    /// with [`SurfaceError::Lost`] until the surface is configured again.
    pub fn lose_surface(&self) {
        self.shared.borrow_mut().surface_lost = true;
    }

    /// Makes subsequent device requests fail with `reason`.
    pub fn refuse_devices(&self, reason: impl Into<String>) {
        self.shared.borrow_mut().device_refusal = Some(reason.into());
    }

    /// Makes subsequent pipeline creation fail with `reason`, as a device
    /// validation error would.
    pub fn reject_pipelines(&self, reason: impl Into<String>) {
        self.shared.borrow_mut().pipeline_rejection = Some(reason.into());
    }

    /// Limits reported by devices opened after this call.
    pub fn set_binding_limits(&self, limits: BindingLimits) {
        self.shared.borrow_mut().binding_limits = limits;
    }

    fn record(&self, f: impl FnOnce(&mut Recording)) {
        f(&mut self.shared.borrow_mut().log);
    }
}

// ── adapter / device / queue ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HeadlessAdapter {
    name: String,
    recorder: Recorder,
}

impl HeadlessAdapter {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            name: "headless".to_owned(),
            recorder: recorder.clone(),
        }
    }
}

impl GraphicsAdapter<Headless> for HeadlessAdapter {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn request_device(
        &self,
        init: &DeviceInit,
    ) -> Result<(HeadlessDevice, HeadlessQueue), AcquireError> {
        if let Some(reason) = self.recorder.shared.borrow().device_refusal.clone() {
            return Err(AcquireError::DeviceRefused {
                adapter: self.name.clone(),
                reason,
            });
        }

        log::debug!("headless device `{}` opened", init.label);
        self.recorder.record(|r| r.devices += 1);

        let device = HeadlessDevice {
            recorder: self.recorder.clone(),
            next_pipeline: Cell::new(0),
            limits: self.recorder.shared.borrow().binding_limits,
        };
        let queue = HeadlessQueue {
            recorder: self.recorder.clone(),
        };
        Ok((device, queue))
    }
}

#[derive(Debug)]
pub struct HeadlessDevice {
    recorder: Recorder,
    next_pipeline: Cell<u64>,
    limits: BindingLimits,
}

#[derive(Debug, Clone)]
pub struct HeadlessShaderModule {
    pub stage: ShaderStage,
    pub entry_point: String,
}

#[derive(Debug, Clone)]
pub struct HeadlessPipeline {
    pub id: u64,
    pub topology: Topology,
    pub format: ColorFormat,
}

impl GraphicsDevice<Headless> for HeadlessDevice {
    fn binding_limits(&self) -> BindingLimits {
        self.limits
    }

    fn create_shader_module(&self, unit: &ShaderUnit) -> HeadlessShaderModule {
        self.recorder
            .record(|r| r.shader_modules.push((unit.stage(), unit.entry_point().to_owned())));
        HeadlessShaderModule {
            stage: unit.stage(),
            entry_point: unit.entry_point().to_owned(),
        }
    }

    fn create_pipeline(
        &self,
        desc: &PipelineDescriptor<'_, Headless>,
    ) -> Result<HeadlessPipeline, ValidationError> {
        if let Some(reason) = self.recorder.shared.borrow().pipeline_rejection.clone() {
            return Err(ValidationError::new("render pipeline", reason));
        }

        let id = self.next_pipeline.get();
        self.next_pipeline.set(id + 1);

        self.recorder.record(|r| {
            r.pipelines.push(RecordedPipeline {
                id,
                label: desc.label.map(str::to_owned),
                topology: desc.topology,
                format: desc.format,
                vertex_entry: desc.vertex.entry_point.to_owned(),
                fragment_entry: desc.fragment.entry_point.to_owned(),
                bind_groups: desc.layout.bind_groups().len(),
            })
        });

        Ok(HeadlessPipeline {
            id,
            topology: desc.topology,
            format: desc.format,
        })
    }

    fn create_command_sequence(&self, label: Option<&str>) -> HeadlessCommandSequence {
        HeadlessCommandSequence {
            label: label.map(str::to_owned),
            passes: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct HeadlessQueue {
    recorder: Recorder,
}

impl SubmissionQueue<Headless> for HeadlessQueue {
    fn submit(&self, commands: HeadlessCommandBuffer) {
        self.recorder.record(|r| {
            r.submissions.push(Submission {
                label: commands.label,
                passes: commands.passes,
            })
        });
    }
}

// ── commands ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadlessCommandSequence {
    label: Option<String>,
    passes: Vec<RecordedPass>,
}

#[derive(Debug)]
pub struct HeadlessCommandBuffer {
    label: Option<String>,
    passes: Vec<RecordedPass>,
}

impl CommandSequence<Headless> for HeadlessCommandSequence {
    fn encode_render_pass(&mut self, target: &HeadlessImage, pass: &RenderPassDesc<'_, Headless>) {
        self.passes.push(RecordedPass {
            label: pass.label.map(str::to_owned),
            target: target.size,
            clear: pass.clear,
            pipeline: pass.pipeline.id,
            draws: vec![pass.draw.clone()],
        });
    }

    fn finish(self) -> HeadlessCommandBuffer {
        HeadlessCommandBuffer {
            label: self.label,
            passes: self.passes,
        }
    }
}

// ── surface ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadlessImage {
    index: u64,
    size: Extent,
}

impl PresentableImage for HeadlessImage {
    fn size(&self) -> Extent {
        self.size
    }
}

/// Virtual surface whose images have the configured size.
#[derive(Debug)]
pub struct HeadlessSurface {
    recorder: Recorder,
    preferred: ColorFormat,
    /// `None` accepts every format.
    supported: Option<Vec<ColorFormat>>,
    config: Option<SurfaceConfig>,
    next_image: u64,
}

impl HeadlessSurface {
    pub fn new(recorder: &Recorder, preferred: ColorFormat) -> Self {
        Self {
            recorder: recorder.clone(),
            preferred,
            supported: None,
            config: None,
            next_image: 0,
        }
    }

    /// Restricts configuration to `formats`, like a display with fixed
    /// capabilities.
    pub fn supporting(mut self, formats: &[ColorFormat]) -> Self {
        self.supported = Some(formats.to_vec());
        self
    }
}

impl PresentSurface<Headless> for HeadlessSurface {
    fn preferred_format(&self) -> ColorFormat {
        self.preferred
    }

    fn configure(&mut self, _device: &HeadlessDevice, config: &SurfaceConfig) -> Result<(), ValidationError> {
        if let Some(supported) = &self.supported {
            if !supported.contains(&config.format) {
                self.config = None;
                return Err(ValidationError::new(
                    "surface configuration",
                    format!("format {} is not supported by the surface", config.format),
                ));
            }
        }

        self.config = Some(*config);
        let mut shared = self.recorder.shared.borrow_mut();
        shared.surface_lost = false;
        shared.log.configurations.push(*config);
        Ok(())
    }

    fn acquire(&mut self) -> Result<HeadlessImage, SurfaceError> {
        if self.recorder.shared.borrow().surface_lost {
            return Err(SurfaceError::Lost);
        }
        let config = self.config.ok_or(SurfaceError::Transient)?;

        let index = self.next_image;
        self.next_image += 1;
        Ok(HeadlessImage {
            index,
            size: config.extent,
        })
    }

    fn present(&mut self, image: HeadlessImage) {
        self.recorder.record(|r| {
            r.presentations.push(Presentation {
                image: image.index,
                size: image.size,
            })
        });
    }
}
