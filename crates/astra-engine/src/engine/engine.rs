use crate::backend::Backend;
use crate::coords::Extent;
use crate::device::{AdapterScope, DeviceContext};
use crate::frame::{Epoch, FrameLoop, LoopError, LoopState, TickOutcome, TickScheduler};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::shader::{CompilationError, ShaderStage, ShaderUnit};
use crate::surface::SurfaceManager;

use super::report::FatalReporter;
use super::{EngineConfig, FatalError, ShaderSources};

/// Embeddable renderer: one surface, one pipeline, one draw per refresh.
///
/// The host supplies the adapter scope, a surface for its drawable region,
/// the shader text and a [`TickScheduler`]; it then forwards each scheduled
/// refresh to [`tick`](Self::tick). Every fatal condition goes to the
/// [`on_fatal_error`](Self::on_fatal_error) handler, at most once per
/// engine, and never panics into the host.
pub struct Engine<B: Backend> {
    config: EngineConfig,
    frame_loop: FrameLoop<B>,
    reporter: FatalReporter,
}

impl<B: Backend> Engine<B> {
    pub fn new(config: EngineConfig) -> Self {
        let frame_loop = FrameLoop::new(config.clear_color, config.vertex_count);
        Self {
            config,
            frame_loop,
            reporter: FatalReporter::default(),
        }
    }

    /// Installs the fatal-error handler, replacing any previous one.
    pub fn on_fatal_error(&mut self, handler: impl FnMut(&FatalError) + 'static) {
        self.reporter.set_handler(Box::new(handler));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    /// Whether a fatal error has been reported.
    pub fn has_failed(&self) -> bool {
        self.reporter.has_fired()
    }

    pub fn frame_loop(&self) -> &FrameLoop<B> {
        &self.frame_loop
    }

    /// Acquires the device, configures `surface` at `size`, builds the
    /// pipeline and starts the frame loop.
    ///
    /// Returns the resulting loop state: `Running` on success, `Stopped` if a
    /// fatal error was reported. Calling it on a loop that already left
    /// `Idle` is a host bug and is returned as an error.
    pub async fn start(
        &mut self,
        scope: &AdapterScope<B::Adapter>,
        surface: B::Surface,
        size: Extent,
        shaders: &ShaderSources,
        scheduler: impl TickScheduler + 'static,
    ) -> Result<LoopState, LoopError> {
        let state = self.frame_loop.state();
        if state != LoopState::Idle {
            return Err(LoopError::AlreadyStarted { state });
        }

        match self.prepare(scope, surface, size, shaders).await {
            Ok((device, surface, pipeline)) => {
                self.frame_loop.start(device, surface, pipeline, scheduler)?;
            }
            Err(err) => {
                self.frame_loop.abandon();
                self.reporter.report(&err);
            }
        }
        Ok(self.frame_loop.state())
    }

    /// [`start`](Self::start), blocking on device acquisition.
    pub fn start_blocking(
        &mut self,
        scope: &AdapterScope<B::Adapter>,
        surface: B::Surface,
        size: Extent,
        shaders: &ShaderSources,
        scheduler: impl TickScheduler + 'static,
    ) -> Result<LoopState, LoopError> {
        pollster::block_on(self.start(scope, surface, size, shaders, scheduler))
    }

    async fn prepare(
        &self,
        scope: &AdapterScope<B::Adapter>,
        surface: B::Surface,
        size: Extent,
        shaders: &ShaderSources,
    ) -> Result<(DeviceContext<B>, SurfaceManager<B>, Pipeline<B>), FatalError> {
        let device = DeviceContext::acquire(scope, &self.config.device).await?;

        let mut surface = SurfaceManager::new(surface);
        let format = self
            .config
            .output_format
            .unwrap_or_else(|| surface.preferred_format());
        surface
            .configure(&device, format, size.width, size.height)
            .map_err(FatalError::SurfaceConfiguration)?;

        let label = shaders.label.as_deref();
        let vertex = compile(
            &shaders.vertex,
            ShaderStage::Vertex,
            shaders.vertex_entry.as_deref(),
            label,
        )?;
        let fragment = compile(
            &shaders.fragment,
            ShaderStage::Fragment,
            shaders.fragment_entry.as_deref(),
            label,
        )?;

        let mut builder = PipelineBuilder::new(vertex, fragment)
            .topology(self.config.topology)
            .output_format(format);
        if let Some(label) = label {
            builder = builder.label(label);
        }
        let pipeline = builder.build(&device)?;

        Ok((device, surface, pipeline))
    }

    /// Forwards one scheduled refresh to the frame loop.
    pub fn tick(&mut self, epoch: Epoch) -> TickOutcome {
        let outcome = self.frame_loop.tick(epoch);
        if outcome == TickOutcome::SurfaceLost {
            self.reporter.report(&FatalError::SurfaceLost);
        }
        outcome
    }

    /// Stops rendering. Idempotent.
    pub fn stop(&mut self) {
        self.frame_loop.stop();
    }

    /// Follows a change of the drawable region.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame_loop.resize(width, height);
    }
}

fn compile(
    source: &str,
    stage: ShaderStage,
    entry_point: Option<&str>,
    label: Option<&str>,
) -> Result<ShaderUnit, CompilationError> {
    let unit = match entry_point {
        Some(entry) => ShaderUnit::compile_entry(source, stage, entry),
        None => ShaderUnit::compile(source, stage),
    }
    .map_err(|err| err.with_label(label))?;

    Ok(match label {
        Some(label) => unit.with_label(format!("{label} {stage}")),
        None => unit,
    })
}
