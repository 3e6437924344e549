use crate::backend::{Backend, CommandSequence, DrawCall, RenderPassDesc};
use crate::device::DeviceContext;
use crate::paint::ClearColor;
use crate::pipeline::Pipeline;
use crate::surface::{SurfaceError, SurfaceManager};
use crate::time::FrameClock;

use super::{Epoch, FrameInfo, LoopError, LoopState, TickOutcome, TickScheduler};

// Field order is drop order: pipeline and surface go before the device.
struct FrameResources<B: Backend> {
    pipeline: Pipeline<B>,
    surface: SurfaceManager<B>,
    device: DeviceContext<B>,
}

/// Drives one surface at the display's refresh rate.
///
/// `Idle -> Running -> Stopped`. At most one tick is requested at a time and
/// every request carries a fresh epoch, so a tick is honoured only while
/// running and only for the latest request.
pub struct FrameLoop<B: Backend> {
    state: LoopState,
    generation: u64,
    pending: bool,
    scheduler: Option<Box<dyn TickScheduler>>,
    resources: Option<FrameResources<B>>,
    clock: FrameClock,
    clear: ClearColor,
    vertex_count: u32,
}

impl<B: Backend> FrameLoop<B> {
    pub fn new(clear: ClearColor, vertex_count: u32) -> Self {
        Self {
            state: LoopState::Idle,
            generation: 0,
            pending: false,
            scheduler: None,
            resources: None,
            clock: FrameClock::new(),
            clear,
            vertex_count,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Epoch of the latest tick request.
    pub fn epoch(&self) -> Epoch {
        Epoch(self.generation)
    }

    /// Whether a requested tick has not been delivered yet.
    pub fn tick_pending(&self) -> bool {
        self.pending
    }

    /// Takes ownership of the frame resources and requests the first tick.
    pub fn start(
        &mut self,
        device: DeviceContext<B>,
        surface: SurfaceManager<B>,
        pipeline: Pipeline<B>,
        scheduler: impl TickScheduler + 'static,
    ) -> Result<(), LoopError> {
        if self.state != LoopState::Idle {
            return Err(LoopError::AlreadyStarted { state: self.state });
        }

        self.resources = Some(FrameResources {
            pipeline,
            surface,
            device,
        });
        self.scheduler = Some(Box::new(scheduler));
        self.state = LoopState::Running;
        self.clock.reset();

        log::info!("frame loop started");
        self.request_next();
        Ok(())
    }

    /// Runs one frame if `epoch` answers the outstanding request.
    pub fn tick(&mut self, epoch: Epoch) -> TickOutcome {
        if self.state != LoopState::Running || epoch != self.epoch() || !self.pending {
            log::trace!("ignoring tick for {epoch} (loop {}, {})", self.state, self.epoch());
            return TickOutcome::Ignored;
        }
        self.pending = false;

        let Some(res) = self.resources.as_mut() else {
            return TickOutcome::Ignored;
        };

        let outcome = match res.surface.acquire_next_image() {
            Ok(ticket) => {
                let mut commands = res.device.create_command_sequence(Some("astra frame"));
                commands.encode_render_pass(
                    ticket.image(),
                    &RenderPassDesc {
                        label: Some("astra pass"),
                        clear: self.clear,
                        pipeline: res.pipeline.raw(),
                        draw: DrawCall::vertices(self.vertex_count),
                    },
                );
                res.device.submit(commands.finish());

                let size = ticket.size();
                res.surface.present(ticket);

                let time = self.clock.tick();
                log::trace!("frame {} presented at {size}", time.index);
                TickOutcome::Presented(FrameInfo {
                    index: time.index,
                    dt: time.dt,
                    size,
                })
            }
            Err(SurfaceError::Lost) => TickOutcome::SurfaceLost,
            Err(err @ (SurfaceError::Transient | SurfaceError::Unconfigured)) => {
                log::debug!("frame skipped: {err}");
                TickOutcome::Skipped
            }
            Err(err @ SurfaceError::TicketAlreadyOutstanding) => {
                log::warn!("frame skipped: {err}");
                TickOutcome::Skipped
            }
        };

        if outcome == TickOutcome::SurfaceLost {
            log::error!("surface lost; stopping frame loop");
            self.halt();
        } else {
            self.request_next();
        }
        outcome
    }

    /// Stops the loop and releases its resources.
    ///
    /// Idempotent; does nothing while idle. Ticks already scheduled are
    /// ignored when they arrive.
    pub fn stop(&mut self) {
        match self.state {
            LoopState::Running => {
                log::info!("frame loop stopped");
                self.halt();
            }
            LoopState::Idle | LoopState::Stopped => {}
        }
    }

    /// Moves an idle loop straight to `Stopped`, for when it could not be
    /// started at all.
    pub(crate) fn abandon(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Stopped;
        }
    }

    /// Reconfigures the surface for a new display size.
    ///
    /// A size the backend rejects leaves the surface lost; the next tick
    /// reports it.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(FrameResources {
            surface, device, ..
        }) = self.resources.as_mut()
        {
            if let Err(err) = surface.resize(device, width, height) {
                log::error!("surface resize to {width}x{height} failed: {err}");
            }
        }
    }

    pub fn surface(&self) -> Option<&SurfaceManager<B>> {
        self.resources.as_ref().map(|r| &r.surface)
    }

    pub fn pipeline(&self) -> Option<&Pipeline<B>> {
        self.resources.as_ref().map(|r| &r.pipeline)
    }

    fn halt(&mut self) {
        self.state = LoopState::Stopped;
        self.generation += 1;
        self.pending = false;
        self.scheduler = None;
        self.resources = None;
    }

    fn request_next(&mut self) {
        self.generation += 1;
        let epoch = self.epoch();
        if let Some(scheduler) = self.scheduler.as_mut() {
            self.pending = true;
            scheduler.request_tick(epoch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{Headless, HeadlessAdapter, HeadlessSurface, Recorder};
    use crate::device::{AdapterScope, DeviceInit};
    use crate::frame::TickQueue;
    use crate::pipeline::{ColorFormat, PipelineBuilder};
    use crate::shader::builtin::{RED_FRAG, TRIANGLE_VERT};
    use crate::shader::{ShaderStage, ShaderUnit};

    fn running(recorder: &Recorder, queue: &TickQueue) -> FrameLoop<Headless> {
        let scope = AdapterScope::from(HeadlessAdapter::new(recorder));
        let device = pollster::block_on(DeviceContext::acquire(&scope, &DeviceInit::default())).unwrap();

        let mut surface = SurfaceManager::new(HeadlessSurface::new(recorder, ColorFormat::Bgra8Unorm));
        surface.configure(&device, ColorFormat::Bgra8Unorm, 64, 32).unwrap();

        let pipeline = PipelineBuilder::new(
            ShaderUnit::compile(TRIANGLE_VERT, ShaderStage::Vertex).unwrap(),
            ShaderUnit::compile(RED_FRAG, ShaderStage::Fragment).unwrap(),
        )
        .output_format(ColorFormat::Bgra8Unorm)
        .build(&device)
        .unwrap();

        let mut frame_loop = FrameLoop::new(ClearColor::TRANSPARENT, 3);
        frame_loop.start(device, surface, pipeline, queue.clone()).unwrap();
        frame_loop
    }

    // ── scheduling ─────────────────────────────────────────────────────────

    #[test]
    fn start_requests_exactly_one_tick() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let frame_loop = running(&recorder, &queue);
        assert_eq!(frame_loop.state(), LoopState::Running);
        assert_eq!(queue.len(), 1);
        assert!(frame_loop.tick_pending());
        assert_eq!(recorder.submission_count(), 0);
    }

    #[test]
    fn each_tick_requests_the_next() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);

        for expected in 0..3 {
            let epoch = queue.pop().unwrap();
            let TickOutcome::Presented(info) = frame_loop.tick(epoch) else {
                panic!("frame not presented");
            };
            assert_eq!(info.index, expected);
            assert_eq!(queue.len(), 1);
        }
        assert_eq!(recorder.submission_count(), 3);
        assert_eq!(recorder.presentation_count(), 3);
    }

    #[test]
    fn duplicate_delivery_is_ignored() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        let epoch = queue.pop().unwrap();

        assert!(frame_loop.tick(epoch).is_presented());
        assert_eq!(frame_loop.tick(epoch), TickOutcome::Ignored);
        assert_eq!(recorder.submission_count(), 1);
        assert_eq!(queue.len(), 1);
        assert_ne!(queue.pop(), Some(epoch));
    }

    #[test]
    fn idle_loop_ignores_ticks() {
        let mut frame_loop: FrameLoop<Headless> = FrameLoop::new(ClearColor::TRANSPARENT, 3);
        assert_eq!(frame_loop.tick(frame_loop.epoch()), TickOutcome::Ignored);
        frame_loop.stop();
        assert_eq!(frame_loop.state(), LoopState::Idle);
    }

    // ── stopping ───────────────────────────────────────────────────────────

    #[test]
    fn tick_scheduled_before_stop_submits_nothing() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        let scheduled = queue.pop().unwrap();

        frame_loop.stop();
        assert_eq!(frame_loop.tick(scheduled), TickOutcome::Ignored);
        assert_eq!(frame_loop.tick(frame_loop.epoch()), TickOutcome::Ignored);
        assert_eq!(recorder.submission_count(), 0);
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert!(frame_loop.surface().is_none());
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        frame_loop.stop();
        frame_loop.stop();
        assert_eq!(frame_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn restarting_is_rejected() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        frame_loop.stop();

        let scope = AdapterScope::from(HeadlessAdapter::new(&recorder));
        let device = pollster::block_on(DeviceContext::acquire(&scope, &DeviceInit::default())).unwrap();
        let surface = SurfaceManager::new(HeadlessSurface::new(&recorder, ColorFormat::Bgra8Unorm));
        let pipeline = PipelineBuilder::new(
            ShaderUnit::compile(TRIANGLE_VERT, ShaderStage::Vertex).unwrap(),
            ShaderUnit::compile(RED_FRAG, ShaderStage::Fragment).unwrap(),
        )
        .build(&device)
        .unwrap();

        let err = frame_loop.start(device, surface, pipeline, queue.clone()).unwrap_err();
        assert_eq!(
            err,
            LoopError::AlreadyStarted {
                state: LoopState::Stopped
            }
        );
    }

    // ── surface states ─────────────────────────────────────────────────────

    #[test]
    fn lost_surface_stops_the_loop() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        recorder.lose_surface();

        let epoch = queue.pop().unwrap();
        assert_eq!(frame_loop.tick(epoch), TickOutcome::SurfaceLost);
        assert_eq!(frame_loop.state(), LoopState::Stopped);
        assert!(queue.is_empty());
        assert_eq!(recorder.submission_count(), 0);
    }

    #[test]
    fn minimized_surface_skips_but_keeps_ticking() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        frame_loop.resize(0, 0);

        let epoch = queue.pop().unwrap();
        assert_eq!(frame_loop.tick(epoch), TickOutcome::Skipped);
        assert_eq!(queue.len(), 1);

        frame_loop.resize(100, 50);
        let TickOutcome::Presented(info) = frame_loop.tick(queue.pop().unwrap()) else {
            panic!("frame not presented");
        };
        assert_eq!(info.size, crate::coords::Extent::new(100, 50));
    }

    #[test]
    fn pass_clears_and_draws_the_configured_vertex_count() {
        let (recorder, queue) = (Recorder::new(), TickQueue::new());
        let mut frame_loop = running(&recorder, &queue);
        frame_loop.tick(queue.pop().unwrap());

        let rec = recorder.snapshot();
        let pass = &rec.submissions[0].passes[0];
        assert_eq!(pass.clear, ClearColor::TRANSPARENT);
        assert_eq!(pass.draws, vec![DrawCall::vertices(3)]);
        assert_eq!(pass.target, crate::coords::Extent::new(64, 32));
    }
}
