use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use astra_engine::backend::gpu::{Gpu, GpuAdapter, GpuInstance, GpuOptions};
use astra_engine::coords::Extent;
use astra_engine::device::AdapterScope;
use astra_engine::frame::{Epoch, LoopState, TickOutcome, TickScheduler};
use astra_engine::{Engine, EngineConfig, ShaderSources};

/// Window and engine configuration for one viewer run.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub size: Extent,
    pub shaders: ShaderSources,
    pub engine: EngineConfig,
}

/// Opens the window and renders until it is closed or rendering fails.
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut viewer = Viewer::new(config);

    event_loop
        .run_app(&mut viewer)
        .context("winit event loop terminated with error")?;

    viewer.finish()
}

/// Ticks arrive as redraws: a request stores the epoch and asks winit for a
/// redraw, which the platform paces to the display refresh.
struct RedrawScheduler {
    window: Arc<Window>,
    next: Rc<Cell<Option<Epoch>>>,
}

impl TickScheduler for RedrawScheduler {
    fn request_tick(&mut self, epoch: Epoch) {
        self.next.set(Some(epoch));
        self.window.request_redraw();
    }
}

struct Session {
    engine: Engine<Gpu>,
    scope: AdapterScope<GpuAdapter>,
    next: Rc<Cell<Option<Epoch>>>,
    window: Arc<Window>,
}

struct Viewer {
    config: ViewerConfig,
    instance: GpuInstance,
    session: Option<Session>,
    failure: Rc<RefCell<Option<String>>>,
}

impl Viewer {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            instance: GpuInstance::new(GpuOptions::default()),
            session: None,
            failure: Rc::new(RefCell::new(None)),
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.size.width,
                self.config.size.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let mut surface = self.instance.create_surface(Arc::clone(&window))?;
        let scope = pollster::block_on(
            self.instance
                .select_adapter(&mut surface, &self.config.engine.device),
        );

        let mut engine = Engine::new(self.config.engine.clone());
        let sink = Rc::clone(&self.failure);
        engine.on_fatal_error(move |err| {
            *sink.borrow_mut() = Some(err.to_string());
        });

        let next = Rc::new(Cell::new(None));
        let scheduler = RedrawScheduler {
            window: Arc::clone(&window),
            next: Rc::clone(&next),
        };

        let size = window.inner_size();
        engine.start_blocking(
            &scope,
            surface,
            Extent::new(size.width, size.height),
            &self.config.shaders,
            scheduler,
        )?;

        Ok(Session {
            engine,
            scope,
            next,
            window,
        })
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.engine.stop();
            drop(session.engine);
            session.scope.shutdown();
        }
    }

    fn finish(mut self) -> Result<()> {
        self.close();
        match self.failure.borrow_mut().take() {
            Some(reason) => Err(anyhow!("rendering stopped: {reason}")),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match self.open(event_loop) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("failed to open viewer: {e:#}");
                event_loop.exit();
                return;
            }
        }

        if self.failure.borrow().is_some() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close();
                event_loop.exit();
                return;
            }

            WindowEvent::Resized(new_size) => {
                session.engine.resize(new_size.width, new_size.height);
                session.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = session.window.inner_size();
                session.engine.resize(new_size.width, new_size.height);
            }

            WindowEvent::RedrawRequested => {
                // Redraws winit issues on its own (expose, resize) carry no tick.
                if let Some(epoch) = session.next.take() {
                    session.window.pre_present_notify();
                    if session.engine.tick(epoch) == TickOutcome::SurfaceLost {
                        log::error!("window surface lost; closing viewer");
                    }
                }
            }

            _ => {}
        }

        if session.engine.state() == LoopState::Stopped {
            event_loop.exit();
        }
    }
}
