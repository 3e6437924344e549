use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};

use astra_engine::backend::headless::{Headless, HeadlessAdapter, HeadlessSurface, Recorder};
use astra_engine::coords::Extent;
use astra_engine::device::AdapterScope;
use astra_engine::frame::{TickOutcome, TickQueue};
use astra_engine::pipeline::ColorFormat;
use astra_engine::{Engine, EngineConfig, ShaderSources};

/// Runs `ticks` ticks without a display and prints the recording.
pub fn run(shaders: &ShaderSources, size: Extent, ticks: u32) -> Result<()> {
    let recorder = Recorder::new();
    let scope = AdapterScope::from(HeadlessAdapter::new(&recorder));
    let surface = HeadlessSurface::new(&recorder, ColorFormat::Bgra8UnormSrgb);
    let queue = TickQueue::new();

    let failure = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&failure);

    let mut engine: Engine<Headless> = Engine::new(EngineConfig::default());
    engine.on_fatal_error(move |err| *sink.borrow_mut() = Some(err.to_string()));
    engine.start_blocking(&scope, surface, size, shaders, queue.clone())?;

    let mut presented = 0u32;
    for _ in 0..ticks {
        let Some(epoch) = queue.pop() else { break };
        match engine.tick(epoch) {
            TickOutcome::Presented(info) => {
                presented += 1;
                log::debug!("frame {} ({:?})", info.index, info.dt);
            }
            TickOutcome::Skipped => log::debug!("frame skipped"),
            TickOutcome::SurfaceLost | TickOutcome::Ignored => break,
        }
    }
    engine.stop();

    if let Some(reason) = failure.borrow_mut().take() {
        bail!("rendering failed: {reason}");
    }

    let rec = recorder.snapshot();
    println!("presented {presented}/{ticks} frame(s) at {size}");
    for pipeline in &rec.pipelines {
        println!(
            "pipeline #{}: {:?} -> {} (vs `{}`, fs `{}`, {} bind groups)",
            pipeline.id,
            pipeline.topology,
            pipeline.format,
            pipeline.vertex_entry,
            pipeline.fragment_entry,
            pipeline.bind_groups
        );
    }
    for (i, submission) in rec.submissions.iter().enumerate() {
        for pass in &submission.passes {
            let draws: Vec<String> = pass
                .draws
                .iter()
                .map(|d| format!("{:?}x{:?}", d.vertices, d.instances))
                .collect();
            println!("submission {i}: pass on {} draws [{}]", pass.target, draws.join(", "));
        }
    }

    scope.shutdown();
    Ok(())
}
