//! wgpu backend.
//!
//! Bootstrap order for a windowed host:
//!
//! ```ignore
//! let instance = GpuInstance::new(GpuOptions::default());
//! let mut surface = instance.create_surface(window.clone())?;
//! let scope = pollster::block_on(instance.select_adapter(&mut surface, &init));
//! ```
//!
//! The scope is then handed to the engine together with the surface.

mod conversions;
mod device;
mod options;
mod surface;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::device::{AcquireError, AdapterScope, DeviceInit};

use super::{Backend, GraphicsAdapter};

pub use device::{GpuCommandSequence, GpuDevice, GpuQueue};
pub use options::GpuOptions;
pub use surface::{GpuImage, GpuSurface};

/// Type family of the wgpu backend.
#[derive(Debug)]
pub enum Gpu {}

impl Backend for Gpu {
    type Adapter = GpuAdapter;
    type Device = GpuDevice;
    type Queue = GpuQueue;
    type Surface = GpuSurface;
    type ShaderModule = wgpu::ShaderModule;
    type Pipeline = wgpu::RenderPipeline;
    type Image = GpuImage;
    type CommandSequence = GpuCommandSequence;
    type CommandBuffer = wgpu::CommandBuffer;
}

/// Owns the wgpu instance surfaces and adapters are created from.
pub struct GpuInstance {
    instance: wgpu::Instance,
    options: GpuOptions,
}

impl GpuInstance {
    pub fn new(options: GpuOptions) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        Self { instance, options }
    }

    /// Creates a surface for a display region.
    ///
    /// The target must be `'static` (e.g. an `Arc<Window>`), so the surface
    /// can live inside the engine without borrowing the host's window.
    pub fn create_surface(
        &self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
    ) -> Result<GpuSurface> {
        let surface = self
            .instance
            .create_surface(target)
            .context("failed to create wgpu surface")?;
        Ok(GpuSurface::new(surface, &self.options))
    }

    /// Selects the adapter able to present to `surface`.
    ///
    /// Returns an empty scope when the platform has no suitable adapter; the
    /// engine then reports `NoAdapterAvailable` instead of failing here.
    pub async fn select_adapter(
        &self,
        surface: &mut GpuSurface,
        init: &DeviceInit,
    ) -> AdapterScope<GpuAdapter> {
        let requested = self
            .instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: conversions::power_preference(init.power_preference),
                compatible_surface: Some(surface.raw()),
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await;

        match requested {
            Ok(raw) => {
                let info = raw.get_info();
                log::info!("selected adapter `{}` ({:?})", info.name, info.backend);
                surface.attach(&raw);
                AdapterScope::from(GpuAdapter {
                    raw,
                    options: self.options.clone(),
                })
            }
            Err(err) => {
                log::warn!("no suitable GPU adapter: {err}");
                AdapterScope::empty()
            }
        }
    }
}

/// A physical GPU selected by [`GpuInstance::select_adapter`].
pub struct GpuAdapter {
    raw: wgpu::Adapter,
    options: GpuOptions,
}

impl GpuAdapter {
    pub fn raw(&self) -> &wgpu::Adapter {
        &self.raw
    }
}

impl GraphicsAdapter<Gpu> for GpuAdapter {
    fn name(&self) -> String {
        self.raw.get_info().name
    }

    async fn request_device(&self, init: &DeviceInit) -> Result<(GpuDevice, GpuQueue), AcquireError> {
        let (device, queue) = self
            .raw
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(init.label.as_str()),
                required_features: self.options.required_features,
                required_limits: self.options.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| AcquireError::DeviceRefused {
                adapter: self.name(),
                reason: err.to_string(),
            })?;

        // Errors the engine does not capture in a scope end up here; wgpu's
        // default handler would panic inside the host's event loop.
        device.on_uncaptured_error(Arc::new(|err| {
            log::error!("uncaptured wgpu error: {err}");
        }));

        Ok((GpuDevice::new(device), GpuQueue::new(queue)))
    }
}
