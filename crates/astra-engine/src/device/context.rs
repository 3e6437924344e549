use crate::backend::{
    Backend, GraphicsAdapter, GraphicsDevice, PipelineDescriptor, SubmissionQueue, ValidationError,
};
use crate::pipeline::BindingLimits;
use crate::shader::ShaderUnit;

use super::{AcquireError, AdapterScope, DeviceInit};

/// Owns the logical device and its submission queue.
///
/// Root resource of a running engine: surfaces, shader modules, pipelines and
/// command sequences are created through it and borrow it. Driver resources
/// are released exactly once, when the context is dropped.
pub struct DeviceContext<B: Backend> {
    adapter_name: String,
    device: B::Device,
    queue: B::Queue,
}

impl<B: Backend> DeviceContext<B> {
    /// Opens a device on the scope's adapter.
    ///
    /// Fails with [`AcquireError::NoAdapterAvailable`] when the scope is empty.
    pub async fn acquire(
        scope: &AdapterScope<B::Adapter>,
        init: &DeviceInit,
    ) -> Result<Self, AcquireError> {
        let adapter = scope.adapter()?;
        let adapter_name = adapter.name();

        log::info!("requesting device `{}` from adapter `{adapter_name}`", init.label);
        let (device, queue) = adapter.request_device(init).await?;

        Ok(Self {
            adapter_name,
            device,
            queue,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// The queue opened together with the device.
    pub fn queue(&self) -> &B::Queue {
        &self.queue
    }

    pub fn binding_limits(&self) -> BindingLimits {
        self.device.binding_limits()
    }

    pub fn create_shader_module(&self, unit: &ShaderUnit) -> B::ShaderModule {
        self.device.create_shader_module(unit)
    }

    /// Prefer [`PipelineBuilder`](crate::pipeline::PipelineBuilder), which
    /// resolves the layout first.
    pub fn create_pipeline(
        &self,
        desc: &PipelineDescriptor<'_, B>,
    ) -> Result<B::Pipeline, ValidationError> {
        self.device.create_pipeline(desc)
    }

    pub fn create_command_sequence(&self, label: Option<&str>) -> B::CommandSequence {
        self.device.create_command_sequence(label)
    }

    pub fn submit(&self, commands: B::CommandBuffer) {
        self.queue.submit(commands);
    }
}

impl<B: Backend> Drop for DeviceContext<B> {
    fn drop(&mut self) {
        log::info!("releasing device from adapter `{}`", self.adapter_name);
    }
}
