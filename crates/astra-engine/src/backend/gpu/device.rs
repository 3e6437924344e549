use crate::backend::{
    CommandSequence, GraphicsDevice, PipelineDescriptor, RenderPassDesc, SubmissionQueue,
    ValidationError,
};
use crate::pipeline::{BindingLimits, PipelineLayout};
use crate::shader::ShaderUnit;

use super::conversions;
use super::{Gpu, GpuImage};

/// Logical wgpu device.
pub struct GpuDevice {
    raw: wgpu::Device,
}

impl GpuDevice {
    pub(super) fn new(raw: wgpu::Device) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &wgpu::Device {
        &self.raw
    }

    fn create_bind_group_layouts(&self, layout: &PipelineLayout) -> Vec<wgpu::BindGroupLayout> {
        layout
            .bind_groups()
            .iter()
            .map(|group| {
                let entries: Vec<wgpu::BindGroupLayoutEntry> = group
                    .entries
                    .iter()
                    .map(|entry| wgpu::BindGroupLayoutEntry {
                        binding: entry.binding,
                        visibility: conversions::shader_stages(entry.visibility),
                        ty: conversions::binding_type(entry.kind),
                        count: None,
                    })
                    .collect();

                self.raw
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("astra bind group layout"),
                        entries: &entries,
                    })
            })
            .collect()
    }

    fn build_pipeline(&self, desc: &PipelineDescriptor<'_, Gpu>) -> wgpu::RenderPipeline {
        let bind_group_layouts = self.create_bind_group_layouts(desc.layout);
        let bgl_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

        let pipeline_layout = self
            .raw
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: desc.label,
                bind_group_layouts: &bgl_refs,
                immediate_size: 0,
            });

        self.raw.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: desc.label,
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: desc.vertex.module,
                entry_point: Some(desc.vertex.entry_point),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: desc.fragment.module,
                entry_point: Some(desc.fragment.entry_point),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: conversions::texture_format(desc.format),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: conversions::primitive_topology(desc.topology),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Runs `f` inside a validation error scope and returns what it captured.
pub(super) fn validated<T>(
    device: &wgpu::Device,
    object: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, ValidationError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    match pollster::block_on(scope.pop()) {
        None => Ok(value),
        Some(err) => Err(ValidationError::new(object, err.to_string())),
    }
}

impl GraphicsDevice<Gpu> for GpuDevice {
    fn binding_limits(&self) -> BindingLimits {
        let limits = self.raw.limits();
        BindingLimits {
            max_bind_groups: limits.max_bind_groups,
            max_bindings_per_bind_group: limits.max_bindings_per_bind_group,
        }
    }

    fn create_shader_module(&self, unit: &ShaderUnit) -> wgpu::ShaderModule {
        self.raw.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: unit.label(),
            source: wgpu::ShaderSource::Wgsl(unit.source().into()),
        })
    }

    fn create_pipeline(
        &self,
        desc: &PipelineDescriptor<'_, Gpu>,
    ) -> Result<wgpu::RenderPipeline, ValidationError> {
        validated(&self.raw, "render pipeline", || self.build_pipeline(desc))
    }

    fn create_command_sequence(&self, label: Option<&str>) -> GpuCommandSequence {
        GpuCommandSequence {
            encoder: self
                .raw
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label }),
        }
    }
}

/// Submission queue obtained with the device.
pub struct GpuQueue {
    raw: wgpu::Queue,
}

impl GpuQueue {
    pub(super) fn new(raw: wgpu::Queue) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &wgpu::Queue {
        &self.raw
    }
}

impl SubmissionQueue<Gpu> for GpuQueue {
    fn submit(&self, commands: wgpu::CommandBuffer) {
        self.raw.submit(std::iter::once(commands));
    }
}

pub struct GpuCommandSequence {
    encoder: wgpu::CommandEncoder,
}

impl CommandSequence<Gpu> for GpuCommandSequence {
    fn encode_render_pass(&mut self, target: &GpuImage, pass: &RenderPassDesc<'_, Gpu>) {
        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: pass.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(conversions::clear_color(pass.clear)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pass.pipeline);
        rpass.draw(pass.draw.vertices.clone(), pass.draw.instances.clone());
    }

    fn finish(self) -> wgpu::CommandBuffer {
        self.encoder.finish()
    }
}
