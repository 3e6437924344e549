//! Engine value types to wgpu and back.

use crate::device::PowerPreference;
use crate::paint::ClearColor;
use crate::pipeline::{ColorFormat, StageVisibility, Topology};
use crate::shader::{BindingKind, TextureDimension, TextureSample};

pub(super) fn texture_format(format: ColorFormat) -> wgpu::TextureFormat {
    match format {
        ColorFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        ColorFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
        ColorFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        ColorFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorFormat::Rgb10a2Unorm => wgpu::TextureFormat::Rgb10a2Unorm,
        ColorFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
    }
}

/// `None` for formats the engine does not render to.
pub(super) fn color_format(format: wgpu::TextureFormat) -> Option<ColorFormat> {
    Some(match format {
        wgpu::TextureFormat::Bgra8Unorm => ColorFormat::Bgra8Unorm,
        wgpu::TextureFormat::Bgra8UnormSrgb => ColorFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8Unorm => ColorFormat::Rgba8Unorm,
        wgpu::TextureFormat::Rgba8UnormSrgb => ColorFormat::Rgba8UnormSrgb,
        wgpu::TextureFormat::Rgb10a2Unorm => ColorFormat::Rgb10a2Unorm,
        wgpu::TextureFormat::Rgba16Float => ColorFormat::Rgba16Float,
        _ => return None,
    })
}

pub(super) fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

pub(super) fn power_preference(pref: PowerPreference) -> wgpu::PowerPreference {
    match pref {
        PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
    }
}

pub(super) fn clear_color(color: ClearColor) -> wgpu::Color {
    wgpu::Color {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(super) fn shader_stages(visibility: StageVisibility) -> wgpu::ShaderStages {
    let mut stages = wgpu::ShaderStages::NONE;
    if visibility.vertex {
        stages |= wgpu::ShaderStages::VERTEX;
    }
    if visibility.fragment {
        stages |= wgpu::ShaderStages::FRAGMENT;
    }
    stages
}

pub(super) fn binding_type(kind: BindingKind) -> wgpu::BindingType {
    match kind {
        BindingKind::UniformBuffer => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        BindingKind::StorageBuffer { read_only } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        BindingKind::Texture {
            sample,
            dimension,
            multisampled,
        } => wgpu::BindingType::Texture {
            sample_type: match sample {
                // Multisampled float textures cannot be filterable.
                TextureSample::Float => wgpu::TextureSampleType::Float {
                    filterable: !multisampled,
                },
                TextureSample::Depth => wgpu::TextureSampleType::Depth,
                TextureSample::Sint => wgpu::TextureSampleType::Sint,
                TextureSample::Uint => wgpu::TextureSampleType::Uint,
            },
            view_dimension: match dimension {
                TextureDimension::D1 => wgpu::TextureViewDimension::D1,
                TextureDimension::D2 => wgpu::TextureViewDimension::D2,
                TextureDimension::D2Array => wgpu::TextureViewDimension::D2Array,
                TextureDimension::D3 => wgpu::TextureViewDimension::D3,
                TextureDimension::Cube => wgpu::TextureViewDimension::Cube,
                TextureDimension::CubeArray => wgpu::TextureViewDimension::CubeArray,
            },
            multisampled,
        },
        BindingKind::Sampler { comparison } => wgpu::BindingType::Sampler(if comparison {
            wgpu::SamplerBindingType::Comparison
        } else {
            wgpu::SamplerBindingType::Filtering
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_color_format_maps_both_ways() {
        for format in [
            ColorFormat::Bgra8Unorm,
            ColorFormat::Bgra8UnormSrgb,
            ColorFormat::Rgba8Unorm,
            ColorFormat::Rgba8UnormSrgb,
            ColorFormat::Rgb10a2Unorm,
            ColorFormat::Rgba16Float,
        ] {
            assert_eq!(color_format(texture_format(format)), Some(format));
        }
    }

    #[test]
    fn unknown_texture_format_is_not_a_color_format() {
        assert_eq!(color_format(wgpu::TextureFormat::Depth32Float), None);
    }

    #[test]
    fn visibility_combines_stages() {
        let both = shader_stages(StageVisibility {
            vertex: true,
            fragment: true,
        });
        assert_eq!(both, wgpu::ShaderStages::VERTEX_FRAGMENT);
        assert_eq!(shader_stages(StageVisibility::default()), wgpu::ShaderStages::NONE);
    }

    #[test]
    fn multisampled_float_texture_is_not_filterable() {
        let ty = binding_type(BindingKind::Texture {
            sample: TextureSample::Float,
            dimension: TextureDimension::D2,
            multisampled: true,
        });
        assert!(matches!(
            ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                multisampled: true,
                ..
            }
        ));
    }
}
