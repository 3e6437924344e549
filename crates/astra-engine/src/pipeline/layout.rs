//! Explicit pipeline layout resolution.
//!
//! Stands in for an automatic layout: both stage interfaces are inspected and
//! either an exact layout comes out or a [`LinkageError`] names the mismatch.
//! Nothing is guessed.

use std::collections::BTreeMap;

use crate::shader::{BindingKind, ReflectedKind, ScalarKind, ShaderStage, ShaderUnit};

use super::{ColorFormat, LinkageError};

/// Stages a binding is visible to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StageVisibility {
    pub vertex: bool,
    pub fragment: bool,
}

impl StageVisibility {
    fn add(&mut self, stage: ShaderStage) {
        match stage {
            ShaderStage::Vertex => self.vertex = true,
            ShaderStage::Fragment => self.fragment = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub binding: u32,
    pub kind: BindingKind,
    pub visibility: StageVisibility,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindGroupLayout {
    pub group: u32,
    /// Sorted by binding.
    pub entries: Vec<LayoutEntry>,
}

/// Device limits a resolved layout has to fit in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BindingLimits {
    pub max_bind_groups: u32,
    /// Highest binding number in a group, exclusive.
    pub max_bindings_per_bind_group: u32,
}

impl Default for BindingLimits {
    /// The WebGPU baseline every adapter supports.
    fn default() -> Self {
        Self {
            max_bind_groups: 4,
            max_bindings_per_bind_group: 1000,
        }
    }
}

/// Resolved bind group layouts of a pipeline.
///
/// Groups are contiguous from 0; unused group numbers below the highest used
/// one are present and empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineLayout {
    groups: Vec<BindGroupLayout>,
}

impl PipelineLayout {
    pub fn bind_groups(&self) -> &[BindGroupLayout] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Checks that `vertex` feeds `fragment` and that `fragment` can write a
/// `format` target, then merges the resources both stages use.
///
/// Group and binding numbers are checked against `limits` before any layout
/// storage is sized from them.
pub fn resolve(
    vertex: &ShaderUnit,
    fragment: &ShaderUnit,
    format: ColorFormat,
    limits: BindingLimits,
) -> Result<PipelineLayout, LinkageError> {
    expect_stage(vertex, ShaderStage::Vertex)?;
    expect_stage(fragment, ShaderStage::Fragment)?;

    let vs = vertex.interface();
    let fs = fragment.interface();

    if !vs.inputs.is_empty() {
        return Err(LinkageError::VertexInputsUnsupported {
            locations: vs.inputs.iter().map(|v| v.location).collect(),
        });
    }

    for input in &fs.inputs {
        let location = input.location;
        let produced = vs
            .output(location)
            .ok_or(LinkageError::MissingVertexOutput { location })?;

        match (produced.ty, input.ty) {
            (Some(v), Some(f)) if v == f => {}
            (Some(vertex), Some(fragment)) => {
                return Err(LinkageError::TypeMismatch {
                    location,
                    vertex,
                    fragment,
                });
            }
            _ => return Err(LinkageError::UnresolvedType { location }),
        }

        if produced.interpolation != input.interpolation || produced.sampling != input.sampling {
            return Err(LinkageError::InterpolationMismatch { location });
        }
    }

    let color = fs.output(0).ok_or(LinkageError::MissingColorOutput)?;
    match color.ty {
        Some(ty) if ty.kind == ScalarKind::Float && ty.components >= format.components() => {}
        Some(ty) => return Err(LinkageError::IncompatibleColorOutput { ty, format }),
        None => return Err(LinkageError::UnresolvedType { location: 0 }),
    }

    let mut merged: BTreeMap<(u32, u32), LayoutEntry> = BTreeMap::new();
    for unit in [vertex, fragment] {
        for res in &unit.interface().resources {
            let (group, binding) = (res.group, res.binding);
            if group >= limits.max_bind_groups {
                return Err(LinkageError::BindGroupLimit {
                    group,
                    max: limits.max_bind_groups,
                });
            }
            if binding >= limits.max_bindings_per_bind_group {
                return Err(LinkageError::BindingLimit {
                    group,
                    binding,
                    max: limits.max_bindings_per_bind_group,
                });
            }

            let kind = match &res.kind {
                ReflectedKind::Resolved(kind) => *kind,
                ReflectedKind::Unresolved(reason) => {
                    return Err(LinkageError::UnresolvableBinding {
                        group,
                        binding,
                        reason: *reason,
                    });
                }
            };

            let entry = merged.entry((group, binding)).or_insert(LayoutEntry {
                binding,
                kind,
                visibility: StageVisibility::default(),
            });
            if entry.kind != kind {
                return Err(LinkageError::ConflictingBinding { group, binding });
            }
            entry.visibility.add(unit.stage());
        }
    }

    let group_count = merged.keys().map(|(g, _)| g + 1).max().unwrap_or(0);
    let mut groups: Vec<BindGroupLayout> = (0..group_count)
        .map(|group| BindGroupLayout {
            group,
            entries: Vec::new(),
        })
        .collect();
    for ((group, _), entry) in merged {
        groups[group as usize].entries.push(entry);
    }

    Ok(PipelineLayout { groups })
}

fn expect_stage(unit: &ShaderUnit, expected: ShaderStage) -> Result<(), LinkageError> {
    if unit.stage() == expected {
        Ok(())
    } else {
        Err(LinkageError::StageMismatch {
            expected,
            actual: unit.stage(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::builtin::{RED_FRAG, TRIANGLE_VERT};

    fn vs(src: &str) -> ShaderUnit {
        ShaderUnit::compile(src, ShaderStage::Vertex).unwrap()
    }

    fn fs(src: &str) -> ShaderUnit {
        ShaderUnit::compile(src, ShaderStage::Fragment).unwrap()
    }

    fn link(
        vertex: &ShaderUnit,
        fragment: &ShaderUnit,
        format: ColorFormat,
    ) -> Result<PipelineLayout, LinkageError> {
        resolve(vertex, fragment, format, BindingLimits::default())
    }

    const VS_WITH_UV: &str = r#"
        struct VsOut {
            @builtin(position) pos: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }
        @vertex
        fn main(@builtin(vertex_index) i: u32) -> VsOut {
            var out: VsOut;
            out.pos = vec4<f32>(0.0, 0.0, 0.0, 1.0);
            out.uv = vec2<f32>(0.0, 1.0);
            return out;
        }
    "#;

    // ── stage interfaces ───────────────────────────────────────────────────

    #[test]
    fn builtin_pair_links_with_an_empty_layout() {
        let layout = link(&vs(TRIANGLE_VERT), &fs(RED_FRAG), ColorFormat::Bgra8UnormSrgb).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn matching_inter_stage_variable_links() {
        let frag = fs(r#"
            @fragment
            fn main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, 0.0, 1.0);
            }
        "#);
        assert!(link(&vs(VS_WITH_UV), &frag, ColorFormat::Rgba8Unorm).is_ok());
    }

    #[test]
    fn fragment_input_without_vertex_output_is_rejected() {
        let frag = fs(r#"
            @fragment
            fn main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::MissingVertexOutput { location: 3 });
    }

    #[test]
    fn differently_typed_location_is_rejected() {
        let frag = fs(r#"
            @fragment
            fn main(@location(0) uv: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, 1.0);
            }
        "#);
        let err = link(&vs(VS_WITH_UV), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert!(matches!(err, LinkageError::TypeMismatch { location: 0, .. }));
        assert!(err.to_string().contains("vec2<f32>"));
    }

    #[test]
    fn vertex_location_inputs_are_rejected() {
        let vert = vs(r#"
            @vertex
            fn main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(pos, 0.0, 1.0);
            }
        "#);
        let err = link(&vert, &fs(RED_FRAG), ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::VertexInputsUnsupported { locations: vec![0] });
    }

    #[test]
    fn differing_interpolation_is_rejected() {
        let vert = vs(r#"
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(0) @interpolate(flat) v: f32,
            }
            @vertex
            fn main() -> VsOut {
                var out: VsOut;
                out.pos = vec4<f32>(0.0, 0.0, 0.0, 1.0);
                out.v = 1.0;
                return out;
            }
        "#);
        let frag = fs(r#"
            @fragment
            fn main(@location(0) @interpolate(perspective, centroid) v: f32) -> @location(0) vec4<f32> {
                return vec4<f32>(v);
            }
        "#);
        let err = link(&vert, &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::InterpolationMismatch { location: 0 });
    }

    #[test]
    fn differing_sampling_is_rejected() {
        let vert = vs(r#"
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(0) @interpolate(linear, centroid) v: f32,
            }
            @vertex
            fn main() -> VsOut {
                var out: VsOut;
                out.pos = vec4<f32>(0.0, 0.0, 0.0, 1.0);
                out.v = 1.0;
                return out;
            }
        "#);
        let frag = fs(r#"
            @fragment
            fn main(@location(0) @interpolate(linear) v: f32) -> @location(0) vec4<f32> {
                return vec4<f32>(v);
            }
        "#);
        let err = link(&vert, &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::InterpolationMismatch { location: 0 });
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let err = link(&fs(RED_FRAG), &vs(TRIANGLE_VERT), ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(
            err,
            LinkageError::StageMismatch {
                expected: ShaderStage::Vertex,
                actual: ShaderStage::Fragment
            }
        );
    }

    // ── color output ───────────────────────────────────────────────────────

    #[test]
    fn integer_color_output_is_rejected() {
        let frag = fs(r#"
            @fragment
            fn main() -> @location(0) vec4<u32> {
                return vec4<u32>(1u);
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert!(matches!(err, LinkageError::IncompatibleColorOutput { .. }));
    }

    #[test]
    fn color_output_with_too_few_channels_is_rejected() {
        let frag = fs(r#"
            @fragment
            fn main() -> @location(0) vec2<f32> {
                return vec2<f32>(1.0, 0.0);
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert!(matches!(
            err,
            LinkageError::IncompatibleColorOutput {
                format: ColorFormat::Rgba8Unorm,
                ..
            }
        ));
        assert!(err.to_string().contains("vec2<f32>"));
    }

    #[test]
    fn color_output_must_be_location_zero() {
        let frag = fs(r#"
            @fragment
            fn main() -> @location(1) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::MissingColorOutput);
    }

    // ── resources ──────────────────────────────────────────────────────────

    #[test]
    fn shared_uniform_is_visible_to_both_stages() {
        let vert = vs(r#"
            @group(0) @binding(0) var<uniform> scale: vec4<f32>;
            @vertex
            fn main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
                return scale;
            }
        "#);
        let frag = fs(r#"
            @group(0) @binding(0) var<uniform> scale: vec4<f32>;
            @group(2) @binding(1) var<uniform> tint: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return scale * tint;
            }
        "#);
        let layout = link(&vert, &frag, ColorFormat::Rgba8Unorm).unwrap();
        let groups = layout.bind_groups();

        assert_eq!(groups.len(), 3);
        assert!(groups[1].entries.is_empty());
        assert_eq!(
            groups[0].entries[0].visibility,
            StageVisibility {
                vertex: true,
                fragment: true
            }
        );
        assert_eq!(groups[2].entries[0].binding, 1);
        assert!(!groups[2].entries[0].visibility.vertex);
    }

    #[test]
    fn group_beyond_device_limit_is_rejected() {
        let frag = fs(r#"
            @group(2147483647) @binding(0) var<uniform> tint: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(
            err,
            LinkageError::BindGroupLimit {
                group: 2147483647,
                max: 4
            }
        );
    }

    #[test]
    fn group_limit_follows_the_device() {
        let frag = fs(r#"
            @group(7) @binding(0) var<uniform> tint: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::BindGroupLimit { group: 7, max: 4 });

        let wide = BindingLimits {
            max_bind_groups: 8,
            ..BindingLimits::default()
        };
        let layout = resolve(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm, wide).unwrap();
        assert_eq!(layout.bind_groups().len(), 8);
    }

    #[test]
    fn binding_beyond_device_limit_is_rejected() {
        let frag = fs(r#"
            @group(0) @binding(5000) var<uniform> tint: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(
            err,
            LinkageError::BindingLimit {
                group: 0,
                binding: 5000,
                max: 1000
            }
        );
    }

    #[test]
    fn stages_disagreeing_on_a_binding_are_rejected() {
        let vert = vs(r#"
            @group(0) @binding(0) var<uniform> a: vec4<f32>;
            @vertex
            fn main() -> @builtin(position) vec4<f32> {
                return a;
            }
        "#);
        let frag = fs(r#"
            @group(0) @binding(0) var<storage, read> a: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return a;
            }
        "#);
        let err = link(&vert, &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert_eq!(err, LinkageError::ConflictingBinding { group: 0, binding: 0 });
    }

    #[test]
    fn storage_textures_are_not_guessed() {
        let frag = fs(r#"
            @group(0) @binding(0) var img: texture_storage_2d<rgba8unorm, write>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                textureStore(img, vec2<i32>(0, 0), vec4<f32>(1.0));
                return vec4<f32>(1.0);
            }
        "#);
        let err = link(&vs(TRIANGLE_VERT), &frag, ColorFormat::Rgba8Unorm).unwrap_err();
        assert!(matches!(err, LinkageError::UnresolvableBinding { group: 0, binding: 0, .. }));
    }
}
