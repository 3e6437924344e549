//! Stage interface extraction from a validated naga module.
//!
//! Only what pipeline linkage needs is kept: user-defined `@location`
//! inputs/outputs of the selected entry point, and the resource bindings the
//! entry point actually reaches.

use std::fmt;

use naga::valid::ModuleInfo;

/// Scalar class of an inter-stage variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
    Bool,
}

/// Type of a `@location` variable: a scalar or a vector of scalars.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IoType {
    pub kind: ScalarKind,
    /// Scalar width in bytes.
    pub width: u8,
    /// 1 for scalars, 2–4 for vectors.
    pub components: u8,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.kind {
            ScalarKind::Float => "f",
            ScalarKind::Sint => "i",
            ScalarKind::Uint => "u",
            ScalarKind::Bool => "bool",
        };
        let bits = u32::from(self.width) * 8;
        let scalar = if self.kind == ScalarKind::Bool {
            scalar.to_owned()
        } else {
            format!("{scalar}{bits}")
        };
        match self.components {
            1 => f.write_str(&scalar),
            n => write!(f, "vec{n}<{scalar}>"),
        }
    }
}

/// `@interpolate` type of an inter-stage variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Perspective,
    Linear,
    Flat,
}

/// `@interpolate` sampling of an inter-stage variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sampling {
    Center,
    Centroid,
    Sample,
    First,
    Either,
}

/// A user-defined inter-stage variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVar {
    pub location: u32,
    pub name: Option<String>,
    /// `None` when the declared type is not a scalar or vector.
    pub ty: Option<IoType>,
    /// After WGSL defaults: perspective/center for floats, flat for integers.
    pub interpolation: Option<Interpolation>,
    pub sampling: Option<Sampling>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureSample {
    Float,
    Depth,
    Sint,
    Uint,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    D1,
    D2,
    D2Array,
    D3,
    Cube,
    CubeArray,
}

/// Resource kinds a pipeline layout can be inferred for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    StorageBuffer {
        read_only: bool,
    },
    Texture {
        sample: TextureSample,
        dimension: TextureDimension,
        multisampled: bool,
    },
    Sampler {
        comparison: bool,
    },
}

/// Result of classifying a resource declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectedKind {
    Resolved(BindingKind),
    /// The declaration exists but its layout entry cannot be inferred.
    Unresolved(&'static str),
}

/// A `@group/@binding` resource used by the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUse {
    pub group: u32,
    pub binding: u32,
    pub name: Option<String>,
    pub kind: ReflectedKind,
}

/// Everything linkage needs to know about one compiled stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInterface {
    pub entry_point: String,
    /// Sorted by location.
    pub inputs: Vec<InterfaceVar>,
    /// Sorted by location.
    pub outputs: Vec<InterfaceVar>,
    /// Sorted by `(group, binding)`.
    pub resources: Vec<ResourceUse>,
}

impl StageInterface {
    pub fn input(&self, location: u32) -> Option<&InterfaceVar> {
        self.inputs.iter().find(|v| v.location == location)
    }

    pub fn output(&self, location: u32) -> Option<&InterfaceVar> {
        self.outputs.iter().find(|v| v.location == location)
    }
}

pub(crate) fn reflect(module: &naga::Module, info: &ModuleInfo, index: usize) -> StageInterface {
    let ep = &module.entry_points[index];

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), arg.name.as_deref(), &mut inputs);
    }
    inputs.sort_by_key(|v| v.location);

    let mut outputs = Vec::new();
    if let Some(result) = ep.function.result.as_ref() {
        collect_locations(module, result.ty, result.binding.as_ref(), None, &mut outputs);
    }
    outputs.sort_by_key(|v| v.location);

    let usage = info.get_entry_point(index);
    let mut resources: Vec<ResourceUse> = module
        .global_variables
        .iter()
        .filter(|(handle, _)| !usage[*handle].is_empty())
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            Some(ResourceUse {
                group: rb.group,
                binding: rb.binding,
                name: var.name.clone(),
                kind: classify(module, var),
            })
        })
        .collect();
    resources.sort_by_key(|r| (r.group, r.binding));

    StageInterface {
        entry_point: ep.name.clone(),
        inputs,
        outputs,
        resources,
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    name: Option<&str>,
    out: &mut Vec<InterfaceVar>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => out.push(InterfaceVar {
            location: *location,
            name: name.map(str::to_owned),
            ty: io_type(inner),
            interpolation: interpolation.map(convert_interpolation),
            sampling: sampling.map(convert_sampling),
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        // Unbound arguments/results are structs whose members carry the bindings.
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_locations(
                        module,
                        member.ty,
                        member.binding.as_ref(),
                        member.name.as_deref(),
                        out,
                    );
                }
            }
        }
    }
}

fn convert_interpolation(interpolation: naga::Interpolation) -> Interpolation {
    match interpolation {
        naga::Interpolation::Perspective => Interpolation::Perspective,
        naga::Interpolation::Linear => Interpolation::Linear,
        naga::Interpolation::Flat => Interpolation::Flat,
    }
}

fn convert_sampling(sampling: naga::Sampling) -> Sampling {
    match sampling {
        naga::Sampling::Center => Sampling::Center,
        naga::Sampling::Centroid => Sampling::Centroid,
        naga::Sampling::Sample => Sampling::Sample,
        naga::Sampling::First => Sampling::First,
        naga::Sampling::Either => Sampling::Either,
    }
}

fn io_type(inner: &naga::TypeInner) -> Option<IoType> {
    let (scalar, components) = match inner {
        naga::TypeInner::Scalar(scalar) => (*scalar, 1),
        naga::TypeInner::Vector { size, scalar } => (*scalar, *size as u8),
        _ => return None,
    };
    Some(IoType {
        kind: scalar_kind(scalar.kind)?,
        width: scalar.width,
        components,
    })
}

fn scalar_kind(kind: naga::ScalarKind) -> Option<ScalarKind> {
    match kind {
        naga::ScalarKind::Float => Some(ScalarKind::Float),
        naga::ScalarKind::Sint => Some(ScalarKind::Sint),
        naga::ScalarKind::Uint => Some(ScalarKind::Uint),
        naga::ScalarKind::Bool => Some(ScalarKind::Bool),
        _ => None,
    }
}

fn classify(module: &naga::Module, var: &naga::GlobalVariable) -> ReflectedKind {
    match var.space {
        naga::AddressSpace::Uniform => ReflectedKind::Resolved(BindingKind::UniformBuffer),
        naga::AddressSpace::Storage { access } => ReflectedKind::Resolved(BindingKind::StorageBuffer {
            read_only: !access.contains(naga::StorageAccess::STORE),
        }),
        naga::AddressSpace::Handle => match &module.types[var.ty].inner {
            naga::TypeInner::Sampler { comparison } => {
                ReflectedKind::Resolved(BindingKind::Sampler { comparison: *comparison })
            }
            naga::TypeInner::Image { dim, arrayed, class } => classify_image(*dim, *arrayed, class),
            naga::TypeInner::BindingArray { .. } => ReflectedKind::Unresolved("binding arrays"),
            _ => ReflectedKind::Unresolved("unsupported handle type"),
        },
        _ => ReflectedKind::Unresolved("unsupported address space"),
    }
}

fn classify_image(dim: naga::ImageDimension, arrayed: bool, class: &naga::ImageClass) -> ReflectedKind {
    let dimension = match (dim, arrayed) {
        (naga::ImageDimension::D1, false) => TextureDimension::D1,
        (naga::ImageDimension::D2, false) => TextureDimension::D2,
        (naga::ImageDimension::D2, true) => TextureDimension::D2Array,
        (naga::ImageDimension::D3, false) => TextureDimension::D3,
        (naga::ImageDimension::Cube, false) => TextureDimension::Cube,
        (naga::ImageDimension::Cube, true) => TextureDimension::CubeArray,
        _ => return ReflectedKind::Unresolved("arrayed 1D/3D textures"),
    };

    let (sample, multisampled) = match class {
        naga::ImageClass::Sampled { kind, multi } => {
            let sample = match kind {
                naga::ScalarKind::Float => TextureSample::Float,
                naga::ScalarKind::Sint => TextureSample::Sint,
                naga::ScalarKind::Uint => TextureSample::Uint,
                _ => return ReflectedKind::Unresolved("texture sample type"),
            };
            (sample, *multi)
        }
        naga::ImageClass::Depth { multi } => (TextureSample::Depth, *multi),
        naga::ImageClass::Storage { .. } => return ReflectedKind::Unresolved("storage textures"),
        #[allow(unreachable_patterns)]
        _ => return ReflectedKind::Unresolved("unsupported texture class"),
    };

    ReflectedKind::Resolved(BindingKind::Texture {
        sample,
        dimension,
        multisampled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_type_display_matches_wgsl_spelling() {
        let vec4f = IoType {
            kind: ScalarKind::Float,
            width: 4,
            components: 4,
        };
        let u = IoType {
            kind: ScalarKind::Uint,
            width: 4,
            components: 1,
        };
        assert_eq!(vec4f.to_string(), "vec4<f32>");
        assert_eq!(u.to_string(), "u32");
    }

    #[test]
    fn lookup_by_location() {
        let iface = StageInterface {
            entry_point: "main".into(),
            outputs: vec![InterfaceVar {
                location: 2,
                name: Some("uv".into()),
                ty: None,
                interpolation: None,
                sampling: None,
            }],
            ..Default::default()
        };
        assert!(iface.output(2).is_some());
        assert!(iface.output(0).is_none());
        assert!(iface.input(2).is_none());
    }
}
