use std::sync::Arc;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::{CompilationError, Diagnostic};
use super::reflect::{self, StageInterface};
use super::ShaderStage;

/// Compiled, validated shader stage.
///
/// Immutable after creation. The source text is kept verbatim because GPU
/// backends build their own module from it; the reflected interface is what
/// pipeline linkage inspects.
#[derive(Debug, Clone)]
pub struct ShaderUnit {
    label: Option<String>,
    stage: ShaderStage,
    source: Arc<str>,
    interface: StageInterface,
}

impl ShaderUnit {
    /// Compiles `source` and selects its single entry point for `stage`.
    ///
    /// Sources declaring several entry points of the same stage must use
    /// [`compile_entry`](Self::compile_entry).
    pub fn compile(source: &str, stage: ShaderStage) -> Result<Self, CompilationError> {
        Self::compile_inner(source, stage, None)
    }

    /// Compiles `source` and selects the entry point named `entry_point`.
    pub fn compile_entry(
        source: &str,
        stage: ShaderStage,
        entry_point: &str,
    ) -> Result<Self, CompilationError> {
        Self::compile_inner(source, stage, Some(entry_point))
    }

    fn compile_inner(
        source: &str,
        stage: ShaderStage,
        entry_point: Option<&str>,
    ) -> Result<Self, CompilationError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| CompilationError::new(stage, Diagnostic::from_parse(&err, source)))?;

        let info = Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .map_err(|err| CompilationError::new(stage, Diagnostic::from_validation(&err, source)))?;

        let index = select_entry_point(&module, stage, entry_point)?;
        let interface = reflect::reflect(&module, &info, index);

        log::debug!(
            "compiled {stage} shader (entry `{}`, {} inputs, {} outputs, {} resources)",
            interface.entry_point,
            interface.inputs.len(),
            interface.outputs.len(),
            interface.resources.len()
        );

        Ok(Self {
            label: None,
            stage,
            source: Arc::from(source),
            interface,
        })
    }

    /// Attaches a debug label used in logs and GPU object names.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.interface.entry_point
    }

    /// Source text exactly as it was compiled.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn interface(&self) -> &StageInterface {
        &self.interface
    }
}

fn select_entry_point(
    module: &naga::Module,
    stage: ShaderStage,
    wanted: Option<&str>,
) -> Result<usize, CompilationError> {
    let naga_stage = stage.to_naga();
    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == naga_stage);

    let fail = |message: String| CompilationError::new(stage, Diagnostic::new(message, None));

    match wanted {
        Some(name) => candidates
            .find(|(_, ep)| ep.name == name)
            .map(|(i, _)| i)
            .ok_or_else(|| fail(format!("no @{stage} entry point named `{name}`"))),
        None => {
            let (index, first) = candidates
                .next()
                .ok_or_else(|| fail(format!("source declares no @{stage} entry point")))?;
            if let Some((_, second)) = candidates.next() {
                return Err(fail(format!(
                    "source declares several @{stage} entry points (`{}`, `{}`, ...); name one explicitly",
                    first.name, second.name
                )));
            }
            Ok(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::builtin::{RED_FRAG, TRIANGLE_VERT};
    use crate::shader::{BindingKind, IoType, ReflectedKind, ScalarKind};

    const VEC4F: IoType = IoType {
        kind: ScalarKind::Float,
        width: 4,
        components: 4,
    };

    // ── successful compilation ─────────────────────────────────────────────

    #[test]
    fn builtin_triangle_compiles_without_location_inputs() {
        let unit = ShaderUnit::compile(TRIANGLE_VERT, ShaderStage::Vertex).unwrap();
        assert_eq!(unit.stage(), ShaderStage::Vertex);
        assert_eq!(unit.entry_point(), "main");
        assert!(unit.interface().inputs.is_empty());
        assert!(unit.interface().outputs.is_empty());
        assert_eq!(unit.source(), TRIANGLE_VERT);
    }

    #[test]
    fn builtin_red_fragment_writes_location_zero() {
        let unit = ShaderUnit::compile(RED_FRAG, ShaderStage::Fragment).unwrap();
        let out = unit.interface().output(0).unwrap();
        assert_eq!(out.ty, Some(VEC4F));
        assert!(unit.interface().inputs.is_empty());
    }

    #[test]
    fn struct_members_are_flattened_into_locations() {
        let src = r#"
            struct VsOut {
                @builtin(position) pos: vec4<f32>,
                @location(1) uv: vec2<f32>,
                @location(0) color: vec4<f32>,
            }
            @vertex
            fn vs(@builtin(vertex_index) i: u32) -> VsOut {
                var out: VsOut;
                out.pos = vec4<f32>(0.0, 0.0, 0.0, 1.0);
                out.uv = vec2<f32>(0.0, 0.0);
                out.color = vec4<f32>(1.0, 1.0, 1.0, 1.0);
                return out;
            }
        "#;
        let unit = ShaderUnit::compile(src, ShaderStage::Vertex).unwrap();
        let locations: Vec<u32> = unit.interface().outputs.iter().map(|v| v.location).collect();
        assert_eq!(locations, vec![0, 1]);
        assert_eq!(unit.interface().output(1).unwrap().name.as_deref(), Some("uv"));
    }

    #[test]
    fn only_resources_reached_by_the_entry_point_are_reported() {
        let src = r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;
            @group(0) @binding(1) var<uniform> unused: vec4<f32>;
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let unit = ShaderUnit::compile(src, ShaderStage::Fragment).unwrap();
        let resources = &unit.interface().resources;
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].binding, 0);
        assert_eq!(resources[0].kind, ReflectedKind::Resolved(BindingKind::UniformBuffer));
    }

    #[test]
    fn named_entry_point_is_selected_among_several() {
        let src = r#"
            @fragment fn red() -> @location(0) vec4<f32> { return vec4<f32>(1.0, 0.0, 0.0, 1.0); }
            @fragment fn blue() -> @location(0) vec4<f32> { return vec4<f32>(0.0, 0.0, 1.0, 1.0); }
        "#;
        let unit = ShaderUnit::compile_entry(src, ShaderStage::Fragment, "blue").unwrap();
        assert_eq!(unit.entry_point(), "blue");
    }

    #[test]
    fn label_is_kept() {
        let unit = ShaderUnit::compile(RED_FRAG, ShaderStage::Fragment)
            .unwrap()
            .with_label("red");
        assert_eq!(unit.label(), Some("red"));
    }

    // ── failures ───────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_carries_a_located_diagnostic() {
        let src = "@vertex\nfn main( -> @builtin(position) vec4<f32> {\n}\n";
        let err = ShaderUnit::compile(src, ShaderStage::Vertex).unwrap_err();
        assert_eq!(err.stage, ShaderStage::Vertex);
        let diag = err.primary().unwrap();
        assert!(!diag.message.is_empty());
        let loc = diag.location.unwrap();
        assert_eq!(loc.line, 2);
    }

    #[test]
    fn type_error_is_rejected() {
        let src = r#"
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return 1u;
            }
        "#;
        let err = ShaderUnit::compile(src, ShaderStage::Fragment).unwrap_err();
        assert!(!err.diagnostics.is_empty());
        assert!(!err.diagnostics[0].message.is_empty());
    }

    #[test]
    fn missing_stage_entry_point_is_a_compilation_error() {
        let err = ShaderUnit::compile(RED_FRAG, ShaderStage::Vertex).unwrap_err();
        let diag = err.primary().unwrap();
        assert!(diag.message.contains("no @vertex entry point"));
        assert!(diag.location.is_none());
    }

    #[test]
    fn several_entry_points_without_a_name_are_rejected() {
        let src = r#"
            @fragment fn a() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
            @fragment fn b() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }
        "#;
        let err = ShaderUnit::compile(src, ShaderStage::Fragment).unwrap_err();
        assert!(err.diagnostics[0].message.contains("several"));
    }

    #[test]
    fn unknown_entry_point_name_is_rejected() {
        let err = ShaderUnit::compile_entry(RED_FRAG, ShaderStage::Fragment, "nope").unwrap_err();
        assert!(err.diagnostics[0].message.contains("`nope`"));
    }
}
