use std::fmt;

use super::ShaderStage;

/// 1-based position inside shader source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl From<naga::SourceLocation> for SourceLocation {
    fn from(loc: naga::SourceLocation) -> Self {
        Self {
            line: loc.line_number,
            column: loc.line_position,
        }
    }
}

/// A single compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// `None` when the message is not tied to a span (e.g. a missing entry point).
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub(crate) fn new(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn from_parse(err: &naga::front::wgsl::ParseError, source: &str) -> Self {
        Self::new(err.message(), err.location(source).map(SourceLocation::from))
    }

    pub(crate) fn from_validation(
        err: &naga::WithSpan<naga::valid::ValidationError>,
        source: &str,
    ) -> Self {
        use std::error::Error as _;

        // The top-level validation error only names the failing item; the
        // actual cause sits further down the source chain.
        let inner = err.as_inner();
        let mut message = inner.to_string();
        let mut cause = inner.source();
        while let Some(c) = cause {
            message.push_str(": ");
            message.push_str(&c.to_string());
            cause = c.source();
        }

        let location = err
            .spans()
            .map(|(span, _)| span)
            .find(|span| span.is_defined())
            .map(|span| SourceLocation::from(span.location(source)));

        Self::new(message, location)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}:{}: {}", loc.line, loc.column, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Shader source was rejected by the front-end or the validator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} shader failed to compile: {}", summarize(.diagnostics))]
pub struct CompilationError {
    pub stage: ShaderStage,
    pub label: Option<String>,
    /// Never empty.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationError {
    pub(crate) fn new(stage: ShaderStage, diagnostic: Diagnostic) -> Self {
        Self {
            stage,
            label: None,
            diagnostics: vec![diagnostic],
        }
    }

    pub(crate) fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_owned);
        self
    }

    /// First diagnostic; always present.
    pub fn primary(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_owned(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_with_location_prefixes_line_and_column() {
        let d = Diagnostic::new("expected `;`", Some(SourceLocation { line: 3, column: 7 }));
        assert_eq!(d.to_string(), "3:7: expected `;`");
    }

    #[test]
    fn diagnostic_without_location_is_just_the_message() {
        let d = Diagnostic::new("no entry point", None);
        assert_eq!(d.to_string(), "no entry point");
    }

    #[test]
    fn error_display_counts_extra_diagnostics() {
        let mut err = CompilationError::new(ShaderStage::Fragment, Diagnostic::new("a", None));
        err.diagnostics.push(Diagnostic::new("b", None));
        assert_eq!(err.to_string(), "fragment shader failed to compile: a (+1 more)");
    }
}
