use std::fmt;

use crate::backend::ValidationError;
use crate::device::AcquireError;
use crate::pipeline::LinkageError;
use crate::shader::CompilationError;

/// An error that ends rendering for this engine instance.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FatalError {
    #[error("device acquisition failed: {0}")]
    Acquire(#[from] AcquireError),

    #[error("surface lost")]
    SurfaceLost,

    /// The display refused the surface configuration, e.g. an output format
    /// it cannot present.
    #[error("surface configuration failed: {0}")]
    SurfaceConfiguration(ValidationError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("incompatible stage linkage: {0}")]
    Linkage(#[from] LinkageError),
}

/// Coarse class of a [`FatalError`], as reported to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FatalReason {
    NoAdapterAvailable,
    SurfaceLost,
    CompilationError,
    IncompatibleStageLinkage,
}

impl FatalError {
    pub fn reason(&self) -> FatalReason {
        match self {
            Self::Acquire(_) => FatalReason::NoAdapterAvailable,
            Self::SurfaceLost | Self::SurfaceConfiguration(_) => FatalReason::SurfaceLost,
            Self::Compilation(_) => FatalReason::CompilationError,
            Self::Linkage(_) => FatalReason::IncompatibleStageLinkage,
        }
    }
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoAdapterAvailable => "no adapter available",
            Self::SurfaceLost => "surface lost",
            Self::CompilationError => "compilation error",
            Self::IncompatibleStageLinkage => "incompatible stage linkage",
        })
    }
}

type Handler = Box<dyn FnMut(&FatalError)>;

/// Delivers at most one fatal error to the host.
#[derive(Default)]
pub(crate) struct FatalReporter {
    handler: Option<Handler>,
    fired: bool,
}

impl FatalReporter {
    pub(crate) fn set_handler(&mut self, handler: Handler) {
        self.handler = Some(handler);
    }

    pub(crate) fn has_fired(&self) -> bool {
        self.fired
    }

    pub(crate) fn report(&mut self, err: &FatalError) {
        log::error!("fatal: {err}");
        if self.fired {
            log::debug!("fatal error already reported; not notifying again");
            return;
        }
        self.fired = true;
        if let Some(handler) = self.handler.as_mut() {
            handler(err);
        }
    }
}
