use std::fmt;

use crate::args::InitialOptions;
use crate::error::{Error, Result};

/// The three workflows an invocation can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Compile sources and hand the schematic straight to a backend
    FrontendAndBackend,
    /// Compile sources and write the schematic document (`-c`)
    FrontendOnly,
    /// Read a schematic document and run a backend on it (`-i`)
    BackendOnly,
}

impl ExecutionMode {
    pub fn resolve(compile_only: bool, use_intermediate: bool) -> Result<Self> {
        match (compile_only, use_intermediate) {
            (true, true) => Err(Error::ConflictingMode),
            (true, false) => Ok(ExecutionMode::FrontendOnly),
            (false, true) => Ok(ExecutionMode::BackendOnly),
            (false, false) => Ok(ExecutionMode::FrontendAndBackend),
        }
    }

    pub fn from_options(options: &InitialOptions) -> Result<Self> {
        Self::resolve(options.compile_only(), options.use_intermediate())
    }

    pub fn uses_frontend(self) -> bool {
        !matches!(self, ExecutionMode::BackendOnly)
    }

    pub fn uses_backend(self) -> bool {
        !matches!(self, ExecutionMode::FrontendOnly)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::FrontendAndBackend => write!(f, "frontend+backend"),
            ExecutionMode::FrontendOnly => write!(f, "frontend only"),
            ExecutionMode::BackendOnly => write!(f, "backend only"),
        }
    }
}
