use std::io;
use std::path::PathBuf;

use crate::plugin::PluginKind;

/// Errors that can occur while preparing or running a manifold invocation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed command-line argument '{token}'")]
    InvalidArgument { token: String },

    #[error("option {option} requires a parameter")]
    MissingParameter { option: String },

    #[error("cannot specify both -c/--compile-only and -i/--intermediate")]
    ConflictingMode,

    #[error("path not found: '{}'", path.display())]
    PathNotFound { path: PathBuf },

    #[error("cannot open '{}': {source}", path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write '{}': {source}", path.display())]
    FileNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backend must be specified (use -b/--backend [backend-name])")]
    BackendRequired,

    #[error("could not load {kind} '{name}'")]
    PluginNotFound { kind: PluginKind, name: String },

    #[error("{0}")]
    OptionParseError(String),

    #[error("option '{option}' declared by {owner} is already registered")]
    DuplicateOption { option: String, owner: String },

    #[error("compile-only mode requires an output path (use -o/--output [path])")]
    OutputPathRequired,

    #[error("invalid plugin manifest '{}': {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("invalid schematic document: {0}")]
    InvalidSchematic(String),

    #[error("{kind} '{name}' failed: {message}")]
    Plugin {
        kind: PluginKind,
        name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Expected, named outcomes of orchestration.
    ///
    /// These are reported as a single log line and stop the run cleanly.
    /// Everything else is either a parse error or an unexpected fault and
    /// travels to the process boundary.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Error::ConflictingMode
                | Error::PathNotFound { .. }
                | Error::FileNotReadable { .. }
                | Error::FileNotWritable { .. }
                | Error::BackendRequired
                | Error::PluginNotFound { .. }
                | Error::OptionParseError(_)
                | Error::DuplicateOption { .. }
                | Error::OutputPathRequired
                | Error::InvalidManifest { .. }
                | Error::InvalidSchematic(_)
        )
    }

    /// Malformed token shapes found before any orchestration happens
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. } | Error::MissingParameter { .. }
        )
    }

    pub(crate) fn invalid_argument(token: &str) -> Self {
        Error::InvalidArgument {
            token: token.to_string(),
        }
    }
}

/// Result type alias for manifold engine operations
pub type Result<T> = std::result::Result<T, Error>;
