//! manifold-engine core
//!
//! This crate provides the command-line entry layer of the manifold
//! compiler pipeline:
//! - Classify raw arguments into frontend, backend, engine and file tokens
//! - Extract the engine switches that select plugins and the execution mode
//! - Discover frontend and backend plugins and run one of three workflows
pub mod args;
pub mod config;
pub mod error;
pub mod mode;
pub mod options;
pub mod orchestrator;
pub mod plugin;
pub mod schematic;

// Re-export commonly used types and traits
pub use args::{ClassifiedArguments, InitialOptions};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use mode::ExecutionMode;
pub use options::{OptionSchema, OptionSpec, ParsedOptions, Verbosity};
pub use orchestrator::{LogControl, Orchestrator, RunOutcome, Stage};
pub use plugin::{Backend, Frontend, ManifestCatalog, PluginCatalog, PluginKind, PluginRegistry};
pub use schematic::Schematic;
