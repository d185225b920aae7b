//! Plugin interfaces
//!
//! A frontend turns source inputs into a [`Schematic`]; a backend consumes
//! one. Both get a chance to declare options on the shared schema before
//! the command line is parsed.

use std::fmt;

use serde::Deserialize;

use crate::error::Result;
use crate::options::{OptionSchema, ParsedOptions};
use crate::schematic::Schematic;

pub mod builtin;
pub mod discovery;
pub mod external;
pub mod manifest;
pub mod registry;

pub use discovery::{ManifestCatalog, PLUGIN_MANIFEST_SUFFIX, PluginCatalog};
pub use manifest::PluginManifest;
pub use registry::PluginRegistry;

/// The two plugin capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Frontend,
    Backend,
}

impl PluginKind {
    /// Label used when a plugin declares options
    pub fn owner(self, name: &str) -> String {
        format!("{self} '{name}'")
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Frontend => write!(f, "frontend"),
            PluginKind::Backend => write!(f, "backend"),
        }
    }
}

pub trait Frontend: Send + Sync {
    fn name(&self) -> &str;

    /// Declare frontend-specific options (optional)
    fn register_options(&self, _schema: &mut OptionSchema) -> Result<()> {
        Ok(())
    }

    /// Compile the positional inputs in `options` into a schematic
    fn invoke(&self, options: &ParsedOptions) -> Result<Schematic>;
}

pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Declare backend-specific options (optional)
    fn register_options(&self, _schema: &mut OptionSchema) -> Result<()> {
        Ok(())
    }

    /// Produce final output from a schematic
    fn invoke(&self, schematic: Schematic, options: &ParsedOptions) -> Result<()>;
}
