//! `*.plugin.toml` manifests describing external-process plugins.
//!
//! ```toml
//! kind = "backend"
//! name = "verilog"
//! command = "bin/manifold-verilog"
//! args = ["--emit"]
//!
//! [[options]]
//! long = "bverilog-top"
//! takes_value = true
//! help = "Name of the top-level module"
//! ```
//!
//! A relative `command` containing a path separator is resolved against the
//! manifest's directory; a bare program name is looked up on `PATH`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::options::OptionSpec;

use super::PluginKind;
use super::external::{ExternalBackend, ExternalFrontend};
use super::registry::PluginRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    pub kind: PluginKind,
    pub name: String,
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub options: Vec<ManifestOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOption {
    pub long: String,
    #[serde(default)]
    pub short: Option<char>,
    #[serde(default)]
    pub takes_value: bool,
    #[serde(default)]
    pub help: String,
}

impl ManifestOption {
    pub fn to_spec(&self) -> OptionSpec {
        let spec = if self.takes_value {
            OptionSpec::value(self.long.clone(), "VALUE")
        } else {
            OptionSpec::flag(self.long.clone())
        };
        let spec = spec.help(self.help.clone());
        match self.short {
            Some(short) => spec.short(short),
            None => spec,
        }
    }
}

impl PluginManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::FileNotReadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text; `path` is used for messages and for resolving
    /// a relative command
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let invalid = |message: String| Error::InvalidManifest {
            path: path.to_path_buf(),
            message,
        };

        let mut manifest: PluginManifest =
            toml::from_str(text).map_err(|e| invalid(e.message().to_string()))?;

        if manifest.name.trim().is_empty() {
            return Err(invalid("plugin name must not be empty".to_string()));
        }
        if manifest.command.as_os_str().is_empty() {
            return Err(invalid("command must not be empty".to_string()));
        }
        if let Some(option) = manifest
            .options
            .iter()
            .find(|option| option.long.is_empty() || option.long.starts_with('-'))
        {
            return Err(invalid(format!(
                "option name '{}' must be non-empty and given without dashes",
                option.long
            )));
        }

        let command = &manifest.command;
        if command.is_relative() && command.components().count() > 1 {
            if let Some(dir) = path.parent() {
                manifest.command = dir.join(command);
            }
        }

        Ok(manifest)
    }

    /// Add the plugin this manifest describes to `registry`
    pub fn register(self, registry: &mut PluginRegistry) -> bool {
        match self.kind {
            PluginKind::Frontend => registry.register_frontend(Arc::new(ExternalFrontend::new(self))),
            PluginKind::Backend => registry.register_backend(Arc::new(ExternalBackend::new(self))),
        }
    }
}
