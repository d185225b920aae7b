//! Process-level configuration taken from the environment

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Directories or manifests searched for plugins on every run
pub const PLUGIN_PATH_ENV: &str = "MANIFOLD_PLUGIN_PATH";

/// Exported to external plugins so they can match the engine's verbosity
pub const VERBOSITY_ENV: &str = "MANIFOLD_VERBOSITY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// The process's own plugin path, searched after the built-in plugins
    /// and before any `--search-url` entries
    pub plugin_path: Vec<PathBuf>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_plugin_path(env::var_os(PLUGIN_PATH_ENV))
    }

    /// Build from a platform path list such as `a:b` on Unix
    pub fn from_plugin_path(value: Option<OsString>) -> Self {
        let plugin_path = value
            .map(|value| {
                env::split_paths(&value)
                    .filter(|path| !path.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { plugin_path }
    }

    pub fn with_plugin_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plugin_path.push(path.into());
        self
    }
}
