//! Plugin discovery
//!
//! Search sources are directories or individual manifest files. A directory
//! contributes its direct members whose names end in
//! [`PLUGIN_MANIFEST_SUFFIX`], in file-name order.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

use super::builtin;
use super::manifest::PluginManifest;
use super::registry::PluginRegistry;

pub const PLUGIN_MANIFEST_SUFFIX: &str = ".plugin.toml";

/// Produces the plugin registry for a run
pub trait PluginCatalog {
    /// `sources` are the already expanded manifest files from `--search-url`
    fn load(&self, sources: &[PathBuf]) -> Result<PluginRegistry>;
}

/// Expand `--search-url` entries into manifest files.
///
/// A path that does not exist is fatal.
pub fn expand_search_paths<S: AsRef<str>>(paths: &[S]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for path in paths {
        let path = Path::new(path.as_ref());
        if !path.exists() {
            return Err(Error::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        sources.extend(expand(path)?);
    }
    Ok(sources)
}

fn expand(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut manifests = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let is_manifest = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(PLUGIN_MANIFEST_SUFFIX));
        if entry.file_type().is_file() && is_manifest {
            manifests.push(entry.into_path());
        }
    }
    debug!(
        "found {} plugin manifest(s) in {}",
        manifests.len(),
        path.display()
    );
    Ok(manifests)
}

/// Built-in plugins, then the configured plugin path, then extra sources
pub struct ManifestCatalog {
    config: EngineConfig,
}

impl ManifestCatalog {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn own_sources(&self) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for path in &self.config.plugin_path {
            if !path.exists() {
                warn!("skipping missing plugin path entry '{}'", path.display());
                continue;
            }
            sources.extend(expand(path)?);
        }
        Ok(sources)
    }
}

impl PluginCatalog for ManifestCatalog {
    fn load(&self, sources: &[PathBuf]) -> Result<PluginRegistry> {
        let mut registry = PluginRegistry::new();
        builtin::register_all(&mut registry);

        for source in self.own_sources()?.iter().chain(sources) {
            debug!("loading plugin manifest {}", source.display());
            PluginManifest::load(source)?.register(&mut registry);
        }

        Ok(registry)
    }
}
