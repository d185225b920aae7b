use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::{Backend, Frontend, PluginKind};

/// Name-keyed plugin tables, built once per run and read-only afterwards
#[derive(Default)]
pub struct PluginRegistry {
    frontends: BTreeMap<String, Arc<dyn Frontend>>,
    backends: BTreeMap<String, Arc<dyn Backend>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frontend. The first plugin registered under a name wins.
    pub fn register_frontend(&mut self, frontend: Arc<dyn Frontend>) -> bool {
        let name = frontend.name().to_string();
        if self.frontends.contains_key(&name) {
            warn!("ignoring duplicate frontend '{}'", name);
            return false;
        }
        debug!("registered frontend '{}'", name);
        self.frontends.insert(name, frontend);
        true
    }

    /// Register a backend. The first plugin registered under a name wins.
    pub fn register_backend(&mut self, backend: Arc<dyn Backend>) -> bool {
        let name = backend.name().to_string();
        if self.backends.contains_key(&name) {
            warn!("ignoring duplicate backend '{}'", name);
            return false;
        }
        debug!("registered backend '{}'", name);
        self.backends.insert(name, backend);
        true
    }

    pub fn frontend(&self, name: &str) -> Result<Arc<dyn Frontend>> {
        self.frontends
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PluginNotFound {
                kind: PluginKind::Frontend,
                name: name.to_string(),
            })
    }

    pub fn backend(&self, name: &str) -> Result<Arc<dyn Backend>> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PluginNotFound {
                kind: PluginKind::Backend,
                name: name.to_string(),
            })
    }

    pub fn frontend_names(&self) -> impl Iterator<Item = &str> {
        self.frontends.keys().map(String::as_str)
    }

    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty() && self.backends.is_empty()
    }
}
