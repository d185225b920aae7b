//! Fixtures shared by the workspace integration tests.
//!
//! A [`Workbench`] is a scratch directory holding source files, schematic
//! documents and `*.plugin.toml` manifests for one test.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use toml::{Table, Value};

pub use manifold_engine_core::*;

pub struct Workbench {
    dir: TempDir,
}

impl Workbench {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the workbench, as a command-line token
    pub fn arg(&self, name: &str) -> String {
        self.path().join(name).to_string_lossy().into_owned()
    }

    pub fn write_source(&self, name: &str, text: &str) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        Ok(path)
    }

    pub fn write_schematic(&self, name: &str, schematic: &Schematic) -> io::Result<PathBuf> {
        let text = schematic::to_pretty_string(schematic).map_err(io::Error::other)?;
        self.write_source(name, &text)
    }

    pub fn read_schematic(&self, name: &str) -> io::Result<Schematic> {
        let file = fs::File::open(self.path().join(name))?;
        schematic::read_from(file).map_err(io::Error::other)
    }

    /// Write `<dir>/<plugin.name>.plugin.toml`
    pub fn write_manifest(&self, dir: &str, plugin: &ManifestBuilder) -> io::Result<PathBuf> {
        let file = format!("{}{}", plugin.name, plugin::PLUGIN_MANIFEST_SUFFIX);
        let text = toml::to_string(&plugin.to_table()).map_err(io::Error::other)?;
        self.write_source(&format!("{dir}/{file}"), &text)
    }
}

/// Builds the text of an external plugin manifest
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    kind: PluginKind,
    name: String,
    command: String,
    args: Vec<String>,
    options: Vec<Table>,
}

impl ManifestBuilder {
    pub fn new(kind: PluginKind, name: &str, command: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            command: command.to_string(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn option(mut self, long: &str, takes_value: bool) -> Self {
        let mut option = Table::new();
        option.insert("long".into(), Value::String(long.to_string()));
        option.insert("takes_value".into(), Value::Boolean(takes_value));
        self.options.push(option);
        self
    }

    fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.insert("kind".into(), Value::String(self.kind.to_string()));
        table.insert("name".into(), Value::String(self.name.clone()));
        table.insert("command".into(), Value::String(self.command.clone()));
        table.insert(
            "args".into(),
            Value::Array(self.args.iter().cloned().map(Value::String).collect()),
        );
        table.insert(
            "options".into(),
            Value::Array(self.options.iter().cloned().map(Value::Table).collect()),
        );
        table
    }
}
