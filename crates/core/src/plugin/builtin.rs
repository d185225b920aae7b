//! Plugins compiled into the engine.
//!
//! - frontend `default`: records every input file as a source unit
//! - backend `json`: writes the schematic document to a file or stdout

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::args::DEFAULT_FRONTEND;
use crate::error::{Error, Result};
use crate::options::{OptionSchema, OptionSpec, ParsedOptions};
use crate::schematic::{self, Schematic};

use super::registry::PluginRegistry;
use super::{Backend, Frontend, PluginKind};

pub const JSON_BACKEND: &str = "json";

/// Built-in registration table
pub fn register_all(registry: &mut PluginRegistry) {
    registry.register_frontend(Arc::new(DefaultFrontend));
    registry.register_backend(Arc::new(JsonBackend));
}

pub struct DefaultFrontend;

impl DefaultFrontend {
    const NAME_OPTION: &'static str = "fname";
}

impl Frontend for DefaultFrontend {
    fn name(&self) -> &str {
        DEFAULT_FRONTEND
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        schema.declare(
            &PluginKind::Frontend.owner(DEFAULT_FRONTEND),
            OptionSpec::value(Self::NAME_OPTION, "NAME")
                .help("Name of the produced schematic [default: stem of the first input]"),
        )
    }

    fn invoke(&self, options: &ParsedOptions) -> Result<Schematic> {
        let mut sources = Vec::with_capacity(options.files().len());
        for file in options.files() {
            let path = Path::new(file);
            let text = fs::read_to_string(path).map_err(|source| Error::FileNotReadable {
                path: path.to_path_buf(),
                source,
            })?;
            sources.push(json!({ "path": file, "text": text }));
        }

        let name = options
            .value(Self::NAME_OPTION)
            .map(str::to_string)
            .or_else(|| {
                options
                    .primary_file()
                    .and_then(|file| Path::new(file).file_stem())
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "schematic".to_string());
        info!("frontend '{}' read {} source(s)", DEFAULT_FRONTEND, sources.len());

        Ok(Schematic::new(name)
            .with_attribute("frontend", DEFAULT_FRONTEND)
            .with_body(json!({ "sources": sources })))
    }
}

pub struct JsonBackend;

impl JsonBackend {
    const OUTPUT_OPTION: &'static str = "bjson-output";
}

impl Backend for JsonBackend {
    fn name(&self) -> &str {
        JSON_BACKEND
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        schema.declare(
            &PluginKind::Backend.owner(JSON_BACKEND),
            OptionSpec::value(Self::OUTPUT_OPTION, "PATH")
                .help("Write the schematic document here instead of stdout"),
        )
    }

    fn invoke(&self, schematic: Schematic, options: &ParsedOptions) -> Result<()> {
        match options.value(Self::OUTPUT_OPTION) {
            Some(output) => {
                let path = Path::new(output);
                let not_writable = |source| Error::FileNotWritable {
                    path: path.to_path_buf(),
                    source,
                };
                let file = File::create(path).map_err(not_writable)?;
                schematic::write_to(&schematic, BufWriter::new(file)).map_err(|e| match e {
                    Error::Io(source) => not_writable(source),
                    other => other,
                })?;
                info!("wrote schematic '{}' to {}", schematic.name, path.display());
            }
            None => schematic::write_to(&schematic, io::stdout().lock())?,
        }
        Ok(())
    }
}
