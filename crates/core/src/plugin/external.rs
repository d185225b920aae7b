//! Plugins backed by an external program described in a manifest.
//!
//! Declared options are forwarded as `--long [value]`. A frontend receives
//! the positional inputs as trailing arguments after `--` and prints a schematic
//! document on stdout; a backend reads the schematic document on stdin.

use std::io;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::args::ESCAPE_TOKEN;
use crate::config::VERBOSITY_ENV;
use crate::error::{Error, Result};
use crate::options::{OptionSchema, ParsedOptions};
use crate::schematic::{self, Schematic};

use super::manifest::PluginManifest;
use super::{Backend, Frontend, PluginKind};

struct ExternalTool {
    manifest: PluginManifest,
}

impl ExternalTool {
    fn command(&self, options: &ParsedOptions) -> Command {
        let mut command = Command::new(&self.manifest.command);
        command.args(&self.manifest.args);
        for option in &self.manifest.options {
            let flag = format!("--{}", option.long);
            if option.takes_value {
                for value in options.values(&option.long) {
                    command.arg(&flag).arg(value);
                }
            } else if options.has_flag(&option.long) {
                command.arg(&flag);
            }
        }
        command.env(VERBOSITY_ENV, options.verbosity().as_str());
        command
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        let owner = self.manifest.kind.owner(&self.manifest.name);
        for option in &self.manifest.options {
            schema.declare(&owner, option.to_spec())?;
        }
        Ok(())
    }

    fn failure(&self, message: impl Into<String>) -> Error {
        Error::Plugin {
            kind: self.manifest.kind,
            name: self.manifest.name.clone(),
            message: message.into(),
        }
    }

    fn cannot_run(&self, err: std::io::Error) -> Error {
        self.failure(format!(
            "cannot run '{}': {err}",
            self.manifest.command.display()
        ))
    }
}

pub struct ExternalFrontend {
    tool: ExternalTool,
}

impl ExternalFrontend {
    pub fn new(manifest: PluginManifest) -> Self {
        debug_assert_eq!(manifest.kind, PluginKind::Frontend);
        Self {
            tool: ExternalTool { manifest },
        }
    }
}

impl Frontend for ExternalFrontend {
    fn name(&self) -> &str {
        &self.tool.manifest.name
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        self.tool.register_options(schema)
    }

    fn invoke(&self, options: &ParsedOptions) -> Result<Schematic> {
        let mut command = self.tool.command(options);
        // files that arrived behind the escape token may look like options
        command
            .arg(ESCAPE_TOKEN)
            .args(options.files())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        info!("running frontend '{}': {:?}", self.name(), command);

        let output = command.output().map_err(|e| self.tool.cannot_run(e))?;
        if !output.status.success() {
            return Err(self.tool.failure(format!("exited with {}", output.status)));
        }
        debug!("frontend '{}' wrote {} bytes", self.name(), output.stdout.len());

        schematic::read_from(output.stdout.as_slice())
            .map_err(|e| self.tool.failure(format!("produced an unreadable schematic: {e}")))
    }
}

pub struct ExternalBackend {
    tool: ExternalTool,
}

impl ExternalBackend {
    pub fn new(manifest: PluginManifest) -> Self {
        debug_assert_eq!(manifest.kind, PluginKind::Backend);
        Self {
            tool: ExternalTool { manifest },
        }
    }
}

impl Backend for ExternalBackend {
    fn name(&self) -> &str {
        &self.tool.manifest.name
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        self.tool.register_options(schema)
    }

    fn invoke(&self, schematic: Schematic, options: &ParsedOptions) -> Result<()> {
        let mut command = self.tool.command(options);
        command.stdin(Stdio::piped());
        info!("running backend '{}': {:?}", self.name(), command);

        let mut child = command.spawn().map_err(|e| self.tool.cannot_run(e))?;
        // stdin is closed when the writer is dropped, before waiting
        let sent = match child.stdin.take() {
            Some(stdin) => schematic::write_to(&schematic, stdin),
            None => Ok(()),
        };
        let status = child.wait().map_err(|e| self.tool.cannot_run(e))?;

        if !status.success() {
            return Err(self.tool.failure(format!("exited with {status}")));
        }
        match sent {
            // the program finished without reading all of its input
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("backend '{}' closed its input early", self.name());
                Ok(())
            }
            sent => sent.map_err(|e| self.tool.failure(format!("cannot send schematic: {e}"))),
        }
    }
}
