//! First pass over the command line.
//!
//! Picks out the handful of switches the engine needs before any plugin is
//! loaded and leaves everything else for the full option schema:
//!
//! - `-f`, `--frontend [name]`
//! - `-b`, `--backend [name]`
//! - `-c`, `--compile-only` (do not load a backend, emit a schematic)
//! - `-i`, `--intermediate` (read a schematic, do not load a frontend)
//! - `--search-url [path]` (repeatable)
//!
//! Short and long forms accept one or two leading dashes.

use std::iter::Peekable;

use crate::error::{Error, Result};

use super::ESCAPE_TOKEN;

pub const DEFAULT_FRONTEND: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineSwitch {
    Frontend,
    Backend,
    Intermediate,
    CompileOnly,
    SearchUrl,
}

impl EngineSwitch {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "f" | "frontend" => Some(EngineSwitch::Frontend),
            "b" | "backend" => Some(EngineSwitch::Backend),
            "i" | "intermediate" => Some(EngineSwitch::Intermediate),
            "c" | "compile-only" => Some(EngineSwitch::CompileOnly),
            "search-url" => Some(EngineSwitch::SearchUrl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialOptions {
    frontend_name: String,
    /// Empty means no backend was named; there is no default backend
    backend_name: String,
    compile_only: bool,
    use_intermediate: bool,
    extra_search_paths: Vec<String>,
    remaining_arguments: Vec<String>,
}

impl Default for InitialOptions {
    fn default() -> Self {
        Self {
            frontend_name: DEFAULT_FRONTEND.to_string(),
            backend_name: String::new(),
            compile_only: false,
            use_intermediate: false,
            extra_search_paths: Vec::new(),
            remaining_arguments: Vec::new(),
        }
    }
}

impl InitialOptions {
    pub fn extract<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut options = Self::default();
        let mut tokens = args.iter().map(|arg| arg.as_ref()).peekable();

        while let Some(arg) = tokens.next() {
            if arg == ESCAPE_TOKEN {
                // this and every later argument are exempt from processing
                options.remaining_arguments.push(arg.to_string());
                options
                    .remaining_arguments
                    .extend(tokens.by_ref().map(str::to_string));
                break;
            }

            let Some(name) = option_name(arg)? else {
                options.remaining_arguments.push(arg.to_string());
                continue;
            };

            let Some(switch) = EngineSwitch::from_name(name) else {
                options.remaining_arguments.push(arg.to_string());
                continue;
            };

            match switch {
                EngineSwitch::Intermediate => options.use_intermediate = true,
                EngineSwitch::CompileOnly => options.compile_only = true,
                EngineSwitch::Frontend => options.frontend_name = parameter(&mut tokens, arg)?,
                EngineSwitch::Backend => options.backend_name = parameter(&mut tokens, arg)?,
                EngineSwitch::SearchUrl => {
                    let path = parameter(&mut tokens, arg)?;
                    options.extra_search_paths.push(path);
                }
            }
        }

        Ok(options)
    }

    pub fn frontend_name(&self) -> &str {
        &self.frontend_name
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn compile_only(&self) -> bool {
        self.compile_only
    }

    pub fn use_intermediate(&self) -> bool {
        self.use_intermediate
    }

    pub fn extra_search_paths(&self) -> &[String] {
        &self.extra_search_paths
    }

    /// Unrecognized tokens, in order, for the full option parser
    pub fn remaining_arguments(&self) -> &[String] {
        &self.remaining_arguments
    }
}

/// Consume the parameter of a value-taking switch.
///
/// The parameter must exist and must not look like an option itself.
fn parameter<'a, I>(tokens: &mut Peekable<I>, option: &str) -> Result<String>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .next_if(|next| !next.starts_with('-'))
        .map(str::to_string)
        .ok_or_else(|| Error::MissingParameter {
            option: option.to_string(),
        })
}

/// Strip one or two leading dashes from an option token.
///
/// Returns `Ok(None)` for tokens that are not options at all.
fn option_name(arg: &str) -> Result<Option<&str>> {
    let Some(rest) = arg.strip_prefix('-') else {
        return Ok(None);
    };
    if rest.is_empty() {
        return Err(Error::invalid_argument(arg));
    }
    match rest.strip_prefix('-') {
        // "---" or similar is never allowed
        Some(long) if long.starts_with('-') => Err(Error::invalid_argument(arg)),
        Some(long) => Ok(Some(long)),
        None => Ok(Some(rest)),
    }
}
