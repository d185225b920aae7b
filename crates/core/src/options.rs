//! Shared option schema.
//!
//! The engine declares its own switches, every loaded plugin adds its
//! options, and the combined schema parses whatever the initial pass left
//! over into a [`ParsedOptions`] value.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};

use crate::args::ESCAPE_TOKEN;
use crate::error::{Error, Result};

pub const PROGRAM_NAME: &str = "manifold";

pub const VERBOSE: &str = "verbose";
pub const OUTPUT: &str = "output";

/// Owner recorded for options declared by the engine itself
pub const ENGINE_OWNER: &str = "engine";

const INPUT_FILES: &str = "input-files";
const HELP: &str = "help";

/// Printed after the option list; mirrors the `manifold` binary's exit codes
const EXIT_STATUS_HELP: &str = "Exit status: 0 on success, 1 on a malformed command line or an \
unexpected failure, 2 when the engine reported an error and stopped";

/// How chatty the run should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    #[default]
    Quiet,
    /// Informational and debug messages as well
    Verbose,
}

impl Verbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Verbose => "verbose",
        }
    }
}

/// One declared command-line option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    long: String,
    short: Option<char>,
    value_name: Option<String>,
    help: String,
}

impl OptionSpec {
    /// A boolean switch
    pub fn flag(long: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            value_name: None,
            help: String::new(),
        }
    }

    /// An option that consumes the following token
    pub fn value(long: impl Into<String>, value_name: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            value_name: Some(value_name.into()),
            help: String::new(),
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn long_name(&self) -> &str {
        &self.long
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn takes_value(&self) -> bool {
        self.value_name.is_some()
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.long.clone())
            .long(self.long.clone())
            .help(self.help.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        match &self.value_name {
            Some(value_name) => arg
                .value_name(value_name.clone())
                .num_args(1)
                .action(ArgAction::Append),
            // repeating a switch is not an error
            None => arg.action(ArgAction::Count),
        }
    }
}

/// Result of running the schema over an argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Options(ParsedOptions),
    /// `-h`/`--help` was given; carries the rendered help text
    Help(String),
}

#[derive(Debug, Clone)]
pub struct OptionSchema {
    declared: Vec<(OptionSpec, String)>,
}

impl Default for OptionSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionSchema {
    /// A schema holding only the engine-level switches
    pub fn new() -> Self {
        let mut schema = Self {
            declared: Vec::new(),
        };
        schema.declared.push((
            OptionSpec::flag(VERBOSE)
                .short('v')
                .help("Display informational messages in addition to warnings and errors"),
            ENGINE_OWNER.to_string(),
        ));
        schema.declared.push((
            OptionSpec::value(OUTPUT, "PATH")
                .short('o')
                .help("Where to write the schematic in compile-only mode"),
            ENGINE_OWNER.to_string(),
        ));
        schema
    }

    /// Add an option on behalf of `owner`.
    ///
    /// Long and short names must be unique across the whole schema.
    pub fn declare(&mut self, owner: &str, spec: OptionSpec) -> Result<()> {
        let long_taken = spec.long == INPUT_FILES
            || spec.long == HELP
            || self.declared.iter().any(|(d, _)| d.long == spec.long);
        let short_taken = spec.short.is_some_and(|short| {
            short == 'h' || self.declared.iter().any(|(d, _)| d.short == Some(short))
        });
        if long_taken || short_taken {
            let option = if long_taken {
                format!("--{}", spec.long)
            } else {
                format!("-{}", spec.short.unwrap_or_default())
            };
            return Err(Error::DuplicateOption {
                option,
                owner: owner.to_string(),
            });
        }

        tracing::debug!("{} declares option --{}", owner, spec.long);
        self.declared.push((spec, owner.to_string()));
        Ok(())
    }

    pub fn specs(&self) -> impl Iterator<Item = &OptionSpec> {
        self.declared.iter().map(|(spec, _)| spec)
    }

    /// Who declared the option with this long name
    pub fn owner_of(&self, long: &str) -> Option<&str> {
        self.declared
            .iter()
            .find(|(spec, _)| spec.long == long)
            .map(|(_, owner)| owner.as_str())
    }

    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<ParseOutcome> {
        let matches = match self
            .command()
            .try_get_matches_from(self.normalize(args))
        {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Ok(ParseOutcome::Help(err.render().to_string()));
            }
            Err(err) => return Err(Error::OptionParseError(summarize(&err))),
        };

        let mut parsed = ParsedOptions::default();
        for spec in self.specs() {
            if spec.takes_value() {
                if let Some(values) = matches.get_many::<String>(&spec.long) {
                    parsed
                        .values
                        .insert(spec.long.clone(), values.cloned().collect());
                }
            } else if matches.get_count(&spec.long) > 0 {
                parsed.flags.insert(spec.long.clone());
            }
        }
        parsed.files = matches
            .get_many::<String>(INPUT_FILES)
            .map(|files| files.cloned().collect())
            .unwrap_or_default();

        Ok(ParseOutcome::Options(parsed))
    }

    /// Rewrite declared options given with one or two dashes into the
    /// `--long` / `-s` forms clap expects. Unknown tokens, option values and
    /// everything from `--` on pass through untouched.
    fn normalize<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut normalized = Vec::with_capacity(args.len());
        let mut tokens = args.iter().map(|arg| arg.as_ref());
        let mut expects_value = false;

        while let Some(arg) = tokens.next() {
            if arg == ESCAPE_TOKEN {
                normalized.push(arg.to_string());
                normalized.extend(tokens.by_ref().map(str::to_string));
                break;
            }
            if expects_value || !arg.starts_with('-') {
                expects_value = false;
                normalized.push(arg.to_string());
                continue;
            }

            let (name, inline_value) = match arg.trim_start_matches('-').split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (arg.trim_start_matches('-'), None),
            };
            let Some((rewritten, takes_value)) = self.canonical(name) else {
                normalized.push(arg.to_string());
                continue;
            };
            match inline_value {
                Some(value) => normalized.push(format!("{rewritten}={value}")),
                None => {
                    expects_value = takes_value;
                    normalized.push(rewritten);
                }
            }
        }
        normalized
    }

    /// Canonical spelling of a declared option name, and whether it takes a value
    fn canonical(&self, name: &str) -> Option<(String, bool)> {
        if name == HELP {
            return Some((format!("--{HELP}"), false));
        }
        if let Some(spec) = self.specs().find(|spec| spec.long == name) {
            return Some((format!("--{}", spec.long), spec.takes_value()));
        }
        let mut chars = name.chars();
        let short = match (chars.next(), chars.next()) {
            (Some(short), None) => short,
            _ => return None,
        };
        if short == 'h' {
            return Some(("-h".to_string(), false));
        }
        self.specs()
            .find(|spec| spec.short == Some(short))
            .map(|spec| (format!("-{short}"), spec.takes_value()))
    }

    fn command(&self) -> Command {
        let files = Arg::new(INPUT_FILES)
            .value_name("FILE")
            .help("Input files")
            .num_args(0..)
            .action(ArgAction::Append);

        self.specs().fold(
            Command::new(PROGRAM_NAME)
                .no_binary_name(true)
                .disable_version_flag(true)
                .after_help(EXIT_STATUS_HELP)
                .arg(files),
            |command, spec| command.arg(spec.to_arg()),
        )
    }
}

/// First line of a clap error, without its `error:` prefix
fn summarize(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error:").trim().to_string()
}

/// Concrete option values and positional files of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    flags: BTreeSet<String>,
    values: BTreeMap<String, Vec<String>>,
    files: Vec<String>,
}

impl ParsedOptions {
    pub fn has_flag(&self, long: &str) -> bool {
        self.flags.contains(long)
    }

    /// First value given for a value-taking option
    pub fn value(&self, long: &str) -> Option<&str> {
        self.values
            .get(long)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value given for a value-taking option, in order
    pub fn values(&self, long: &str) -> &[String] {
        self.values.get(long).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn primary_file(&self) -> Option<&str> {
        self.files.first().map(String::as_str)
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.has_flag(VERBOSE) {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.value(OUTPUT).map(PathBuf::from)
    }
}
