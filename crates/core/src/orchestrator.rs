//! Drives one engine invocation from validated arguments to a finished
//! frontend/backend workflow.
//!
//! Stages run strictly in order:
//! mode resolution → plugin loading → option registration → dispatch,
//! ending in [`Stage::Done`] or [`Stage::Failed`]. Nothing is retried.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::args::{ClassifiedArguments, InitialOptions};
use crate::error::{Error, Result};
use crate::mode::ExecutionMode;
use crate::options::{OptionSchema, ParseOutcome, ParsedOptions, Verbosity};
use crate::plugin::discovery::{self, PluginCatalog};
use crate::plugin::{Backend, Frontend, PluginRegistry};
use crate::schematic::{self, Schematic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ModeResolution,
    PluginLoading,
    OptionRegistration,
    Dispatch,
    Done,
    Failed,
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(ExecutionMode),
    /// Nothing to do; reported as a warning
    NoInputFiles,
    /// Help was requested; carries the rendered text
    Help(String),
}

/// Receives the verbosity once the command line has been parsed
pub trait LogControl {
    fn apply(&self, verbosity: Verbosity);
}

/// Leaves logging as it is
pub struct NoopLogControl;

impl LogControl for NoopLogControl {
    fn apply(&self, _verbosity: Verbosity) {}
}

/// The plugins a mode needs, looked up by name
enum Pipeline {
    Full {
        frontend: Arc<dyn Frontend>,
        backend: Arc<dyn Backend>,
    },
    FrontendOnly {
        frontend: Arc<dyn Frontend>,
    },
    BackendOnly {
        backend: Arc<dyn Backend>,
    },
}

impl Pipeline {
    fn frontend(&self) -> Option<&Arc<dyn Frontend>> {
        match self {
            Pipeline::Full { frontend, .. } | Pipeline::FrontendOnly { frontend } => Some(frontend),
            Pipeline::BackendOnly { .. } => None,
        }
    }

    fn backend(&self) -> Option<&Arc<dyn Backend>> {
        match self {
            Pipeline::Full { backend, .. } | Pipeline::BackendOnly { backend } => Some(backend),
            Pipeline::FrontendOnly { .. } => None,
        }
    }
}

pub struct Orchestrator {
    initial: InitialOptions,
    classified: ClassifiedArguments,
    catalog: Box<dyn PluginCatalog>,
    log_control: Box<dyn LogControl>,
    stage: Stage,
    verbosity: Verbosity,
}

impl Orchestrator {
    pub fn new(
        initial: InitialOptions,
        classified: ClassifiedArguments,
        catalog: Box<dyn PluginCatalog>,
    ) -> Self {
        Self {
            initial,
            classified,
            catalog,
            log_control: Box::new(NoopLogControl),
            stage: Stage::ModeResolution,
            verbosity: Verbosity::default(),
        }
    }

    pub fn with_log_control(mut self, log_control: Box<dyn LogControl>) -> Self {
        self.log_control = log_control;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Verbosity from the parsed command line; quiet until parsing succeeds
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn run(&mut self) -> Result<RunOutcome> {
        let result = self.drive();
        match &result {
            Ok(_) => self.stage = Stage::Done,
            Err(err) => {
                debug!("run failed during {:?}: {}", self.stage, err);
                self.stage = Stage::Failed;
            }
        }
        result
    }

    fn drive(&mut self) -> Result<RunOutcome> {
        self.stage = Stage::ModeResolution;
        let mode = ExecutionMode::from_options(&self.initial)?;
        info!("execution mode: {}", mode);
        self.check_plugin_options(mode);

        self.stage = Stage::PluginLoading;
        let pipeline = self.load_plugins(mode)?;

        self.stage = Stage::OptionRegistration;
        let options = match self.register_and_parse(&pipeline)? {
            ParseOutcome::Options(options) => options,
            ParseOutcome::Help(text) => return Ok(RunOutcome::Help(text)),
        };

        self.stage = Stage::Dispatch;
        self.dispatch(mode, pipeline, &options)
    }

    /// Options addressed to a plugin the mode never loads are ignored
    fn check_plugin_options(&self, mode: ExecutionMode) {
        debug!(
            "classified arguments: {} frontend, {} backend, {} engine option(s), {} file(s)",
            self.classified.frontend_options().len(),
            self.classified.backend_options().len(),
            self.classified.engine_options().len(),
            self.classified.file_arguments().len()
        );

        let mut ignored = Vec::new();
        if !mode.uses_frontend() {
            ignored.extend_from_slice(self.classified.frontend_options());
        }
        if !mode.uses_backend() {
            ignored.extend_from_slice(self.classified.backend_options());
        }
        if !ignored.is_empty() {
            warn!(
                "options {} have no effect in {} mode",
                ignored.join(", "),
                mode
            );
        }
    }

    fn load_plugins(&self, mode: ExecutionMode) -> Result<Pipeline> {
        let sources = discovery::expand_search_paths(self.initial.extra_search_paths())?;
        let registry = self.catalog.load(&sources)?;

        Ok(match mode {
            ExecutionMode::FrontendAndBackend => Pipeline::Full {
                frontend: self.lookup_frontend(&registry)?,
                backend: self.lookup_backend(&registry)?,
            },
            ExecutionMode::FrontendOnly => Pipeline::FrontendOnly {
                frontend: self.lookup_frontend(&registry)?,
            },
            ExecutionMode::BackendOnly => Pipeline::BackendOnly {
                backend: self.lookup_backend(&registry)?,
            },
        })
    }

    fn lookup_frontend(&self, registry: &PluginRegistry) -> Result<Arc<dyn Frontend>> {
        let name = self.initial.frontend_name();
        let frontend = registry.frontend(name)?;
        info!("loaded frontend '{}'", name);
        Ok(frontend)
    }

    fn lookup_backend(&self, registry: &PluginRegistry) -> Result<Arc<dyn Backend>> {
        // there is no default backend
        let name = self.initial.backend_name();
        if name.is_empty() {
            return Err(Error::BackendRequired);
        }
        let backend = registry.backend(name)?;
        info!("loaded backend '{}'", name);
        Ok(backend)
    }

    fn register_and_parse(&mut self, pipeline: &Pipeline) -> Result<ParseOutcome> {
        let mut schema = OptionSchema::new();
        if let Some(frontend) = pipeline.frontend() {
            frontend.register_options(&mut schema)?;
        }
        if let Some(backend) = pipeline.backend() {
            backend.register_options(&mut schema)?;
        }

        let outcome = schema.parse(self.initial.remaining_arguments())?;
        if let ParseOutcome::Options(options) = &outcome {
            self.verbosity = options.verbosity();
            self.log_control.apply(self.verbosity);
        }
        Ok(outcome)
    }

    fn dispatch(
        &self,
        mode: ExecutionMode,
        pipeline: Pipeline,
        options: &ParsedOptions,
    ) -> Result<RunOutcome> {
        let Some(primary) = options.primary_file() else {
            warn!("no input files specified");
            return Ok(RunOutcome::NoInputFiles);
        };

        match pipeline {
            Pipeline::BackendOnly { backend } => {
                if options.files().len() > 1 {
                    warn!(
                        "only the first input is read in intermediate mode; ignoring {}",
                        options.files()[1..].join(", ")
                    );
                }
                let schematic = read_schematic(Path::new(primary))?;
                info!("invoking backend '{}'", backend.name());
                backend.invoke(schematic, options)?;
            }
            Pipeline::FrontendOnly { frontend } => {
                let output = options.output_path().ok_or(Error::OutputPathRequired)?;
                info!("invoking frontend '{}'", frontend.name());
                let schematic = frontend.invoke(options)?;
                write_schematic(&output, &schematic)?;
                info!("wrote schematic to {}", output.display());
            }
            Pipeline::Full { frontend, backend } => {
                info!("invoking frontend '{}'", frontend.name());
                let schematic = frontend.invoke(options)?;
                info!("invoking backend '{}'", backend.name());
                backend.invoke(schematic, options)?;
            }
        }

        Ok(RunOutcome::Completed(mode))
    }
}

fn read_schematic(path: &Path) -> Result<Schematic> {
    let not_readable = |source| Error::FileNotReadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(not_readable)?;
    schematic::read_from(BufReader::new(file)).map_err(|e| match e {
        Error::Io(source) => not_readable(source),
        other => other,
    })
}

fn write_schematic(path: &Path, schematic: &Schematic) -> Result<()> {
    let not_writable = |source| Error::FileNotWritable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(not_writable)?;
    schematic::write_to(schematic, BufWriter::new(file)).map_err(|e| match e {
        Error::Io(source) => not_writable(source),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::sync::Mutex;

    struct Fixed;

    impl Frontend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn invoke(&self, options: &ParsedOptions) -> Result<Schematic> {
            Ok(Schematic::new("fixed").with_attribute("inputs", options.files().join(",")))
        }
    }

    #[derive(Default)]
    struct Recorder {
        received: Mutex<Vec<Schematic>>,
    }

    impl Backend for Arc<Recorder> {
        fn name(&self) -> &str {
            "recorder"
        }

        fn invoke(&self, schematic: Schematic, _options: &ParsedOptions) -> Result<()> {
            self.received.lock().unwrap().push(schematic);
            Ok(())
        }
    }

    struct TestCatalog {
        recorder: Arc<Recorder>,
    }

    impl PluginCatalog for TestCatalog {
        fn load(&self, _sources: &[PathBuf]) -> Result<PluginRegistry> {
            let mut registry = PluginRegistry::new();
            registry.register_frontend(Arc::new(Fixed));
            registry.register_backend(Arc::new(self.recorder.clone()));
            Ok(registry)
        }
    }

    struct Captured(Rc<Cell<Option<Verbosity>>>);

    impl LogControl for Captured {
        fn apply(&self, verbosity: Verbosity) {
            self.0.set(Some(verbosity));
        }
    }

    fn orchestrator(args: &[&str]) -> (Orchestrator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let orchestrator = Orchestrator::new(
            InitialOptions::extract(args).unwrap(),
            ClassifiedArguments::partition(args).unwrap(),
            Box::new(TestCatalog {
                recorder: recorder.clone(),
            }),
        );
        (orchestrator, recorder)
    }

    #[test]
    fn test_frontend_and_backend_hand_off() {
        let (mut engine, recorder) = orchestrator(&["-f", "fixed", "-b", "recorder", "a", "b"]);
        assert_eq!(engine.stage(), Stage::ModeResolution);

        let outcome = engine.run().unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed(ExecutionMode::FrontendAndBackend)
        );
        assert_eq!(engine.stage(), Stage::Done);

        let received = recorder.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].attributes["inputs"], "a,b");
    }

    #[test]
    fn test_conflicting_mode_fails_first() {
        let (mut engine, _) = orchestrator(&["-c", "-i", "-f", "missing"]);
        assert!(matches!(engine.run(), Err(Error::ConflictingMode)));
        assert_eq!(engine.stage(), Stage::Failed);
    }

    #[test]
    fn test_backend_required() {
        let (mut engine, _) = orchestrator(&["-f", "fixed", "x"]);
        assert!(matches!(engine.run(), Err(Error::BackendRequired)));

        let (mut engine, _) = orchestrator(&["-i", "x.json"]);
        assert!(matches!(engine.run(), Err(Error::BackendRequired)));
    }

    #[test]
    fn test_plugin_lookup_miss() {
        // the default frontend is not in the test catalog
        let (mut engine, _) = orchestrator(&["-b", "recorder", "x"]);
        match engine.run() {
            Err(Error::PluginNotFound { kind, name }) => {
                assert_eq!(kind, crate::plugin::PluginKind::Frontend);
                assert_eq!(name, "default");
            }
            other => panic!("expected PluginNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_no_input_files_is_not_an_error() {
        let (mut engine, recorder) = orchestrator(&["-f", "fixed", "-b", "recorder"]);
        assert_eq!(engine.run().unwrap(), RunOutcome::NoInputFiles);
        assert_eq!(engine.stage(), Stage::Done);
        assert!(recorder.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_option_fails_parsing() {
        let (mut engine, _) = orchestrator(&["-f", "fixed", "-b", "recorder", "--bogus", "x"]);
        assert!(matches!(engine.run(), Err(Error::OptionParseError(_))));
        assert_eq!(engine.stage(), Stage::Failed);
    }

    #[test]
    fn test_verbosity_is_applied_after_parsing() {
        let seen = Rc::new(Cell::new(None));
        let (engine, _) = orchestrator(&["-f", "fixed", "-b", "recorder", "-v"]);
        let mut engine = engine.with_log_control(Box::new(Captured(seen.clone())));
        assert_eq!(engine.verbosity(), Verbosity::Quiet);

        engine.run().unwrap();
        assert_eq!(seen.get(), Some(Verbosity::Verbose));
        assert_eq!(engine.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_help_stops_before_dispatch() {
        let (mut engine, recorder) = orchestrator(&["-f", "fixed", "-b", "recorder", "--help", "x"]);
        match engine.run().unwrap() {
            RunOutcome::Help(text) => assert!(text.contains("--output")),
            other => panic!("expected help, got {other:?}"),
        }
        assert!(recorder.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_compile_only_requires_output() {
        let (mut engine, _) = orchestrator(&["-c", "-f", "fixed", "x"]);
        assert!(matches!(engine.run(), Err(Error::OutputPathRequired)));
    }

    #[test]
    fn test_missing_search_path() {
        let (mut engine, _) = orchestrator(&["--search-url", "/no/such/manifold/dir", "x"]);
        assert!(matches!(engine.run(), Err(Error::PathNotFound { .. })));
    }
}
