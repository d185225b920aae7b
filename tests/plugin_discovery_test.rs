//! Plugin discovery: search paths, the configured plugin path and injected catalogs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use manifold_harness::*;

fn engine(args: &[String], catalog: Box<dyn PluginCatalog>) -> Orchestrator {
    Orchestrator::new(
        InitialOptions::extract(args).unwrap(),
        ClassifiedArguments::partition(args).unwrap(),
        catalog,
    )
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_manifest_with_unknown_key_is_rejected() {
    let bench = Workbench::new().unwrap();
    let manifest = bench
        .write_source(
            "plugins/odd.plugin.toml",
            "kind = \"backend\"\nname = \"odd\"\ncommand = \"true\"\nversion = 2\n",
        )
        .unwrap();

    let run = args(&[
        "-b",
        "odd",
        "--search-url",
        manifest.to_str().unwrap(),
        "x",
    ]);
    let err = engine(&run, Box::new(ManifestCatalog::new(EngineConfig::default())))
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidManifest { .. }));
}

#[test]
fn test_plugin_path_is_searched_before_search_urls() {
    let bench = Workbench::new().unwrap();
    bench
        .write_manifest(
            "configured",
            &ManifestBuilder::new(PluginKind::Backend, "emit", "true").arg("configured"),
        )
        .unwrap();
    bench
        .write_manifest(
            "extra",
            &ManifestBuilder::new(PluginKind::Backend, "emit", "false"),
        )
        .unwrap();
    let config = EngineConfig::default().with_plugin_path(bench.path().join("configured"));

    let registry = ManifestCatalog::new(config)
        .load(&plugin::discovery::expand_search_paths(&[bench.arg("extra")]).unwrap())
        .unwrap();
    assert_eq!(
        registry.backend_names().collect::<Vec<_>>(),
        ["emit", "json"]
    );
}

#[cfg(unix)]
#[test]
fn test_external_plugins_from_search_url() {
    let bench = Workbench::new().unwrap();
    // `cat` echoes an existing schematic, so it acts as a pass-through frontend
    bench
        .write_manifest(
            "plugins",
            &ManifestBuilder::new(PluginKind::Frontend, "passthrough", "cat"),
        )
        .unwrap();
    bench
        .write_manifest(
            "plugins",
            &ManifestBuilder::new(PluginKind::Backend, "sink", "sh")
                .arg("-c")
                .arg("cat > \"$0\"")
                .arg(&bench.arg("sink.json")),
        )
        .unwrap();
    let schematic = Schematic::new("counter").with_attribute("width", "8");
    bench.write_schematic("counter.json", &schematic).unwrap();

    let run = args(&[
        "-f",
        "passthrough",
        "-b",
        "sink",
        "--search-url",
        &bench.arg("plugins"),
        &bench.arg("counter.json"),
    ]);
    let outcome = engine(&run, Box::new(ManifestCatalog::new(EngineConfig::default())))
        .run()
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed(ExecutionMode::FrontendAndBackend)
    );
    assert_eq!(bench.read_schematic("sink.json").unwrap(), schematic);
}

#[cfg(unix)]
#[test]
fn test_external_plugin_options_are_declared() {
    let bench = Workbench::new().unwrap();
    bench
        .write_manifest(
            "plugins",
            &ManifestBuilder::new(PluginKind::Backend, "verilog", "true")
                .option("bverilog-top", true),
        )
        .unwrap();

    let run = args(&[
        "-i",
        "-b",
        "verilog",
        "--search-url",
        &bench.arg("plugins"),
        "--help",
    ]);
    match engine(&run, Box::new(ManifestCatalog::new(EngineConfig::default())))
        .run()
        .unwrap()
    {
        RunOutcome::Help(text) => assert!(text.contains("--bverilog-top")),
        other => panic!("expected help, got {other:?}"),
    }
}

/// Serves plugins defined in the test instead of manifests
struct InMemoryCatalog {
    seen: Arc<Mutex<Vec<PathBuf>>>,
}

struct Constant;

impl Frontend for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn invoke(&self, options: &ParsedOptions) -> Result<Schematic> {
        Ok(Schematic::new("constant").with_attribute("inputs", options.files().len().to_string()))
    }
}

struct Discard;

impl Backend for Discard {
    fn name(&self) -> &str {
        "discard"
    }

    fn register_options(&self, schema: &mut OptionSchema) -> Result<()> {
        schema.declare(
            &PluginKind::Backend.owner("discard"),
            OptionSpec::flag("bdiscard-quietly"),
        )
    }

    fn invoke(&self, _schematic: Schematic, options: &ParsedOptions) -> Result<()> {
        assert!(options.has_flag("bdiscard-quietly"));
        Ok(())
    }
}

impl PluginCatalog for InMemoryCatalog {
    fn load(&self, sources: &[PathBuf]) -> Result<PluginRegistry> {
        self.seen.lock().unwrap().extend_from_slice(sources);
        let mut registry = PluginRegistry::new();
        registry.register_frontend(Arc::new(Constant));
        registry.register_backend(Arc::new(Discard));
        Ok(registry)
    }
}

#[test]
fn test_injected_catalog_receives_expanded_sources() {
    let bench = Workbench::new().unwrap();
    let manifest = bench
        .write_manifest(
            "plugins",
            &ManifestBuilder::new(PluginKind::Backend, "unused", "true"),
        )
        .unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let run = args(&[
        "-f",
        "constant",
        "-b",
        "discard",
        "--bdiscard-quietly",
        "--search-url",
        &bench.arg("plugins"),
        "a.src",
    ]);
    let catalog = InMemoryCatalog { seen: seen.clone() };
    assert_eq!(
        engine(&run, Box::new(catalog)).run().unwrap(),
        RunOutcome::Completed(ExecutionMode::FrontendAndBackend)
    );
    assert_eq!(*seen.lock().unwrap(), vec![manifest]);
}
