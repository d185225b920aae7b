use manifold_engine_core::{LogControl, Verbosity};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Threshold used when `RUST_LOG` is unset and `--verbose` was not given
pub const QUIET_FILTER: &str = "warn";

/// Threshold for `--verbose`
pub const VERBOSE_FILTER: &str = "trace";

pub fn filter_for(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => QUIET_FILTER,
        Verbosity::Verbose => VERBOSE_FILTER,
    }
}

/// Handle onto the installed subscriber's filter
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogControl for LogHandle {
    fn apply(&self, verbosity: Verbosity) {
        // quiet keeps whatever RUST_LOG (or the default) selected
        if verbosity == Verbosity::Quiet {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(filter_for(verbosity))) {
            eprintln!("Warning: failed to raise log level: {}", e);
        }
    }
}

/// Install the stderr subscriber.
///
/// Starts from `RUST_LOG` when set, otherwise warnings and above.
pub fn init() -> LogHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(QUIET_FILTER));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    LogHandle { handle }
}
