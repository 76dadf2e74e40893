use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level chosen from the debug flags
fn default_level(debug: bool, ddebug: bool) -> Level {
    if ddebug {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Filter from `RUST_LOG` when it is set and parses; otherwise the level
/// picked by the debug flags. `RUST_LOG` replaces the flags, it is not merged.
fn build_filter(rust_log: Option<&str>, debug: bool, ddebug: bool) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(default_level(debug, ddebug).into()))
}

/// Install the global subscriber
pub fn init(debug: bool, ddebug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(rust_log.as_deref(), debug, ddebug))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
