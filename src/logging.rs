use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for the `argbind` binary.
///
/// The filter comes from `RUST_LOG`, falling back to `default_level`
/// (normally `logging.level` from the config). Events go to stderr so
/// token output on stdout stays clean; set `ARGBIND_LOG` to a file path to
/// write them there instead.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = std::env::var("ARGBIND_LOG")
        .ok()
        .and_then(|path| match std::fs::File::create(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Warning: Failed to create log file {}: {}", path, e);
                None
            }
        });

    let registry = tracing_subscriber::registry().with(filter);
    match file {
        Some(file) => registry
            .with(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true),
            )
            .init(),
        None => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339()),
            )
            .init(),
    }
}
