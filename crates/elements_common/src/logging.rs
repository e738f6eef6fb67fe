//! Tracing setup and small logging helpers.
//!
//! Library crates only emit events through `tracing` macros. The binary
//! installs the subscriber once via [`init`].

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the subscriber with `info` as the default level.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Installs the subscriber. `RUST_LOG` overrides `level` when set.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .is_ok();

    // a second call (tests, embedding) keeps the first subscriber
    if installed {
        info!("Logging ready (default level {})", level);
    }
}

/// Logs `error` at ERROR, prefixed with `context`.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Logs the outcome of `result` and hands it back unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => log_error(e, error_context),
    }
    result
}
