//! Tracing setup shared by the LiveClass binary and tests.

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate-name prefix shared by every LiveClass target.
const TARGET_PREFIX: &str = "liveclass";

/// Installs the subscriber with LiveClass targets at `INFO`.
///
/// ```
/// use liveclass_common::logging;
///
/// logging::init();
/// // Later calls are ignored once a subscriber is installed.
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Installs the subscriber with LiveClass targets at `level`.
///
/// `RUST_LOG` directives still apply to every other target. Does nothing when
/// a global subscriber already exists.
pub fn init_with_level(level: Level) {
    let directive = format!("{}={}", TARGET_PREFIX, level);
    let filter = match directive.parse() {
        Ok(parsed) => EnvFilter::from_default_env().add_directive(parsed),
        Err(err) => {
            eprintln!("ignoring log directive {:?}: {}", directive, err);
            EnvFilter::from_default_env()
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .try_init()
        .is_ok();

    if installed {
        info!(%level, "logging initialized");
    }
}

/// Logs `success_message` or `error_context: err` and hands `result` back.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    if let Err(e) = &result {
        error!("{}: {}", error_context, e);
    } else {
        info!("{}", success_message);
    }
    result
}
