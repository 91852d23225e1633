//! Log setup for the command-line tools.

use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Logs never go to stdout, which may carry CSV output. Calling this more
/// than once is harmless.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with an explicit fallback filter.
pub fn init_with_default(directive: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
