//! Tracing subscriber setup for the `yamlsync` binary.
//!
//! Configure via the RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=yamlsync::sync=debug` - resolution and planning only
//!
//! Output goes to stderr so command results on stdout stay pipeable. The
//! library itself only emits events and never calls `init`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the global subscriber, defaulting to `warn` without RUST_LOG.
///
/// Calling it again is a no-op: the first subscriber stays installed and
/// nothing is printed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    // Only fails when a global subscriber is already set
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        init();
        init();
        assert!(tracing::dispatcher::has_been_set());
    }
}
