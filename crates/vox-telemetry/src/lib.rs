//! Telemetry for Vox
//!
//! Structured logging via the `tracing` ecosystem.

/// Initialize the global tracing subscriber
///
/// `log_filter` is the default directive, overridable at runtime through
/// `RUST_LOG`.
pub fn init(log_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
