//! Tracing setup.
//!
//! Installs a fmt subscriber with env-filter control (`RUST_LOG`) and
//! bridges the `log` macros used by the database layer into tracing.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber. Call once at startup; a second
/// call is a no-op (the error from the already-installed subscriber is
/// discarded).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_log::LogTracer::init();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));
    let _ = tracing::subscriber::set_global_default(subscriber);
}
