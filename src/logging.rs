use std::sync::Once;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT_LOGGING: Once = Once::new();

/// Install the global `tracing` subscriber. Safe to call more than once.
///
/// The filter comes from `RUST_LOG`, then `ECOM_LOG_LEVEL`, then `info`.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| {
                EnvFilter::try_new(std::env::var("ECOM_LOG_LEVEL").unwrap_or_else(|_| "info".into()))
            })
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let stdout_layer = fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_timer(ChronoUtc::rfc_3339());

        // A subscriber may already be installed by an embedding application.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init();
    });
}
