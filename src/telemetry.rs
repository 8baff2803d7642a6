use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a JSON-formatted tracing subscriber.
///
/// The core itself never calls this — it only emits events — but a binary
/// or integration test embedding the core can call it once at startup,
/// mirroring the teacher's `telemetry::init_tracing`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,good_lp=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
