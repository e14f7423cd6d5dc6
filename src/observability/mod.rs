//! Tracing/logging setup (§A.2). Request-scoped spans record algorithm
//! label, pass label, and match grade; OTLP export is carried at the same
//! fidelity as resource attributes and an env-filtered subscriber, with the
//! exporter pipeline itself left a follow-up.

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::Result;

pub mod metrics;

pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let _resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    // TODO: wire an OTLP exporter once a collector endpoint is available in
    // every deployment target; today the resource above is unused.

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Ok(())
}

pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}
