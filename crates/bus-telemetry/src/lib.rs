//! # Bus Telemetry
//!
//! Observability for processes that host a topic bus.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON
//! - **Metrics**: Prometheus dispatch counters fed by the bus observer hook
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bus_telemetry::{init_telemetry, TelemetryConfig};
//! use topic_bus::TopicBus;
//!
//! let telemetry = init_telemetry(TelemetryConfig::from_env())?;
//! let bus = TopicBus::new().with_observer(telemetry.metrics());
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `topic-bus` | Service name, also the metrics namespace |
//! | `RUST_LOG` | unset | Filter directives; override the configured level when valid |
//! | `TOPIC_BUS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `TOPIC_BUS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TOPIC_BUS_JSON_LOGS` | `false` | JSON log lines (default `true` in containers) |

mod config;
mod logging;
mod metrics;

use std::sync::Arc;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{BusMetrics, OTHER_TOPIC_LABEL};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and create dispatch metrics.
///
/// The returned handle must be kept for as long as the metrics are needed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<Telemetry, TelemetryError> {
    let metrics = Arc::new(BusMetrics::new(&config.metrics_namespace())?);

    init_logging(&config)?;

    Ok(Telemetry { config, metrics })
}

/// Handle to initialized telemetry.
pub struct Telemetry {
    config: TelemetryConfig,
    metrics: Arc<BusMetrics>,
}

impl Telemetry {
    /// The configuration telemetry was initialized with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Shared dispatch metrics, ready to attach as a bus observer.
    pub fn metrics(&self) -> Arc<BusMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry...");
    }
}
