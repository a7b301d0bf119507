//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines and used as the metrics namespace
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error), or any `EnvFilter` directive
    pub log_level: String,

    /// Whether to write log lines to stdout
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "topic-bus".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: topic-bus)
    /// - `TOPIC_BUS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TOPIC_BUS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TOPIC_BUS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "topic-bus".to_string()),

            log_level: env::var("TOPIC_BUS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("TOPIC_BUS_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("TOPIC_BUS_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),
        }
    }

    /// Metric-safe form of the service name (`[a-zA-Z_][a-zA-Z0-9_]*`).
    ///
    /// An empty name falls back to `topic_bus`; a leading digit gets a `_`
    /// prefix.
    pub fn metrics_namespace(&self) -> String {
        let sanitized: String = self
            .service_name
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        match sanitized.chars().next() {
            None => "topic_bus".to_string(),
            Some(first) if first.is_ascii_digit() => format!("_{sanitized}"),
            Some(_) => sanitized,
        }
    }
}

/// `"1"`/`"true"` and `"0"`/`"false"` in any case; anything else is `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => true,
        "0" | "false" => false,
        _ => default,
    }
}
