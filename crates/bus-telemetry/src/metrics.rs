//! Prometheus metrics for the topic bus.
//!
//! All metrics follow the naming convention: `<namespace>_<metric>_<unit>`
//!
//! - `<ns>_publishes_total{topic}`: non-empty publish calls. Topics outside
//!   the predefined set are folded into `topic="other"` to bound cardinality.
//! - `<ns>_notifications_total`: subscribers that ran to completion.
//! - `<ns>_subscriber_failures_total{kind}`: failed subscribers, `kind` is
//!   `error` or `panic`.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use topic_bus::{topics, Delivery, DispatchObserver, SubscriberError};

use crate::TelemetryError;

/// Label used for application-defined topics.
pub const OTHER_TOPIC_LABEL: &str = "other";

/// Dispatch counters, registered into a Prometheus registry.
///
/// Attach to a bus with [`topic_bus::TopicBus::with_observer`].
pub struct BusMetrics {
    publishes: IntCounterVec,
    notifications: IntCounter,
    failures: IntCounterVec,
    registry: Registry,
}

impl BusMetrics {
    /// Create metrics in a fresh registry.
    pub fn new(namespace: &str) -> Result<Self, TelemetryError> {
        Self::register(Registry::new(), namespace)
    }

    /// Create metrics and register them into `registry`.
    ///
    /// Fails if metrics with the same names are already registered there.
    pub fn register(registry: Registry, namespace: &str) -> Result<Self, TelemetryError> {
        let publishes = IntCounterVec::new(
            Opts::new("publishes_total", "Publish calls by topic").namespace(namespace),
            &["topic"],
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        let notifications = IntCounter::with_opts(
            Opts::new(
                "notifications_total",
                "Subscribers that completed without error",
            )
            .namespace(namespace),
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        let failures = IntCounterVec::new(
            Opts::new(
                "subscriber_failures_total",
                "Subscribers that failed, by failure kind",
            )
            .namespace(namespace),
            &["kind"],
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(publishes.clone()),
            Box::new(notifications.clone()),
            Box::new(failures.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        }

        Ok(Self {
            publishes,
            notifications,
            failures,
            registry,
        })
    }

    /// The registry these metrics live in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Publish count recorded for `topic` (after label folding).
    pub fn publishes(&self, topic: &str) -> u64 {
        self.publishes.with_label_values(&[topic_label(topic)]).get()
    }

    /// Total successful subscriber invocations.
    pub fn notifications(&self) -> u64 {
        self.notifications.get()
    }

    /// Failure count for `kind` (`"error"` or `"panic"`).
    pub fn failures(&self, kind: &str) -> u64 {
        self.failures.with_label_values(&[kind]).get()
    }

    /// Encode the registry in Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

impl DispatchObserver for BusMetrics {
    fn on_publish(&self, topic: &str, delivery: &Delivery) {
        self.publishes.with_label_values(&[topic_label(topic)]).inc();
        self.notifications.inc_by(delivery.notified as u64);
    }

    fn on_subscriber_failure(&self, _topic: &str, error: &SubscriberError) {
        self.failures.with_label_values(&[error.kind()]).inc();
    }
}

fn topic_label(topic: &str) -> &str {
    if topics::is_predefined(topic) || topics::is_wildcard(topic) {
        topic
    } else {
        OTHER_TOPIC_LABEL
    }
}
