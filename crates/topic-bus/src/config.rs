//! Bus configuration from environment variables.

use std::env;

/// Runtime knobs for a [`TopicBus`](crate::TopicBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Catch subscriber panics and treat them as failures.
    ///
    /// When `false`, a panicking subscriber unwinds through `publish` and the
    /// subscribers after it are not notified. Only set it from code that owns
    /// every subscriber on the bus; [`BusConfig::from_env`] never clears it.
    pub catch_panics: bool,

    /// Upper bound on registrations per topic. `None` means unbounded.
    pub max_subscribers_per_topic: Option<usize>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            max_subscribers_per_topic: None,
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TOPIC_BUS_MAX_SUBSCRIBERS`: Per-topic registration limit (default: unbounded)
    ///
    /// Panic isolation stays on; see [`BusConfig::propagate_panics`].
    pub fn from_env() -> Self {
        Self::from_vars(env::var("TOPIC_BUS_MAX_SUBSCRIBERS").ok().as_deref())
    }

    fn from_vars(max_subscribers: Option<&str>) -> Self {
        Self {
            max_subscribers_per_topic: max_subscribers.and_then(|v| v.trim().parse().ok()),
            ..Self::default()
        }
    }

    /// Set the per-topic registration limit.
    #[must_use]
    pub fn with_max_subscribers(mut self, limit: usize) -> Self {
        self.max_subscribers_per_topic = Some(limit);
        self
    }

    /// Let subscriber panics propagate to the publisher.
    ///
    /// This gives up per-subscriber isolation: a panic aborts the rest of
    /// the notification pass, wildcard subscribers included.
    #[must_use]
    pub fn propagate_panics(mut self) -> Self {
        self.catch_panics = false;
        self
    }
}
