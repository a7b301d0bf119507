//! # Dispatch Observer
//!
//! Hook for watching what the bus does without subscribing to topics.
//! Observers see the topic name, which wildcard subscribers do not.

use serde::{Deserialize, Serialize};

use crate::subscriber::SubscriberError;

/// Outcome of a single publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Subscribers that ran to completion.
    pub notified: usize,
    /// Subscribers that returned an error or panicked.
    pub failed: usize,
}

impl Delivery {
    /// Total subscribers invoked, successful or not.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.notified + self.failed
    }

    /// Whether no subscriber was invoked at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invoked() == 0
    }
}

/// Receives a callback after every publish and on every subscriber failure.
///
/// Observers run on the publishing thread, after the subscribers.
pub trait DispatchObserver: Send + Sync {
    /// Called once per non-empty publish, after all subscribers ran.
    fn on_publish(&self, topic: &str, delivery: &Delivery);

    /// Called for each subscriber that failed during a publish of `topic`.
    fn on_subscriber_failure(&self, topic: &str, error: &SubscriberError) {
        let _ = (topic, error);
    }
}
