//! # Topic Bus
//!
//! Defines the publishing side of the bus and the subscription registry.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::BusConfig;
use crate::observer::{Delivery, DispatchObserver};
use crate::subscriber::{Subscriber, SubscriberError, Subscription};
use crate::topics::WILDCARD;

/// Errors from registration operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Topics must be non-empty.
    #[error("Topic is empty")]
    EmptyTopic,

    /// The topic already holds the configured number of registrations.
    #[error("Topic {topic} already has {limit} subscribers")]
    TopicFull { topic: String, limit: usize },
}

/// Trait for publishing to the bus.
///
/// This is the interface publishers depend on, so they can be handed any
/// bus implementation.
pub trait TopicPublisher<A = Value>: Send + Sync {
    /// Publish `args` to every subscriber of `topic`, then to every
    /// subscriber of [`WILDCARD`].
    ///
    /// An empty topic is ignored.
    ///
    /// # Returns
    ///
    /// How many subscribers ran and how many of them failed.
    fn publish(&self, topic: &str, args: &[A]) -> Delivery;

    /// Get the total number of non-empty publish calls.
    fn events_published(&self) -> u64;
}

/// In-memory topic bus.
///
/// Subscribers run synchronously on the publishing thread. The registry
/// lock is never held while a subscriber runs, so subscribers may publish,
/// subscribe or unsubscribe on the same bus.
pub struct TopicBus<A = Value> {
    /// Topic -> subscribers in registration order.
    registry: RwLock<HashMap<String, Vec<Subscriber<A>>>>,

    /// Runtime configuration.
    config: BusConfig,

    /// Optional hook notified after each publish.
    observer: Option<Arc<dyn DispatchObserver>>,

    /// Total non-empty publish calls.
    events_published: AtomicU64,
}

impl TopicBus<Value> {
    /// Create a bus carrying JSON values with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }
}

impl<A> TopicBus<A> {
    /// Create a bus with the given configuration.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            config,
            observer: None,
            events_published: AtomicU64::new(0),
        }
    }

    /// Attach a dispatch observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Register `subscriber` under `topic`.
    ///
    /// Ignored when the topic is empty or already full. Registering the same
    /// subscriber twice makes it run twice per publish.
    pub fn subscribe(&self, topic: &str, subscriber: &Subscriber<A>) {
        match self.try_subscribe(topic, subscriber) {
            Ok(()) => {}
            Err(BusError::EmptyTopic) => {
                debug!("Ignoring subscription with empty topic");
            }
            Err(e @ BusError::TopicFull { .. }) => {
                warn!(topic = %topic, error = %e, "Subscription dropped");
            }
        }
    }

    /// Register `subscriber` under `topic`, reporting why it was refused.
    pub fn try_subscribe(&self, topic: &str, subscriber: &Subscriber<A>) -> Result<(), BusError> {
        if topic.is_empty() {
            return Err(BusError::EmptyTopic);
        }

        let mut registry = self.registry.write();

        if let Some(limit) = self.config.max_subscribers_per_topic {
            let current = registry.get(topic).map_or(0, Vec::len);
            if current >= limit {
                return Err(BusError::TopicFull {
                    topic: topic.to_string(),
                    limit,
                });
            }
        }

        let subscribers = registry.entry(topic.to_string()).or_default();
        subscribers.push(subscriber.clone());

        debug!(
            topic = %topic,
            registrations = subscribers.len(),
            "New subscription created"
        );
        Ok(())
    }

    /// Register `subscriber` under `topic` for as long as the returned
    /// [`Subscription`] is alive.
    ///
    /// Returns `None` when the registration was refused.
    pub fn subscribe_scoped(
        self: &Arc<Self>,
        topic: &str,
        subscriber: Subscriber<A>,
    ) -> Option<Subscription<A>> {
        self.try_subscribe(topic, &subscriber).ok()?;
        Some(Subscription::new(
            Arc::downgrade(self),
            topic.to_string(),
            subscriber,
        ))
    }

    /// Remove registrations.
    ///
    /// - topic and subscriber: every registration of that subscriber under
    ///   that topic.
    /// - topic only: every subscriber of that topic.
    /// - no topic (or an empty one): everything, whatever `subscriber` is.
    ///
    /// # Returns
    ///
    /// The number of registrations removed.
    pub fn unsubscribe(&self, topic: Option<&str>, subscriber: Option<&Subscriber<A>>) -> usize {
        let mut registry = self.registry.write();

        let removed = match (topic.filter(|t| !t.is_empty()), subscriber) {
            (Some(topic), Some(subscriber)) => {
                let Some(subscribers) = registry.get_mut(topic) else {
                    return 0;
                };
                let before = subscribers.len();
                subscribers.retain(|s| !s.same(subscriber));
                let removed = before - subscribers.len();
                if subscribers.is_empty() {
                    registry.remove(topic);
                }
                removed
            }
            (Some(topic), None) => registry.remove(topic).map_or(0, |s| s.len()),
            (None, _) => {
                let removed = registry.values().map(Vec::len).sum();
                registry.clear();
                removed
            }
        };

        debug!(topic = ?topic, removed, "Unsubscribed");
        removed
    }

    /// Remove every registration of every topic.
    pub fn clear(&self) -> usize {
        self.unsubscribe(None, None)
    }

    /// Number of registrations under exactly `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.read().get(topic).map_or(0, Vec::len)
    }

    /// Number of topics with at least one registration, wildcard included.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Topics with at least one registration, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.registry.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Get the bus configuration.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Copy out the subscribers for `topic`, then those of the wildcard.
    ///
    /// Publishing the wildcard itself lists its subscribers twice.
    fn snapshot(&self, topic: &str) -> Vec<Subscriber<A>> {
        let registry = self.registry.read();
        let direct = registry.get(topic).into_iter().flatten();
        let wildcard = registry.get(WILDCARD).into_iter().flatten();
        direct.chain(wildcard).cloned().collect()
    }

    fn invoke(&self, subscriber: &Subscriber<A>, args: &[A]) -> Result<(), SubscriberError> {
        if !self.config.catch_panics {
            return subscriber.call(args);
        }
        panic::catch_unwind(AssertUnwindSafe(|| subscriber.call(args)))
            .unwrap_or_else(|payload| Err(SubscriberError::from_panic(payload)))
    }
}

impl Default for TopicBus<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TopicPublisher<A> for TopicBus<A> {
    fn publish(&self, topic: &str, args: &[A]) -> Delivery {
        if topic.is_empty() {
            debug!("Ignoring publish with empty topic");
            return Delivery::default();
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);

        let subscribers = self.snapshot(topic);
        let mut delivery = Delivery::default();

        for subscriber in &subscribers {
            match self.invoke(subscriber, args) {
                Ok(()) => delivery.notified += 1,
                Err(e) => {
                    delivery.failed += 1;
                    match &e {
                        SubscriberError::Panicked(_) => {
                            error!(topic = %topic, error = %e, "Subscriber panicked");
                        }
                        SubscriberError::Failed(_) => {
                            warn!(topic = %topic, error = %e, "Subscriber failed");
                        }
                    }
                    if let Some(observer) = &self.observer {
                        observer.on_subscriber_failure(topic, &e);
                    }
                }
            }
        }

        debug!(
            topic = %topic,
            args = args.len(),
            notified = delivery.notified,
            failed = delivery.failed,
            "Topic published"
        );

        if let Some(observer) = &self.observer {
            observer.on_publish(topic, &delivery);
        }
        delivery
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
