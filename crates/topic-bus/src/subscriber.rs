//! # Subscribers
//!
//! Defines the subscription side of the topic bus.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::bus::TopicBus;

/// Errors a subscriber reports back to the bus while handling a publish.
///
/// The bus never propagates these to the publisher; they are logged and
/// handed to the dispatch observer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriberError {
    /// The callback returned an error.
    #[error("Subscriber failed: {0}")]
    Failed(String),

    /// The callback panicked.
    #[error("Subscriber panicked: {0}")]
    Panicked(String),
}

impl SubscriberError {
    /// Create a failure from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap an arbitrary error as a failure.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        Self::Failed(error.to_string())
    }

    /// Build a [`SubscriberError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// Short label for the failure kind (`"error"` or `"panic"`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Failed(_) => "error",
            Self::Panicked(_) => "panic",
        }
    }
}

type Callback<A> = dyn Fn(&[A]) -> Result<(), SubscriberError> + Send + Sync;

/// A callback registered against a topic.
///
/// Clones share identity: unsubscribing with any clone removes the
/// registrations made with the others. Two handles built separately are
/// different subscribers even if they wrap the same function.
pub struct Subscriber<A = Value> {
    callback: Arc<Callback<A>>,
}

impl<A> Subscriber<A> {
    /// Create a subscriber from a fallible callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[A]) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Create a subscriber from a callback that cannot fail.
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(&[A]) + Send + Sync + 'static,
    {
        Self::new(move |args| {
            callback(args);
            Ok(())
        })
    }

    /// Whether `self` and `other` are the same subscriber.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.callback).cast::<()>(),
            Arc::as_ptr(&other.callback).cast::<()>(),
        )
    }

    /// Invoke the callback.
    pub(crate) fn call(&self, args: &[A]) -> Result<(), SubscriberError> {
        (self.callback)(args)
    }
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// A scoped registration.
///
/// When dropped, the (topic, subscriber) pairing is removed from the bus.
/// If the bus is already gone, dropping does nothing.
pub struct Subscription<A = Value> {
    /// The bus this registration lives on.
    bus: Weak<TopicBus<A>>,

    /// Topic the subscriber was registered under.
    topic: String,

    /// The registered subscriber.
    subscriber: Subscriber<A>,
}

impl<A> Subscription<A> {
    pub(crate) fn new(bus: Weak<TopicBus<A>>, topic: String, subscriber: Subscriber<A>) -> Self {
        Self {
            bus,
            topic,
            subscriber,
        }
    }

    /// Topic this subscription is registered under.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The registered subscriber.
    #[must_use]
    pub fn subscriber(&self) -> &Subscriber<A> {
        &self.subscriber
    }
}

impl<A> Drop for Subscription<A> {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let removed = bus.unsubscribe(Some(&self.topic), Some(&self.subscriber));
        debug!(topic = %self.topic, removed, "Subscription dropped");
    }
}

impl<A> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("subscriber", &self.subscriber)
            .finish()
    }
}
