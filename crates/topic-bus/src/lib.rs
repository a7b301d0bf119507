//! # Topic Bus - Synchronous Publish/Subscribe
//!
//! An in-memory registry of subscribers keyed by topic name. Publishing a
//! topic runs every subscriber of that topic, then every subscriber of the
//! wildcard topic `"*"`, on the calling thread, before `publish` returns.
//!
//! ```text
//!  publish("order-placed", [42])
//!          │
//!          ▼
//!  ┌──────────────┐   "order-placed"   ┌──────────────┐
//!  │   TopicBus   │ ─────────────────▶ │ subscriber A │  ([42])
//!  │              │                    └──────────────┘
//!  │              │        "*"         ┌──────────────┐
//!  │              │ ─────────────────▶ │ subscriber B │  ([42])
//!  └──────────────┘                    └──────────────┘
//! ```
//!
//! ## Rules
//!
//! - There is no global bus. Construct one and share it (`Arc<TopicBus>`).
//! - Wildcard subscribers get the published arguments, not the topic name.
//! - A failing or panicking subscriber never stops the others and never
//!   reaches the publisher.
//! - Subscribers may publish, subscribe or unsubscribe re-entrantly. Changes
//!   take effect on the next publish.
//!
//! ## Example
//!
//! ```
//! use serde_json::{json, Value};
//! use topic_bus::{topics, Subscriber, TopicBus, TopicPublisher};
//!
//! let bus = TopicBus::new();
//! let audit = Subscriber::infallible(|args: &[Value]| println!("saw {args:?}"));
//! bus.subscribe(topics::WILDCARD, &audit);
//!
//! let delivery = bus.publish("order-placed", &[json!(42)]);
//! assert_eq!(delivery.notified, 1);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod element_id;
pub mod observer;
pub mod subscriber;
pub mod topics;

// Re-export main types
pub use bus::{BusError, TopicBus, TopicPublisher};
pub use config::BusConfig;
pub use element_id::IdGenerator;
pub use observer::{Delivery, DispatchObserver};
pub use subscriber::{Subscriber, SubscriberError, Subscription};
pub use topics::WILDCARD;
