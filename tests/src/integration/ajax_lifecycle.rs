//! # Ajax Lifecycle Flow
//!
//! A host page drives one ajax call through the predefined topics:
//!
//! ```text
//! before → precondition ─(veto)─▶ stop
//!              │
//!              ▼
//!         before-send → after → success | failure → complete
//! ```
//!
//! Precondition subscribers veto by failing; the driver reads the veto from
//! the delivery report. DOM updates publish `dom-node-*` with element ids
//! from an `IdGenerator`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{bail, Result};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use topic_bus::{topics, IdGenerator, Subscriber, SubscriberError, TopicBus, TopicPublisher};

    use crate::fixtures::{labelled, recorder};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Minimal host page: publishes the lifecycle topics for one call.
    struct Page {
        bus: Arc<TopicBus>,
        ids: IdGenerator,
    }

    impl Page {
        fn new(bus: Arc<TopicBus>) -> Self {
            Self {
                bus,
                ids: IdGenerator::new(),
            }
        }

        /// Run one call. `respond` decides the outcome.
        fn ajax(&self, url: &str, respond: impl Fn() -> Result<Value>) -> Result<Value> {
            let attrs = json!({ "u": url });
            self.bus.publish(topics::AJAX_CALL_BEFORE, &[attrs.clone()]);

            let precondition = self.bus.publish(topics::AJAX_CALL_PRECONDITION, &[attrs.clone()]);
            if precondition.failed > 0 {
                bail!("call to {} vetoed by precondition", url);
            }

            self.bus.publish(topics::AJAX_CALL_BEFORE_SEND, &[attrs.clone()]);
            self.bus.publish(topics::AJAX_CALL_AFTER, &[attrs.clone()]);

            let outcome = respond();
            match &outcome {
                Ok(body) => {
                    self.bus
                        .publish(topics::AJAX_CALL_SUCCESS, &[attrs.clone(), body.clone()]);
                }
                Err(e) => {
                    self.bus
                        .publish(topics::AJAX_CALL_FAILURE, &[attrs.clone(), json!(e.to_string())]);
                }
            }
            self.bus.publish(topics::AJAX_CALL_COMPLETE, &[attrs]);
            outcome
        }

        /// Replace a node: removing, then added, with a generated id if needed.
        fn replace_node(&self, existing_id: Option<&str>) -> String {
            let id = self.ids.ensure_id(existing_id);
            self.bus.publish(topics::DOM_NODE_REMOVING, &[json!(id)]);
            self.bus.publish(topics::DOM_NODE_ADDED, &[json!(id)]);
            id
        }
    }

    fn lifecycle_log(bus: &TopicBus) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for topic in topics::ALL {
            bus.subscribe(topic, &labelled(topic, &log));
        }
        log
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[test]
    fn test_successful_call_publishes_in_order() -> Result<()> {
        let bus = Arc::new(TopicBus::new());
        let log = lifecycle_log(&bus);
        let page = Page::new(Arc::clone(&bus));

        let body = page.ajax("/cart", || Ok(json!({ "items": 3 })))?;

        assert_eq!(body, json!({ "items": 3 }));
        assert_eq!(
            *log.lock(),
            vec![
                topics::AJAX_CALL_BEFORE,
                topics::AJAX_CALL_PRECONDITION,
                topics::AJAX_CALL_BEFORE_SEND,
                topics::AJAX_CALL_AFTER,
                topics::AJAX_CALL_SUCCESS,
                topics::AJAX_CALL_COMPLETE,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_failed_call_publishes_failure_then_complete() {
        let bus = Arc::new(TopicBus::new());
        let (failure, failure_calls) = recorder();
        let (complete, complete_calls) = recorder();
        bus.subscribe(topics::AJAX_CALL_FAILURE, &failure);
        bus.subscribe(topics::AJAX_CALL_COMPLETE, &complete);
        let page = Page::new(Arc::clone(&bus));

        let result = page.ajax("/broken", || bail!("503"));

        assert!(result.is_err());
        assert_eq!(
            *failure_calls.lock(),
            vec![vec![json!({ "u": "/broken" }), json!("503")]]
        );
        assert_eq!(complete_calls.lock().len(), 1);
    }

    #[test]
    fn test_precondition_veto_stops_call() {
        let bus = Arc::new(TopicBus::new());
        let log = lifecycle_log(&bus);
        let veto = Subscriber::new(|args: &[Value]| match args.first() {
            Some(attrs) if attrs["u"] == "/admin" => Err(SubscriberError::failed("forbidden")),
            _ => Ok(()),
        });
        bus.subscribe(topics::AJAX_CALL_PRECONDITION, &veto);
        let page = Page::new(Arc::clone(&bus));

        let vetoed = page.ajax("/admin", || Ok(json!(null)));
        assert!(vetoed.is_err());
        assert_eq!(
            *log.lock(),
            vec![topics::AJAX_CALL_BEFORE, topics::AJAX_CALL_PRECONDITION]
        );

        // Other URLs pass the same precondition
        log.lock().clear();
        assert!(page.ajax("/public", || Ok(json!(null))).is_ok());
        assert_eq!(log.lock().len(), 6);
    }

    #[test]
    fn test_wildcard_audits_whole_call_without_topic_names() {
        let bus = Arc::new(TopicBus::new());
        let (audit, audit_calls) = recorder();
        bus.subscribe(topics::WILDCARD, &audit);
        let page = Page::new(Arc::clone(&bus));

        page.ajax("/ping", || Ok(json!("pong"))).unwrap();

        let calls = audit_calls.lock();
        assert_eq!(calls.len(), 6);
        // Every call starts with the call attributes, never a topic string
        assert!(calls.iter().all(|args| args[0] == json!({ "u": "/ping" })));
        assert_eq!(bus.events_published(), 6);
    }

    #[test]
    fn test_replaced_nodes_get_stable_ids() {
        let bus = Arc::new(TopicBus::new());
        let (removing, removing_calls) = recorder();
        let (added, added_calls) = recorder();
        bus.subscribe(topics::DOM_NODE_REMOVING, &removing);
        bus.subscribe(topics::DOM_NODE_ADDED, &added);
        let page = Page::new(Arc::clone(&bus));

        assert_eq!(page.replace_node(Some("header")), "header");
        assert_eq!(page.replace_node(None), "wicket-generated-id-0");
        assert_eq!(page.replace_node(Some("")), "wicket-generated-id-1");

        let expected = vec![
            vec![json!("header")],
            vec![json!("wicket-generated-id-0")],
            vec![json!("wicket-generated-id-1")],
        ];
        assert_eq!(*removing_calls.lock(), expected);
        assert_eq!(*added_calls.lock(), expected);
    }

    #[test]
    fn test_page_teardown_unsubscribes_everything() {
        let bus = Arc::new(TopicBus::new());
        let log = lifecycle_log(&bus);
        let (audit, audit_calls) = recorder();
        bus.subscribe(topics::WILDCARD, &audit);

        bus.unsubscribe(None, None);
        Page::new(Arc::clone(&bus))
            .ajax("/after-teardown", || Ok(json!(1)))
            .unwrap();

        assert!(log.lock().is_empty());
        assert!(audit_calls.lock().is_empty());
    }
}
