//! # Topics
//!
//! Well-known topic names published by the host page, plus the wildcard.
//! Any non-empty string is a valid topic; these are the ones external
//! callers can rely on.

/// Matches every topic. Subscribers registered here run after the
/// subscribers of the published topic.
pub const WILDCARD: &str = "*";

// =========================================================================
// DOM LIFECYCLE
// =========================================================================

/// A node is about to be removed from the document.
pub const DOM_NODE_REMOVING: &str = "dom-node-removing";

/// A node was added to the document.
pub const DOM_NODE_ADDED: &str = "dom-node-added";

// =========================================================================
// AJAX CALL LIFECYCLE
// =========================================================================

/// Before anything else happens for an ajax call.
pub const AJAX_CALL_BEFORE: &str = "ajax-call-before";

/// A precondition is being evaluated. Any subscriber may veto the call.
pub const AJAX_CALL_PRECONDITION: &str = "ajax-call-precondition";

/// Just before the request leaves.
pub const AJAX_CALL_BEFORE_SEND: &str = "ajax-call-before-send";

/// The response arrived and was processed successfully.
pub const AJAX_CALL_SUCCESS: &str = "ajax-call-success";

/// The request completed, successfully or not.
pub const AJAX_CALL_COMPLETE: &str = "ajax-call-complete";

/// After the request was sent (the response may still be pending).
pub const AJAX_CALL_AFTER: &str = "ajax-call-after";

/// The request failed.
pub const AJAX_CALL_FAILURE: &str = "ajax-call-failure";

/// Every predefined topic, in lifecycle order. Does not include [`WILDCARD`].
pub const ALL: [&str; 9] = [
    DOM_NODE_REMOVING,
    DOM_NODE_ADDED,
    AJAX_CALL_BEFORE,
    AJAX_CALL_PRECONDITION,
    AJAX_CALL_BEFORE_SEND,
    AJAX_CALL_SUCCESS,
    AJAX_CALL_COMPLETE,
    AJAX_CALL_AFTER,
    AJAX_CALL_FAILURE,
];

/// Whether `topic` is one of the predefined names in [`ALL`].
#[must_use]
pub fn is_predefined(topic: &str) -> bool {
    ALL.contains(&topic)
}

/// Whether `topic` is the wildcard.
#[must_use]
pub fn is_wildcard(topic: &str) -> bool {
    topic == WILDCARD
}
