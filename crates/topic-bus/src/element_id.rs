//! # Generated Element Ids
//!
//! Hands out identifiers for host elements that do not carry one, so that
//! listeners and topics can refer to them by id.

use std::sync::atomic::{AtomicU64, Ordering};

/// Default prefix for generated ids.
pub const DEFAULT_ID_PREFIX: &str = "wicket-generated-id-";

/// Monotonic id source: `<prefix>0`, `<prefix>1`, ...
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl IdGenerator {
    /// Create a generator using [`DEFAULT_ID_PREFIX`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ID_PREFIX)
    }

    /// Create a generator with a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Keep `existing` if it is a non-empty id, otherwise generate one.
    pub fn ensure_id(&self, existing: Option<&str>) -> String {
        match existing {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.next_id(),
        }
    }

    /// Generate a fresh id.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }

    /// How many ids have been generated so far.
    #[must_use]
    pub fn generated(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
