//! Cross-crate integration scenarios.

pub mod ajax_lifecycle;
