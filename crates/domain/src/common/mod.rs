//! Common utility functions shared across the domain.
//!
//! Pure functions only - no side effects, no I/O.

pub mod merge;

pub use merge::dedup_preserving_order;
