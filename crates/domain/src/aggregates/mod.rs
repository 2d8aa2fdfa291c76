//! Aggregate roots - domain objects that own their related data
//!
//! A [`Character`] owns its level, path slots and stored choices, and
//! shares immutable content (ancestry, paths) through `Arc`. Mutations
//! that can invalidate stored choices return a [`ValidationReport`]
//! describing what was corrected.

pub mod character;

pub use character::{Character, InvalidChoice, ValidationReport};
