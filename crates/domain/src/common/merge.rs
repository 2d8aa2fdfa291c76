//! Order-preserving merge helpers for list-valued attributes.
//!
//! Languages and professions behave like sets, but the sheet shows them in
//! the order they were gained, so a `HashSet` is not enough.

use std::collections::HashSet;
use std::hash::Hash;

/// Removes later duplicates, keeping the first occurrence of each item.
///
/// # Examples
///
/// ```
/// use charforge_domain::common::dedup_preserving_order;
///
/// let mut professions = vec!["Commoner", "Scholar", "Commoner"];
/// dedup_preserving_order(&mut professions);
/// assert_eq!(professions, vec!["Commoner", "Scholar"]);
/// ```
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: &mut Vec<T>) {
    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}
