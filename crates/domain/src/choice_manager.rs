//! Generic selection helper for picking items from an offered list.
//!
//! Used for ad hoc picks outside attribute resolution (starting spells,
//! random NPC traits). Randomness comes from the caller's `Rng`.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::entities::{Spell, SpellTradition};
use crate::error::DomainError;
use crate::value_objects::Skill;

/// Anything that can be offered by a [`ChoiceManager`].
pub trait Selectable: Clone {
    fn selection_id(&self) -> &str;
}

impl Selectable for Spell {
    fn selection_id(&self) -> &str {
        &self.id
    }
}

impl Selectable for SpellTradition {
    fn selection_id(&self) -> &str {
        &self.id
    }
}

impl Selectable for Skill {
    fn selection_id(&self) -> &str {
        &self.name
    }
}

/// How [`ChoiceManager::auto_select`] picks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChoiceBehavior {
    Random,
    #[default]
    FirstAvailable,
    /// Weighted draw without replacement; needs a [`WeightedConfig`]
    Weighted,
}

/// Per-item weights for [`ChoiceBehavior::Weighted`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedConfig {
    pub weights: HashMap<String, f64>,
    /// Weight of items missing from `weights`
    pub default_weight: f64,
}

impl Default for WeightedConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            default_weight: 1.0,
        }
    }
}

impl WeightedConfig {
    pub fn with_weight(mut self, id: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(id.into(), weight);
        self
    }

    fn weight_of(&self, id: &str) -> f64 {
        self.weights.get(id).copied().unwrap_or(self.default_weight)
    }
}

#[derive(Debug, Clone)]
pub struct ChoiceManager<T: Selectable> {
    id: String,
    available: Vec<T>,
    min_selections: usize,
    max_selections: usize,
    behavior: ChoiceBehavior,
    weights: Option<WeightedConfig>,
    selected: Vec<T>,
}

impl<T: Selectable> ChoiceManager<T> {
    pub fn new(id: impl Into<String>, available: Vec<T>, max_selections: usize) -> Self {
        Self {
            id: id.into(),
            available,
            min_selections: 0,
            max_selections,
            behavior: ChoiceBehavior::default(),
            weights: None,
            selected: Vec::new(),
        }
    }

    pub fn with_min_selections(mut self, min_selections: usize) -> Self {
        self.min_selections = min_selections;
        self
    }

    pub fn with_behavior(mut self, behavior: ChoiceBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_weights(mut self, weights: WeightedConfig) -> Self {
        self.weights = Some(weights);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn selected(&self) -> &[T] {
        &self.selected
    }

    pub fn available(&self) -> &[T] {
        &self.available
    }

    /// Picks up to `max_selections` items according to the configured behavior.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a weighted manager without weights or with a
    /// negative weight. The current selection is kept on error.
    pub fn auto_select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&[T], DomainError> {
        let picked = match self.behavior {
            ChoiceBehavior::FirstAvailable => self
                .available
                .iter()
                .take(self.max_selections)
                .cloned()
                .collect(),
            ChoiceBehavior::Random => self
                .available
                .choose_multiple(rng, self.max_selections)
                .cloned()
                .collect(),
            ChoiceBehavior::Weighted => self.select_weighted(rng)?,
        };
        self.selected = picked;
        Ok(&self.selected)
    }

    fn select_weighted<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<T>, DomainError> {
        let config = self.weights.as_ref().ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "Choice '{}' needs a weight configuration for weighted selection",
                self.id
            ))
        })?;

        let mut remaining: Vec<&T> = self.available.iter().collect();
        let mut picked = Vec::new();
        while picked.len() < self.max_selections && !remaining.is_empty() {
            let weights: Vec<f64> = remaining
                .iter()
                .map(|item| config.weight_of(item.selection_id()))
                .collect();
            let distribution = match WeightedIndex::new(&weights) {
                Ok(distribution) => distribution,
                // Only zero-weight items remain
                Err(WeightedError::AllWeightsZero) => break,
                Err(e) => {
                    return Err(DomainError::invalid_argument(format!(
                        "Invalid weights for choice '{}': {}",
                        self.id, e
                    )))
                }
            };
            let index = distribution.sample(rng);
            picked.push(remaining.remove(index).clone());
        }
        Ok(picked)
    }

    /// Replaces the selection with `items`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `items` is outside the min/max bounds,
    /// `Unavailable` when an item is not offered. The current selection is
    /// kept on error.
    pub fn manual_select(&mut self, items: Vec<T>) -> Result<(), DomainError> {
        if items.len() > self.max_selections {
            return Err(DomainError::invalid_argument(format!(
                "Cannot select more than {} items",
                self.max_selections
            )));
        }
        if items.len() < self.min_selections {
            return Err(DomainError::invalid_argument(format!(
                "Must select at least {} items",
                self.min_selections
            )));
        }
        if let Some(missing) = items.iter().find(|item| {
            !self
                .available
                .iter()
                .any(|offered| offered.selection_id() == item.selection_id())
        }) {
            return Err(DomainError::unavailable(format!(
                "'{}' is not available in choice '{}'",
                missing.selection_id(),
                self.id
            )));
        }
        self.selected = items;
        Ok(())
    }
}
