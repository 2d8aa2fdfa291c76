//! Spell registry - lookup of spells and traditions for spell choices
//!
//! The registry is a plain value owned by whoever assembles a
//! character-building session. Separate sessions (and tests) use separate
//! registries.

use std::collections::BTreeMap;

use crate::entities::{Spell, SpellTradition};
use crate::value_objects::{SpellChoice, SpellChoiceKind, SpellSelection};

/// Spells and traditions keyed by id. Every listing is ordered by id.
#[derive(Debug, Clone, Default)]
pub struct SpellRegistry {
    spells: BTreeMap<String, Spell>,
    traditions: BTreeMap<String, SpellTradition>,
}

impl SpellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a spell, returning the one it replaced.
    pub fn register_spell(&mut self, spell: Spell) -> Option<Spell> {
        self.spells.insert(spell.id.clone(), spell)
    }

    /// Registers a tradition, returning the one it replaced.
    pub fn register_tradition(&mut self, tradition: SpellTradition) -> Option<SpellTradition> {
        self.traditions.insert(tradition.id.clone(), tradition)
    }

    pub fn spell(&self, id: &str) -> Option<&Spell> {
        self.spells.get(id)
    }

    pub fn tradition(&self, id: &str) -> Option<&SpellTradition> {
        self.traditions.get(id)
    }

    pub fn spells(&self) -> Vec<&Spell> {
        self.spells.values().collect()
    }

    pub fn traditions(&self) -> Vec<&SpellTradition> {
        self.traditions.values().collect()
    }

    pub fn spells_by_tradition(&self, tradition_id: &str) -> Vec<&Spell> {
        self.spells
            .values()
            .filter(|spell| spell.tradition == tradition_id)
            .collect()
    }

    pub fn spells_by_max_rank(&self, max_rank: u32) -> Vec<&Spell> {
        self.spells
            .values()
            .filter(|spell| spell.rank <= max_rank)
            .collect()
    }

    pub fn spells_by_tradition_and_rank(&self, tradition_id: &str, max_rank: u32) -> Vec<&Spell> {
        self.spells
            .values()
            .filter(|spell| spell.tradition == tradition_id && spell.rank <= max_rank)
            .collect()
    }

    /// Spells a spell choice could teach to a caster of `max_power`.
    ///
    /// With a `slot`, the slot's kind narrows the result: a discover-tradition
    /// slot teaches no spells, the other kinds honour the slot's tradition
    /// restriction. `specific_spells`, when non-empty, limits the result to
    /// those ids.
    pub fn available_spells_for_choice(
        &self,
        choice: &SpellChoice,
        max_power: i32,
        slot: Option<usize>,
    ) -> Vec<&Spell> {
        let Ok(max_rank) = u32::try_from(max_power) else {
            return Vec::new();
        };
        let slot = slot.and_then(|index| choice.choices.get(index));
        if slot.is_some_and(|slot| slot.kind == SpellChoiceKind::DiscoverTradition) {
            return Vec::new();
        }
        let restriction = slot.and_then(|slot| slot.restriction());
        let specific = choice
            .specific_spells
            .as_deref()
            .filter(|ids| !ids.is_empty());

        self.spells
            .values()
            .filter(|spell| restriction.is_none_or(|allowed| allowed.contains(&spell.tradition)))
            .filter(|spell| specific.is_none_or(|ids| ids.contains(&spell.id)))
            .filter(|spell| spell.rank <= max_rank)
            .collect()
    }

    /// Whether `selected` fits `choice`: no more picks than `count`, and
    /// every pick matches the kind of the slot at its position.
    pub fn validate_spell_choice(&self, choice: &SpellChoice, selected: &[SpellSelection]) -> bool {
        selected.len() <= choice.count
            && selected
                .iter()
                .enumerate()
                .all(|(index, pick)| choice.slot_accepts(index, pick))
    }

    /// Traditions the slot at `slot` could let the character discover,
    /// excluding those already `discovered`.
    pub fn available_traditions_for_choice(
        &self,
        choice: &SpellChoice,
        slot: usize,
        discovered: &[String],
    ) -> Vec<&SpellTradition> {
        let Some(slot) = choice.choices.get(slot) else {
            return Vec::new();
        };
        if slot.kind == SpellChoiceKind::LearnSpell {
            return Vec::new();
        }
        let restriction = slot.restriction();
        self.traditions
            .values()
            .filter(|tradition| !discovered.contains(&tradition.id))
            .filter(|tradition| restriction.is_none_or(|allowed| allowed.contains(&tradition.id)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.spells.clear();
        self.traditions.clear();
    }
}
