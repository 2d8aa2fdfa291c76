//! Attribute resolution for [`Character`].
//!
//! Order of application:
//! 1. ancestry base attributes, plus ancestry level-0 attribute choices
//! 2. secondary attributes derived by the ancestry rules
//! 3. remaining ancestry level-0 choices
//! 4. ancestry modifier and its choices (level 4+)
//! 5. novice, expert, master: each path's modifiers, then its choices
//! 6. healing rate recomputed from the final health
//! 7. languages and professions de-duplicated, first occurrence wins

use crate::common::dedup_preserving_order;
use crate::entities::{Path, PathTier, ANCESTRY_MODIFIER_LEVEL, INITIAL_CHOICE_LEVEL};
use crate::value_objects::{
    AttributeSheet, AvailableChoice, ChoiceConfig, ChoiceKey, ChoiceSource, ChoiceType,
    MainAttributes, SecondaryAttributes, SpellSelection,
};

use super::Character;

impl Character {
    /// Computes the character's attribute sheet at its current level.
    ///
    /// Always recomputed from ancestry, paths and stored choices; callers
    /// in a hot loop should keep the result.
    pub fn resolve_attributes(&self) -> AttributeSheet {
        self.resolve_at(self.level)
    }

    /// The `power` the character would have at `level` with its current
    /// ancestry, paths and choices. Used as the spell rank ceiling.
    pub fn spell_power_at(&self, level: u32) -> i32 {
        self.resolve_at(level).secondary.power
    }

    /// Stored spell selections of the currently offered spell choices,
    /// each truncated to its offer's count.
    pub fn spell_selections(&self) -> Vec<(ChoiceKey, Vec<SpellSelection>)> {
        self.available_choices()
            .into_iter()
            .filter_map(|choice| {
                let ChoiceConfig::Spell(offer) = choice.config else {
                    return None;
                };
                let Some(ChoiceConfig::Spell(stored)) = self.choices.get(&choice.key) else {
                    return None;
                };
                let picks: Vec<SpellSelection> = stored
                    .selected_choices
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .take(offer.count)
                    .cloned()
                    .collect();
                (!picks.is_empty()).then_some((choice.key, picks))
            })
            .collect()
    }

    /// Ids of the traditions discovered through spell choices.
    pub fn discovered_traditions(&self) -> Vec<String> {
        let mut traditions: Vec<String> = self
            .spell_selections()
            .into_iter()
            .flat_map(|(_, picks)| picks)
            .filter_map(|pick| match pick {
                SpellSelection::DiscoverTradition { tradition_id } => Some(tradition_id),
                SpellSelection::LearnSpell { .. } => None,
            })
            .collect();
        dedup_preserving_order(&mut traditions);
        traditions
    }

    pub(crate) fn resolve_at(&self, level: u32) -> AttributeSheet {
        let ancestry = self.ancestry.as_ref();
        let observer = self.observer.as_ref();
        let available = self.available_choices_at(level);

        let is_initial = |choice: &&AvailableChoice<'_>| {
            choice.key.source() == ChoiceSource::Ancestry
                && choice.key.level() == INITIAL_CHOICE_LEVEL
        };
        let from = |source: ChoiceSource| {
            available
                .iter()
                .filter(move |choice| choice.key.source() == source)
        };

        let mut main = ancestry.base_attributes();
        let mut secondary = SecondaryAttributes::default();

        // Initial attribute picks count as part of the base attributes
        for choice in from(ChoiceSource::Ancestry)
            .filter(is_initial)
            .filter(|c| c.key.choice_type == ChoiceType::Attribute)
        {
            self.apply_choice(choice, &mut main, &mut secondary);
        }

        secondary = ancestry.compute_secondary(&main, level);

        for choice in from(ChoiceSource::Ancestry)
            .filter(is_initial)
            .filter(|c| c.key.choice_type != ChoiceType::Attribute)
        {
            self.apply_choice(choice, &mut main, &mut secondary);
        }

        ancestry.apply_modifiers(level, &mut main, &mut secondary, observer);
        for choice in from(ChoiceSource::Ancestry)
            .filter(|c| c.key.level() == ANCESTRY_MODIFIER_LEVEL)
        {
            self.apply_choice(choice, &mut main, &mut secondary);
        }

        for source in [
            ChoiceSource::NovicePath,
            ChoiceSource::ExpertPath,
            ChoiceSource::MasterPath,
        ] {
            let Some(path) = self.path_for(source) else {
                continue;
            };
            path.apply_modifiers(level, &mut main, &mut secondary, observer);
            for choice in from(source) {
                self.apply_choice(choice, &mut main, &mut secondary);
            }
        }

        secondary.healing_rate = ancestry
            .secondary_attribute_rules()
            .healing_rate(&main, level, &secondary);
        dedup_preserving_order(&mut secondary.languages);
        dedup_preserving_order(&mut secondary.professions);

        let sheet = AttributeSheet { main, secondary };
        observer.resolution_finished(self.name.as_str(), level, &sheet);
        sheet
    }

    fn path_for(&self, source: ChoiceSource) -> Option<&Path> {
        PathTier::from_source(source)
            .and_then(|tier| self.path(tier))
            .map(|path| path.as_ref())
    }

    /// Applies one offered choice using the stored selection, or the
    /// offer's defaults when nothing (or something of another type) is stored.
    fn apply_choice(
        &self,
        choice: &AvailableChoice<'_>,
        main: &mut MainAttributes,
        secondary: &mut SecondaryAttributes,
    ) {
        let stored = self.choices.get(&choice.key);
        let (from_selection, items): (bool, Vec<String>) = match (choice.config, stored) {
            (ChoiceConfig::Attribute(offer), stored) => {
                let stored = match stored {
                    Some(ChoiceConfig::Attribute(s)) if s.selected_attributes.is_some() => Some(s),
                    _ => None,
                };
                let picks = offer.effective_attributes(stored);
                for attr in &picks {
                    main.add(*attr, offer.increase_by);
                }
                (
                    stored.is_some(),
                    picks.iter().map(ToString::to_string).collect(),
                )
            }
            (ChoiceConfig::Profession(offer), stored) => {
                let stored = match stored {
                    Some(ChoiceConfig::Profession(s)) if s.selected_professions.is_some() => {
                        Some(s)
                    }
                    _ => None,
                };
                let picks = offer.effective_professions(stored);
                secondary
                    .professions
                    .extend(picks.iter().map(|p| p.to_string()));
                (
                    stored.is_some(),
                    picks.into_iter().map(str::to_string).collect(),
                )
            }
            (ChoiceConfig::Language(offer), Some(ChoiceConfig::Language(stored))) => {
                let picks = offer.effective_languages(Some(stored));
                secondary
                    .languages
                    .extend(picks.iter().map(|l| l.to_string()));
                (true, picks.into_iter().map(str::to_string).collect())
            }
            (ChoiceConfig::Skill(offer), Some(ChoiceConfig::Skill(stored))) => {
                let picks = offer.effective_skills(Some(stored));
                for skill in &picks {
                    if !secondary.has_skill(&skill.name) {
                        secondary.skills.push((*skill).clone());
                    }
                }
                (true, picks.iter().map(|s| s.name.clone()).collect())
            }
            (ChoiceConfig::Spell(offer), Some(ChoiceConfig::Spell(stored))) => {
                // Spells are tracked separately and change no attributes
                let picks = stored
                    .selected_choices
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .take(offer.count)
                    .map(ToString::to_string)
                    .collect();
                (true, picks)
            }
            _ => (false, Vec::new()),
        };
        self.observer
            .choice_resolved(choice.key, from_selection, &items);
    }
}
