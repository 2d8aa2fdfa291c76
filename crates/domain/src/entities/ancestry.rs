//! Ancestry entity - base attributes, derivation rules and ancestry benefits

use serde::{Deserialize, Serialize};

use crate::observer::AttributeObserver;
use crate::value_objects::{
    AttributeModifier, AvailableChoice, ChoiceConfig, ChoiceLocation, ChoiceSource,
    MainAttributes, SecondaryAttributeRules, SecondaryAttributes,
};

/// Level at which the ancestry modifier (and its choices) becomes active.
pub const ANCESTRY_MODIFIER_LEVEL: u32 = 4;

/// Level at which initial (character creation) choices are offered.
pub const INITIAL_CHOICE_LEVEL: u32 = 0;

/// A character's lineage. Immutable once built; characters share it
/// through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ancestry {
    name: String,
    base_attributes: MainAttributes,
    #[serde(rename = "secondaryAttributes", default)]
    secondary_attribute_rules: SecondaryAttributeRules,
    #[serde(rename = "levelBenefits", default)]
    ancestry_modifier: AttributeModifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    initial_choices: Vec<ChoiceConfig>,
}

impl Ancestry {
    pub fn new(
        name: impl Into<String>,
        base_attributes: MainAttributes,
        secondary_attribute_rules: SecondaryAttributeRules,
        ancestry_modifier: AttributeModifier,
    ) -> Self {
        Self {
            name: name.into(),
            base_attributes,
            secondary_attribute_rules,
            ancestry_modifier,
            initial_choices: Vec::new(),
        }
    }

    pub fn with_initial_choice(mut self, choice: impl Into<ChoiceConfig>) -> Self {
        self.initial_choices.push(choice.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn base_attributes(&self) -> MainAttributes {
        self.base_attributes
    }

    #[inline]
    pub fn secondary_attribute_rules(&self) -> &SecondaryAttributeRules {
        &self.secondary_attribute_rules
    }

    #[inline]
    pub fn ancestry_modifier(&self) -> &AttributeModifier {
        &self.ancestry_modifier
    }

    #[inline]
    pub fn initial_choices(&self) -> &[ChoiceConfig] {
        &self.initial_choices
    }

    /// Derives secondary attributes from (possibly already adjusted) main attributes.
    pub fn compute_secondary(&self, main: &MainAttributes, level: u32) -> SecondaryAttributes {
        self.secondary_attribute_rules.compute(main, level)
    }

    /// Applies the ancestry modifier when `character_level` has reached
    /// [`ANCESTRY_MODIFIER_LEVEL`]; a no-op below it.
    pub fn apply_modifiers(
        &self,
        character_level: u32,
        main: &mut MainAttributes,
        secondary: &mut SecondaryAttributes,
        observer: &dyn AttributeObserver,
    ) {
        if character_level < ANCESTRY_MODIFIER_LEVEL {
            return;
        }
        self.ancestry_modifier.apply_to(main, secondary);
        observer.modifier_applied(
            ChoiceLocation::new(ChoiceSource::Ancestry, ANCESTRY_MODIFIER_LEVEL),
            &self.ancestry_modifier,
        );
    }

    /// Choices at a given ancestry level: level 0 yields the initial
    /// choices, any other level the ancestry modifier's choices. Without a
    /// level, initial choices win when there are any.
    ///
    /// Gating the modifier choices on the character's level is up to the caller.
    pub fn choices(&self, level: Option<u32>) -> &[ChoiceConfig] {
        match level {
            Some(INITIAL_CHOICE_LEVEL) => &self.initial_choices,
            None if !self.initial_choices.is_empty() => &self.initial_choices,
            _ => self.ancestry_modifier.choices(),
        }
    }

    /// Keyed choices offered to a character of `character_level`: the
    /// initial choices always, the modifier choices from level 4.
    pub fn available_choices(&self, character_level: u32) -> Vec<AvailableChoice<'_>> {
        let mut available: Vec<AvailableChoice<'_>> = AvailableChoice::enumerate(
            ChoiceLocation::new(ChoiceSource::Ancestry, INITIAL_CHOICE_LEVEL),
            &self.initial_choices,
        )
        .collect();
        if character_level >= ANCESTRY_MODIFIER_LEVEL {
            available.extend(AvailableChoice::enumerate(
                ChoiceLocation::new(ChoiceSource::Ancestry, ANCESTRY_MODIFIER_LEVEL),
                self.ancestry_modifier.choices(),
            ));
        }
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::test_fixtures;
    use crate::value_objects::{ChoiceType, NumericAttribute};

    #[test]
    fn test_modifier_only_applies_from_level_four() {
        let human = test_fixtures::human();
        let mut main = human.base_attributes();
        let mut secondary = human.compute_secondary(&main, 3);
        human.apply_modifiers(3, &mut main, &mut secondary, &NoopObserver);
        assert_eq!(secondary.health, 10);

        human.apply_modifiers(4, &mut main, &mut secondary, &NoopObserver);
        assert_eq!(secondary.health, 15);
    }

    #[test]
    fn test_choices_by_level() {
        let human = test_fixtures::human();
        assert_eq!(human.choices(Some(0))[0].choice_type(), ChoiceType::Attribute);
        assert_eq!(human.choices(None), human.initial_choices());
        assert_eq!(human.choices(Some(4))[0].choice_type(), ChoiceType::Skill);
    }

    #[test]
    fn test_available_choices_gate_level_four() {
        let human = test_fixtures::human();
        let keys = |level| -> Vec<String> {
            human
                .available_choices(level)
                .into_iter()
                .map(|c| c.key.to_string())
                .collect()
        };
        assert_eq!(
            keys(3),
            vec!["ancestry-0-attribute-0", "ancestry-0-profession-0"]
        );
        assert_eq!(
            keys(4),
            vec![
                "ancestry-0-attribute-0",
                "ancestry-0-profession-0",
                "ancestry-4-skill-0",
                "ancestry-4-spell-0"
            ]
        );
    }

    #[test]
    fn test_languer_rules() {
        let languer = test_fixtures::languer();
        let main = languer.base_attributes();
        let secondary = languer.compute_secondary(&main, 0);
        assert_eq!(secondary.health, 8);
        assert_eq!(secondary.get(NumericAttribute::Perception), Some(13));
        assert_eq!(secondary.languages, vec!["Common", "High Archaic"]);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "name": "Human",
            "baseAttributes": {"strength": 10, "agility": 10, "intellect": 10, "will": 10},
            "secondaryAttributes": {
                "health": {"type": "attributeBased", "sourceAttribute": "strength"},
                "languages": ["Common"]
            },
            "levelBenefits": {"modifiers": {"health": 5}},
            "initialChoices": [{"type": "attribute", "count": 1, "increaseBy": 1}]
        }"#;
        let ancestry: Ancestry = serde_json::from_str(json).unwrap();
        assert_eq!(ancestry.name(), "Human");
        assert_eq!(ancestry.ancestry_modifier().delta(NumericAttribute::Health), 5);
        assert_eq!(ancestry.initial_choices().len(), 1);
        let secondary = ancestry.compute_secondary(&ancestry.base_attributes(), 0);
        assert_eq!(secondary.health, 10);
        assert_eq!(secondary.healing_rate, 2);
        assert_eq!(secondary.languages, vec!["Common"]);
    }
}
