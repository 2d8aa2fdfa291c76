//! Re-checking stored choices against the offers that currently exist.

use std::collections::HashMap;

use serde::Serialize;

use crate::observer::ValidationAction;
use crate::value_objects::{ChoiceConfig, ChoiceIssue, ChoiceKey, ChoiceSource, Reconciliation};

use super::Character;

/// Keys touched by a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Kept with fewer items
    pub trimmed: Vec<ChoiceKey>,
    /// Deleted entirely
    pub removed: Vec<ChoiceKey>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.trimmed.is_empty() && self.removed.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.trimmed.extend(other.trimmed);
        self.removed.extend(other.removed);
    }
}

/// A stored choice that validation would trim or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidChoice {
    pub key: ChoiceKey,
    pub selection: ChoiceConfig,
    pub issues: Vec<ChoiceIssue>,
    /// What validation would store instead; `None` means removal
    pub corrected: Option<ChoiceConfig>,
}

impl InvalidChoice {
    pub fn would_remove(&self) -> bool {
        self.corrected.is_none()
    }
}

impl Character {
    /// Dry run: stored choices of `source` that no longer fit their offer.
    /// Nothing is changed.
    pub fn invalid_choices(&self, source: ChoiceSource) -> Vec<InvalidChoice> {
        self.inspect_source(source)
            .into_iter()
            .map(|(key, stored, reconciliation)| InvalidChoice {
                key,
                selection: stored.clone(),
                issues: reconciliation.issues,
                corrected: reconciliation.corrected,
            })
            .collect()
    }

    /// Trims or removes the stored choices of `source` that no longer fit.
    ///
    /// With `preserve_invalid_choices` set, invalid choices are reported to
    /// the observer and kept verbatim.
    pub fn validate_choices_for_source(&mut self, source: ChoiceSource) -> ValidationReport {
        let findings: Vec<(ChoiceKey, Reconciliation)> = self
            .inspect_source(source)
            .into_iter()
            .map(|(key, _, reconciliation)| (key, reconciliation))
            .collect();
        let mut report = ValidationReport::default();

        for (key, reconciliation) in findings {
            if self.validation.preserve_invalid_choices {
                self.observer
                    .choice_validated(key, ValidationAction::Preserved, &reconciliation.issues);
                continue;
            }
            match reconciliation.corrected {
                Some(corrected) => {
                    self.choices.insert(key, corrected);
                    self.observer
                        .choice_validated(key, ValidationAction::Trimmed, &reconciliation.issues);
                    report.trimmed.push(key);
                }
                None => {
                    self.choices.remove(&key);
                    self.observer
                        .choice_validated(key, ValidationAction::Removed, &reconciliation.issues);
                    report.removed.push(key);
                }
            }
        }
        report
    }

    /// Validates every source, ancestry first.
    pub fn validate_all_choices(&mut self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for source in ChoiceSource::ALL {
            report.merge(self.validate_choices_for_source(source));
        }
        report
    }

    /// Reconciles each stored choice of `source` with the offer under the
    /// same key. Only choices with issues are returned.
    fn inspect_source(
        &self,
        source: ChoiceSource,
    ) -> Vec<(ChoiceKey, &ChoiceConfig, Reconciliation)> {
        let offers: HashMap<ChoiceKey, &ChoiceConfig> = self
            .available_choices_for(source)
            .into_iter()
            .map(|choice| (choice.key, choice.config))
            .collect();

        self.choices
            .iter()
            .filter(|(key, _)| key.source() == source)
            .filter_map(|(key, stored)| {
                let reconciliation = match offers.get(key) {
                    Some(offer) => offer.reconcile(stored),
                    None => Reconciliation {
                        corrected: None,
                        issues: vec![ChoiceIssue::NoLongerOffered],
                    },
                };
                (!reconciliation.is_valid()).then_some((*key, stored, reconciliation))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::entities::{Path, PathTier};
    use crate::observer::{MockAttributeObserver, ValidationAction};
    use crate::test_fixtures;
    use crate::value_objects::{
        AttributeChoice, AttributeModifier, ChoiceConfig, ChoiceIssue, ChoiceKey, ChoiceSource,
        ChoiceValidationConfig, LanguageChoice, MainAttribute, Skill, SkillChoice,
    };

    use MainAttribute::*;

    fn key(s: &str) -> ChoiceKey {
        s.parse().unwrap()
    }

    fn attributes(attrs: &[MainAttribute]) -> ChoiceConfig {
        ChoiceConfig::Attribute(AttributeChoice::new(attrs.len(), 1).with_selected(attrs.to_vec()))
    }

    /// A novice path whose level 1 attribute choice lets the player pick three.
    fn generous_path() -> Path {
        Path::new(
            "Scholar",
            PathTier::Novice,
            [(1, AttributeModifier::new().with_choice(AttributeChoice::new(3, 1)))],
        )
        .unwrap()
    }

    /// Same slot, but only one pick.
    fn strict_path() -> Path {
        Path::new(
            "Zealot",
            PathTier::Novice,
            [(1, AttributeModifier::new().with_choice(AttributeChoice::new(1, 1)))],
        )
        .unwrap()
    }

    #[test]
    fn test_path_swap_trims_to_new_count() {
        let mut character = test_fixtures::character("Lyra", test_fixtures::human());
        character.set_path(Arc::new(generous_path()));
        character.level_up();
        let slot = key("novicePath-1-attribute-0");
        character.set_choice(slot, attributes(&[Strength, Agility, Intellect]));
        assert_eq!(character.resolve_attributes().main.intellect, 11);

        let report = character.set_path(Arc::new(strict_path()));
        assert_eq!(report.trimmed, vec![slot]);
        assert!(report.removed.is_empty());
        assert_eq!(character.choice(&slot), Some(&attributes(&[Strength])));

        let sheet = character.resolve_attributes();
        assert_eq!(sheet.main.strength, 12);
        assert_eq!(sheet.main.agility, 10);
        assert_eq!(sheet.main.intellect, 10);
    }

    #[test]
    fn test_path_swap_removes_choices_no_longer_offered() {
        let mut edward = test_fixtures::edward();
        edward.level_up();
        let slot = key("novicePath-1-attribute-0");
        edward.set_choice(slot, attributes(&[Will, Will]));

        let report = edward.set_path(Arc::new(test_fixtures::magician()));
        assert!(report.removed.is_empty());
        assert_eq!(report.trimmed, vec![slot]);

        let report = edward.remove_path(PathTier::Novice);
        assert_eq!(report.removed, vec![slot]);
        assert!(edward.choice(&slot).is_none());
    }

    #[test]
    fn test_unavailable_items_are_dropped() {
        let mut character = test_fixtures::character("Lyra", test_fixtures::human());
        character.level_up_to(4).unwrap();
        let slot = key("ancestry-4-skill-0");
        character.set_choice(
            slot,
            ChoiceConfig::Skill(SkillChoice::new(1, vec![]).with_selected(vec![Skill::new("Polyglot", "")])),
        );

        let invalid = character.invalid_choices(ChoiceSource::Ancestry);
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].would_remove());
        assert_eq!(
            invalid[0].issues,
            vec![ChoiceIssue::UnavailableSelections { items: vec!["Polyglot".into()] }]
        );
        // Dry run leaves the choice in place
        assert!(character.choice(&slot).is_some());

        let report = character.validate_choices_for_source(ChoiceSource::Ancestry);
        assert_eq!(report.removed, vec![slot]);
        assert!(character.choice(&slot).is_none());
    }

    #[test]
    fn test_valid_choices_are_untouched() {
        let mut character = test_fixtures::character("Quill", test_fixtures::languer());
        character.level_up_to(4).unwrap();
        character.set_choice(
            key("ancestry-4-language-1"),
            ChoiceConfig::Language(LanguageChoice::new(1).with_selected(["Giantish"])),
        );
        character.set_choice(key("ancestry-0-attribute-0"), attributes(&[Will]));

        assert!(character.invalid_choices(ChoiceSource::Ancestry).is_empty());
        assert!(character.validate_all_choices().is_empty());
        assert_eq!(character.stored_choices().count(), 2);
    }

    #[test]
    fn test_choices_above_current_level_are_removed() {
        let mut character = test_fixtures::character("Lyra", test_fixtures::human());
        let slot = key("ancestry-4-skill-0");
        character.set_choice(
            slot,
            ChoiceConfig::Skill(SkillChoice::new(1, vec![]).with_selected(vec![test_fixtures::determined()])),
        );
        let report = character.validate_choices_for_source(ChoiceSource::Ancestry);
        assert_eq!(report.removed, vec![slot]);
    }

    #[test]
    fn test_preserve_invalid_choices_keeps_everything() {
        let mut character = test_fixtures::character("Lyra", test_fixtures::human())
            .with_validation_config(ChoiceValidationConfig::preserving());
        character.set_path(Arc::new(generous_path()));
        character.level_up();
        let slot = key("novicePath-1-attribute-0");
        character.set_choice(slot, attributes(&[Strength, Agility, Intellect]));

        let report = character.set_path(Arc::new(strict_path()));
        assert!(report.is_empty());
        assert_eq!(character.choice(&slot), Some(&attributes(&[Strength, Agility, Intellect])));
        assert_eq!(character.invalid_choices(ChoiceSource::NovicePath).len(), 1);

        // Resolution still honours the live count
        assert_eq!(character.resolve_attributes().main.agility, 10);

        let report = character.set_validation_config(ChoiceValidationConfig::default());
        assert_eq!(report.trimmed, vec![slot]);
        assert_eq!(character.choice(&slot), Some(&attributes(&[Strength])));
    }

    #[test]
    fn test_disabled_path_validation_defers_until_enabled() {
        let disabled = ChoiceValidationConfig {
            validate_on_path_change: false,
            ..ChoiceValidationConfig::default()
        };
        let mut edward = test_fixtures::edward().with_validation_config(disabled);
        edward.level_up();
        let slot = key("novicePath-1-attribute-0");
        edward.set_choice(slot, attributes(&[Will]));

        assert!(edward.remove_path(PathTier::Novice).is_empty());
        assert!(edward.choice(&slot).is_some());

        let report = edward.set_validation_config(ChoiceValidationConfig::default());
        assert_eq!(report.removed, vec![slot]);
    }

    #[test]
    fn test_ancestry_swap_revalidates_ancestry_choices() {
        let mut character = test_fixtures::character("Lyra", test_fixtures::human());
        character.set_choice(key("ancestry-0-profession-0"), ChoiceConfig::Profession(
            crate::value_objects::ProfessionChoice::new(1, Vec::<String>::new()).with_selected(["Military"]),
        ));

        let report = character.set_ancestry(Arc::new(test_fixtures::languer()));
        assert_eq!(report.removed, vec![key("ancestry-0-profession-0")]);
    }

    #[test]
    fn test_disabled_ancestry_validation_defers_until_enabled() {
        let disabled = ChoiceValidationConfig {
            validate_on_ancestry_change: false,
            ..ChoiceValidationConfig::default()
        };
        let mut character = test_fixtures::character("Lyra", test_fixtures::human())
            .with_validation_config(disabled);
        let slot = key("ancestry-0-profession-0");
        character.set_choice(slot, ChoiceConfig::Profession(
            crate::value_objects::ProfessionChoice::new(1, Vec::<String>::new()).with_selected(["Military"]),
        ));

        assert!(character.set_ancestry(Arc::new(test_fixtures::languer())).is_empty());
        assert!(character.choice(&slot).is_some());

        let report = character.set_validation_config(ChoiceValidationConfig::default());
        assert_eq!(report.removed, vec![slot]);
        assert!(character.choice(&slot).is_none());
    }

    #[test]
    fn test_observer_is_told_about_corrections() {
        let mut observer = MockAttributeObserver::new();
        observer
            .expect_choice_validated()
            .withf(|key, action, issues| {
                key.to_string() == "novicePath-1-attribute-0"
                    && *action == ValidationAction::Trimmed
                    && matches!(issues, [ChoiceIssue::ExceedsCount { count: 1, selected: 3 }])
            })
            .times(1)
            .return_const(());

        let mut character = test_fixtures::character("Lyra", test_fixtures::human())
            .with_observer(Arc::new(observer));
        character.set_path(Arc::new(generous_path()));
        character.level_up();
        character.set_choice(key("novicePath-1-attribute-0"), attributes(&[Strength, Agility, Intellect]));
        character.set_path(Arc::new(strict_path()));
    }
}
