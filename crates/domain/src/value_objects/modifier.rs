//! AttributeModifier - additive deltas granted by an ancestry or path level

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ChoiceConfig, MainAttributes, NumericAttribute, SecondaryAttributes, Skill};

/// A sparse bag of additive attribute deltas, list additions, and the
/// choices unlocked alongside them.
///
/// Numeric deltas always add; nothing here replaces a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeModifier {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifiers: BTreeMap<NumericAttribute, i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub professions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Skill>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceConfig>,
}

impl AttributeModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the delta for `attr` (deltas for the same attribute stack).
    pub fn with(mut self, attr: impl Into<NumericAttribute>, delta: i32) -> Self {
        let entry = self.modifiers.entry(attr.into()).or_insert(0);
        *entry = entry.saturating_add(delta);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.professions.push(profession.into());
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_choice(mut self, choice: impl Into<ChoiceConfig>) -> Self {
        self.choices.push(choice.into());
        self
    }

    /// Delta for one attribute, 0 when absent.
    pub fn delta(&self, attr: NumericAttribute) -> i32 {
        self.modifiers.get(&attr).copied().unwrap_or(0)
    }

    #[inline]
    pub fn choices(&self) -> &[ChoiceConfig] {
        &self.choices
    }

    pub fn has_effects(&self) -> bool {
        !(self.modifiers.is_empty()
            && self.languages.is_empty()
            && self.professions.is_empty()
            && self.skills.is_empty())
    }

    /// Adds the numeric deltas and appends the list additions. Duplicates in
    /// the lists are kept here; resolution removes them at the end.
    pub fn apply_to(&self, main: &mut MainAttributes, secondary: &mut SecondaryAttributes) {
        for (&attr, &delta) in &self.modifiers {
            match attr.as_main() {
                Some(main_attr) => main.add(main_attr, delta),
                None => secondary.add(attr, delta),
            }
        }
        secondary.languages.extend(self.languages.iter().cloned());
        secondary.professions.extend(self.professions.iter().cloned());
        secondary.skills.extend(self.skills.iter().cloned());
    }
}

macro_rules! into_choice_config {
    ($($choice:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<super::$choice> for ChoiceConfig {
                fn from(choice: super::$choice) -> Self {
                    ChoiceConfig::$variant(choice)
                }
            }
        )*
    };
}

into_choice_config! {
    AttributeChoice => Attribute,
    SkillChoice => Skill,
    ProfessionChoice => Profession,
    LanguageChoice => Language,
    SpellChoice => Spell,
}
