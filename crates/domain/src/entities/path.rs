//! Path entity - Novice, Expert and Master progressions
//!
//! A path binds [`AttributeModifier`]s to the character levels of its tier.
//! Tier levels are not contiguous (a novice path triggers at 1, 2, 5 and 8),
//! so modifiers live in a sparse map keyed by the exact threshold level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::DomainError;
use crate::observer::AttributeObserver;
use crate::value_objects::{
    AttributeModifier, AvailableChoice, ChoiceConfig, ChoiceLocation, ChoiceSource,
    MainAttributes, SecondaryAttributes,
};

/// Which path slot a path occupies, and at which levels it grants benefits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathTier {
    Novice,
    Expert,
    Master,
}

impl PathTier {
    pub const ALL: [PathTier; 3] = [PathTier::Novice, PathTier::Expert, PathTier::Master];

    /// Threshold levels, ascending.
    pub const fn levels(&self) -> &'static [u32] {
        match self {
            Self::Novice => &[1, 2, 5, 8],
            Self::Expert => &[3, 6, 9],
            Self::Master => &[7, 10],
        }
    }

    pub fn is_threshold(&self, level: u32) -> bool {
        self.levels().contains(&level)
    }

    /// The choice source of this tier's slot.
    pub fn source(&self) -> ChoiceSource {
        match self {
            Self::Novice => ChoiceSource::NovicePath,
            Self::Expert => ChoiceSource::ExpertPath,
            Self::Master => ChoiceSource::MasterPath,
        }
    }

    /// Inverse of [`PathTier::source`]; `None` for the ancestry.
    pub fn from_source(source: ChoiceSource) -> Option<Self> {
        match source {
            ChoiceSource::Ancestry => None,
            ChoiceSource::NovicePath => Some(Self::Novice),
            ChoiceSource::ExpertPath => Some(Self::Expert),
            ChoiceSource::MasterPath => Some(Self::Master),
        }
    }
}

impl fmt::Display for PathTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Novice => "novice",
            Self::Expert => "expert",
            Self::Master => "master",
        };
        write!(f, "{}", name)
    }
}

/// An immutable progression path. Characters share it through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PathSchema", into = "PathSchema")]
pub struct Path {
    name: String,
    tier: PathTier,
    description: Option<String>,
    levels: BTreeMap<u32, AttributeModifier>,
}

impl Path {
    /// Creates a path, rejecting modifiers bound to levels that are not
    /// thresholds of `tier`. Missing thresholds simply grant nothing.
    pub fn new(
        name: impl Into<String>,
        tier: PathTier,
        levels: impl IntoIterator<Item = (u32, AttributeModifier)>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Path name cannot be empty"));
        }
        let mut bound = BTreeMap::new();
        for (level, modifier) in levels {
            if !tier.is_threshold(level) {
                return Err(DomainError::validation(format!(
                    "{} path '{}' cannot grant benefits at level {} (allowed: {:?})",
                    tier,
                    name,
                    level,
                    tier.levels()
                )));
            }
            if bound.insert(level, modifier).is_some() {
                return Err(DomainError::validation(format!(
                    "{} path '{}' binds level {} twice",
                    tier, name, level
                )));
            }
        }
        Ok(Self {
            name,
            tier,
            description: None,
            levels: bound,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tier(&self) -> PathTier {
        self.tier
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn source(&self) -> ChoiceSource {
        self.tier.source()
    }

    /// The modifier bound to exactly `level`.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidArgument` for a negative level.
    pub fn modifier_at(&self, level: i32) -> Result<Option<&AttributeModifier>, DomainError> {
        let level = u32::try_from(level).map_err(|_| {
            DomainError::invalid_argument(format!("Level cannot be negative: {}", level))
        })?;
        Ok(self.levels.get(&level))
    }

    /// Modifiers active at `character_level`, ascending by threshold.
    pub fn active_modifiers(
        &self,
        character_level: u32,
    ) -> impl Iterator<Item = (u32, &AttributeModifier)> + '_ {
        self.levels
            .range(..=character_level)
            .map(|(level, modifier)| (*level, modifier))
    }

    /// Applies every active modifier in ascending level order.
    pub fn apply_modifiers(
        &self,
        character_level: u32,
        main: &mut MainAttributes,
        secondary: &mut SecondaryAttributes,
        observer: &dyn AttributeObserver,
    ) {
        for (level, modifier) in self.active_modifiers(character_level) {
            modifier.apply_to(main, secondary);
            observer.modifier_applied(ChoiceLocation::new(self.source(), level), modifier);
        }
    }

    /// `(threshold, choice)` pairs unlocked up to `character_level`, ascending.
    /// Several choices on one modifier surface as separate entries.
    pub fn choices(&self, character_level: u32) -> Vec<(u32, &ChoiceConfig)> {
        self.active_modifiers(character_level)
            .flat_map(|(level, modifier)| modifier.choices().iter().map(move |c| (level, c)))
            .collect()
    }

    /// Keyed choices unlocked up to `character_level`.
    pub fn available_choices(&self, character_level: u32) -> Vec<AvailableChoice<'_>> {
        self.active_modifiers(character_level)
            .flat_map(|(level, modifier)| {
                AvailableChoice::enumerate(
                    ChoiceLocation::new(self.source(), level),
                    modifier.choices(),
                )
            })
            .collect()
    }
}

/// JSON shape: `{name, type, description?, levels: {"1": modifier, ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathSchema {
    name: String,
    #[serde(rename = "type")]
    tier: PathTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    levels: BTreeMap<u32, AttributeModifier>,
}

impl TryFrom<PathSchema> for Path {
    type Error = DomainError;

    fn try_from(schema: PathSchema) -> Result<Self, Self::Error> {
        let path = Path::new(schema.name, schema.tier, schema.levels)?;
        Ok(match schema.description {
            Some(description) => path.with_description(description),
            None => path,
        })
    }
}

impl From<Path> for PathSchema {
    fn from(path: Path) -> Self {
        Self {
            name: path.name,
            tier: path.tier,
            description: path.description,
            levels: path.levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{MockAttributeObserver, NoopObserver};
    use crate::value_objects::{AttributeChoice, MainAttribute, NumericAttribute};

    fn health(delta: i32) -> AttributeModifier {
        AttributeModifier::new().with(NumericAttribute::Health, delta)
    }

    #[test]
    fn test_rejects_non_threshold_level() {
        let result = Path::new("Warrior", PathTier::Novice, [(3, health(5))]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(Path::new("Assassin", PathTier::Expert, [(3, health(2))]).is_ok());
    }

    #[test]
    fn test_modifier_at_negative_level_is_invalid_argument() {
        let path = Path::new("Warrior", PathTier::Novice, [(1, health(5))]).unwrap();
        assert!(matches!(
            path.modifier_at(-1),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(path.modifier_at(1).unwrap(), Some(&health(5)));
        assert_eq!(path.modifier_at(2).unwrap(), None);
    }

    #[test]
    fn test_apply_modifiers_is_level_gated_and_additive() {
        let path = Path::new(
            "Warrior",
            PathTier::Novice,
            [
                (1, AttributeModifier::new().with(MainAttribute::Strength, 1)),
                (2, AttributeModifier::new().with(MainAttribute::Strength, 1)),
                (5, health(5)),
            ],
        )
        .unwrap();

        let mut main = MainAttributes::new(10, 10, 10, 10);
        let mut secondary = SecondaryAttributes::default();
        path.apply_modifiers(2, &mut main, &mut secondary, &NoopObserver);
        assert_eq!(main.strength, 12);
        assert_eq!(secondary.health, 0);
    }

    #[test]
    fn test_apply_modifiers_notifies_observer_in_level_order() {
        let path = Path::new("Warrior", PathTier::Novice, [(5, health(1)), (1, health(1))]).unwrap();
        let mut observer = MockAttributeObserver::new();
        let mut seq = mockall::Sequence::new();
        for level in [1, 5] {
            observer
                .expect_modifier_applied()
                .withf(move |location, _| location.level == level)
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }

        let mut main = MainAttributes::default();
        let mut secondary = SecondaryAttributes::default();
        path.apply_modifiers(8, &mut main, &mut secondary, &observer);
        assert_eq!(secondary.health, 2);
    }

    #[test]
    fn test_choices_ascending_and_flattened() {
        let path = Path::new(
            "Warrior",
            PathTier::Novice,
            [
                (
                    2,
                    AttributeModifier::new()
                        .with_choice(AttributeChoice::new(1, 1))
                        .with_choice(AttributeChoice::new(2, 1)),
                ),
                (1, AttributeModifier::new().with_choice(AttributeChoice::new(1, 1))),
            ],
        )
        .unwrap();

        let levels: Vec<u32> = path.choices(8).into_iter().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![1, 2, 2]);
        assert_eq!(path.choices(1).len(), 1);
        assert!(path.choices(0).is_empty());

        let keys: Vec<String> = path
            .available_choices(2)
            .into_iter()
            .map(|c| c.key.to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "novicePath-1-attribute-0",
                "novicePath-2-attribute-0",
                "novicePath-2-attribute-1"
            ]
        );
    }

    #[test]
    fn test_active_set_grows_with_level() {
        let path = Path::new(
            "Warrior",
            PathTier::Novice,
            PathTier::Novice.levels().iter().map(|l| (*l, health(1))),
        )
        .unwrap();
        for level in 0..10 {
            let lower: Vec<u32> = path.active_modifiers(level).map(|(l, _)| l).collect();
            let upper: Vec<u32> = path.active_modifiers(level + 1).map(|(l, _)| l).collect();
            assert!(lower.iter().all(|l| upper.contains(l)));
        }
    }

    #[test]
    fn test_json_roundtrip_validates_levels() {
        let json = r#"{
            "name": "Assassin",
            "type": "expert",
            "levels": {"3": {"modifiers": {"agility": 1}}, "6": {"modifiers": {"health": 2}}}
        }"#;
        let path: Path = serde_json::from_str(json).unwrap();
        assert_eq!(path.tier(), PathTier::Expert);
        assert_eq!(path.active_modifiers(6).count(), 2);

        let bad = r#"{"name": "Assassin", "type": "expert", "levels": {"4": {}}}"#;
        assert!(serde_json::from_str::<Path>(bad).is_err());
    }
}
