//! Character aggregate - ancestry, paths, level and stored choices
//!
//! # Design
//!
//! - **Shared content**: ancestries and paths are immutable and held through
//!   `Arc`, never copied into the character.
//! - **Derived attributes**: nothing derived is stored. Every call to
//!   [`Character::resolve_attributes`] recomputes the sheet from scratch.
//! - **Keyed choices**: player selections are stored under a
//!   [`ChoiceKey`] (`source-level-type-index`) and interpreted against
//!   whatever offer currently lives at that key.
//! - **Total choice operations**: storing, reading and validating choices
//!   never fail. Stale selections are trimmed or removed, not reported as
//!   errors.

mod resolution;
mod validation;

pub use validation::{InvalidChoice, ValidationReport};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::entities::{Ancestry, Path, PathTier};
use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::observer::{AttributeObserver, TracingObserver};
use crate::value_objects::{
    AvailableChoice, CharacterName, ChoiceConfig, ChoiceKey, ChoiceSource,
    ChoiceValidationConfig, StoredChoice,
};

/// A player character under construction.
///
/// # Invariants
///
/// - `level` only grows (`level_up`, `level_up_to`)
/// - each path slot holds a path of the matching tier
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use charforge_domain::aggregates::Character;
/// use charforge_domain::entities::Ancestry;
/// use charforge_domain::value_objects::{
///     AttributeModifier, CharacterName, MainAttributes, SecondaryAttributeRules,
/// };
///
/// let ancestry = Ancestry::new(
///     "Human",
///     MainAttributes::new(10, 10, 10, 10),
///     SecondaryAttributeRules::default().with_languages(["Common"]),
///     AttributeModifier::new(),
/// );
/// let mut character = Character::new(CharacterName::new("Edward").unwrap(), Arc::new(ancestry));
/// character.level_up();
///
/// let sheet = character.resolve_attributes();
/// assert_eq!(sheet.secondary.health, 10);
/// assert_eq!(sheet.secondary.languages, vec!["Common"]);
/// ```
#[derive(Clone)]
pub struct Character {
    id: CharacterId,
    name: CharacterName,
    level: u32,
    ancestry: Arc<Ancestry>,
    novice_path: Option<Arc<Path>>,
    expert_path: Option<Arc<Path>>,
    master_path: Option<Arc<Path>>,
    choices: BTreeMap<ChoiceKey, ChoiceConfig>,
    validation: ChoiceValidationConfig,
    observer: Arc<dyn AttributeObserver>,
}

impl Character {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// A level 0 character with no paths and no stored choices.
    pub fn new(name: CharacterName, ancestry: Arc<Ancestry>) -> Self {
        Self {
            id: CharacterId::new(),
            name,
            level: 0,
            ancestry,
            novice_path: None,
            expert_path: None,
            master_path: None,
            choices: BTreeMap::new(),
            validation: ChoiceValidationConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the telemetry observer (default: [`TracingObserver`]).
    pub fn with_observer(mut self, observer: Arc<dyn AttributeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_validation_config(mut self, config: ChoiceValidationConfig) -> Self {
        self.validation = config;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn ancestry(&self) -> &Arc<Ancestry> {
        &self.ancestry
    }

    pub fn path(&self, tier: PathTier) -> Option<&Arc<Path>> {
        match tier {
            PathTier::Novice => self.novice_path.as_ref(),
            PathTier::Expert => self.expert_path.as_ref(),
            PathTier::Master => self.master_path.as_ref(),
        }
    }

    #[inline]
    pub fn validation_config(&self) -> ChoiceValidationConfig {
        self.validation
    }

    fn path_slot(&mut self, tier: PathTier) -> &mut Option<Arc<Path>> {
        match tier {
            PathTier::Novice => &mut self.novice_path,
            PathTier::Expert => &mut self.expert_path,
            PathTier::Master => &mut self.master_path,
        }
    }

    // =========================================================================
    // Level
    // =========================================================================

    /// Raises the level by one and returns the new level.
    pub fn level_up(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    /// Raises the level to `target`.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidArgument` if `target` is below the current level.
    pub fn level_up_to(&mut self, target: u32) -> Result<u32, DomainError> {
        if target < self.level {
            return Err(DomainError::invalid_argument(format!(
                "Cannot lower level from {} to {}",
                self.level, target
            )));
        }
        self.level = target;
        Ok(self.level)
    }

    // =========================================================================
    // Ancestry & paths
    // =========================================================================

    /// Swaps the ancestry, re-validating ancestry choices when enabled.
    pub fn set_ancestry(&mut self, ancestry: Arc<Ancestry>) -> ValidationReport {
        self.ancestry = ancestry;
        if self.validation.validate_on_ancestry_change {
            self.validate_choices_for_source(ChoiceSource::Ancestry)
        } else {
            ValidationReport::default()
        }
    }

    /// Puts `path` into the slot of its tier, re-validating that slot's
    /// choices when enabled.
    pub fn set_path(&mut self, path: Arc<Path>) -> ValidationReport {
        let tier = path.tier();
        *self.path_slot(tier) = Some(path);
        self.after_path_change(tier)
    }

    /// Empties the slot of `tier`. Its stored choices go stale and are
    /// removed when path validation is enabled.
    pub fn remove_path(&mut self, tier: PathTier) -> ValidationReport {
        *self.path_slot(tier) = None;
        self.after_path_change(tier)
    }

    fn after_path_change(&mut self, tier: PathTier) -> ValidationReport {
        if self.validation.validate_on_path_change {
            self.validate_choices_for_source(tier.source())
        } else {
            ValidationReport::default()
        }
    }

    /// Replaces the validation settings. Turning a validation dimension on
    /// validates it right away, as does turning off preservation.
    pub fn set_validation_config(&mut self, config: ChoiceValidationConfig) -> ValidationReport {
        let previous = std::mem::replace(&mut self.validation, config);
        let mut report = ValidationReport::default();

        let revalidate_paths = config.enables_path_validation(&previous)
            || (config.stops_preserving(&previous) && config.validate_on_path_change);
        let revalidate_ancestry = config.enables_ancestry_validation(&previous)
            || (config.stops_preserving(&previous) && config.validate_on_ancestry_change);

        if revalidate_paths {
            report.merge(self.validate_all_choices());
        } else if revalidate_ancestry {
            report.merge(self.validate_choices_for_source(ChoiceSource::Ancestry));
        }
        report
    }

    // =========================================================================
    // Choices
    // =========================================================================

    /// Every choice currently offered: ancestry first, then novice, expert
    /// and master paths, each ascending by level.
    pub fn available_choices(&self) -> Vec<AvailableChoice<'_>> {
        self.available_choices_at(self.level)
    }

    /// Choices offered by one source at the current level.
    pub fn available_choices_for(&self, source: ChoiceSource) -> Vec<AvailableChoice<'_>> {
        self.source_choices_at(source, self.level)
    }

    pub(crate) fn available_choices_at(&self, level: u32) -> Vec<AvailableChoice<'_>> {
        ChoiceSource::ALL
            .into_iter()
            .flat_map(|source| self.source_choices_at(source, level))
            .collect()
    }

    fn source_choices_at(&self, source: ChoiceSource, level: u32) -> Vec<AvailableChoice<'_>> {
        match PathTier::from_source(source) {
            None => self.ancestry.available_choices(level),
            Some(tier) => self
                .path(tier)
                .map(|path| path.available_choices(level))
                .unwrap_or_default(),
        }
    }

    /// Stores a selection under `key`, replacing any previous one. The
    /// selection is not checked against the offer until validation runs.
    pub fn set_choice(&mut self, key: ChoiceKey, selection: ChoiceConfig) -> Option<ChoiceConfig> {
        self.choices.insert(key, selection)
    }

    /// The stored selection for `key`; `None` means "not chosen yet".
    pub fn choice(&self, key: &ChoiceKey) -> Option<&ChoiceConfig> {
        self.choices.get(key)
    }

    pub fn remove_choice(&mut self, key: &ChoiceKey) -> Option<ChoiceConfig> {
        self.choices.remove(key)
    }

    /// Removes the stored choices of one source, or all of them.
    pub fn clear_choices(&mut self, source: Option<ChoiceSource>) {
        match source {
            Some(source) => self.choices.retain(|key, _| key.source() != source),
            None => self.choices.clear(),
        }
    }

    pub fn stored_choices(&self) -> impl Iterator<Item = (&ChoiceKey, &ChoiceConfig)> {
        self.choices.iter()
    }

    /// Stored selections in their persisted form, ordered by key.
    pub fn export_choices(&self) -> Vec<StoredChoice> {
        self.choices
            .iter()
            .map(|(key, selection)| StoredChoice::from_entry(*key, selection.clone()))
            .collect()
    }

    /// Replaces every stored selection. Later entries win on duplicate keys.
    pub fn import_choices(&mut self, stored: impl IntoIterator<Item = StoredChoice>) {
        self.choices = stored
            .into_iter()
            .map(|choice| (choice.key(), choice.selection))
            .collect();
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("level", &self.level)
            .field("ancestry", &self.ancestry.name())
            .field("novice_path", &self.novice_path.as_ref().map(|p| p.name()))
            .field("expert_path", &self.expert_path.as_ref().map(|p| p.name()))
            .field("master_path", &self.master_path.as_ref().map(|p| p.name()))
            .field("choices", &self.choices.len())
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use crate::value_objects::{
        AttributeChoice, ChoiceLocation, ChoiceType, LanguageChoice, MainAttribute,
    };

    fn key(s: &str) -> ChoiceKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_character_starts_at_level_zero() {
        let character = test_fixtures::character("Lyra", test_fixtures::human());
        assert_eq!(character.level(), 0);
        assert_eq!(character.name().as_str(), "Lyra");
        assert!(character.path(PathTier::Novice).is_none());
        assert_eq!(character.stored_choices().count(), 0);
    }

    #[test]
    fn test_level_up_is_monotonic() {
        let mut character = test_fixtures::edward();
        assert_eq!(character.level_up(), 1);
        assert_eq!(character.level_up_to(4).unwrap(), 4);
        assert!(matches!(
            character.level_up_to(2),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(character.level(), 4);
    }

    #[test]
    fn test_set_path_routes_by_tier() {
        let character = test_fixtures::edward();
        assert_eq!(
            character.path(PathTier::Novice).map(|p| p.name()),
            Some("Warrior")
        );
        assert_eq!(
            character.path(PathTier::Expert).map(|p| p.name()),
            Some("Assassin")
        );
        assert_eq!(
            character.path(PathTier::Master).map(|p| p.name()),
            Some("Acrobat")
        );
    }

    #[test]
    fn test_available_choices_ordered_by_source_then_level() {
        let mut character = test_fixtures::edward();
        character.level_up_to(7).unwrap();
        let keys: Vec<String> = character
            .available_choices()
            .into_iter()
            .map(|c| c.key.to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                "ancestry-0-attribute-0",
                "ancestry-0-profession-0",
                "ancestry-4-skill-0",
                "ancestry-4-spell-0",
                "novicePath-1-attribute-0",
                "masterPath-7-attribute-0",
            ]
        );
    }

    #[test]
    fn test_available_choices_grow_with_level() {
        let mut character = test_fixtures::edward();
        let mut previous: Vec<ChoiceKey> = Vec::new();
        for _ in 0..10 {
            let current: Vec<ChoiceKey> =
                character.available_choices().into_iter().map(|c| c.key).collect();
            assert!(previous.iter().all(|k| current.contains(k)));
            previous = current;
            character.level_up();
        }
    }

    #[test]
    fn test_choice_crud() {
        let mut character = test_fixtures::edward();
        let initial = key("ancestry-0-attribute-0");
        let selection = ChoiceConfig::Attribute(
            AttributeChoice::new(1, 1).with_selected([MainAttribute::Will]),
        );

        assert!(character.choice(&initial).is_none());
        assert!(character.set_choice(initial, selection.clone()).is_none());
        assert_eq!(character.choice(&initial), Some(&selection));
        assert_eq!(character.remove_choice(&initial), Some(selection));
        assert!(character.choice(&initial).is_none());
    }

    #[test]
    fn test_clear_choices_by_source() {
        let mut character = test_fixtures::edward();
        let selection = ChoiceConfig::Language(LanguageChoice::new(1).with_selected(["Elvish"]));
        character.set_choice(key("ancestry-4-language-0"), selection.clone());
        character.set_choice(key("novicePath-1-language-0"), selection.clone());
        character.set_choice(key("masterPath-7-language-0"), selection);

        character.clear_choices(Some(ChoiceSource::NovicePath));
        let remaining: Vec<ChoiceSource> =
            character.stored_choices().map(|(k, _)| k.source()).collect();
        assert_eq!(
            remaining,
            vec![ChoiceSource::Ancestry, ChoiceSource::MasterPath]
        );

        character.clear_choices(None);
        assert_eq!(character.stored_choices().count(), 0);
    }

    #[test]
    fn test_export_import_preserves_choices() {
        let mut character = test_fixtures::edward();
        character.set_choice(
            ChoiceKey::new(
                ChoiceLocation::new(ChoiceSource::NovicePath, 1),
                ChoiceType::Attribute,
                0,
            ),
            ChoiceConfig::Attribute(
                AttributeChoice::new(2, 1)
                    .with_selected([MainAttribute::Will, MainAttribute::Intellect]),
            ),
        );
        let exported = character.export_choices();
        let json = serde_json::to_string(&exported).unwrap();

        let mut restored = test_fixtures::edward();
        restored.import_choices(serde_json::from_str::<Vec<StoredChoice>>(&json).unwrap());
        assert_eq!(restored.export_choices(), exported);
    }
}
