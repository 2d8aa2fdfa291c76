extern crate self as charforge_domain;

pub mod common;

pub mod aggregates;
pub mod choice_manager;
pub mod entities;
pub mod error;
pub mod ids;
pub mod observer;
pub mod spell_registry;
pub mod value_objects;

#[cfg(test)]
mod test_fixtures;

pub use aggregates::{Character, InvalidChoice, ValidationReport};
pub use choice_manager::{ChoiceBehavior, ChoiceManager, Selectable, WeightedConfig};
pub use entities::{
    Ancestry, Path, PathTier, Spell, SpellTradition, SpellType, ANCESTRY_MODIFIER_LEVEL,
    INITIAL_CHOICE_LEVEL,
};
pub use error::DomainError;
pub use ids::CharacterId;
pub use observer::{AttributeObserver, NoopObserver, TracingObserver, ValidationAction};
pub use spell_registry::SpellRegistry;

// Re-export the value objects used across crate boundaries
pub use value_objects::{
    AttributeChoice, AttributeModifier, AttributeSheet, AvailableChoice, CalculationRule,
    CharacterName, ChoiceConfig, ChoiceIssue, ChoiceKey, ChoiceLocation, ChoiceSource, ChoiceType,
    ChoiceValidationConfig, Formula, FormulaError, LanguageChoice, MainAttribute, MainAttributes,
    NumericAttribute, Operation, ProfessionChoice, SecondaryAttributeRules, SecondaryAttributes,
    Skill, SkillChoice, SpellChoice, SpellChoiceKind, SpellChoiceSlot, SpellSelection,
    StoredChoice,
};
