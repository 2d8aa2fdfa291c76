//! Value objects - Immutable objects defined by their attributes

mod attributes;
mod calculation;
mod choice;
mod choice_key;
mod formula;
mod modifier;
mod names;
mod validation_config;

pub use attributes::{
    AttributeSheet, MainAttribute, MainAttributes, NumericAttribute, SecondaryAttributes, Skill,
};
pub use calculation::{CalculationRule, Operation, SecondaryAttributeRules};
pub use choice::{
    AttributeChoice, ChoiceConfig, ChoiceIssue, ChoiceType, LanguageChoice, ProfessionChoice,
    Reconciliation, SkillChoice, SpellChoice, SpellChoiceKind, SpellChoiceSlot, SpellSelection,
};
pub use choice_key::{AvailableChoice, ChoiceKey, ChoiceLocation, ChoiceSource, StoredChoice};
pub use formula::{BinaryOp, Expr, Formula, FormulaError, FormulaVar};
pub use modifier::AttributeModifier;
pub use names::CharacterName;
pub use validation_config::ChoiceValidationConfig;
