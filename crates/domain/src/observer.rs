//! Telemetry hooks for attribute resolution and choice validation.
//!
//! The domain never logs on its own; a [`Character`] reports what it does
//! to an [`AttributeObserver`]. [`TracingObserver`] forwards to `tracing`,
//! [`NoopObserver`] drops everything.
//!
//! [`Character`]: crate::aggregates::Character

use crate::value_objects::{
    AttributeModifier, AttributeSheet, ChoiceIssue, ChoiceKey, ChoiceLocation,
};

/// What validation did to a stored choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationAction {
    Trimmed,
    Removed,
    /// Invalid but left untouched because invalid choices are preserved
    Preserved,
}

#[cfg_attr(test, mockall::automock)]
pub trait AttributeObserver: Send + Sync {
    /// A level modifier from an ancestry or path was applied.
    fn modifier_applied(&self, location: ChoiceLocation, modifier: &AttributeModifier);

    /// An offered choice was resolved. `items` are the picks that took
    /// effect; `from_selection` is false when defaults were used.
    fn choice_resolved(&self, key: ChoiceKey, from_selection: bool, items: &[String]);

    /// Validation found problems with a stored choice and acted on them.
    fn choice_validated(&self, key: ChoiceKey, action: ValidationAction, issues: &[ChoiceIssue]);

    /// A full resolution pass finished.
    fn resolution_finished(&self, character: &str, level: u32, sheet: &AttributeSheet);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AttributeObserver for TracingObserver {
    fn modifier_applied(&self, location: ChoiceLocation, modifier: &AttributeModifier) {
        tracing::debug!(
            source = %location.source,
            level = location.level,
            deltas = ?modifier.modifiers,
            languages = ?modifier.languages,
            professions = ?modifier.professions,
            skills = modifier.skills.len(),
            "Applied level modifier"
        );
    }

    fn choice_resolved(&self, key: ChoiceKey, from_selection: bool, items: &[String]) {
        tracing::debug!(
            choice = %key,
            from_selection,
            items = ?items,
            "Resolved choice"
        );
    }

    fn choice_validated(&self, key: ChoiceKey, action: ValidationAction, issues: &[ChoiceIssue]) {
        match action {
            ValidationAction::Preserved => {
                tracing::debug!(choice = %key, issues = ?issues, "Keeping invalid choice")
            }
            _ => tracing::info!(
                choice = %key,
                action = ?action,
                issues = ?issues,
                "Corrected stored choice"
            ),
        }
    }

    fn resolution_finished(&self, character: &str, level: u32, sheet: &AttributeSheet) {
        tracing::debug!(
            character,
            level,
            strength = sheet.main.strength,
            agility = sheet.main.agility,
            intellect = sheet.main.intellect,
            will = sheet.main.will,
            health = sheet.secondary.health,
            healing_rate = sheet.secondary.healing_rate,
            "Resolved attributes"
        );
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AttributeObserver for NoopObserver {
    fn modifier_applied(&self, _location: ChoiceLocation, _modifier: &AttributeModifier) {}

    fn choice_resolved(&self, _key: ChoiceKey, _from_selection: bool, _items: &[String]) {}

    fn choice_validated(
        &self,
        _key: ChoiceKey,
        _action: ValidationAction,
        _issues: &[ChoiceIssue],
    ) {
    }

    fn resolution_finished(&self, _character: &str, _level: u32, _sheet: &AttributeSheet) {}
}
