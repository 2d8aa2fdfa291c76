//! Calculation rules for secondary attributes.
//!
//! A closed set of rule kinds, interpreted at resolution time:
//! - `fixed`: a constant
//! - `attributeBased`: another attribute combined with a constant
//! - `formula`: a parsed [`Formula`]
//!
//! Every rule may carry a `minimum` that clamps the result from below.

use serde::{Deserialize, Serialize};

use super::{Formula, MainAttributes, NumericAttribute, SecondaryAttributes, Skill};
use crate::error::DomainError;

/// How an `attributeBased` rule combines its source with the modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    #[default]
    Add,
    Subtract,
    Multiply,
    /// Floored division
    Divide,
}

/// A rule deriving one numeric secondary attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", try_from = "RawCalculationRule")]
pub enum CalculationRule {
    Fixed {
        value: i32,
    },
    #[serde(rename_all = "camelCase")]
    AttributeBased {
        source_attribute: NumericAttribute,
        operation: Operation,
        modifier: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i32>,
    },
    Formula {
        formula: Formula,
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i32>,
    },
}

impl CalculationRule {
    /// A rule that always yields `value`.
    pub fn fixed(value: i32) -> Self {
        Self::Fixed { value }
    }

    /// A rule that copies another attribute.
    pub fn copy_of(source: NumericAttribute) -> Self {
        Self::AttributeBased {
            source_attribute: source,
            operation: Operation::Add,
            modifier: 0,
            minimum: None,
        }
    }

    /// A rule combining another attribute with a constant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a division by zero.
    pub fn attribute_based(
        source: NumericAttribute,
        operation: Operation,
        modifier: i32,
    ) -> Result<Self, DomainError> {
        if operation == Operation::Divide && modifier == 0 {
            return Err(DomainError::validation(format!(
                "Rule based on {} cannot divide by zero",
                source
            )));
        }
        Ok(Self::AttributeBased {
            source_attribute: source,
            operation,
            modifier,
            minimum: None,
        })
    }

    /// A rule evaluating a formula string.
    pub fn formula(formula: &str) -> Result<Self, DomainError> {
        Ok(Self::Formula {
            formula: Formula::parse(formula)?,
            minimum: None,
        })
    }

    /// Clamp the rule's result to at least `minimum`. No effect on fixed rules.
    pub fn with_minimum(self, floor: i32) -> Self {
        match self {
            Self::Fixed { .. } => self,
            Self::AttributeBased {
                source_attribute,
                operation,
                modifier,
                ..
            } => Self::AttributeBased {
                source_attribute,
                operation,
                modifier,
                minimum: Some(floor),
            },
            Self::Formula { formula, .. } => Self::Formula {
                formula,
                minimum: Some(floor),
            },
        }
    }

    /// Evaluates the rule against the working sheet.
    ///
    /// Secondary attributes that have not been computed yet read as their
    /// current (initially zero) value.
    pub fn evaluate(
        &self,
        main: &MainAttributes,
        level: u32,
        secondary: &SecondaryAttributes,
    ) -> i32 {
        match self {
            Self::Fixed { value } => *value,
            Self::AttributeBased {
                source_attribute,
                operation,
                modifier,
                minimum,
            } => {
                let source = source_attribute.read(main, secondary);
                let value = match operation {
                    Operation::Add => source.saturating_add(*modifier),
                    Operation::Subtract => source.saturating_sub(*modifier),
                    Operation::Multiply => source.saturating_mul(*modifier),
                    Operation::Divide => (f64::from(source) / f64::from(*modifier)).floor() as i32,
                };
                clamp(value, *minimum)
            }
            Self::Formula { formula, minimum } => {
                let value = formula.evaluate(main, level, secondary).unwrap_or_else(|| {
                    tracing::warn!(
                        formula = formula.as_str(),
                        "Division by zero while evaluating formula, using 0"
                    );
                    0
                });
                clamp(value, *minimum)
            }
        }
    }
}

fn clamp(value: i32, minimum: Option<i32>) -> i32 {
    minimum.map_or(value, |min| value.max(min))
}

// Deserialization goes through the constructor checks
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum RawCalculationRule {
    Fixed {
        value: i32,
    },
    #[serde(rename_all = "camelCase")]
    AttributeBased {
        source_attribute: NumericAttribute,
        #[serde(default)]
        operation: Operation,
        #[serde(default)]
        modifier: i32,
        #[serde(default)]
        minimum: Option<i32>,
    },
    Formula {
        formula: Formula,
        #[serde(default)]
        minimum: Option<i32>,
    },
}

impl TryFrom<RawCalculationRule> for CalculationRule {
    type Error = DomainError;

    fn try_from(raw: RawCalculationRule) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawCalculationRule::Fixed { value } => Self::Fixed { value },
            RawCalculationRule::AttributeBased {
                source_attribute,
                operation,
                modifier,
                minimum,
            } => {
                let rule = Self::attribute_based(source_attribute, operation, modifier)?;
                match minimum {
                    Some(min) => rule.with_minimum(min),
                    None => rule,
                }
            }
            RawCalculationRule::Formula { formula, minimum } => Self::Formula { formula, minimum },
        })
    }
}

/// The full set of derivation rules an ancestry supplies, one per secondary
/// attribute, plus the default lists every member of the ancestry starts with.
///
/// Missing rules deserialize to the defaults of [`SecondaryAttributeRules::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecondaryAttributeRules {
    pub perception: CalculationRule,
    pub defense: CalculationRule,
    pub health: CalculationRule,
    pub healing_rate: CalculationRule,
    pub size: CalculationRule,
    pub speed: CalculationRule,
    pub power: CalculationRule,
    pub damage: CalculationRule,
    pub insanity: CalculationRule,
    pub corruption: CalculationRule,
    pub languages: Vec<String>,
    pub professions: Vec<String>,
    pub skills: Vec<Skill>,
}

impl Default for SecondaryAttributeRules {
    /// Perception from intellect, defense from agility, health from strength,
    /// healing rate a quarter of health; size 1, speed 10, everything else 0.
    fn default() -> Self {
        Self {
            perception: CalculationRule::copy_of(NumericAttribute::Intellect),
            defense: CalculationRule::copy_of(NumericAttribute::Agility),
            health: CalculationRule::copy_of(NumericAttribute::Strength),
            healing_rate: CalculationRule::AttributeBased {
                source_attribute: NumericAttribute::Health,
                operation: Operation::Divide,
                modifier: 4,
                minimum: None,
            },
            size: CalculationRule::fixed(1),
            speed: CalculationRule::fixed(10),
            power: CalculationRule::fixed(0),
            damage: CalculationRule::fixed(0),
            insanity: CalculationRule::fixed(0),
            corruption: CalculationRule::fixed(0),
            languages: Vec::new(),
            professions: Vec::new(),
            skills: Vec::new(),
        }
    }
}

impl SecondaryAttributeRules {
    /// Returns the rule for a numeric secondary attribute.
    pub fn rule(&self, attr: NumericAttribute) -> Option<&CalculationRule> {
        match attr {
            NumericAttribute::Perception => Some(&self.perception),
            NumericAttribute::Defense => Some(&self.defense),
            NumericAttribute::Health => Some(&self.health),
            NumericAttribute::HealingRate => Some(&self.healing_rate),
            NumericAttribute::Size => Some(&self.size),
            NumericAttribute::Speed => Some(&self.speed),
            NumericAttribute::Power => Some(&self.power),
            NumericAttribute::Damage => Some(&self.damage),
            NumericAttribute::Insanity => Some(&self.insanity),
            NumericAttribute::Corruption => Some(&self.corruption),
            _ => None,
        }
    }

    /// Replace the rule for one numeric secondary attribute.
    pub fn with_rule(mut self, attr: NumericAttribute, rule: CalculationRule) -> Self {
        let slot = match attr {
            NumericAttribute::Perception => &mut self.perception,
            NumericAttribute::Defense => &mut self.defense,
            NumericAttribute::Health => &mut self.health,
            NumericAttribute::HealingRate => &mut self.healing_rate,
            NumericAttribute::Size => &mut self.size,
            NumericAttribute::Speed => &mut self.speed,
            NumericAttribute::Power => &mut self.power,
            NumericAttribute::Damage => &mut self.damage,
            NumericAttribute::Insanity => &mut self.insanity,
            NumericAttribute::Corruption => &mut self.corruption,
            _ => return self,
        };
        *slot = rule;
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_professions<I, S>(mut self, professions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.professions = professions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    /// Derives the secondary attributes from `main` at `level`.
    ///
    /// Health runs first and healing rate last; the remaining rules run in
    /// declaration order and see every value computed before them.
    pub fn compute(&self, main: &MainAttributes, level: u32) -> SecondaryAttributes {
        let mut secondary = SecondaryAttributes {
            languages: self.languages.clone(),
            professions: self.professions.clone(),
            skills: self.skills.clone(),
            ..Default::default()
        };

        secondary.health = self.health.evaluate(main, level, &secondary);

        for attr in NumericAttribute::SECONDARY {
            if matches!(attr, NumericAttribute::Health | NumericAttribute::HealingRate) {
                continue;
            }
            if let Some(rule) = self.rule(attr) {
                let value = rule.evaluate(main, level, &secondary);
                secondary.set(attr, value);
            }
        }

        secondary.healing_rate = self.healing_rate(main, level, &secondary);
        secondary
    }

    /// Evaluates only the healing-rate rule against a finished sheet.
    pub fn healing_rate(
        &self,
        main: &MainAttributes,
        level: u32,
        secondary: &SecondaryAttributes,
    ) -> i32 {
        self.healing_rate.evaluate(main, level, secondary)
    }
}
