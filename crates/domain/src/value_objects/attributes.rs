//! Attribute value objects - the numbers and lists that make up a character sheet.
//!
//! Provides type safety for attribute references instead of magic strings like
//! "strength" or "healingRate". The string forms still exist because data files
//! and formulas refer to attributes by name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One of the four main attributes every ancestry defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MainAttribute {
    /// Physical power and health
    Strength,
    /// Reflexes and defense
    Agility,
    /// Reasoning and perception
    Intellect,
    /// Resolve and spiritual power
    Will,
}

impl MainAttribute {
    /// All main attributes in sheet order.
    pub const ALL: [MainAttribute; 4] = [
        Self::Strength,
        Self::Agility,
        Self::Intellect,
        Self::Will,
    ];

    /// Returns the camelCase name used in data files (e.g., "strength").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Intellect => "intellect",
            Self::Will => "will",
        }
    }
}

impl fmt::Display for MainAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MainAttribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Ok(Self::Strength),
            "agility" | "agi" => Ok(Self::Agility),
            "intellect" | "int" => Ok(Self::Intellect),
            "will" | "wil" => Ok(Self::Will),
            _ => Err(DomainError::parse(format!("Unknown main attribute: {}", s))),
        }
    }
}

/// Any attribute with a single integer value: the four main attributes plus
/// the ten numeric secondary attributes.
///
/// Used as the key of modifier deltas and as a source in calculation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericAttribute {
    Strength,
    Agility,
    Intellect,
    Will,
    Perception,
    Defense,
    Health,
    HealingRate,
    Size,
    Speed,
    Power,
    Damage,
    Insanity,
    Corruption,
}

impl NumericAttribute {
    /// The numeric secondary attributes, in the order their rules are declared.
    pub const SECONDARY: [NumericAttribute; 10] = [
        Self::Perception,
        Self::Defense,
        Self::Health,
        Self::HealingRate,
        Self::Size,
        Self::Speed,
        Self::Power,
        Self::Damage,
        Self::Insanity,
        Self::Corruption,
    ];

    /// Returns the camelCase name used in data files and formulas.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Intellect => "intellect",
            Self::Will => "will",
            Self::Perception => "perception",
            Self::Defense => "defense",
            Self::Health => "health",
            Self::HealingRate => "healingRate",
            Self::Size => "size",
            Self::Speed => "speed",
            Self::Power => "power",
            Self::Damage => "damage",
            Self::Insanity => "insanity",
            Self::Corruption => "corruption",
        }
    }

    /// Returns the main attribute this refers to, if it is one.
    pub fn as_main(&self) -> Option<MainAttribute> {
        match self {
            Self::Strength => Some(MainAttribute::Strength),
            Self::Agility => Some(MainAttribute::Agility),
            Self::Intellect => Some(MainAttribute::Intellect),
            Self::Will => Some(MainAttribute::Will),
            _ => None,
        }
    }

    /// Reads the current value of this attribute from a working sheet.
    pub fn read(&self, main: &MainAttributes, secondary: &SecondaryAttributes) -> i32 {
        match self.as_main() {
            Some(attr) => main.get(attr),
            None => secondary.get(*self).unwrap_or(0),
        }
    }
}

impl From<MainAttribute> for NumericAttribute {
    fn from(attr: MainAttribute) -> Self {
        match attr {
            MainAttribute::Strength => Self::Strength,
            MainAttribute::Agility => Self::Agility,
            MainAttribute::Intellect => Self::Intellect,
            MainAttribute::Will => Self::Will,
        }
    }
}

impl fmt::Display for NumericAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NumericAttribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(main) = s.parse::<MainAttribute>() {
            return Ok(main.into());
        }
        Self::SECONDARY
            .iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DomainError::parse(format!("Unknown attribute: {}", s)))
    }
}

/// A named talent or ability.
///
/// Two skills are the same skill when their names match; descriptions are
/// informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Skill {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The four main attributes of a character (working copy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainAttributes {
    pub strength: i32,
    pub agility: i32,
    pub intellect: i32,
    pub will: i32,
}

impl MainAttributes {
    pub fn new(strength: i32, agility: i32, intellect: i32, will: i32) -> Self {
        Self {
            strength,
            agility,
            intellect,
            will,
        }
    }

    pub fn get(&self, attr: MainAttribute) -> i32 {
        match attr {
            MainAttribute::Strength => self.strength,
            MainAttribute::Agility => self.agility,
            MainAttribute::Intellect => self.intellect,
            MainAttribute::Will => self.will,
        }
    }

    /// Adds `delta` to one attribute.
    pub fn add(&mut self, attr: MainAttribute, delta: i32) {
        match attr {
            MainAttribute::Strength => self.strength = self.strength.saturating_add(delta),
            MainAttribute::Agility => self.agility = self.agility.saturating_add(delta),
            MainAttribute::Intellect => self.intellect = self.intellect.saturating_add(delta),
            MainAttribute::Will => self.will = self.will.saturating_add(delta),
        }
    }
}

/// Attributes derived from the main attributes by an ancestry's rules, then
/// adjusted by modifiers and choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryAttributes {
    pub perception: i32,
    pub defense: i32,
    pub health: i32,
    pub healing_rate: i32,
    pub size: i32,
    pub speed: i32,
    pub power: i32,
    pub damage: i32,
    pub insanity: i32,
    pub corruption: i32,
    /// Order-preserving, duplicate-free after resolution
    pub languages: Vec<String>,
    /// Order-preserving, duplicate-free after resolution
    pub professions: Vec<String>,
    pub skills: Vec<Skill>,
}

impl SecondaryAttributes {
    /// Returns the value of a numeric secondary attribute, or `None` for a
    /// main attribute.
    pub fn get(&self, attr: NumericAttribute) -> Option<i32> {
        self.slot(attr).map(|value| *value)
    }

    /// Overwrites a numeric secondary attribute. Main attributes are ignored.
    pub fn set(&mut self, attr: NumericAttribute, value: i32) {
        if let Some(slot) = self.slot_mut(attr) {
            *slot = value;
        }
    }

    /// Adds `delta` to a numeric secondary attribute. Main attributes are ignored.
    pub fn add(&mut self, attr: NumericAttribute, delta: i32) {
        if let Some(slot) = self.slot_mut(attr) {
            *slot = slot.saturating_add(delta);
        }
    }

    /// Returns true if a skill with this name is present.
    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|skill| skill.name == name)
    }

    fn slot(&self, attr: NumericAttribute) -> Option<&i32> {
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

    fn slot_mut(&mut self, attr: NumericAttribute) -> Option<&mut i32> {
        match attr {
            NumericAttribute::Perception => Some(&mut self.perception),
            NumericAttribute::Defense => Some(&mut self.defense),
            NumericAttribute::Health => Some(&mut self.health),
            NumericAttribute::HealingRate => Some(&mut self.healing_rate),
            NumericAttribute::Size => Some(&mut self.size),
            NumericAttribute::Speed => Some(&mut self.speed),
            NumericAttribute::Power => Some(&mut self.power),
            NumericAttribute::Damage => Some(&mut self.damage),
            NumericAttribute::Insanity => Some(&mut self.insanity),
            NumericAttribute::Corruption => Some(&mut self.corruption),
            _ => None,
        }
    }
}

/// The fully resolved attribute snapshot of a character.
///
/// Serializes flat (`{"strength": 11, ..., "languages": [...]}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSheet {
    #[serde(flatten)]
    pub main: MainAttributes,
    #[serde(flatten)]
    pub secondary: SecondaryAttributes,
}

impl AttributeSheet {
    /// Reads any numeric attribute from the sheet.
    pub fn value(&self, attr: NumericAttribute) -> i32 {
        attr.read(&self.main, &self.secondary)
    }
}
