//! Spell and tradition entities.
//!
//! Spells belong to exactly one tradition and carry a rank; a character can
//! learn a spell when its rank does not exceed the character's power.

use serde::{Deserialize, Serialize};

use crate::value_objects::MainAttribute;

/// A spell from a tradition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    /// Unique identifier (e.g., "flame_missile")
    pub id: String,
    pub name: String,
    /// Id of the owning tradition
    pub tradition: String,
    #[serde(rename = "type")]
    pub spell_type: SpellType,
    /// Rank 0 spells are available with no power at all
    #[serde(alias = "level")]
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, alias = "effect")]
    pub description: String,
}

impl Spell {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tradition: impl Into<String>,
        spell_type: SpellType,
        rank: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tradition: tradition.into(),
            spell_type,
            rank,
            range: None,
            duration: None,
            target: None,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellType {
    Attack,
    Utility,
}

/// A school of magic a character can discover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellTradition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_dark: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_attribute: Option<MainAttribute>,
}

impl SpellTradition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            is_dark: false,
            primary_attribute: None,
        }
    }
}
