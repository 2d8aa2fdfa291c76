//! Where a choice comes from and the key a selection is stored under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ChoiceConfig, ChoiceType};
use crate::error::DomainError;

/// The progression source that offers a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceSource {
    Ancestry,
    NovicePath,
    ExpertPath,
    MasterPath,
}

impl ChoiceSource {
    /// Application order during attribute resolution.
    pub const ALL: [ChoiceSource; 4] = [
        ChoiceSource::Ancestry,
        ChoiceSource::NovicePath,
        ChoiceSource::ExpertPath,
        ChoiceSource::MasterPath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ancestry => "ancestry",
            Self::NovicePath => "novicePath",
            Self::ExpertPath => "expertPath",
            Self::MasterPath => "masterPath",
        }
    }
}

impl fmt::Display for ChoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChoiceSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown choice source: {}", s)))
    }
}

/// A source plus the level at which it offers a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceLocation {
    pub source: ChoiceSource,
    pub level: u32,
}

impl ChoiceLocation {
    pub fn new(source: ChoiceSource, level: u32) -> Self {
        Self { source, level }
    }
}

impl fmt::Display for ChoiceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.level)
    }
}

/// Composite key `{source}-{level}-{type}-{index}` identifying one offered
/// choice. `index` counts choices of the same type at the same location.
///
/// Keys order by source (ancestry first), then level, type and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChoiceKey {
    pub location: ChoiceLocation,
    pub choice_type: ChoiceType,
    pub index: usize,
}

impl ChoiceKey {
    pub fn new(location: ChoiceLocation, choice_type: ChoiceType, index: usize) -> Self {
        Self {
            location,
            choice_type,
            index,
        }
    }

    #[inline]
    pub fn source(&self) -> ChoiceSource {
        self.location.source
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.location.level
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.location, self.choice_type, self.index)
    }
}

impl FromStr for ChoiceKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let [source, level, choice_type, index] = parts.as_slice() else {
            return Err(DomainError::parse(format!(
                "Choice key must have four '-' separated parts: {}",
                s
            )));
        };
        let level = level
            .parse()
            .map_err(|_| DomainError::parse(format!("Invalid level in choice key: {}", s)))?;
        let index = index
            .parse()
            .map_err(|_| DomainError::parse(format!("Invalid index in choice key: {}", s)))?;
        Ok(Self::new(
            ChoiceLocation::new(source.parse()?, level),
            choice_type.parse()?,
            index,
        ))
    }
}

impl Serialize for ChoiceKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChoiceKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A choice currently offered to a character, borrowed from its ancestry
/// or path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailableChoice<'a> {
    pub key: ChoiceKey,
    pub config: &'a ChoiceConfig,
}

impl<'a> AvailableChoice<'a> {
    /// Keys the choices offered at one location, numbering each type
    /// separately in declaration order.
    pub fn enumerate(
        location: ChoiceLocation,
        configs: &'a [ChoiceConfig],
    ) -> impl Iterator<Item = AvailableChoice<'a>> + 'a {
        let mut seen: Vec<ChoiceType> = Vec::new();
        configs.iter().map(move |config| {
            let choice_type = config.choice_type();
            let index = seen.iter().filter(|t| **t == choice_type).count();
            seen.push(choice_type);
            AvailableChoice {
                key: ChoiceKey::new(location, choice_type, index),
                config,
            }
        })
    }
}

/// A selection in its persisted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChoice {
    pub source: ChoiceSource,
    pub level: u32,
    #[serde(rename = "type")]
    pub choice_type: ChoiceType,
    pub index: usize,
    pub selection: ChoiceConfig,
}

impl StoredChoice {
    pub fn key(&self) -> ChoiceKey {
        ChoiceKey::new(
            ChoiceLocation::new(self.source, self.level),
            self.choice_type,
            self.index,
        )
    }

    pub fn from_entry(key: ChoiceKey, selection: ChoiceConfig) -> Self {
        Self {
            source: key.source(),
            level: key.level(),
            choice_type: key.choice_type,
            index: key.index,
            selection,
        }
    }
}
