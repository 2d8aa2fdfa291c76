//! Choice configurations - what a player may pick and what they picked.
//!
//! The same type plays two roles:
//! - an *offer*, attached to an ancestry or path modifier (`count`,
//!   `available*`, `default*`)
//! - a *selection*, stored on the character under a [`ChoiceKey`]
//!   (`selected*`)
//!
//! A stored selection is always interpreted against the live offer: the
//! offer's `count` and `available*` lists win over whatever the selection
//! carries.
//!
//! [`ChoiceKey`]: super::ChoiceKey

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{MainAttribute, Skill};
use crate::error::DomainError;

/// Discriminant of [`ChoiceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceType {
    Attribute,
    Skill,
    Profession,
    Language,
    Spell,
}

impl ChoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Skill => "skill",
            Self::Profession => "profession",
            Self::Language => "language",
            Self::Spell => "spell",
        }
    }
}

impl fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChoiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attribute" => Ok(Self::Attribute),
            "skill" => Ok(Self::Skill),
            "profession" => Ok(Self::Profession),
            "language" => Ok(Self::Language),
            "spell" => Ok(Self::Spell),
            _ => Err(DomainError::parse(format!("Unknown choice type: {}", s))),
        }
    }
}

/// Increase `count` main attributes by `increase_by` each.
///
/// The same attribute may be selected more than once; each occurrence applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChoice {
    pub count: usize,
    pub increase_by: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_attributes: Option<Vec<MainAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_attributes: Option<Vec<MainAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_attributes: Option<Vec<MainAttribute>>,
}

impl AttributeChoice {
    pub fn new(count: usize, increase_by: i32) -> Self {
        Self {
            count,
            increase_by,
            available_attributes: None,
            default_attributes: None,
            selected_attributes: None,
        }
    }

    pub fn with_available(mut self, attrs: impl Into<Vec<MainAttribute>>) -> Self {
        self.available_attributes = Some(attrs.into());
        self
    }

    pub fn with_defaults(mut self, attrs: impl Into<Vec<MainAttribute>>) -> Self {
        self.default_attributes = Some(attrs.into());
        self
    }

    pub fn with_selected(mut self, attrs: impl Into<Vec<MainAttribute>>) -> Self {
        self.selected_attributes = Some(attrs.into());
        self
    }

    /// Attributes this offer raises given an optional stored selection:
    /// the selection, else the defaults, else the first `count` main
    /// attributes. Always truncated to this offer's `count`.
    pub fn effective_attributes(&self, stored: Option<&AttributeChoice>) -> Vec<MainAttribute> {
        let source: &[MainAttribute] = stored
            .and_then(|s| s.selected_attributes.as_deref())
            .or(self.default_attributes.as_deref())
            .unwrap_or(&MainAttribute::ALL);
        source.iter().take(self.count).copied().collect()
    }
}

/// Pick `count` skills from a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillChoice {
    pub count: usize,
    #[serde(default)]
    pub available_skills: Vec<Skill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_skills: Option<Vec<Skill>>,
}

impl SkillChoice {
    pub fn new(count: usize, available: Vec<Skill>) -> Self {
        Self {
            count,
            available_skills: available,
            selected_skills: None,
        }
    }

    pub fn with_selected(mut self, skills: Vec<Skill>) -> Self {
        self.selected_skills = Some(skills);
        self
    }

    /// Skills picked for this offer. Skills have no implicit default.
    pub fn effective_skills<'a>(&self, stored: Option<&'a SkillChoice>) -> Vec<&'a Skill> {
        stored
            .and_then(|s| s.selected_skills.as_deref())
            .unwrap_or_default()
            .iter()
            .take(self.count)
            .collect()
    }
}

/// Pick `count` professions. An empty `available_professions` list is an
/// open choice: any profession may be named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionChoice {
    pub count: usize,
    #[serde(default)]
    pub available_professions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_professions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_professions: Option<Vec<String>>,
}

impl ProfessionChoice {
    pub fn new<I, S>(count: usize, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            count,
            available_professions: available.into_iter().map(Into::into).collect(),
            default_professions: None,
            selected_professions: None,
        }
    }

    pub fn with_defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_professions = Some(defaults.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_selected<I, S>(mut self, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_professions = Some(selected.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_open(&self) -> bool {
        self.available_professions.is_empty()
    }

    /// The selection, else the defaults, truncated to `count`.
    pub fn effective_professions<'a>(&'a self, stored: Option<&'a ProfessionChoice>) -> Vec<&'a str> {
        stored
            .and_then(|s| s.selected_professions.as_deref())
            .or(self.default_professions.as_deref())
            .unwrap_or_default()
            .iter()
            .take(self.count)
            .map(String::as_str)
            .collect()
    }
}

/// Learn `count` languages. Without `available_languages` the choice is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChoice {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_languages: Option<Vec<String>>,
    #[serde(default)]
    pub can_read_existing: bool,
    #[serde(default)]
    pub can_learn_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_languages: Option<Vec<String>>,
    /// Per-language "can also write it" flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing_preferences: Option<BTreeMap<String, bool>>,
}

impl LanguageChoice {
    /// A free choice of `count` new languages.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            available_languages: None,
            can_read_existing: false,
            can_learn_new: true,
            selected_languages: None,
            writing_preferences: None,
        }
    }

    pub fn with_available<I, S>(mut self, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_languages = Some(available.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_read_existing(mut self, can_read_existing: bool) -> Self {
        self.can_read_existing = can_read_existing;
        self
    }

    pub fn with_selected<I, S>(mut self, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_languages = Some(selected.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_free(&self) -> bool {
        self.available_languages.is_none()
    }

    /// The selection truncated to `count`. Languages have no implicit default.
    pub fn effective_languages<'a>(&self, stored: Option<&'a LanguageChoice>) -> Vec<&'a str> {
        stored
            .and_then(|s| s.selected_languages.as_deref())
            .unwrap_or_default()
            .iter()
            .take(self.count)
            .map(String::as_str)
            .collect()
    }
}

/// What one slot of a spell choice lets the player do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellChoiceKind {
    DiscoverTradition,
    LearnSpell,
    /// Either of the above
    FlexibleChoice,
}

impl SpellChoiceKind {
    /// Whether a selection fits this slot.
    pub fn accepts(&self, selection: &SpellSelection) -> bool {
        match self {
            Self::DiscoverTradition => matches!(selection, SpellSelection::DiscoverTradition { .. }),
            Self::LearnSpell => matches!(selection, SpellSelection::LearnSpell { .. }),
            Self::FlexibleChoice => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellChoiceSlot {
    #[serde(rename = "type")]
    pub kind: SpellChoiceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_to_traditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_choice: Option<String>,
}

impl SpellChoiceSlot {
    pub fn new(kind: SpellChoiceKind) -> Self {
        Self {
            kind,
            restrict_to_traditions: None,
            description: None,
            default_choice: None,
        }
    }

    pub fn restricted_to<I, S>(mut self, traditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restrict_to_traditions = Some(traditions.into_iter().map(Into::into).collect());
        self
    }

    /// Tradition restriction, if a non-empty one is set.
    pub fn restriction(&self) -> Option<&[String]> {
        self.restrict_to_traditions
            .as_deref()
            .filter(|traditions| !traditions.is_empty())
    }
}

/// A made spell pick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpellSelection {
    #[serde(rename_all = "camelCase")]
    LearnSpell { spell_id: String },
    #[serde(rename_all = "camelCase")]
    DiscoverTradition { tradition_id: String },
}

impl fmt::Display for SpellSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LearnSpell { spell_id } => write!(f, "learn:{}", spell_id),
            Self::DiscoverTradition { tradition_id } => write!(f, "discover:{}", tradition_id),
        }
    }
}

/// Learn spells or discover traditions. Slot `i` of `choices` constrains
/// selection `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellChoice {
    pub count: usize,
    #[serde(default)]
    pub choices: Vec<SpellChoiceSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_spells: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_choices: Option<Vec<SpellSelection>>,
}

impl SpellChoice {
    pub fn new(count: usize, choices: Vec<SpellChoiceSlot>) -> Self {
        Self {
            count,
            choices,
            specific_spells: None,
            selected_choices: None,
        }
    }

    pub fn with_selected(mut self, selected: Vec<SpellSelection>) -> Self {
        self.selected_choices = Some(selected);
        self
    }

    /// Whether `selection` fits the slot at `index`.
    pub fn slot_accepts(&self, index: usize, selection: &SpellSelection) -> bool {
        self.choices
            .get(index)
            .is_some_and(|slot| slot.kind.accepts(selection))
    }
}

/// A choice offer or a stored selection, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChoiceConfig {
    Attribute(AttributeChoice),
    Skill(SkillChoice),
    Profession(ProfessionChoice),
    Language(LanguageChoice),
    Spell(SpellChoice),
}

impl ChoiceConfig {
    pub fn choice_type(&self) -> ChoiceType {
        match self {
            Self::Attribute(_) => ChoiceType::Attribute,
            Self::Skill(_) => ChoiceType::Skill,
            Self::Profession(_) => ChoiceType::Profession,
            Self::Language(_) => ChoiceType::Language,
            Self::Spell(_) => ChoiceType::Spell,
        }
    }

    /// How many items the offer lets the player pick.
    pub fn count(&self) -> usize {
        match self {
            Self::Attribute(c) => c.count,
            Self::Skill(c) => c.count,
            Self::Profession(c) => c.count,
            Self::Language(c) => c.count,
            Self::Spell(c) => c.count,
        }
    }

    /// The selected items as display strings, empty when nothing is selected.
    pub fn selection_labels(&self) -> Vec<String> {
        match self {
            Self::Attribute(c) => labels(c.selected_attributes.as_deref(), |a| a.to_string()),
            Self::Skill(c) => labels(c.selected_skills.as_deref(), |s| s.name.clone()),
            Self::Profession(c) => labels(c.selected_professions.as_deref(), Clone::clone),
            Self::Language(c) => labels(c.selected_languages.as_deref(), Clone::clone),
            Self::Spell(c) => labels(c.selected_choices.as_deref(), |s| s.to_string()),
        }
    }

    /// Checks a stored selection against this live offer and computes the
    /// corrected selection.
    ///
    /// Entries not in the offer's available list are dropped (free language
    /// choices and open profession choices accept anything; attribute choices
    /// without an available list accept any main attribute), then the rest is
    /// truncated to the offer's `count`, which the corrected selection also
    /// takes over. A selection of a different type, or one left empty, is
    /// removed.
    pub fn reconcile(&self, stored: &ChoiceConfig) -> Reconciliation {
        match (self, stored) {
            (Self::Attribute(offer), Self::Attribute(sel)) => {
                let checked = check_selection(
                    sel.selected_attributes.as_deref(),
                    offer.count,
                    |attr| {
                        offer
                            .available_attributes
                            .as_ref()
                            .is_none_or(|available| available.contains(attr))
                    },
                    |attr| attr.to_string(),
                );
                checked.into_reconciliation(|kept| {
                    Self::Attribute(AttributeChoice {
                        count: offer.count,
                        selected_attributes: Some(kept),
                        ..sel.clone()
                    })
                })
            }
            (Self::Skill(offer), Self::Skill(sel)) => {
                let checked = check_selection(
                    sel.selected_skills.as_deref(),
                    offer.count,
                    |skill| offer.available_skills.iter().any(|s| s.name == skill.name),
                    |skill| skill.name.clone(),
                );
                checked.into_reconciliation(|kept| {
                    Self::Skill(SkillChoice {
                        count: offer.count,
                        selected_skills: Some(kept),
                        ..sel.clone()
                    })
                })
            }
            (Self::Profession(offer), Self::Profession(sel)) => {
                let checked = check_selection(
                    sel.selected_professions.as_deref(),
                    offer.count,
                    |prof| offer.is_open() || offer.available_professions.contains(prof),
                    Clone::clone,
                );
                checked.into_reconciliation(|kept| {
                    Self::Profession(ProfessionChoice {
                        count: offer.count,
                        selected_professions: Some(kept),
                        ..sel.clone()
                    })
                })
            }
            (Self::Language(offer), Self::Language(sel)) => {
                let checked = check_selection(
                    sel.selected_languages.as_deref(),
                    offer.count,
                    |lang| {
                        offer
                            .available_languages
                            .as_ref()
                            .is_none_or(|available| available.contains(lang))
                    },
                    Clone::clone,
                );
                checked.into_reconciliation(|kept| {
                    Self::Language(LanguageChoice {
                        count: offer.count,
                        selected_languages: Some(kept),
                        ..sel.clone()
                    })
                })
            }
            (Self::Spell(offer), Self::Spell(sel)) => {
                let checked = check_slotted_selection(
                    sel.selected_choices.as_deref(),
                    offer.count,
                    |index, pick| offer.slot_accepts(index, pick),
                    |pick| pick.to_string(),
                );
                checked.into_reconciliation(|kept| {
                    Self::Spell(SpellChoice {
                        count: offer.count,
                        selected_choices: Some(kept),
                        ..sel.clone()
                    })
                })
            }
            _ => Reconciliation {
                corrected: None,
                issues: vec![ChoiceIssue::NoLongerOffered],
            },
        }
    }
}

fn labels<T>(items: Option<&[T]>, label: impl Fn(&T) -> String) -> Vec<String> {
    items.unwrap_or_default().iter().map(label).collect()
}

/// Something wrong with a stored selection relative to the live offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChoiceIssue {
    /// No live offer matches the stored key (or its type)
    NoLongerOffered,
    /// More items selected than the offer allows
    ExceedsCount { count: usize, selected: usize },
    /// Items that are not in the offer's available list
    UnavailableSelections { items: Vec<String> },
    /// Nothing is selected
    EmptySelection,
}

/// Outcome of [`ChoiceConfig::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The selection to keep, or `None` if it should be removed
    pub corrected: Option<ChoiceConfig>,
    pub issues: Vec<ChoiceIssue>,
}

impl Reconciliation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn is_removal(&self) -> bool {
        self.corrected.is_none()
    }
}

struct CheckedSelection<T> {
    kept: Vec<T>,
    issues: Vec<ChoiceIssue>,
}

impl<T> CheckedSelection<T> {
    fn into_reconciliation(self, rebuild: impl FnOnce(Vec<T>) -> ChoiceConfig) -> Reconciliation {
        let mut issues = self.issues;
        if self.kept.is_empty() {
            if issues.is_empty() {
                issues.push(ChoiceIssue::EmptySelection);
            }
            return Reconciliation {
                corrected: None,
                issues,
            };
        }
        Reconciliation {
            corrected: Some(rebuild(self.kept)),
            issues,
        }
    }
}

fn check_selection<T: Clone>(
    selected: Option<&[T]>,
    count: usize,
    is_available: impl Fn(&T) -> bool,
    label: impl Fn(&T) -> String,
) -> CheckedSelection<T> {
    let selected = selected.unwrap_or_default();
    let (available, unavailable): (Vec<&T>, Vec<&T>) =
        selected.iter().partition(|item| is_available(item));
    finish_check(available, unavailable, count, label)
}

/// Like [`check_selection`], but item `i` is checked against slot `i`.
/// Picks are positional, so everything from the first rejected pick on is
/// dropped; shifting later picks forward would move them into slots they
/// were never checked against.
fn check_slotted_selection<T: Clone>(
    selected: Option<&[T]>,
    count: usize,
    fits_slot: impl Fn(usize, &T) -> bool,
    label: impl Fn(&T) -> String,
) -> CheckedSelection<T> {
    let selected = selected.unwrap_or_default();
    let accepted = selected
        .iter()
        .enumerate()
        .take_while(|(index, item)| fits_slot(*index, item))
        .count();
    let (available, unavailable) = selected.split_at(accepted);
    finish_check(available.iter().collect(), unavailable.iter().collect(), count, label)
}

fn finish_check<T: Clone>(
    available: Vec<&T>,
    unavailable: Vec<&T>,
    count: usize,
    label: impl Fn(&T) -> String,
) -> CheckedSelection<T> {
    let mut issues = Vec::new();
    if !unavailable.is_empty() {
        issues.push(ChoiceIssue::UnavailableSelections {
            items: unavailable.into_iter().map(label).collect(),
        });
    }
    if available.len() > count {
        issues.push(ChoiceIssue::ExceedsCount {
            count,
            selected: available.len(),
        });
    }

    CheckedSelection {
        kept: available.into_iter().take(count).cloned().collect(),
        issues,
    }
}
