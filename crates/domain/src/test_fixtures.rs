//! Shared builders for domain tests.

use std::sync::Arc;

use crate::aggregates::Character;
use crate::entities::{Ancestry, Path, PathTier};
use crate::observer::NoopObserver;
use crate::value_objects::{
    AttributeChoice, AttributeModifier, CalculationRule, CharacterName, LanguageChoice,
    MainAttribute, MainAttributes, NumericAttribute, ProfessionChoice, SecondaryAttributeRules,
    Skill, SkillChoice, SpellChoice, SpellChoiceKind, SpellChoiceSlot,
};

use MainAttribute::*;
use NumericAttribute::{Defense, Health, Perception, Power};

pub const HUMAN_PROFESSIONS: [&str; 7] = [
    "Academic",
    "Artisan",
    "Criminal",
    "Commoner",
    "Wilderness",
    "Religious",
    "Military",
];

pub fn determined() -> Skill {
    Skill::new(
        "Determined",
        "When you roll a 1 on the die from a boon, you can reroll the die.",
    )
}

/// Strength 10 across the board, +1 to one attribute (strength by default),
/// +5 health and a Determined/spell choice at level 4.
pub fn human() -> Ancestry {
    Ancestry::new(
        "Human",
        MainAttributes::new(10, 10, 10, 10),
        SecondaryAttributeRules::default().with_languages(["Common"]),
        AttributeModifier::new()
            .with(Health, 5)
            .with_choice(SkillChoice::new(1, vec![determined()]))
            .with_choice(SpellChoice::new(
                1,
                vec![SpellChoiceSlot::new(SpellChoiceKind::FlexibleChoice)],
            )),
    )
    .with_initial_choice(
        AttributeChoice::new(1, 1)
            .with_available(MainAttribute::ALL)
            .with_defaults([Strength]),
    )
    .with_initial_choice(
        ProfessionChoice::new(1, HUMAN_PROFESSIONS).with_defaults(["Commoner"]),
    )
}

/// Bookish ancestry: health is strength - 1, perception intellect + 1.
pub fn languer() -> Ancestry {
    let rules = SecondaryAttributeRules::default()
        .with_rule(
            Perception,
            CalculationRule::formula("$intellect + 1").expect("valid fixture"),
        )
        .with_rule(
            Health,
            CalculationRule::formula("$strength - 1").expect("valid fixture"),
        )
        .with_languages(["Common", "High Archaic"])
        .with_professions(["Scholar"])
        .with_skills(vec![Skill::new("Linguist", "You learn languages quickly.")]);

    Ancestry::new(
        "Languer",
        MainAttributes::new(9, 9, 12, 10),
        rules,
        AttributeModifier::new()
            .with(Health, 3)
            .with_skill(Skill::new("Knowledge Seeker", ""))
            .with_choice(SkillChoice::new(
                1,
                vec![Skill::new("Polyglot", ""), Skill::new("Archivist", "")],
            ))
            .with_choice(
                LanguageChoice::new(1)
                    .with_available(["Elvish", "Dwarvish", "Trollish"])
                    .with_read_existing(true),
            )
            .with_choice(LanguageChoice::new(1))
            .with_choice(ProfessionChoice::new(1, ["Scribe", "Sage"]))
            .with_choice(ProfessionChoice::new(1, Vec::<String>::new())),
    )
    .with_initial_choice(AttributeChoice::new(1, 1).with_defaults([Intellect]))
    .with_initial_choice(LanguageChoice::new(1).with_available(["Elvish", "Dwarvish"]))
}

pub fn warrior() -> Path {
    Path::new(
        "Warrior",
        PathTier::Novice,
        [
            (
                1,
                AttributeModifier::new()
                    .with(Health, 5)
                    .with_language("Elvish")
                    .with_profession("Blacksmith")
                    .with_skill(Skill::new("Weapon Training", ""))
                    .with_skill(Skill::new("Catch Your Breath", ""))
                    .with_choice(AttributeChoice::new(2, 1).with_defaults([Strength, Agility])),
            ),
            (
                2,
                AttributeModifier::new()
                    .with(Health, 5)
                    .with_skill(Skill::new("Forceful Strike", "")),
            ),
            (
                5,
                AttributeModifier::new()
                    .with(Health, 5)
                    .with(Defense, 1)
                    .with_skill(Skill::new("Combat Expertise", "")),
            ),
            (
                8,
                AttributeModifier::new()
                    .with(Health, 5)
                    .with_skill(Skill::new("Weapon Mastery", "")),
            ),
        ],
    )
    .expect("valid fixture")
}

pub fn magician() -> Path {
    Path::new(
        "Magician",
        PathTier::Novice,
        [
            (
                1,
                AttributeModifier::new()
                    .with(Health, 2)
                    .with(Power, 1)
                    .with_choice(AttributeChoice::new(1, 1).with_defaults([Intellect]))
                    .with_choice(SpellChoice::new(
                        2,
                        vec![
                            SpellChoiceSlot::new(SpellChoiceKind::DiscoverTradition),
                            SpellChoiceSlot::new(SpellChoiceKind::LearnSpell),
                        ],
                    )),
            ),
            (2, AttributeModifier::new().with(Health, 2).with(Power, 1)),
        ],
    )
    .expect("valid fixture")
}

pub fn assassin() -> Path {
    Path::new(
        "Assassin",
        PathTier::Expert,
        [
            (
                3,
                AttributeModifier::new()
                    .with(Health, 3)
                    .with_skill(Skill::new("Assassinate", ""))
                    .with_language("Thieves' Cant"),
            ),
            (6, AttributeModifier::new().with(Health, 3)),
            (9, AttributeModifier::new().with(Health, 3).with(Perception, 1)),
        ],
    )
    .expect("valid fixture")
}

pub fn acrobat() -> Path {
    Path::new(
        "Acrobat",
        PathTier::Master,
        [
            (
                7,
                AttributeModifier::new()
                    .with(Health, 4)
                    .with(Agility, 1)
                    .with_choice(AttributeChoice::new(1, 2).with_available([Agility, Strength])),
            ),
            (10, AttributeModifier::new().with(Health, 4)),
        ],
    )
    .expect("valid fixture")
}

pub fn character(name: &str, ancestry: Ancestry) -> Character {
    let name = CharacterName::new(name).expect("valid fixture");
    Character::new(name, Arc::new(ancestry)).with_observer(Arc::new(NoopObserver))
}

/// Human warrior / assassin / acrobat at level 0.
pub fn edward() -> Character {
    let mut edward = character("Edward", human());
    edward.set_path(Arc::new(warrior()));
    edward.set_path(Arc::new(assassin()));
    edward.set_path(Arc::new(acrobat()));
    edward
}
