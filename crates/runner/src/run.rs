use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charforge_domain::{
    Character, CharacterName, ChoiceBehavior, ChoiceConfig, ChoiceKey, ChoiceManager, ChoiceSource,
    Spell, SpellChoice, SpellChoiceKind, SpellRegistry, SpellSelection, SpellTradition,
};

use crate::config::RunnerConfig;
use crate::content::ContentLibrary;

pub fn run() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charforge_runner=info,charforge_domain=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Charforge");

    let config = RunnerConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let library = ContentLibrary::load(&config.data_dir)?;
    let mut character = build_character(&config, &library)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    advance(&mut character, library.spells(), config.max_level, &mut rng)?;

    for source in ChoiceSource::ALL {
        for invalid in character.invalid_choices(source) {
            tracing::warn!(choice = %invalid.key, issues = ?invalid.issues, "Stored choice is invalid");
        }
    }

    let exported = serde_json::to_string_pretty(&character.export_choices())
        .context("Failed to serialize stored choices")?;
    tracing::info!(character = %character.name(), "Stored choices:\n{}", exported);
    Ok(())
}

fn build_character(config: &RunnerConfig, library: &ContentLibrary) -> Result<Character> {
    let name = CharacterName::new(config.name.as_str()).context("CHARFORGE_NAME is not a valid name")?;
    let mut character = Character::new(name, library.ancestry(&config.ancestry)?);

    let slots = [&config.novice_path, &config.expert_path, &config.master_path];
    for stem in slots.into_iter().flatten() {
        let path = library.path(stem)?;
        tracing::info!(path = path.name(), tier = %path.tier(), "Assigning path");
        character.set_path(path);
    }
    Ok(character)
}

/// Fills open choices and logs the sheet at the current level, then at
/// every level up to `max_level`.
fn advance<R: Rng + ?Sized>(
    character: &mut Character,
    registry: &SpellRegistry,
    max_level: u32,
    rng: &mut R,
) -> Result<()> {
    loop {
        auto_choose(character, registry, rng)?;
        log_sheet(character);
        if character.level() >= max_level {
            return Ok(());
        }
        character.level_up();
    }
}

/// Stores a selection for every offered choice that has none yet and that
/// can be filled without a player: skills and spells. Attribute and
/// profession choices fall back to their defaults during resolution.
fn auto_choose<R: Rng + ?Sized>(
    character: &mut Character,
    registry: &SpellRegistry,
    rng: &mut R,
) -> Result<()> {
    let pending: Vec<(ChoiceKey, ChoiceConfig)> = character
        .available_choices()
        .into_iter()
        .filter(|offer| character.choice(&offer.key).is_none())
        .map(|offer| (offer.key, offer.config.clone()))
        .collect();

    for (key, offer) in pending {
        let selection = match offer {
            ChoiceConfig::Skill(offer) => {
                let mut manager =
                    ChoiceManager::new(key.to_string(), offer.available_skills.clone(), offer.count)
                        .with_behavior(ChoiceBehavior::Random);
                let picked = manager.auto_select(rng)?.to_vec();
                if picked.is_empty() {
                    continue;
                }
                ChoiceConfig::Skill(offer.with_selected(picked))
            }
            ChoiceConfig::Spell(offer) => {
                let picked = pick_spells(character, registry, key, &offer, rng)?;
                if picked.is_empty() {
                    continue;
                }
                ChoiceConfig::Spell(offer.with_selected(picked))
            }
            _ => continue,
        };

        tracing::info!(choice = %key, picked = ?selection.selection_labels(), "Auto-selected choice");
        character.set_choice(key, selection);
    }
    Ok(())
}

/// Fills the slots of a spell choice in order. A flexible slot learns a
/// spell once a tradition is known and discovers one otherwise. Selections
/// are positional, so filling stops at the first slot with no candidates.
fn pick_spells<R: Rng + ?Sized>(
    character: &Character,
    registry: &SpellRegistry,
    key: ChoiceKey,
    offer: &SpellChoice,
    rng: &mut R,
) -> Result<Vec<SpellSelection>> {
    let power = character.spell_power_at(character.level());
    let mut discovered = character.discovered_traditions();
    let mut picks = Vec::new();

    for (index, slot) in offer.choices.iter().enumerate().take(offer.count) {
        let learn = match slot.kind {
            SpellChoiceKind::LearnSpell => true,
            SpellChoiceKind::DiscoverTradition => false,
            SpellChoiceKind::FlexibleChoice => !discovered.is_empty(),
        };
        let manager_id = format!("{}/{}", key, index);

        let pick = if learn {
            let spells: Vec<Spell> = registry
                .available_spells_for_choice(offer, power, Some(index))
                .into_iter()
                .filter(|spell| discovered.contains(&spell.tradition))
                .cloned()
                .collect();
            let mut manager =
                ChoiceManager::new(manager_id, spells, 1).with_behavior(ChoiceBehavior::Random);
            manager
                .auto_select(rng)?
                .first()
                .map(|spell| SpellSelection::LearnSpell {
                    spell_id: spell.id.clone(),
                })
        } else {
            let traditions: Vec<SpellTradition> = registry
                .available_traditions_for_choice(offer, index, &discovered)
                .into_iter()
                .cloned()
                .collect();
            let mut manager =
                ChoiceManager::new(manager_id, traditions, 1).with_behavior(ChoiceBehavior::Random);
            let tradition = manager.auto_select(rng)?.first().map(|t| t.id.clone());
            tradition.map(|tradition_id| {
                discovered.push(tradition_id.clone());
                SpellSelection::DiscoverTradition { tradition_id }
            })
        };

        match pick {
            Some(pick) => picks.push(pick),
            None => {
                tracing::debug!(choice = %key, slot = index, power, "No candidates for spell slot");
                break;
            }
        }
    }
    Ok(picks)
}

fn log_sheet(character: &Character) {
    let sheet = character.resolve_attributes();
    let (main, secondary) = (&sheet.main, &sheet.secondary);
    tracing::info!(
        level = character.level(),
        strength = main.strength,
        agility = main.agility,
        intellect = main.intellect,
        will = main.will,
        health = secondary.health,
        healing_rate = secondary.healing_rate,
        defense = secondary.defense,
        perception = secondary.perception,
        speed = secondary.speed,
        power = secondary.power,
        "Attribute sheet"
    );
    let skills: Vec<&str> = secondary.skills.iter().map(|s| s.name.as_str()).collect();
    tracing::info!(
        level = character.level(),
        languages = ?secondary.languages,
        professions = ?secondary.professions,
        skills = ?skills,
        "Lists"
    );
}
