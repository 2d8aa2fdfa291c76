//! Content library - ancestries, paths and spells loaded from JSON files
//!
//! Layout under the data directory:
//! - `ancestries/<stem>.json` - one [`Ancestry`] per file
//! - `paths/<stem>.json` - one [`Path`] per file
//! - `spells/<stem>.json` - a tradition and its spells
//!
//! Ancestries and paths are looked up by file stem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use charforge_domain::{Ancestry, Path, Spell, SpellRegistry, SpellTradition};

/// One file under `spells/`
#[derive(Debug, Deserialize)]
struct TraditionFile {
    tradition: SpellTradition,
    #[serde(default)]
    spells: Vec<Spell>,
}

#[derive(Debug, Default)]
pub struct ContentLibrary {
    ancestries: BTreeMap<String, Arc<Ancestry>>,
    paths: BTreeMap<String, Arc<Path>>,
    spells: SpellRegistry,
}

impl ContentLibrary {
    pub fn load(data_dir: &FsPath) -> Result<Self> {
        let mut library = Self::default();

        for (stem, ancestry) in read_dir_json::<Ancestry>(&data_dir.join("ancestries"))? {
            tracing::debug!(stem = %stem, ancestry = ancestry.name(), "Loaded ancestry");
            library.ancestries.insert(stem, Arc::new(ancestry));
        }

        for (stem, path) in read_dir_json::<Path>(&data_dir.join("paths"))? {
            tracing::debug!(stem = %stem, path = path.name(), tier = %path.tier(), "Loaded path");
            library.paths.insert(stem, Arc::new(path));
        }

        for (stem, file) in read_dir_json::<TraditionFile>(&data_dir.join("spells"))? {
            let tradition_id = file.tradition.id.clone();
            for spell in file.spells {
                if spell.tradition != tradition_id {
                    tracing::warn!(
                        file = %stem,
                        spell = %spell.id,
                        tradition = %spell.tradition,
                        "Spell belongs to a different tradition than its file"
                    );
                }
                if let Some(previous) = library.spells.register_spell(spell) {
                    tracing::warn!(spell = %previous.id, "Duplicate spell id, keeping the later one");
                }
            }
            library.spells.register_tradition(file.tradition);
        }

        tracing::info!(
            ancestries = library.ancestries.len(),
            paths = library.paths.len(),
            traditions = library.spells.traditions().len(),
            spells = library.spells.spells().len(),
            "Content library loaded"
        );
        Ok(library)
    }

    pub fn ancestry(&self, stem: &str) -> Result<Arc<Ancestry>> {
        self.ancestries.get(stem).cloned().with_context(|| {
            format!(
                "Unknown ancestry '{}' (known: {})",
                stem,
                join_keys(&self.ancestries)
            )
        })
    }

    pub fn path(&self, stem: &str) -> Result<Arc<Path>> {
        self.paths.get(stem).cloned().with_context(|| {
            format!("Unknown path '{}' (known: {})", stem, join_keys(&self.paths))
        })
    }

    pub fn spells(&self) -> &SpellRegistry {
        &self.spells
    }
}

fn join_keys<V>(map: &BTreeMap<String, V>) -> String {
    map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Parses every `*.json` file in `dir`, sorted by file name. A missing
/// directory yields nothing.
fn read_dir_json<T: DeserializeOwned>(dir: &FsPath) -> Result<Vec<(String, T)>> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "Content directory missing, skipping");
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    files.retain(|path| path.extension().is_some_and(|ext| ext == "json"));
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            Ok((stem, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use charforge_domain::{
        CharacterName, NoopObserver, PathTier, SpellChoice, SpellChoiceKind, SpellChoiceSlot,
    };

    use super::*;

    fn bundled() -> ContentLibrary {
        let dir = FsPath::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        ContentLibrary::load(&dir).unwrap()
    }

    #[test]
    fn test_every_bundled_file_loads() {
        let library = bundled();
        assert_eq!(library.ancestries.keys().collect::<Vec<_>>(), ["human", "languer"]);
        assert_eq!(
            library.paths.keys().collect::<Vec<_>>(),
            ["acrobat", "assassin", "magician", "warrior"]
        );
        assert_eq!(library.path("assassin").unwrap().tier(), PathTier::Expert);
        assert_eq!(library.path("acrobat").unwrap().tier(), PathTier::Master);
        assert!(library.spells().tradition("fire").is_some());
        assert!(library.spells().tradition("air").is_some());
        assert_eq!(library.spells().spells_by_tradition("fire").len(), 6);
    }

    #[test]
    fn test_unknown_names_list_known_ones() {
        let library = bundled();
        let err = library.ancestry("dwarf").unwrap_err();
        assert!(err.to_string().contains("human, languer"));
        assert!(library.path("priest").is_err());
    }

    #[test]
    fn test_bundled_edward_matches_reference_health() {
        let library = bundled();
        let name = CharacterName::new("Edward").unwrap();
        let mut edward = charforge_domain::Character::new(name, library.ancestry("human").unwrap())
            .with_observer(Arc::new(NoopObserver));
        for stem in ["warrior", "assassin", "acrobat"] {
            edward.set_path(library.path(stem).unwrap());
        }

        let mut health = Vec::new();
        for _ in 0..4 {
            edward.level_up();
            health.push(edward.resolve_attributes().secondary.health);
        }
        assert_eq!(health, [16, 21, 24, 29]);
    }

    #[test]
    fn test_bundled_languer_derives_from_formulas() {
        let library = bundled();
        let name = CharacterName::new("Quill").unwrap();
        let character = charforge_domain::Character::new(name, library.ancestry("languer").unwrap())
            .with_observer(Arc::new(NoopObserver));
        let sheet = character.resolve_attributes();
        assert_eq!(sheet.secondary.health, 8);
        assert_eq!(sheet.secondary.perception, 14);
        assert_eq!(sheet.secondary.languages, ["Common", "High Archaic"]);
    }

    #[test]
    fn test_bundled_languer_offers_reading_existing_languages() {
        let languer = bundled().ancestry("languer").unwrap();
        let reading: Vec<bool> = languer
            .choices(Some(4))
            .iter()
            .filter_map(|offer| match offer {
                charforge_domain::ChoiceConfig::Language(offer) => Some(offer.can_read_existing),
                _ => None,
            })
            .collect();
        assert_eq!(reading, [true, false]);
    }

    #[test]
    fn test_bundled_spells_respect_power() {
        let library = bundled();
        let choice = SpellChoice::new(
            1,
            vec![SpellChoiceSlot::new(SpellChoiceKind::LearnSpell).restricted_to(["air"])],
        );
        let ids: Vec<&str> = library
            .spells()
            .available_spells_for_choice(&choice, 0, Some(0))
            .into_iter()
            .map(|spell| spell.id.as_str())
            .collect();
        assert_eq!(ids, ["stir_the_air", "wind_blast"]);
    }

    #[test]
    fn test_missing_directories_load_empty() {
        let dir = std::env::temp_dir().join("charforge-empty-content");
        let library = ContentLibrary::load(&dir).unwrap();
        assert!(library.ancestry("human").is_err());
        assert!(library.spells().traditions().is_empty());
    }
}
