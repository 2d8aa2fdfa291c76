//! Runner configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runner configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Directory holding `ancestries/`, `paths/` and `spells/`
    pub data_dir: PathBuf,
    /// Character name
    pub name: String,
    /// Ancestry file stem (e.g., "human")
    pub ancestry: String,
    /// Path file stems; `None` leaves the slot empty
    pub novice_path: Option<String>,
    pub expert_path: Option<String>,
    pub master_path: Option<String>,
    /// Level to advance the character to
    pub max_level: u32,
    /// Seed for automatic choice selection
    pub seed: u64,
}

impl RunnerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            data_dir: lookup("CHARFORGE_DATA_DIR")
                .unwrap_or_else(|| "data".to_string())
                .into(),
            name: lookup("CHARFORGE_NAME").unwrap_or_else(|| "Edward".to_string()),
            ancestry: lookup("CHARFORGE_ANCESTRY").unwrap_or_else(|| "human".to_string()),
            novice_path: optional_slot(lookup("CHARFORGE_NOVICE_PATH"), "warrior"),
            expert_path: optional_slot(lookup("CHARFORGE_EXPERT_PATH"), "assassin"),
            master_path: optional_slot(lookup("CHARFORGE_MASTER_PATH"), "acrobat"),
            max_level: lookup("CHARFORGE_MAX_LEVEL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),
            seed: lookup("CHARFORGE_SEED")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        };

        if config.ancestry.trim().is_empty() {
            anyhow::bail!("CHARFORGE_ANCESTRY must name an ancestry file");
        }
        std::fs::metadata(&config.data_dir).with_context(|| {
            format!(
                "CHARFORGE_DATA_DIR {} is not readable",
                config.data_dir.display()
            )
        })?;
        Ok(config)
    }
}

/// Unset means the default; set but blank means no path in that slot.
fn optional_slot(value: Option<String>, default: &str) -> Option<String> {
    match value {
        None => Some(default.to_string()),
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(v.trim().to_string()),
    }
}
