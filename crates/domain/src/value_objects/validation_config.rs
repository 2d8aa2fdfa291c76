use serde::{Deserialize, Serialize};

/// When stored choices are re-checked against their live offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceValidationConfig {
    /// Re-validate a path slot when its path is replaced or removed
    pub validate_on_path_change: bool,
    /// Re-validate ancestry choices when the ancestry is replaced
    pub validate_on_ancestry_change: bool,
    /// Never trim or remove stored choices
    pub preserve_invalid_choices: bool,
}

impl Default for ChoiceValidationConfig {
    fn default() -> Self {
        Self {
            validate_on_path_change: true,
            validate_on_ancestry_change: true,
            preserve_invalid_choices: false,
        }
    }
}

impl ChoiceValidationConfig {
    /// Keeps every stored choice verbatim.
    pub fn preserving() -> Self {
        Self {
            preserve_invalid_choices: true,
            ..Self::default()
        }
    }

    /// Whether switching from `previous` to `self` turns path validation on.
    pub fn enables_path_validation(&self, previous: &Self) -> bool {
        self.validate_on_path_change && !previous.validate_on_path_change
    }

    pub fn enables_ancestry_validation(&self, previous: &Self) -> bool {
        self.validate_on_ancestry_change && !previous.validate_on_ancestry_change
    }

    /// Whether switching from `previous` to `self` stops preserving invalid choices.
    pub fn stops_preserving(&self, previous: &Self) -> bool {
        !self.preserve_invalid_choices && previous.preserve_invalid_choices
    }
}
