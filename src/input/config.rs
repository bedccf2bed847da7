// Keymap configuration module
//
// Save and load keymap profiles to/from TOML files. Keys and buttons are
// stored by name so the file stays readable:
//
//   [[profile]]
//   name = "Type A"
//   bindings = [
//       { key = "A", action = "B" },
//       { key = "A", action = "X", modifier = true },
//   ]

use super::keymap::{KeyBinding, KeymapProfile, KeymapSet};
use super::{PhysicalKey, SnesButton};
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serializable binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Physical key name (e.g. "SELECT")
    pub key: String,
    /// SNES button label (e.g. "Y")
    pub action: String,
    /// Requires MENU to be held
    #[serde(default, skip_serializing_if = "is_false")]
    pub modifier: bool,
}

impl BindingConfig {
    /// Convert to a runtime binding
    pub fn to_binding(&self) -> Result<KeyBinding, ConfigError> {
        let key = PhysicalKey::from_name(&self.key)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown key: {}", self.key)))?;
        let action = SnesButton::from_label(&self.action)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown button: {}", self.action)))?;
        if self.modifier && key == PhysicalKey::Menu {
            return Err(ConfigError::Invalid("MENU cannot modify itself".into()));
        }
        Ok(KeyBinding::new(key, self.modifier, action))
    }

    /// Create from a runtime binding
    pub fn from_binding(binding: &KeyBinding) -> Self {
        Self {
            key: binding.key.name().to_string(),
            action: binding.action.label().to_string(),
            modifier: binding.modifier,
        }
    }
}

/// Serializable profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Name shown in the options menu
    pub name: String,
    /// Bindings in table order
    pub bindings: Vec<BindingConfig>,
}

/// Complete keymap file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Profiles in selection order
    #[serde(rename = "profile")]
    pub profiles: Vec<ProfileConfig>,
}

impl KeymapConfig {
    /// Describe an existing set
    pub fn from_set(set: &KeymapSet) -> Self {
        Self {
            profiles: set
                .profiles()
                .iter()
                .map(|profile| ProfileConfig {
                    name: profile.name().to_string(),
                    bindings: profile
                        .bindings()
                        .iter()
                        .map(BindingConfig::from_binding)
                        .collect(),
                })
                .collect(),
        }
    }

    /// Convert to a runtime set
    pub fn to_set(&self) -> Result<KeymapSet, ConfigError> {
        let profiles = self
            .profiles
            .iter()
            .map(|profile| {
                let bindings = profile
                    .bindings
                    .iter()
                    .map(BindingConfig::to_binding)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(KeymapProfile::new(profile.name.clone(), bindings))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        KeymapSet::from_profiles(profiles)
            .ok_or_else(|| ConfigError::Invalid("keymap file has no profiles".into()))
    }

    /// Load profiles from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save profiles to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
