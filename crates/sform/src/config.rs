// File: src/config.rs
// Purpose: Marker classes and trigger defaults, optionally read from sform.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::rules::HintKind;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classes: ClassConfig,

    #[serde(default)]
    pub events: EventConfig,

    #[serde(default)]
    pub hints: HintConfig,
}

/// Class names the engine looks for and applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Prefix shared by every marker (default: "SForm")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Suffix of the class marking a validated field (default: "field")
    #[serde(default = "default_field")]
    pub field: String,

    #[serde(default = "default_valid")]
    pub valid: String,

    #[serde(default = "default_invalid")]
    pub invalid: String,
}

/// Event configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Trigger used when a form has no `data-event` (default: "keyup")
    #[serde(default = "default_trigger")]
    pub default_trigger: String,
}

/// Hint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintConfig {
    /// CSS `display` value for a shown hint (default: "inline")
    #[serde(default = "default_display")]
    pub display: String,
}

// Default values
fn default_prefix() -> String {
    "SForm".to_string()
}

fn default_field() -> String {
    "field".to_string()
}

fn default_valid() -> String {
    "valid".to_string()
}

fn default_invalid() -> String {
    "invalid".to_string()
}

fn default_trigger() -> String {
    "keyup".to_string()
}

fn default_display() -> String {
    "inline".to_string()
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            field: default_field(),
            valid: default_valid(),
            invalid: default_invalid(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            default_trigger: default_trigger(),
        }
    }
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            display: default_display(),
        }
    }
}

impl ClassConfig {
    /// Class marking a form for bootstrapping
    pub fn root(&self) -> &str {
        &self.prefix
    }

    pub fn field_class(&self) -> String {
        self.prefixed(&self.field)
    }

    pub fn valid_class(&self) -> String {
        self.prefixed(&self.valid)
    }

    pub fn invalid_class(&self) -> String {
        self.prefixed(&self.invalid)
    }

    /// Class of the hint element for `kind`, e.g. `SForm-min`
    pub fn hint_class(&self, kind: HintKind) -> String {
        self.prefixed(kind.as_str())
    }

    fn prefixed(&self, suffix: &str) -> String {
        format!("{}-{}", self.prefix, suffix)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./sform.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("sform.toml")
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }
}
