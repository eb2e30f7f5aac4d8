//! User-level configuration: where output lands, not how the machine works.
//!
//! The machine's fixed limits live in [`crate::consts`] as `const`s — they
//! describe the target, not a preference, and nothing here should be
//! mistaken for a knob that changes them.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Directory `.ob`/`.ent`/`.ext` files are written into. Relative to
    /// the input file's directory when not absolute.
    pub output_dir: PathBuf,
    /// Extension expected on source files passed without one.
    pub source_extension: String,
    /// Keep the macro-expanded `.am` file alongside the output instead
    /// of discarding it after the pre-processor runs.
    pub keep_expanded: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            output_dir: PathBuf::from("."),
            source_extension: ".as".to_string(),
            keep_expanded: false,
        }
    }
}

impl AssemblerConfig {
    fn config_file() -> Result<PathBuf, ConfigError> {
        let mut dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        dir.push("asm12");
        dir.push("config.toml");
        Ok(dir)
    }

    /// Loads configuration from the user's config directory, falling
    /// back to defaults if no file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_file()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(&path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = AssemblerConfig::default();
        assert_eq!(config.source_extension, ".as");
        assert!(!config.keep_expanded);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AssemblerConfig {
            output_dir: PathBuf::from("/tmp/out"),
            source_extension: ".asm".to_string(),
            keep_expanded: true,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AssemblerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
