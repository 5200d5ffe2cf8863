//! Persisted mode state.

use annuli_module::{ModeSnapshot, ResonatorModel, mode::POLYPHONY_MODES};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// On-disk encoding of a state file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFormat {
    /// Host document, `.json`.
    Json,
    /// State file, `.toml`.
    Toml,
}

impl StateFormat {
    /// Format for `path`, from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// The three mode fields as stored by a host.
///
/// Values are kept as the raw integers found in the document; range checks
/// happen in [`ModuleState::to_snapshot`], so a hand-edited file never fails
/// to load.
///
/// # JSON Format
///
/// ```json
/// { "polyphony": 1, "model": 4, "easterEgg": false }
/// ```
///
/// # TOML Format
///
/// ```toml
/// polyphony = 1
/// model = 4
/// easterEgg = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleState {
    /// Polyphony position (0, 1 or 2).
    pub polyphony: i64,
    /// Resonator model index (0 to 5).
    pub model: i64,
    /// Alternate engine selected.
    #[serde(rename = "easterEgg")]
    pub easter_egg: bool,
}

impl ModuleState {
    /// Parse from the host's JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the host's JSON document.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load state from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the state to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load state from a `.json` or `.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = StateFormat::from_path(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        match format {
            StateFormat::Json => Self::from_json(&content),
            StateFormat::Toml => Self::from_toml(&content),
        }
    }

    /// Save state to a `.json` or `.toml` file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match StateFormat::from_path(path)? {
            StateFormat::Json => self.to_json()?,
            StateFormat::Toml => self.to_toml()?,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "saved module state");
        Ok(())
    }

    /// Mode for the module.
    ///
    /// A polyphony outside `0..3` or a model outside `0..6` is replaced by
    /// its default and logged.
    pub fn to_snapshot(&self) -> ModeSnapshot {
        let polyphony = match u8::try_from(self.polyphony) {
            Ok(p) if p < POLYPHONY_MODES => p,
            _ => {
                tracing::warn!(polyphony = self.polyphony, "polyphony out of range, using 0");
                0
            }
        };
        let model = ResonatorModel::try_from(self.model).unwrap_or_else(|index| {
            tracing::warn!(model = index, "model out of range, using modal");
            ResonatorModel::default()
        });
        ModeSnapshot {
            polyphony,
            model,
            easter_egg: self.easter_egg,
        }
    }
}

impl From<ModeSnapshot> for ModuleState {
    fn from(mode: ModeSnapshot) -> Self {
        Self {
            polyphony: i64::from(mode.polyphony),
            model: i64::from(mode.model.index()),
            easter_egg: mode.easter_egg,
        }
    }
}

impl From<ModuleState> for ModeSnapshot {
    fn from(state: ModuleState) -> Self {
        state.to_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keys() {
        let state = ModuleState {
            polyphony: 2,
            model: 5,
            easter_egg: true,
        };
        assert_eq!(
            state.to_json().unwrap(),
            r#"{"polyphony":2,"model":5,"easterEgg":true}"#
        );
    }

    #[test]
    fn test_missing_keys_default() {
        let state = ModuleState::from_json(r#"{"model": 3}"#).unwrap();
        assert_eq!(
            state,
            ModuleState {
                polyphony: 0,
                model: 3,
                easter_egg: false,
            }
        );
        assert_eq!(ModuleState::from_json("{}").unwrap(), ModuleState::default());
    }

    #[test]
    fn test_out_of_range_uses_defaults() {
        let state = ModuleState {
            polyphony: 7,
            model: -1,
            easter_egg: true,
        };
        let mode = state.to_snapshot();
        assert_eq!(mode.polyphony, 0);
        assert_eq!(mode.model, ResonatorModel::Modal);
        assert!(mode.easter_egg);
    }

    #[test]
    fn test_all_models_survive() {
        for model in ResonatorModel::ALL {
            let mode = ModeSnapshot {
                polyphony: 1,
                model,
                easter_egg: false,
            };
            assert_eq!(ModuleState::from(mode).to_snapshot(), mode);
        }
    }

    #[test]
    fn test_toml_text() {
        let state = ModuleState::from_toml("polyphony = 1\nmodel = 4\neasterEgg = true\n").unwrap();
        assert_eq!(state.to_snapshot().model, ResonatorModel::SympatheticStringQuantized);
        assert!(state.to_toml().unwrap().contains("easterEgg = true"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            StateFormat::from_path(Path::new("a/b.JSON")).unwrap(),
            StateFormat::Json
        );
        assert_eq!(
            StateFormat::from_path(Path::new("b.toml")).unwrap(),
            StateFormat::Toml
        );
        assert!(StateFormat::from_path(Path::new("b")).is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(matches!(
            ModuleState::from_json(r#"{"polyphony": "two"}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
