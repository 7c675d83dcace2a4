//! Configuration file support for the tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/glpt/config.toml`.

use crate::medications::get_default_formulary;
use crate::{DecaySettings, Error, MedicationKind, Result, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub medication: MedicationConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Medication model configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationConfig {
    #[serde(default = "default_medication_kind")]
    pub kind: MedicationKind,

    /// Overrides the preset half-life when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_life_days: Option<f64>,

    #[serde(default = "default_dose_mg")]
    pub dose_mg: f64,

    #[serde(default = "default_interval_days")]
    pub interval_days: i64,
}

impl Default for MedicationConfig {
    fn default() -> Self {
        Self {
            kind: default_medication_kind(),
            half_life_days: None,
            dose_mg: default_dose_mg(),
            interval_days: default_interval_days(),
        }
    }
}

impl MedicationConfig {
    /// Decay model parameters: the configured override, or the preset's
    /// half-life for the configured medication kind
    pub fn decay_settings(&self) -> DecaySettings {
        match self.half_life_days {
            Some(half_life_days) => DecaySettings { half_life_days },
            None => get_default_formulary()
                .preset(self.kind)
                .map(|preset| preset.decay_settings())
                .unwrap_or(DecaySettings {
                    half_life_days: default_half_life_days(),
                }),
        }
    }
}

/// Display preferences
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub weight_unit: WeightUnit,

    /// Trailing window of the levels chart, in days
    #[serde(default = "default_chart_days")]
    pub chart_days: i64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::default(),
            chart_days: default_chart_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("glpt")
}

fn default_medication_kind() -> MedicationKind {
    MedicationKind::Semaglutide
}

fn default_half_life_days() -> f64 {
    7.0
}

fn default_dose_mg() -> f64 {
    0.5
}

fn default_interval_days() -> i64 {
    7
}

fn default_chart_days() -> i64 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("glpt").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.medication.kind, MedicationKind::Semaglutide);
        assert_eq!(config.medication.dose_mg, 0.5);
        assert_eq!(config.medication.interval_days, 7);
        assert_eq!(config.display.weight_unit, WeightUnit::Lbs);
        assert_eq!(config.display.chart_days, 30);
    }

    #[test]
    fn test_decay_settings_follow_preset() {
        let mut config = Config::default();
        assert_eq!(config.medication.decay_settings().half_life_days, 7.0);

        config.medication.kind = MedicationKind::Tirzepatide;
        assert_eq!(config.medication.decay_settings().half_life_days, 5.0);
    }

    #[test]
    fn test_half_life_override_wins() {
        let mut config = Config::default();
        config.medication.half_life_days = Some(6.5);
        assert_eq!(config.medication.decay_settings().half_life_days, 6.5);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.medication.kind, parsed.medication.kind);
        assert_eq!(config.medication.interval_days, parsed.medication.interval_days);
        assert_eq!(config.display.weight_unit, parsed.display.weight_unit);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[medication]
kind = "tirzepatide"
dose_mg = 5.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.medication.kind, MedicationKind::Tirzepatide);
        assert_eq!(config.medication.dose_mg, 5.0);
        assert_eq!(config.medication.interval_days, 7); // default
        assert_eq!(config.display.chart_days, 30); // default
    }
}
