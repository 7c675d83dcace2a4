//! Built-in medication presets.
//!
//! Maps a medication choice to the decay and cadence parameters the rest of
//! the system needs: half-life, injection interval, and the usual titration
//! steps.

use crate::types::{DecaySettings, MedicationKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default formulary - built once and reused across all operations
static DEFAULT_FORMULARY: Lazy<Formulary> = Lazy::new(build_default_formulary_internal);

/// Get a reference to the cached default formulary
pub fn get_default_formulary() -> &'static Formulary {
    &DEFAULT_FORMULARY
}

/// Builds the default formulary with built-in medication presets
///
/// **Note**: For production use, prefer `get_default_formulary()` which
/// returns a cached reference. This function is retained for testing and
/// custom formulary creation.
pub fn build_default_formulary() -> Formulary {
    build_default_formulary_internal()
}

/// Parameters for one medication choice
#[derive(Clone, Debug)]
pub struct MedicationPreset {
    pub kind: MedicationKind,
    pub name: String,
    pub half_life_days: f64,
    pub interval_days: i64,
    pub dose_steps_mg: Vec<f64>,
}

impl MedicationPreset {
    /// Decay model parameters for this medication
    pub fn decay_settings(&self) -> DecaySettings {
        DecaySettings {
            half_life_days: self.half_life_days,
        }
    }
}

/// The complete set of known medication presets
#[derive(Clone, Debug)]
pub struct Formulary {
    pub presets: HashMap<MedicationKind, MedicationPreset>,
}

impl Formulary {
    /// Look up the preset for a medication kind
    pub fn preset(&self, kind: MedicationKind) -> Option<&MedicationPreset> {
        self.presets.get(&kind)
    }

    /// Validate the formulary for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (kind, preset) in &self.presets {
            if kind != &preset.kind {
                errors.push(format!(
                    "Preset key {:?} doesn't match preset.kind {:?}",
                    kind, preset.kind
                ));
            }
            if preset.name.is_empty() {
                errors.push(format!("Preset {:?} has empty name", kind));
            }
            if !preset.half_life_days.is_finite() || preset.half_life_days <= 0.0 {
                errors.push(format!(
                    "Preset {:?} has non-positive half-life {}",
                    kind, preset.half_life_days
                ));
            }
            if preset.interval_days < 1 {
                errors.push(format!(
                    "Preset {:?} has interval {} days (must be at least 1)",
                    kind, preset.interval_days
                ));
            }
            for step in &preset.dose_steps_mg {
                if *step <= 0.0 {
                    errors.push(format!(
                        "Preset {:?} has non-positive dose step {}",
                        kind, step
                    ));
                }
            }
        }

        for kind in [
            MedicationKind::Semaglutide,
            MedicationKind::Tirzepatide,
            MedicationKind::Other,
        ] {
            if !self.presets.contains_key(&kind) {
                errors.push(format!("Formulary is missing a preset for {:?}", kind));
            }
        }

        errors
    }
}

/// Internal function that actually builds the formulary
fn build_default_formulary_internal() -> Formulary {
    let mut presets = HashMap::new();

    presets.insert(
        MedicationKind::Semaglutide,
        MedicationPreset {
            kind: MedicationKind::Semaglutide,
            name: "Semaglutide (Ozempic / Wegovy)".into(),
            half_life_days: 7.0,
            interval_days: 7,
            dose_steps_mg: vec![0.25, 0.5, 1.0, 1.7, 2.4],
        },
    );

    presets.insert(
        MedicationKind::Tirzepatide,
        MedicationPreset {
            kind: MedicationKind::Tirzepatide,
            name: "Tirzepatide (Mounjaro / Zepbound)".into(),
            half_life_days: 5.0,
            interval_days: 7,
            dose_steps_mg: vec![2.5, 5.0, 7.5, 10.0, 12.5, 15.0],
        },
    );

    presets.insert(
        MedicationKind::Other,
        MedicationPreset {
            kind: MedicationKind::Other,
            name: "Other GLP-1".into(),
            half_life_days: 7.0,
            interval_days: 7,
            dose_steps_mg: vec![],
        },
    );

    Formulary { presets }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formulary_is_valid() {
        let formulary = build_default_formulary();
        let errors = formulary.validate();
        assert!(errors.is_empty(), "validation errors: {:?}", errors);
    }

    #[test]
    fn test_known_half_lives() {
        let formulary = get_default_formulary();

        let sema = formulary.preset(MedicationKind::Semaglutide).unwrap();
        assert_eq!(sema.half_life_days, 7.0);
        assert_eq!(sema.interval_days, 7);

        let tirz = formulary.preset(MedicationKind::Tirzepatide).unwrap();
        assert_eq!(tirz.half_life_days, 5.0);
    }

    #[test]
    fn test_validate_flags_bad_preset() {
        let mut formulary = build_default_formulary();
        if let Some(preset) = formulary.presets.get_mut(&MedicationKind::Other) {
            preset.half_life_days = 0.0;
            preset.interval_days = 0;
        }

        let errors = formulary.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_decay_settings_from_preset() {
        let formulary = get_default_formulary();
        let settings = formulary
            .preset(MedicationKind::Semaglutide)
            .unwrap()
            .decay_settings();
        assert_eq!(settings.half_life_days, 7.0);
    }
}
