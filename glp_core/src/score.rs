//! Composite wellness scoring for a single day's entry.
//!
//! Four axes (protein, hydration, fiber, strength training), each a
//! linear-capped ratio against a fixed target worth up to 25 points. Axes
//! are rounded independently and the total is the sum of the rounded axes;
//! that ordering is load-bearing for exact score reproducibility.

use crate::{DailyWellnessEntry, HealthScoreBreakdown};

/// Daily targets, based on common recommendations for GLP-1 users
const PROTEIN_TARGET_GRAMS: f64 = 100.0;
const WATER_TARGET_OZ: f64 = 64.0;
const FIBER_TARGET_GRAMS: f64 = 30.0;
const STRENGTH_TARGET_MINUTES: f64 = 30.0;

/// Maximum points per axis
const AXIS_MAX: f64 = 25.0;

/// Score one axis: linear ratio against the target, capped, then rounded
///
/// Negative raw values are clamped to zero before scoring.
fn axis_score(actual: f64, target: f64) -> u8 {
    let points = (actual.max(0.0) / target * AXIS_MAX).min(AXIS_MAX);
    points.round() as u8
}

/// Score one day's wellness entry
///
/// The exercise axis scores zero unless strength training was both flagged
/// and given a duration; the other three axes are independent of it.
pub fn health_score(entry: &DailyWellnessEntry) -> HealthScoreBreakdown {
    let protein_score = axis_score(entry.protein_grams, PROTEIN_TARGET_GRAMS);
    let hydration_score = axis_score(entry.water_oz, WATER_TARGET_OZ);
    let fiber_score = axis_score(entry.fiber_grams, FIBER_TARGET_GRAMS);

    let exercise_score = match entry.strength_minutes {
        Some(minutes) if entry.strength_training => {
            axis_score(minutes, STRENGTH_TARGET_MINUTES)
        }
        _ => 0,
    };

    HealthScoreBreakdown {
        date: entry.date,
        total_score: protein_score + hydration_score + fiber_score + exercise_score,
        protein_score,
        hydration_score,
        fiber_score,
        exercise_score,
    }
}

/// Qualitative band for a total score, matching the tracker's display tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_score(total_score: u8) -> Self {
        match total_score {
            80..=u8::MAX => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }
}
