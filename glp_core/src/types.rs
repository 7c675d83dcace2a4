//! Core domain types for the GLP-1 tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Injection events and their properties (site, dose, symptoms)
//! - Weight and daily wellness entries
//! - Medication decay settings and derived level samples
//! - Score breakdowns and trend results
//! - Persisted smart-default state

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Injection Types
// ============================================================================

/// Where an injection was administered
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InjectionSite {
    UpperAbdomenLeft,
    UpperAbdomenRight,
    LowerAbdomenLeft,
    LowerAbdomenRight,
    ThighLeft,
    ThighRight,
    UpperArmLeft,
    UpperArmRight,
}

impl InjectionSite {
    /// All sites in canonical rotation order
    pub const ALL: [InjectionSite; 8] = [
        InjectionSite::UpperAbdomenLeft,
        InjectionSite::UpperAbdomenRight,
        InjectionSite::LowerAbdomenLeft,
        InjectionSite::LowerAbdomenRight,
        InjectionSite::ThighLeft,
        InjectionSite::ThighRight,
        InjectionSite::UpperArmLeft,
        InjectionSite::UpperArmRight,
    ];

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            InjectionSite::UpperAbdomenLeft => "Upper Abdomen (Left)",
            InjectionSite::UpperAbdomenRight => "Upper Abdomen (Right)",
            InjectionSite::LowerAbdomenLeft => "Lower Abdomen (Left)",
            InjectionSite::LowerAbdomenRight => "Lower Abdomen (Right)",
            InjectionSite::ThighLeft => "Thigh (Left)",
            InjectionSite::ThighRight => "Thigh (Right)",
            InjectionSite::UpperArmLeft => "Upper Arm (Left)",
            InjectionSite::UpperArmRight => "Upper Arm (Right)",
        }
    }
}

/// Side effect reported alongside an injection
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    DecreasedAppetite,
    Nausea,
    Headache,
    Fatigue,
    Dizziness,
    Indigestion,
    HairLoss,
    Constipation,
    Diarrhea,
    Vomiting,
    Heartburn,
    None,
}

impl Symptom {
    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Symptom::DecreasedAppetite => "Decreased Appetite",
            Symptom::Nausea => "Nausea",
            Symptom::Headache => "Headache",
            Symptom::Fatigue => "Fatigue",
            Symptom::Dizziness => "Dizziness",
            Symptom::Indigestion => "Indigestion",
            Symptom::HairLoss => "Hair Loss",
            Symptom::Constipation => "Constipation",
            Symptom::Diarrhea => "Diarrhea",
            Symptom::Vomiting => "Vomiting",
            Symptom::Heartburn => "Heartburn",
            Symptom::None => "None",
        }
    }
}

/// A recorded medication injection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InjectionEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub site: InjectionSite,
    pub dose_mg: f64,
    pub symptoms: Vec<Symptom>,
    pub notes: Option<String>,
}

// ============================================================================
// Weight and Wellness Entries
// ============================================================================

/// Unit a weight measurement was taken in
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
        }
    }
}

/// Convert a weight value between units
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Lbs, WeightUnit::Kg) => value * 0.453592,
        (WeightUnit::Kg, WeightUnit::Lbs) => value * 2.20462,
        _ => value,
    }
}

/// A body-weight measurement for one day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub weight: f64,
    pub unit: WeightUnit,
    pub notes: Option<String>,
}

/// One day's nutrition and strength-training log
///
/// Uniqueness by date is the caller's concern; the scorer treats each
/// entry as a self-contained day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyWellnessEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub protein_grams: f64,
    pub water_oz: f64,
    pub fiber_grams: f64,
    pub strength_training: bool,
    pub strength_minutes: Option<f64>,
}

// ============================================================================
// Medication Model Types
// ============================================================================

/// Kind of GLP-1 medication being tracked
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MedicationKind {
    Semaglutide,
    Tirzepatide,
    Other,
}

/// Parameters of the exponential decay model
///
/// `half_life_days` must be strictly positive; the decay functions reject
/// anything else before producing output.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DecaySettings {
    pub half_life_days: f64,
}

/// A single point on the estimated medication curve (derived, never stored)
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct LevelSample {
    pub at: DateTime<Utc>,
    /// Estimated active medication, 0-100, where 100 is one nominal dose's peak
    pub level: f64,
}

// ============================================================================
// Scoring and Trend Types
// ============================================================================

/// Per-axis breakdown of one day's wellness score
///
/// Each axis is 0-25; the total is the sum of the four already-rounded
/// axes, so it is 0-100.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthScoreBreakdown {
    pub date: NaiveDate,
    pub total_score: u8,
    pub protein_score: u8,
    pub hydration_score: u8,
    pub fiber_score: u8,
    pub exercise_score: u8,
}

/// A dated numeric observation, the generic input of the trend helpers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Direction a windowed series is moving in
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Windowed change statistics over a dated series
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trend {
    pub change: f64,
    pub percent_change: f64,
    pub direction: TrendDirection,
}

// ============================================================================
// Persisted State
// ============================================================================

/// Smart defaults remembered between invocations
///
/// These seed the next `inject` command's prompts; losing the file only
/// loses the defaults, so corruption falls back to `Default`.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TrackerState {
    pub last_site: Option<InjectionSite>,
    pub last_symptoms: Vec<Symptom>,
    pub last_dose_mg: Option<f64>,
}
