//! Aggregate statistics for the dashboard and doctor report.
//!
//! Everything here is a pure derivation over caller-supplied slices; the
//! clock is always a parameter. Ordering of every returned list is
//! deterministic so views and reports render identically across runs.

use crate::{
    convert_weight, score, trend, DailyWellnessEntry, DatedPoint, InjectionEvent,
    InjectionSite, Result, Symptom, Trend, WeightEntry, WeightUnit,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::HashMap;

/// How many symptoms a report's "most common" list keeps
const TOP_SYMPTOM_LIMIT: usize = 5;

// ============================================================================
// Series Bridges
// ============================================================================

/// Weight entries as a dated series in the requested unit
pub fn weight_series(weights: &[WeightEntry], unit: WeightUnit) -> Vec<DatedPoint> {
    weights
        .iter()
        .map(|w| DatedPoint {
            date: w.date,
            value: convert_weight(w.weight, w.unit, unit),
        })
        .collect()
}

/// Wellness entries as a dated series of total scores
pub fn score_series(entries: &[DailyWellnessEntry]) -> Vec<DatedPoint> {
    entries
        .iter()
        .map(|e| DatedPoint {
            date: e.date,
            value: f64::from(score::health_score(e).total_score),
        })
        .collect()
}

/// Windowed weight trend in the requested unit
pub fn weight_trend(
    weights: &[WeightEntry],
    unit: WeightUnit,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<Option<Trend>> {
    trend::windowed_trend(&weight_series(weights, unit), window_days, now)
}

// ============================================================================
// Symptom and Site Statistics
// ============================================================================

/// Occurrence counts per reported symptom
///
/// `Symptom::None` markers are excluded. Sorted by count descending, then
/// by label, so the order is stable for equal counts.
pub fn symptom_frequency(injections: &[InjectionEvent]) -> Vec<(Symptom, usize)> {
    let mut counts: HashMap<Symptom, usize> = HashMap::new();
    for injection in injections {
        for symptom in &injection.symptoms {
            if *symptom != Symptom::None {
                *counts.entry(*symptom).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(Symptom, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    ranked
}

/// Injection counts per site, in canonical rotation order
pub fn site_distribution(injections: &[InjectionEvent]) -> Vec<(InjectionSite, usize)> {
    let mut counts: HashMap<InjectionSite, usize> = HashMap::new();
    for injection in injections {
        *counts.entry(injection.site).or_insert(0) += 1;
    }

    InjectionSite::ALL
        .iter()
        .filter_map(|site| counts.get(site).map(|count| (*site, *count)))
        .collect()
}

/// Mean gap between a symptomatic injection and the injection before it
#[derive(Clone, Debug, PartialEq)]
pub struct SymptomTiming {
    pub symptom: Symptom,
    pub occurrences: usize,
    pub avg_days_after_previous: f64,
}

/// When symptoms typically show up relative to the preceding injection
///
/// For each occurrence the gap is the whole-day difference between the
/// symptomatic injection's date and the most recent earlier injection's
/// date; a first-ever injection counts as a zero-day gap. Ranked like
/// `symptom_frequency`.
pub fn symptom_timing(injections: &[InjectionEvent]) -> Vec<SymptomTiming> {
    let mut gaps: HashMap<Symptom, Vec<i64>> = HashMap::new();

    for injection in injections {
        let previous = injections
            .iter()
            .filter(|other| other.occurred_at < injection.occurred_at)
            .max_by_key(|other| other.occurred_at);
        let gap_days = previous
            .map(|previous| {
                (injection.occurred_at.date_naive() - previous.occurred_at.date_naive())
                    .num_days()
            })
            .unwrap_or(0);

        for symptom in &injection.symptoms {
            if *symptom != Symptom::None {
                gaps.entry(*symptom).or_default().push(gap_days);
            }
        }
    }

    let mut timings: Vec<SymptomTiming> = gaps
        .into_iter()
        .map(|(symptom, gap_days)| SymptomTiming {
            symptom,
            occurrences: gap_days.len(),
            avg_days_after_previous: gap_days.iter().sum::<i64>() as f64
                / gap_days.len() as f64,
        })
        .collect();
    timings.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.symptom.label().cmp(b.symptom.label()))
    });
    timings
}

// ============================================================================
// Score and Frequency Aggregates
// ============================================================================

/// Rounded mean of total wellness scores; `None` with no entries
pub fn average_health_score(entries: &[DailyWellnessEntry]) -> Option<u32> {
    if entries.is_empty() {
        return None;
    }
    let sum: u32 = entries
        .iter()
        .map(|e| u32::from(score::health_score(e).total_score))
        .sum();
    Some((f64::from(sum) / entries.len() as f64).round() as u32)
}

/// Injections per week for a trailing run of weeks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeeklyCount {
    pub week_start: NaiveDate,
    pub count: usize,
}

/// Start of the week (Sunday) containing the given date
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Injection counts per calendar week, oldest first
///
/// Covers the `weeks` most recent weeks ending with the week containing
/// "now"; weeks with no injections are included with a zero count.
pub fn weekly_injection_counts(
    injections: &[InjectionEvent],
    weeks: usize,
    now: DateTime<Utc>,
) -> Vec<WeeklyCount> {
    if injections.is_empty() || weeks == 0 {
        return Vec::new();
    }

    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for injection in injections {
        *counts
            .entry(week_start(injection.occurred_at.date_naive()))
            .or_insert(0) += 1;
    }

    let current_week = week_start(now.date_naive());
    (0..weeks)
        .rev()
        .map(|weeks_back| {
            let start = current_week - Duration::weeks(weeks_back as i64);
            WeeklyCount {
                week_start: start,
                count: counts.get(&start).copied().unwrap_or(0),
            }
        })
        .collect()
}

// ============================================================================
// Report Summary
// ============================================================================

/// First-to-last weight movement within a report window
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightChange {
    pub start: f64,
    pub end: f64,
    pub change: f64,
}

/// Roll-up of a reporting window for the doctor report
#[derive(Clone, Debug)]
pub struct ReportSummary {
    pub window_days: i64,
    pub total_injections: usize,
    pub weight_change: Option<WeightChange>,
    pub avg_health_score: Option<u32>,
    pub top_symptoms: Vec<Symptom>,
}

/// Summarize a trailing window of tracker data
///
/// Weight change needs at least two measurements in the window; the
/// average score needs at least one wellness entry. Either can be absent
/// independently of the other.
pub fn report_summary(
    injections: &[InjectionEvent],
    weights: &[WeightEntry],
    entries: &[DailyWellnessEntry],
    unit: WeightUnit,
    window_days: i64,
    now: DateTime<Utc>,
) -> ReportSummary {
    let today = now.date_naive();
    let cutoff = today - Duration::days(window_days);

    let window_injections: Vec<InjectionEvent> = injections
        .iter()
        .filter(|i| {
            let date = i.occurred_at.date_naive();
            date >= cutoff && date <= today
        })
        .cloned()
        .collect();

    let mut window_weights: Vec<&WeightEntry> = weights
        .iter()
        .filter(|w| w.date >= cutoff && w.date <= today)
        .collect();
    window_weights.sort_by_key(|w| w.date);

    let weight_change = if window_weights.len() >= 2 {
        let start = convert_weight(
            window_weights[0].weight,
            window_weights[0].unit,
            unit,
        );
        let last = window_weights[window_weights.len() - 1];
        let end = convert_weight(last.weight, last.unit, unit);
        Some(WeightChange {
            start,
            end,
            change: end - start,
        })
    } else {
        None
    };

    let window_entries: Vec<DailyWellnessEntry> = entries
        .iter()
        .filter(|e| e.date >= cutoff && e.date <= today)
        .cloned()
        .collect();

    let top_symptoms = symptom_frequency(&window_injections)
        .into_iter()
        .take(TOP_SYMPTOM_LIMIT)
        .map(|(symptom, _)| symptom)
        .collect();

    ReportSummary {
        window_days,
        total_injections: window_injections.len(),
        weight_change,
        avg_health_score: average_health_score(&window_entries),
        top_symptoms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn injection(days_ago: i64, site: InjectionSite, symptoms: Vec<Symptom>) -> InjectionEvent {
        InjectionEvent {
            id: Uuid::new_v4(),
            occurred_at: fixed_now() - Duration::days(days_ago),
            site,
            dose_mg: 0.5,
            symptoms,
            notes: None,
        }
    }

    fn weight(days_ago: i64, value: f64, unit: WeightUnit) -> WeightEntry {
        WeightEntry {
            id: Uuid::new_v4(),
            date: fixed_now().date_naive() - Duration::days(days_ago),
            weight: value,
            unit,
            notes: None,
        }
    }

    fn wellness(days_ago: i64, protein: f64) -> DailyWellnessEntry {
        DailyWellnessEntry {
            id: Uuid::new_v4(),
            date: fixed_now().date_naive() - Duration::days(days_ago),
            protein_grams: protein,
            water_oz: 0.0,
            fiber_grams: 0.0,
            strength_training: false,
            strength_minutes: None,
        }
    }

    #[test]
    fn test_symptom_frequency_excludes_none_and_ranks() {
        let injections = vec![
            injection(1, InjectionSite::ThighLeft, vec![Symptom::Nausea, Symptom::Fatigue]),
            injection(8, InjectionSite::ThighRight, vec![Symptom::Nausea]),
            injection(15, InjectionSite::ThighLeft, vec![Symptom::None]),
        ];

        let ranked = symptom_frequency(&injections);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], (Symptom::Nausea, 2));
        assert_eq!(ranked[1], (Symptom::Fatigue, 1));
    }

    #[test]
    fn test_symptom_frequency_breaks_count_ties_by_label() {
        let injections = vec![
            injection(1, InjectionSite::ThighLeft, vec![Symptom::Nausea]),
            injection(8, InjectionSite::ThighLeft, vec![Symptom::Headache]),
        ];

        let ranked = symptom_frequency(&injections);
        assert_eq!(ranked[0].0, Symptom::Headache);
        assert_eq!(ranked[1].0, Symptom::Nausea);
    }

    #[test]
    fn test_site_distribution_in_rotation_order() {
        let injections = vec![
            injection(1, InjectionSite::ThighLeft, vec![]),
            injection(8, InjectionSite::UpperAbdomenLeft, vec![]),
            injection(15, InjectionSite::ThighLeft, vec![]),
        ];

        let distribution = site_distribution(&injections);
        assert_eq!(
            distribution,
            vec![
                (InjectionSite::UpperAbdomenLeft, 1),
                (InjectionSite::ThighLeft, 2),
            ]
        );
    }

    #[test]
    fn test_symptom_timing_measures_gap_to_previous_injection() {
        let injections = vec![
            injection(14, InjectionSite::ThighLeft, vec![]),
            injection(7, InjectionSite::ThighRight, vec![Symptom::Nausea]),
            injection(1, InjectionSite::ThighLeft, vec![Symptom::Nausea]),
        ];

        let timings = symptom_timing(&injections);
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].symptom, Symptom::Nausea);
        assert_eq!(timings[0].occurrences, 2);
        // Gaps are 7 and 6 days
        assert!((timings[0].avg_days_after_previous - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_symptom_timing_first_injection_counts_zero_gap() {
        let injections = vec![injection(3, InjectionSite::ThighLeft, vec![Symptom::Headache])];

        let timings = symptom_timing(&injections);
        assert_eq!(timings[0].avg_days_after_previous, 0.0);
    }

    #[test]
    fn test_average_health_score() {
        assert_eq!(average_health_score(&[]), None);

        // Scores 25 and 0 average to 13
        let entries = vec![wellness(1, 100.0), wellness(2, 0.0)];
        assert_eq!(average_health_score(&entries), Some(13));
    }

    #[test]
    fn test_weekly_injection_counts_include_empty_weeks() {
        let injections = vec![
            injection(0, InjectionSite::ThighLeft, vec![]),
            injection(14, InjectionSite::ThighRight, vec![]),
        ];

        let counts = weekly_injection_counts(&injections, 3, fixed_now());
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 0);
        assert_eq!(counts[2].count, 1);
        // Week starts are Sundays, one week apart
        for window in counts.windows(2) {
            assert_eq!(window[1].week_start - window[0].week_start, Duration::weeks(1));
        }
    }

    #[test]
    fn test_weekly_counts_empty_without_injections() {
        assert!(weekly_injection_counts(&[], 12, fixed_now()).is_empty());
    }

    #[test]
    fn test_weight_series_converts_units() {
        let weights = vec![weight(1, 100.0, WeightUnit::Kg)];
        let series = weight_series(&weights, WeightUnit::Lbs);
        assert!((series[0].value - 220.462).abs() < 1e-6);
    }

    #[test]
    fn test_report_summary_rolls_up_window() {
        let injections = vec![
            injection(2, InjectionSite::ThighLeft, vec![Symptom::Nausea]),
            injection(9, InjectionSite::ThighRight, vec![Symptom::Nausea, Symptom::Fatigue]),
            injection(60, InjectionSite::UpperArmLeft, vec![Symptom::Headache]),
        ];
        let weights = vec![
            weight(25, 210.0, WeightUnit::Lbs),
            weight(2, 204.0, WeightUnit::Lbs),
        ];
        let entries = vec![wellness(1, 100.0)];

        let summary = report_summary(
            &injections,
            &weights,
            &entries,
            WeightUnit::Lbs,
            30,
            fixed_now(),
        );

        assert_eq!(summary.total_injections, 2);
        let change = summary.weight_change.unwrap();
        assert_eq!(change.start, 210.0);
        assert_eq!(change.end, 204.0);
        assert_eq!(change.change, -6.0);
        assert_eq!(summary.avg_health_score, Some(25));
        assert_eq!(summary.top_symptoms[0], Symptom::Nausea);
        assert!(!summary.top_symptoms.contains(&Symptom::Headache));
    }

    #[test]
    fn test_report_summary_with_sparse_data() {
        let summary = report_summary(&[], &[], &[], WeightUnit::Lbs, 30, fixed_now());

        assert_eq!(summary.total_injections, 0);
        assert_eq!(summary.weight_change, None);
        assert_eq!(summary.avg_health_score, None);
        assert!(summary.top_symptoms.is_empty());
    }
}
