//! Tracker history loading with an N-day window.
//!
//! This module loads recent records from both the journal and the CSV
//! archive to provide the event lists the computational core consumes.

use crate::journal::JournalRecord;
use crate::{DailyWellnessEntry, InjectionEvent, Result, WeightEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Recent tracker events, split by kind and sorted newest first
#[derive(Clone, Debug, Default)]
pub struct History {
    pub injections: Vec<InjectionEvent>,
    pub weights: Vec<WeightEntry>,
    pub wellness: Vec<DailyWellnessEntry>,
}

impl History {
    /// The most recent weight measurement, if any
    pub fn latest_weight(&self) -> Option<&WeightEntry> {
        self.weights.first()
    }

    /// The wellness entry logged for a specific date, if any
    ///
    /// When a date was logged more than once the most recently journaled
    /// entry wins.
    pub fn wellness_on(&self, date: NaiveDate) -> Option<&DailyWellnessEntry> {
        self.wellness.iter().find(|e| e.date == date)
    }
}

/// Load records from the last N days from both the journal and the CSV archive
///
/// Returns history sorted newest first within each kind. Records appearing
/// in both the journal and the archive are deduplicated by id.
pub fn load_recent_history(
    journal_path: &Path,
    csv_path: &Path,
    days: i64,
    now: DateTime<Utc>,
) -> Result<History> {
    let cutoff = now - Duration::days(days);
    let cutoff_date = cutoff.date_naive();

    let mut history = History::default();
    let mut seen_ids = HashSet::new();

    // Load from the journal first (most recent)
    if journal_path.exists() {
        let records = crate::journal::read_records(journal_path)?;
        let count = keep_recent(records, cutoff, cutoff_date, &mut seen_ids, &mut history);
        tracing::debug!("Loaded {} records from journal", count);
    }

    // Load from CSV (archived)
    if csv_path.exists() {
        let records = crate::csv_rollup::load_records_from_csv(csv_path)?;
        let count = keep_recent(records, cutoff, cutoff_date, &mut seen_ids, &mut history);
        tracing::debug!("Loaded {} records from CSV", count);
    }

    // Sort each kind newest first
    history
        .injections
        .sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    history.weights.sort_by(|a, b| b.date.cmp(&a.date));
    history.wellness.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::info!(
        "Loaded {} injections, {} weights, {} wellness entries from last {} days",
        history.injections.len(),
        history.weights.len(),
        history.wellness.len(),
        days
    );

    Ok(history)
}

/// Route in-window, unseen records into the history buckets
fn keep_recent(
    records: Vec<JournalRecord>,
    cutoff: DateTime<Utc>,
    cutoff_date: NaiveDate,
    seen_ids: &mut HashSet<uuid::Uuid>,
    history: &mut History,
) -> usize {
    let mut kept = 0;
    for record in records {
        if seen_ids.contains(&record.id()) {
            continue;
        }

        let in_window = match &record {
            JournalRecord::Injection(event) => event.occurred_at >= cutoff,
            JournalRecord::Weight(entry) => entry.date >= cutoff_date,
            JournalRecord::Wellness(entry) => entry.date >= cutoff_date,
        };
        if !in_window {
            continue;
        }

        seen_ids.insert(record.id());
        kept += 1;
        match record {
            JournalRecord::Injection(event) => history.injections.push(event),
            JournalRecord::Weight(entry) => history.weights.push(entry),
            JournalRecord::Wellness(entry) => history.wellness.push(entry),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{JsonlSink, RecordSink};
    use crate::{InjectionSite, WeightUnit};
    use uuid::Uuid;

    fn injection_record(days_ago: i64) -> JournalRecord {
        JournalRecord::Injection(InjectionEvent {
            id: Uuid::new_v4(),
            occurred_at: Utc::now() - Duration::days(days_ago),
            site: InjectionSite::UpperAbdomenRight,
            dose_mg: 0.5,
            symptoms: vec![],
            notes: None,
        })
    }

    fn weight_record(days_ago: i64, weight: f64) -> JournalRecord {
        JournalRecord::Weight(WeightEntry {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive() - Duration::days(days_ago),
            weight,
            unit: WeightUnit::Lbs,
            notes: None,
        })
    }

    #[test]
    fn test_load_recent_history_applies_window() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");
        let csv_path = temp_dir.path().join("events.csv");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&injection_record(1)).unwrap();
        sink.append(&injection_record(3)).unwrap();
        sink.append(&injection_record(10)).unwrap(); // Too old

        let history =
            load_recent_history(&journal_path, &csv_path, 7, Utc::now()).unwrap();
        assert_eq!(history.injections.len(), 2);
        assert!(history.weights.is_empty());
    }

    #[test]
    fn test_records_split_by_kind_and_sorted_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");
        let csv_path = temp_dir.path().join("events.csv");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&weight_record(5, 210.0)).unwrap();
        sink.append(&injection_record(2)).unwrap();
        sink.append(&weight_record(1, 208.0)).unwrap();

        let history =
            load_recent_history(&journal_path, &csv_path, 7, Utc::now()).unwrap();
        assert_eq!(history.injections.len(), 1);
        assert_eq!(history.weights.len(), 2);
        assert_eq!(history.weights[0].weight, 208.0);
        assert_eq!(history.latest_weight().unwrap().weight, 208.0);
    }

    #[test]
    fn test_deduplication_across_journal_and_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");
        let csv_path = temp_dir.path().join("events.csv");

        let record = injection_record(1);
        let record_id = record.id();
        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&record).unwrap();

        // Roll up to CSV, then re-journal the same record
        crate::csv_rollup::journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();
        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&record).unwrap();

        let history =
            load_recent_history(&journal_path, &csv_path, 7, Utc::now()).unwrap();

        let count = history
            .injections
            .iter()
            .filter(|i| i.id == record_id)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_wellness_on_finds_entry_by_date() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");
        let csv_path = temp_dir.path().join("events.csv");

        let today = Utc::now().date_naive();
        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&JournalRecord::Wellness(DailyWellnessEntry {
            id: Uuid::new_v4(),
            date: today,
            protein_grams: 80.0,
            water_oz: 64.0,
            fiber_grams: 25.0,
            strength_training: false,
            strength_minutes: None,
        }))
        .unwrap();

        let history =
            load_recent_history(&journal_path, &csv_path, 7, Utc::now()).unwrap();
        assert!(history.wellness_on(today).is_some());
        assert!(history
            .wellness_on(today - Duration::days(1))
            .is_none());
    }
}
