//! Append-only event journal.
//!
//! Injections, weights, and wellness entries are appended to a JSONL
//! (JSON Lines) file with file locking to ensure safe concurrent access.

use crate::{DailyWellnessEntry, InjectionEvent, Result, WeightEntry};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One journaled tracker event
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalRecord {
    Injection(InjectionEvent),
    Weight(WeightEntry),
    Wellness(DailyWellnessEntry),
}

impl JournalRecord {
    /// Stable identity of the underlying event, used for deduplication
    pub fn id(&self) -> Uuid {
        match self {
            JournalRecord::Injection(event) => event.id,
            JournalRecord::Weight(entry) => entry.id,
            JournalRecord::Wellness(entry) => entry.id,
        }
    }
}

/// Record sink trait for persisting journal records
pub trait RecordSink {
    fn append(&mut self, record: &JournalRecord) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlSink {
    fn append(&mut self, record: &JournalRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write record as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        // Lock is automatically released when file is dropped
        file.unlock()?;

        tracing::debug!("Appended record {} to journal", record.id());
        Ok(())
    }
}

/// Read all records from a journal file
pub fn read_records(path: &Path) -> Result<Vec<JournalRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from journal", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InjectionSite, WeightUnit};
    use chrono::Utc;

    fn injection_record() -> JournalRecord {
        JournalRecord::Injection(InjectionEvent {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            site: InjectionSite::LowerAbdomenLeft,
            dose_mg: 0.5,
            symptoms: vec![crate::Symptom::Nausea],
            notes: Some("first week".into()),
        })
    }

    fn weight_record() -> JournalRecord {
        JournalRecord::Weight(WeightEntry {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            weight: 205.5,
            unit: WeightUnit::Lbs,
            notes: None,
        })
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");

        let record = injection_record();
        let record_id = record.id();

        // Append record
        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&record).unwrap();

        // Read back
        let records = read_records(&journal_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), record_id);
    }

    #[test]
    fn test_append_mixed_record_kinds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&injection_record()).unwrap();
        sink.append(&weight_record()).unwrap();
        sink.append(&JournalRecord::Wellness(DailyWellnessEntry {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            protein_grams: 90.0,
            water_oz: 48.0,
            fiber_grams: 20.0,
            strength_training: true,
            strength_minutes: Some(20.0),
        }))
        .unwrap();

        let records = read_records(&journal_path).unwrap();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], JournalRecord::Injection(_)));
        assert!(matches!(records[1], JournalRecord::Weight(_)));
        assert!(matches!(records[2], JournalRecord::Wellness(_)));
    }

    #[test]
    fn test_read_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("nonexistent.jsonl");

        let records = read_records(&journal_path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("events.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&injection_record()).unwrap();

        // Inject a corrupt line between two good ones
        {
            let mut file = OpenOptions::new().append(true).open(&journal_path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        sink.append(&weight_record()).unwrap();

        let records = read_records(&journal_path).unwrap();
        assert_eq!(records.len(), 2);
    }
}
