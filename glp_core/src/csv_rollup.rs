//! CSV rollup functionality for archiving journal records.
//!
//! This module implements atomic journal-to-CSV conversion with proper
//! error handling to prevent data loss. All three record kinds share one
//! flat row shape; columns that don't apply to a kind stay empty.

use crate::journal::JournalRecord;
use crate::{DailyWellnessEntry, Error, InjectionEvent, Result, Symptom, WeightEntry};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CsvRow {
    kind: String,
    id: String,
    date: String,
    occurred_at: Option<String>,
    site: Option<String>,
    dose_mg: Option<f64>,
    symptoms: Option<String>,
    weight: Option<f64>,
    unit: Option<String>,
    protein_grams: Option<f64>,
    water_oz: Option<f64>,
    fiber_grams: Option<f64>,
    strength_training: Option<bool>,
    strength_minutes: Option<f64>,
    notes: Option<String>,
}

fn join_symptoms(symptoms: &[Symptom]) -> String {
    symptoms
        .iter()
        .map(|s| {
            serde_json::to_value(s)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn split_symptoms(joined: &str) -> Vec<Symptom> {
    joined
        .split(';')
        .filter(|s| !s.is_empty())
        .filter_map(|s| serde_json::from_value(serde_json::Value::String(s.into())).ok())
        .collect()
}

impl From<&JournalRecord> for CsvRow {
    fn from(record: &JournalRecord) -> Self {
        let empty = CsvRow {
            kind: String::new(),
            id: record.id().to_string(),
            date: String::new(),
            occurred_at: None,
            site: None,
            dose_mg: None,
            symptoms: None,
            weight: None,
            unit: None,
            protein_grams: None,
            water_oz: None,
            fiber_grams: None,
            strength_training: None,
            strength_minutes: None,
            notes: None,
        };

        match record {
            JournalRecord::Injection(event) => CsvRow {
                kind: "injection".into(),
                date: event.occurred_at.date_naive().to_string(),
                occurred_at: Some(event.occurred_at.to_rfc3339()),
                site: serde_json::to_value(event.site)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_owned)),
                dose_mg: Some(event.dose_mg),
                symptoms: Some(join_symptoms(&event.symptoms)),
                notes: event.notes.clone(),
                ..empty
            },
            JournalRecord::Weight(entry) => CsvRow {
                kind: "weight".into(),
                date: entry.date.to_string(),
                weight: Some(entry.weight),
                unit: Some(entry.unit.label().into()),
                notes: entry.notes.clone(),
                ..empty
            },
            JournalRecord::Wellness(entry) => CsvRow {
                kind: "wellness".into(),
                date: entry.date.to_string(),
                protein_grams: Some(entry.protein_grams),
                water_oz: Some(entry.water_oz),
                fiber_grams: Some(entry.fiber_grams),
                strength_training: Some(entry.strength_training),
                strength_minutes: entry.strength_minutes,
                ..empty
            },
        }
    }
}

impl TryFrom<CsvRow> for JournalRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;
        let date = row
            .date
            .parse()
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?;

        match row.kind.as_str() {
            "injection" => {
                let occurred_at = row
                    .occurred_at
                    .as_deref()
                    .ok_or_else(|| Error::Other("Injection row missing timestamp".into()))?;
                let occurred_at = DateTime::parse_from_rfc3339(occurred_at)
                    .map_err(|e| Error::Other(format!("Invalid timestamp: {}", e)))?
                    .with_timezone(&Utc);

                let site = row
                    .site
                    .as_deref()
                    .and_then(|s| {
                        serde_json::from_value(serde_json::Value::String(s.into())).ok()
                    })
                    .ok_or_else(|| Error::Other("Injection row has unknown site".into()))?;

                Ok(JournalRecord::Injection(InjectionEvent {
                    id,
                    occurred_at,
                    site,
                    dose_mg: row.dose_mg.unwrap_or(0.0),
                    symptoms: row.symptoms.as_deref().map(split_symptoms).unwrap_or_default(),
                    notes: row.notes,
                }))
            }
            "weight" => {
                let unit = match row.unit.as_deref() {
                    Some("kg") => crate::WeightUnit::Kg,
                    _ => crate::WeightUnit::Lbs,
                };
                Ok(JournalRecord::Weight(WeightEntry {
                    id,
                    date,
                    weight: row
                        .weight
                        .ok_or_else(|| Error::Other("Weight row missing value".into()))?,
                    unit,
                    notes: row.notes,
                }))
            }
            "wellness" => Ok(JournalRecord::Wellness(DailyWellnessEntry {
                id,
                date,
                protein_grams: row.protein_grams.unwrap_or(0.0),
                water_oz: row.water_oz.unwrap_or(0.0),
                fiber_grams: row.fiber_grams.unwrap_or(0.0),
                strength_training: row.strength_training.unwrap_or(false),
                strength_minutes: row.strength_minutes,
            })),
            other => Err(Error::Other(format!("Unknown record kind '{}'", other))),
        }
    }
}

/// Roll up journal records into CSV and archive the journal atomically
///
/// This function:
/// 1. Reads all records from the journal
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to .processed
/// 5. Returns the number of records processed
///
/// # Safety
/// - CSV is fsynced before the journal is renamed
/// - The journal is renamed (not deleted) to allow manual recovery if needed
/// - Processed journal files can be cleaned up with `cleanup_processed_journals`
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    // Read all records from the journal
    let records = crate::journal::read_records(journal_path)?;

    if records.is_empty() {
        tracing::info!("No records in journal to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open CSV file for appending
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Determine if we need to write headers by checking file size after opening
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    // Write all records to CSV
    for record in &records {
        let row = CsvRow::from(record);
        writer.serialize(row)?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} records to CSV", records.len());

    // Atomically archive the journal by renaming it
    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(records.len())
}

/// Load all archived records from a CSV file
///
/// Malformed rows are skipped with a warning rather than aborting the load.
pub fn load_records_from_csv(path: &Path) -> Result<Vec<JournalRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match JournalRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(records)
}

/// Clean up old processed journal files
///
/// This removes all .jsonl.processed files in the given directory.
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed journal: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
