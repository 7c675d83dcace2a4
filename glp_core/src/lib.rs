#![forbid(unsafe_code)]

//! Core domain model and business logic for the GLP-1 tracker.
//!
//! This crate provides:
//! - Domain types (injections, weight, wellness entries)
//! - Medication decay model and level queries
//! - Wellness scoring, trend statistics, and report analytics
//! - Persistence (journal, CSV rollup, state)
//!
//! The computational modules are pure: they perform no I/O and take the
//! current time as an explicit parameter.

pub mod types;
pub mod error;
pub mod medications;
pub mod config;
pub mod logging;
pub mod journal;
pub mod csv_rollup;
pub mod state;
pub mod history;
pub mod decay;
pub mod score;
pub mod trend;
pub mod analytics;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use medications::{build_default_formulary, get_default_formulary};
pub use config::Config;
pub use journal::{JournalRecord, JsonlSink, RecordSink};
pub use history::{load_recent_history, History};
pub use decay::{current_level, days_since_last_injection, medication_levels, next_due_date};
pub use score::{health_score, ScoreBand};
pub use trend::windowed_trend;
