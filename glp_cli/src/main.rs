use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use glp_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glpt")]
#[command(about = "GLP-1 medication and wellness tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an injection
    Inject {
        /// Injection site (e.g. thigh-left, upper-abdomen-right)
        #[arg(long)]
        site: Option<String>,

        /// Dose in mg
        #[arg(long)]
        dose: Option<f64>,

        /// Symptom experienced (repeatable)
        #[arg(long = "symptom")]
        symptoms: Vec<String>,

        /// Free-form note
        #[arg(long)]
        notes: Option<String>,

        /// Date of the injection (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Time of the injection (HH:MM, default now)
        #[arg(long)]
        time: Option<String>,
    },

    /// Record a body-weight measurement
    Weight {
        /// Measured weight
        value: f64,

        /// Unit (lbs or kg, default from config)
        #[arg(long)]
        unit: Option<String>,

        /// Date of the measurement (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Free-form note
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a day's nutrition and strength training
    Wellness {
        /// Protein eaten, grams
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Water drunk, ounces
        #[arg(long, default_value_t = 0.0)]
        water: f64,

        /// Fiber eaten, grams
        #[arg(long, default_value_t = 0.0)]
        fiber: f64,

        /// Minutes of strength training, if any
        #[arg(long)]
        strength_minutes: Option<f64>,

        /// Date of the entry (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the tracker summary (default)
    Status,

    /// Chart estimated medication levels
    Levels {
        /// Trailing window in days (default from config)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Show the wellness score breakdown for a date
    Score {
        /// Date to score (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the weight trend over a window
    Trend {
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Summarize a reporting window
    Report {
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll up journal records to CSV
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// Days of history loaded for level math; a dose contributes under 0.1%
/// of its peak after ten half-lives, so this covers any realistic setting
const HISTORY_WINDOW_DAYS: i64 = 120;

/// Presentation-layer downsampling: keep every 4th hourly sample
const CHART_SAMPLE_STRIDE: usize = 4;

struct Paths {
    journal: PathBuf,
    csv: PathBuf,
    state: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            journal: data_dir.join("journal").join("events.jsonl"),
            csv: data_dir.join("events.csv"),
            state: data_dir.join("journal").join("state.json"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    glp_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);

    // The clock is read once here; everything below is deterministic in it
    let now = Utc::now();

    match cli.command {
        Some(Commands::Inject {
            site,
            dose,
            symptoms,
            notes,
            date,
            time,
        }) => cmd_inject(&paths, &config, now, site, dose, symptoms, notes, date, time),
        Some(Commands::Weight {
            value,
            unit,
            date,
            notes,
        }) => cmd_weight(&paths, &config, now, value, unit, date, notes),
        Some(Commands::Wellness {
            protein,
            water,
            fiber,
            strength_minutes,
            date,
        }) => cmd_wellness(&paths, now, protein, water, fiber, strength_minutes, date),
        Some(Commands::Levels { days }) => cmd_levels(&paths, &config, now, days),
        Some(Commands::Score { date }) => cmd_score(&paths, now, date),
        Some(Commands::Trend { days }) => cmd_trend(&paths, &config, now, days),
        Some(Commands::Report { days }) => cmd_report(&paths, &config, now, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        Some(Commands::Status) | None => cmd_status(&paths, &config, now),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_inject(
    paths: &Paths,
    config: &Config,
    now: DateTime<Utc>,
    site: Option<String>,
    dose: Option<f64>,
    symptoms: Vec<String>,
    notes: Option<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
) -> Result<()> {
    let state = TrackerState::load(&paths.state)?;

    let site = match site {
        Some(raw) => parse_site(&raw)?,
        None => state.last_site.unwrap_or(InjectionSite::UpperAbdomenLeft),
    };
    let dose_mg = dose
        .or(state.last_dose_mg)
        .unwrap_or(config.medication.dose_mg);

    let mut parsed_symptoms = Vec::new();
    for raw in &symptoms {
        parsed_symptoms.push(parse_symptom(raw)?);
    }

    let occurred_at = resolve_timestamp(now, date, time)?;

    let event = InjectionEvent {
        id: uuid::Uuid::new_v4(),
        occurred_at,
        site,
        dose_mg,
        symptoms: parsed_symptoms.clone(),
        notes,
    };

    let mut sink = JsonlSink::new(&paths.journal);
    sink.append(&JournalRecord::Injection(event))?;

    // Remember this injection's choices as the next invocation's defaults
    TrackerState::update(&paths.state, |state| {
        state.last_site = Some(site);
        state.last_symptoms = parsed_symptoms.clone();
        state.last_dose_mg = Some(dose_mg);
        Ok(())
    })?;

    println!("✓ Injection logged: {} mg at {}", dose_mg, site.label());

    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    if let Some(due) = next_due_date(&history.injections, config.medication.interval_days) {
        println!("  Next due: {}", due);
    }

    Ok(())
}

fn cmd_weight(
    paths: &Paths,
    config: &Config,
    now: DateTime<Utc>,
    value: f64,
    unit: Option<String>,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<()> {
    let unit = match unit.as_deref() {
        Some(raw) => parse_weight_unit(raw)?,
        None => config.display.weight_unit,
    };

    let entry = WeightEntry {
        id: uuid::Uuid::new_v4(),
        date: date.unwrap_or_else(|| now.date_naive()),
        weight: value,
        unit,
        notes,
    };

    let mut sink = JsonlSink::new(&paths.journal);
    sink.append(&JournalRecord::Weight(entry))?;

    println!("✓ Weight logged: {} {}", value, unit.label());
    Ok(())
}

fn cmd_wellness(
    paths: &Paths,
    now: DateTime<Utc>,
    protein: f64,
    water: f64,
    fiber: f64,
    strength_minutes: Option<f64>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let entry = DailyWellnessEntry {
        id: uuid::Uuid::new_v4(),
        date: date.unwrap_or_else(|| now.date_naive()),
        protein_grams: protein,
        water_oz: water,
        fiber_grams: fiber,
        strength_training: strength_minutes.is_some(),
        strength_minutes,
    };

    let breakdown = health_score(&entry);

    let mut sink = JsonlSink::new(&paths.journal);
    sink.append(&JournalRecord::Wellness(entry))?;

    println!("✓ Wellness logged for {}", breakdown.date);
    display_score(&breakdown);
    Ok(())
}

fn cmd_status(paths: &Paths, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    let settings = config.medication.decay_settings();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  GLP-1 TRACKER STATUS");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if history.injections.is_empty() {
        println!("  No injections logged yet.");
    } else {
        let level = current_level(&history.injections, &settings, now)?;
        println!("  Estimated level: {:.1}%", level);

        if let Some(days) = days_since_last_injection(&history.injections, now) {
            println!("  Last injection:  {} day(s) ago", days);
        }
        if let Some(due) = next_due_date(&history.injections, config.medication.interval_days) {
            println!("  Next due:        {}", due);
        }
    }

    let unit = config.display.weight_unit;
    if let Some(latest) = history.latest_weight() {
        println!();
        println!(
            "  Weight: {:.1} {} ({})",
            convert_weight(latest.weight, latest.unit, unit),
            unit.label(),
            latest.date
        );
        match analytics::weight_trend(&history.weights, unit, 30, now)? {
            Some(trend) => println!(
                "  30-day trend: {} ({:+.1} {}, {:+.1}%)",
                direction_label(trend.direction),
                trend.change,
                unit.label(),
                trend.percent_change
            ),
            None => println!("  30-day trend: not enough data"),
        }
    }

    if let Some(entry) = history.wellness_on(now.date_naive()) {
        let breakdown = health_score(entry);
        println!();
        println!(
            "  Today's wellness score: {} ({})",
            breakdown.total_score,
            ScoreBand::for_score(breakdown.total_score).label()
        );
    }

    println!();
    Ok(())
}

fn cmd_levels(
    paths: &Paths,
    config: &Config,
    now: DateTime<Utc>,
    days: Option<i64>,
) -> Result<()> {
    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    let settings = config.medication.decay_settings();
    let window_days = days.unwrap_or(config.display.chart_days);

    let samples = medication_levels(&history.injections, &settings, window_days, now)?;

    println!("\n  Estimated medication level, last {} day(s)", window_days);
    println!();
    print!("  ");
    for sample in samples.iter().step_by(CHART_SAMPLE_STRIDE) {
        print!("{}", spark_char(sample.level));
    }
    println!();
    println!(
        "  {} … {}",
        samples
            .first()
            .map(|s| s.at.date_naive().to_string())
            .unwrap_or_default(),
        now.date_naive()
    );
    println!();
    println!(
        "  Now: {:.1}% (half-life {} days)",
        samples.last().map(|s| s.level).unwrap_or(0.0),
        settings.half_life_days
    );
    println!();
    Ok(())
}

fn cmd_score(paths: &Paths, now: DateTime<Utc>, date: Option<NaiveDate>) -> Result<()> {
    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    let date = date.unwrap_or_else(|| now.date_naive());

    match history.wellness_on(date) {
        Some(entry) => {
            display_score(&health_score(entry));
            Ok(())
        }
        None => {
            println!("No wellness entry logged for {}.", date);
            Ok(())
        }
    }
}

fn cmd_trend(paths: &Paths, config: &Config, now: DateTime<Utc>, days: i64) -> Result<()> {
    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    let unit = config.display.weight_unit;

    match analytics::weight_trend(&history.weights, unit, days, now)? {
        Some(trend) => {
            println!("\n  Weight trend, last {} day(s)", days);
            println!("  Direction: {}", direction_label(trend.direction));
            println!("  Change:    {:+.1} {}", trend.change, unit.label());
            println!("  Percent:   {:+.2}%", trend.percent_change);
            println!();
        }
        None => {
            println!("Not enough weight entries in the last {} day(s).", days);
        }
    }
    Ok(())
}

fn cmd_report(paths: &Paths, config: &Config, now: DateTime<Utc>, days: i64) -> Result<()> {
    let history = load_recent_history(&paths.journal, &paths.csv, HISTORY_WINDOW_DAYS, now)?;
    let unit = config.display.weight_unit;

    let summary = analytics::report_summary(
        &history.injections,
        &history.weights,
        &history.wellness,
        unit,
        days,
        now,
    );

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  REPORT: LAST {} DAYS", summary.window_days);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Injections: {}", summary.total_injections);

    match summary.weight_change {
        Some(change) => println!(
            "  Weight: {:.1} → {:.1} {} ({:+.1})",
            change.start,
            change.end,
            unit.label(),
            change.change
        ),
        None => println!("  Weight: not enough data"),
    }

    match summary.avg_health_score {
        Some(avg) => println!("  Avg wellness score: {}", avg),
        None => println!("  Avg wellness score: no entries"),
    }

    if !summary.top_symptoms.is_empty() {
        println!();
        println!("  Most common symptoms:");
        for symptom in &summary.top_symptoms {
            println!("    - {}", symptom.label());
        }
    }

    let sites = analytics::site_distribution(&history.injections);
    if !sites.is_empty() {
        println!();
        println!("  Injection sites:");
        for (site, count) in sites {
            println!("    {:24} {}", site.label(), count);
        }
    }

    let timings = analytics::symptom_timing(&history.injections);
    if !timings.is_empty() {
        println!();
        println!("  Symptom timing (days after previous injection):");
        for timing in timings {
            println!(
                "    {:20} {}x, avg {:.1} days",
                timing.symptom.label(),
                timing.occurrences,
                timing.avg_days_after_previous
            );
        }
    }

    println!();
    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.journal.exists() {
        println!("No journal file found - nothing to roll up.");
        return Ok(());
    }

    let count = glp_core::csv_rollup::journal_to_csv_and_archive(&paths.journal, &paths.csv)?;

    println!("✓ Rolled up {} records to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        if let Some(journal_dir) = paths.journal.parent() {
            let cleaned = glp_core::csv_rollup::cleanup_processed_journals(journal_dir)?;
            if cleaned > 0 {
                println!("✓ Cleaned up {} processed journal files", cleaned);
            }
        }
    }

    Ok(())
}

fn display_score(breakdown: &HealthScoreBreakdown) {
    println!("\n  Wellness score for {}", breakdown.date);
    println!();
    println!("    Protein:   {:>2} / 25", breakdown.protein_score);
    println!("    Hydration: {:>2} / 25", breakdown.hydration_score);
    println!("    Fiber:     {:>2} / 25", breakdown.fiber_score);
    println!("    Exercise:  {:>2} / 25", breakdown.exercise_score);
    println!("    ─────────────────");
    println!(
        "    Total:     {:>3} ({})",
        breakdown.total_score,
        ScoreBand::for_score(breakdown.total_score).label()
    );
    println!();
}

fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => "up",
        TrendDirection::Down => "down",
        TrendDirection::Stable => "stable",
    }
}

fn spark_char(level: f64) -> char {
    const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let index = (level / 100.0 * 7.0).round().clamp(0.0, 7.0) as usize;
    BLOCKS[index]
}

/// Combine the optional date/time overrides with "now" into a timestamp
fn resolve_timestamp(
    now: DateTime<Utc>,
    date: Option<NaiveDate>,
    time: Option<String>,
) -> Result<DateTime<Utc>> {
    let date = date.unwrap_or_else(|| now.date_naive());
    let time = match time {
        Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| {
            Error::InvalidInput(format!("time must be HH:MM, got '{}': {}", raw, e))
        })?,
        None => now.time(),
    };
    Ok(NaiveDateTime::new(date, time).and_utc())
}

fn parse_site(raw: &str) -> Result<InjectionSite> {
    let normalized = raw.to_lowercase().replace(['-', ' '], "_");
    let site = match normalized.as_str() {
        "upper_abdomen_left" => InjectionSite::UpperAbdomenLeft,
        "upper_abdomen_right" => InjectionSite::UpperAbdomenRight,
        "lower_abdomen_left" => InjectionSite::LowerAbdomenLeft,
        "lower_abdomen_right" => InjectionSite::LowerAbdomenRight,
        "thigh_left" => InjectionSite::ThighLeft,
        "thigh_right" => InjectionSite::ThighRight,
        "upper_arm_left" => InjectionSite::UpperArmLeft,
        "upper_arm_right" => InjectionSite::UpperArmRight,
        _ => {
            return Err(Error::InvalidInput(format!(
                "unknown injection site '{}'",
                raw
            )))
        }
    };
    Ok(site)
}

fn parse_symptom(raw: &str) -> Result<Symptom> {
    let normalized = raw.to_lowercase().replace(['-', ' '], "_");
    let symptom = match normalized.as_str() {
        "decreased_appetite" => Symptom::DecreasedAppetite,
        "nausea" => Symptom::Nausea,
        "headache" => Symptom::Headache,
        "fatigue" => Symptom::Fatigue,
        "dizziness" => Symptom::Dizziness,
        "indigestion" => Symptom::Indigestion,
        "hair_loss" => Symptom::HairLoss,
        "constipation" => Symptom::Constipation,
        "diarrhea" => Symptom::Diarrhea,
        "vomiting" => Symptom::Vomiting,
        "heartburn" => Symptom::Heartburn,
        "none" => Symptom::None,
        _ => {
            return Err(Error::InvalidInput(format!(
                "unknown symptom '{}'",
                raw
            )))
        }
    };
    Ok(symptom)
}

fn parse_weight_unit(raw: &str) -> Result<WeightUnit> {
    match raw.to_lowercase().as_str() {
        "lbs" | "lb" | "pounds" => Ok(WeightUnit::Lbs),
        "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kg),
        other => Err(Error::InvalidInput(format!(
            "unknown weight unit '{}'",
            other
        ))),
    }
}
