//! Exponential decay model for estimating active medication levels.
//!
//! Each injection contributes `100 * e^(-λt)` where `λ = ln 2 / half-life`
//! and `t` is the time since the injection. The level at any instant is the
//! sum of contributions from all prior injections, capped at 100. The cap is
//! a deliberate simplification of overlapping doses, not true
//! pharmacokinetic superposition; downstream views depend on it.
//!
//! Every function takes "now" as a parameter so results are reproducible.

use crate::{DecaySettings, Error, InjectionEvent, LevelSample, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Peak contribution of a single nominal dose, in percent
const PEAK_LEVEL: f64 = 100.0;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Decay constant λ in 1/millisecond, validated against the settings
///
/// Rejects non-positive or non-finite half-lives up front so the math
/// below can never produce NaN or infinity.
fn decay_constant_per_ms(settings: &DecaySettings) -> Result<f64> {
    if !settings.half_life_days.is_finite() || settings.half_life_days <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "half-life must be a positive number of days, got {}",
            settings.half_life_days
        )));
    }
    Ok(std::f64::consts::LN_2 / (settings.half_life_days * MS_PER_DAY))
}

/// Sum of decay contributions at a given instant, capped at the peak
fn level_at_ms(injections: &[InjectionEvent], lambda: f64, at_ms: i64) -> f64 {
    let mut total = 0.0;
    for injection in injections {
        let injected_ms = injection.occurred_at.timestamp_millis();
        // No contribution before the injection occurs
        if injected_ms <= at_ms {
            let elapsed_ms = (at_ms - injected_ms) as f64;
            total += PEAK_LEVEL * (-lambda * elapsed_ms).exp();
        }
    }
    total.min(PEAK_LEVEL)
}

/// Estimated medication levels over a trailing window, sampled hourly
///
/// Produces `window_days * 24 + 1` samples, oldest first, from
/// `now - window_days` days up to and including `now`. Injections may be
/// supplied in any order; an empty list yields all-zero levels.
pub fn medication_levels(
    injections: &[InjectionEvent],
    settings: &DecaySettings,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<LevelSample>> {
    let lambda = decay_constant_per_ms(settings)?;

    if window_days < 0 {
        return Err(Error::InvalidInput(format!(
            "window must be a non-negative number of days, got {}",
            window_days
        )));
    }

    let hours = window_days * 24;
    let mut samples = Vec::with_capacity(hours as usize + 1);

    for hours_back in (0..=hours).rev() {
        let at = now - Duration::hours(hours_back);
        let level = level_at_ms(injections, lambda, at.timestamp_millis());
        samples.push(LevelSample { at, level });
    }

    Ok(samples)
}

/// Estimated medication level right now, without materializing a window
pub fn current_level(
    injections: &[InjectionEvent],
    settings: &DecaySettings,
    now: DateTime<Utc>,
) -> Result<f64> {
    let lambda = decay_constant_per_ms(settings)?;
    Ok(level_at_ms(injections, lambda, now.timestamp_millis()))
}

/// The most recent injection, if any
///
/// Ties on the timestamp keep the earliest-logged event: an event only
/// displaces the running best when it is strictly more recent, so the
/// result is deterministic for a given input order.
pub fn last_injection(injections: &[InjectionEvent]) -> Option<&InjectionEvent> {
    injections.iter().fold(None, |best, event| match best {
        Some(b) if event.occurred_at <= b.occurred_at => Some(b),
        _ => Some(event),
    })
}

/// Whole days between "now" and the most recent injection's calendar date
///
/// Day granularity, not timestamps: an injection late last night counts as
/// one day ago this morning. `None` when nothing has been logged.
pub fn days_since_last_injection(
    injections: &[InjectionEvent],
    now: DateTime<Utc>,
) -> Option<i64> {
    let last = last_injection(injections)?;
    Some((now.date_naive() - last.occurred_at.date_naive()).num_days())
}

/// Suggested date of the next injection on a fixed cadence
///
/// The reminder is independent of the decay level: most recent injection's
/// calendar date plus `interval_days`. `None` when nothing has been logged.
pub fn next_due_date(injections: &[InjectionEvent], interval_days: i64) -> Option<NaiveDate> {
    let last = last_injection(injections)?;
    Some(last.occurred_at.date_naive() + Duration::days(interval_days))
}
