//! Statistics over a reading snapshot
//!
//! Every function here is a pure function of a slice of readings (and,
//! for windowed values, an explicit `now`). Nothing is cached: callers take
//! a fresh snapshot from the store per request and recompute.
//!
//! Absence of data is never an error. Empty logs and empty windows yield
//! `None`, which the HTTP layer serializes as `null`.

use crate::types::{time_label, HeartRateCategory, Metric, Reading};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Trailing windows reported in the stats summary, in minutes
pub const STATS_WINDOWS_MINUTES: [i64; 3] = [5, 15, 30];

/// Upper bound on readings returned by a single listing
pub const MAX_READINGS_LIMIT: usize = 100;

/// Pulse of the most recent reading
pub fn current_value(readings: &[Reading]) -> Option<u16> {
    readings.last().map(|r| r.pulse)
}

/// Most recent value of `metric`, skipping readings that lack it
pub fn current_metric(readings: &[Reading], metric: Metric) -> Option<f64> {
    readings.iter().rev().find_map(|r| r.metric_value(metric))
}

/// Rounded mean of `metric` over readings at or after `now - window_minutes`
///
/// Readings without the metric are excluded from both sum and count.
pub fn windowed_average(
    readings: &[Reading],
    now: DateTime<Utc>,
    window_minutes: i64,
    metric: Metric,
) -> Option<u32> {
    let cutoff = now - Duration::minutes(window_minutes);
    let (sum, count) = readings
        .iter()
        .filter(|r| r.timestamp >= cutoff)
        .filter_map(|r| r.metric_value(metric))
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return None;
    }
    // Values are non-negative, so round() is round-half-up
    Some((sum / count as f64).round() as u32)
}

/// Local `HH:MM:SS` time of the most recent reading
pub fn last_updated(readings: &[Reading]) -> Option<String> {
    readings.last().map(|r| time_label(r.timestamp))
}

/// Oxygen saturation block of the stats summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spo2Summary {
    pub current: Option<f64>,
    pub last5_minutes: Option<u32>,
    pub last15_minutes: Option<u32>,
    pub last30_minutes: Option<u32>,
    /// Retained readings that carry a saturation value
    pub readings: usize,
}

/// Response body of the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub last5_minutes: Option<u32>,
    pub last15_minutes: Option<u32>,
    pub last30_minutes: Option<u32>,
    pub current: Option<u16>,
    pub last_updated: Option<String>,
    pub total_readings: usize,
    pub has_data: bool,
    pub spo2: Spo2Summary,
}

/// Compose the stats summary for a snapshot
pub fn stats_summary(readings: &[Reading], now: DateTime<Utc>) -> StatsSummary {
    let [w5, w15, w30] = STATS_WINDOWS_MINUTES;
    let total_readings = readings.len();

    StatsSummary {
        last5_minutes: windowed_average(readings, now, w5, Metric::Pulse),
        last15_minutes: windowed_average(readings, now, w15, Metric::Pulse),
        last30_minutes: windowed_average(readings, now, w30, Metric::Pulse),
        current: current_value(readings),
        last_updated: last_updated(readings),
        total_readings,
        has_data: total_readings > 0,
        spo2: Spo2Summary {
            current: current_metric(readings, Metric::Spo2),
            last5_minutes: windowed_average(readings, now, w5, Metric::Spo2),
            last15_minutes: windowed_average(readings, now, w15, Metric::Spo2),
            last30_minutes: windowed_average(readings, now, w30, Metric::Spo2),
            readings: readings.iter().filter(|r| r.spo2.is_some()).count(),
        },
    }
}

/// Most-recent-first listing, at most `limit` entries, at or after `since`
///
/// `limit` is capped at [`MAX_READINGS_LIMIT`] regardless of what the
/// caller validated.
pub fn filtered_readings(
    readings: &[Reading],
    limit: usize,
    since: Option<DateTime<Utc>>,
) -> Vec<Reading> {
    let limit = limit.min(MAX_READINGS_LIMIT);

    let mut selected: Vec<Reading> = readings
        .iter()
        .filter(|r| since.map_or(true, |since| r.timestamp >= since))
        .cloned()
        .collect();

    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    selected.truncate(limit);
    selected
}

/// Risky vs. normal counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTally {
    pub total: usize,
    pub risky: usize,
    pub normal: usize,
    pub risky_percentage: u32,
}

/// Count risky and normal readings
pub fn category_tally(readings: &[Reading]) -> CategoryTally {
    let total = readings.len();
    let risky = readings.iter().filter(|r| r.is_risky).count();
    let risky_percentage = if total == 0 {
        0
    } else {
        (100.0 * risky as f64 / total as f64).round() as u32
    };

    CategoryTally {
        total,
        risky,
        normal: total - risky,
        risky_percentage,
    }
}

/// Low / normal / high counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

/// Count readings per heart rate category
pub fn category_breakdown(readings: &[Reading]) -> CategoryBreakdown {
    readings
        .iter()
        .fold(CategoryBreakdown::default(), |mut acc, r| {
            match r.category {
                HeartRateCategory::Low => acc.low += 1,
                HeartRateCategory::Normal => acc.normal += 1,
                HeartRateCategory::High => acc.high += 1,
            }
            acc
        })
}
