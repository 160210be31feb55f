//! Core data types for heart rate monitoring
//!
//! This module defines the fundamental data structures:
//! - `Reading`: a single stored observation with its derived risk flag
//! - `RiskThresholds`: the normal pulse range used for classification
//! - `Metric`: which value an aggregate is computed over
//!
//! Plus the domain validation shared by the HTTP layer and the store.

use crate::error::{Result, SinmamError};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted pulse in BPM
pub const PULSE_MIN: f64 = 30.0;
/// Highest accepted pulse in BPM
pub const PULSE_MAX: f64 = 250.0;
/// Lowest accepted oxygen saturation in percent
pub const SPO2_MIN: f64 = 50.0;
/// Highest accepted oxygen saturation in percent
pub const SPO2_MAX: f64 = 100.0;

/// Identifier assigned by the store, strictly increasing for the process lifetime
pub type ReadingId = u64;

/// Pulse range outside of which a reading is classified as risky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Pulses strictly above this are risky (tachycardia)
    pub upper: u16,
    /// Pulses strictly below this are risky (bradycardia)
    pub lower: u16,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            upper: 100,
            lower: 60,
        }
    }
}

impl RiskThresholds {
    /// Risky iff `pulse > upper` or `pulse < lower`
    pub fn is_risky(&self, pulse: u16) -> bool {
        pulse > self.upper || pulse < self.lower
    }

    /// Classify a pulse against this range
    pub fn category(&self, pulse: u16) -> HeartRateCategory {
        if pulse < self.lower {
            HeartRateCategory::Low
        } else if pulse > self.upper {
            HeartRateCategory::High
        } else {
            HeartRateCategory::Normal
        }
    }
}

/// Coarse heart rate category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartRateCategory {
    Low,
    Normal,
    High,
}

/// Value an aggregate is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Heart rate in BPM
    Pulse,
    /// Blood oxygen saturation; readings without it are skipped
    Spo2,
}

/// A single stored heart rate observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Sequential identifier
    pub id: ReadingId,
    /// Heart rate in BPM
    pub pulse: u16,
    /// Oxygen saturation in percent, when the sensor reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    /// Outside the configured normal range at insertion time
    pub is_risky: bool,
    /// Category at insertion time
    pub category: HeartRateCategory,
    /// Local wall-clock label (HH:MM) for display
    pub hour: String,
    /// Server-observed insertion time
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Build a reading, deriving the risk flag and category from `thresholds`
    pub fn new(
        id: ReadingId,
        pulse: u16,
        spo2: Option<f64>,
        timestamp: DateTime<Utc>,
        thresholds: &RiskThresholds,
    ) -> Self {
        Self {
            id,
            pulse,
            spo2,
            is_risky: thresholds.is_risky(pulse),
            category: thresholds.category(pulse),
            hour: hour_label(timestamp),
            timestamp,
        }
    }

    /// Value of `metric` carried by this reading, if any
    pub fn metric_value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pulse => Some(f64::from(self.pulse)),
            Metric::Spo2 => self.spo2,
        }
    }
}

/// Local `HH:MM` label for a timestamp
pub fn hour_label(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Local `HH:MM:SS` label for a timestamp
pub fn time_label(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Validate a submitted pulse and round it to whole BPM
pub fn validate_pulse(value: f64) -> Result<u16> {
    if value.is_nan() {
        return Err(SinmamError::InvalidReading(
            "Heart rate cannot be NaN".to_string(),
        ));
    }
    if value < PULSE_MIN {
        return Err(SinmamError::InvalidReading(
            "Heart rate cannot be less than 30 BPM".to_string(),
        ));
    }
    if value > PULSE_MAX {
        return Err(SinmamError::InvalidReading(
            "Heart rate cannot be greater than 250 BPM".to_string(),
        ));
    }
    Ok(value.round() as u16)
}

/// Validate a submitted oxygen saturation
pub fn validate_spo2(value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(SinmamError::InvalidReading(
            "Oxygen saturation cannot be NaN".to_string(),
        ));
    }
    if value < SPO2_MIN {
        return Err(SinmamError::InvalidReading(
            "Oxygen saturation cannot be less than 50%".to_string(),
        ));
    }
    if value > SPO2_MAX {
        return Err(SinmamError::InvalidReading(
            "Oxygen saturation cannot be greater than 100%".to_string(),
        ));
    }
    Ok(value)
}
