//! Request validation for the heart rate endpoints
//!
//! Everything here runs before the store is touched. Failures carry the
//! user-facing message returned in the 400 body.

use crate::error::{Result, SinmamError};
use crate::types::{validate_pulse, validate_spo2};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Default number of readings listed when `limit` is omitted
pub const DEFAULT_LIMIT: usize = 20;
/// Largest `limit` accepted from a client
pub const MAX_LIMIT: usize = 100;

/// Validated body of a reading submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSubmission {
    pub pulse: u16,
    pub spo2: Option<f64>,
}

/// Validate a raw JSON submission body
pub fn validate_submission(body: &Value) -> Result<ReadingSubmission> {
    let fields = body
        .as_object()
        .ok_or_else(|| invalid_reading("Request body must be an object"))?;

    let pulse = match fields.get("pulse") {
        None => return Err(invalid_reading("Pulse field is required")),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| invalid_reading("Heart rate must be a number"))?,
    };
    let pulse = validate_pulse(pulse)?;

    let spo2 = match fields.get("spo2") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let spo2 = value
                .as_f64()
                .ok_or_else(|| invalid_reading("Oxygen saturation must be a number"))?;
            Some(validate_spo2(spo2)?)
        }
    };

    Ok(ReadingSubmission { pulse, spo2 })
}

/// Parse `limit`, defaulting to [`DEFAULT_LIMIT`]
pub fn validate_limit(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIMIT);
    };

    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|limit| (1..=MAX_LIMIT as i64).contains(limit))
        .map(|limit| limit as usize)
        .ok_or_else(|| {
            SinmamError::InvalidQuery("Limit must be a number between 1 and 100".to_string())
        })
}

/// Parse an optional RFC 3339 `since` timestamp
pub fn validate_since(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|_| {
                SinmamError::InvalidQuery(
                    "Since parameter must be a valid ISO 8601 timestamp".to_string(),
                )
            }),
    }
}

fn invalid_reading(message: &str) -> SinmamError {
    SinmamError::InvalidReading(message.to_string())
}
