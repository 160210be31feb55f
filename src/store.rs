//! Bounded in-memory reading log
//!
//! The store is the single owner of the reading history. Every append
//! assigns the next id, stamps the server time, classifies the pulse and
//! then evicts from the front until the log fits its capacity. Appends and
//! reads are serialized through one lock, so readers never observe a log
//! between push and trim and ids are never handed out twice.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::types::{validate_pulse, validate_spo2, Reading, ReadingId};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Log contents guarded by the store lock
#[derive(Debug)]
struct ReadingLog {
    readings: VecDeque<Reading>,
    next_id: ReadingId,
}

impl ReadingLog {
    fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity),
            next_id: 1,
        }
    }
}

/// Bounded, append-only reading store with FIFO eviction
#[derive(Debug)]
pub struct ReadingStore {
    config: MonitorConfig,
    log: RwLock<ReadingLog>,
}

impl ReadingStore {
    /// Create an empty store; fails if the configuration is unusable
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        let log = RwLock::new(ReadingLog::new(config.max_history));
        Ok(Self { config, log })
    }

    /// Maximum number of readings retained
    pub fn capacity(&self) -> usize {
        self.config.max_history
    }

    /// Append a reading stamped with the current server time
    ///
    /// Values are re-validated; out-of-range input is rejected with
    /// `SinmamError::InvalidReading` and never stored.
    pub async fn append(&self, pulse: u16, spo2: Option<f64>) -> Result<Reading> {
        self.insert(pulse, spo2, None).await
    }

    /// Append a reading with an explicit timestamp
    ///
    /// Used to backfill history (demo mode). Callers are expected to
    /// backfill in chronological order.
    pub async fn append_at(
        &self,
        pulse: u16,
        spo2: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading> {
        self.insert(pulse, spo2, Some(timestamp)).await
    }

    async fn insert(
        &self,
        pulse: u16,
        spo2: Option<f64>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Reading> {
        let pulse = validate_pulse(f64::from(pulse))
            .inspect_err(|e| warn!("Rejected reading: {}", e))?;
        let spo2 = spo2
            .map(validate_spo2)
            .transpose()
            .inspect_err(|e| warn!("Rejected reading: {}", e))?;

        let mut log = self.log.write().await;

        // Stamp under the lock so id order and timestamp order agree
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let reading = Reading::new(
            log.next_id,
            pulse,
            spo2,
            timestamp,
            &self.config.thresholds,
        );
        log.next_id += 1;
        log.readings.push_back(reading.clone());

        let mut evicted = 0;
        while log.readings.len() > self.config.max_history {
            log.readings.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("Evicted {} reading(s), {} retained", evicted, log.readings.len());
        }

        Ok(reading)
    }

    /// Copy of the log in insertion order
    pub async fn read_all(&self) -> Vec<Reading> {
        let log = self.log.read().await;
        log.readings.iter().cloned().collect()
    }

    /// Number of retained readings
    pub async fn count(&self) -> usize {
        self.log.read().await.readings.len()
    }

    /// Clear the log and restart ids at 1
    ///
    /// Administrative/test use only: ids handed out before a reset will be
    /// reused afterwards.
    pub async fn reset(&self) {
        let mut log = self.log.write().await;
        log.readings.clear();
        log.next_id = 1;
        info!("Heart rate readings cleared");
    }
}
