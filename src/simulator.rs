//! Demo-mode reading generator
//!
//! Development aid only. When enabled it backfills a short synthetic
//! history and then appends one synthetic reading per interval, always
//! through the store's append API. It never feeds values into the
//! aggregation path: an empty store still reports "no data" unless this
//! generator has actually written readings.

use crate::config::SimulationConfig;
use crate::error::{Result, SinmamError};
use crate::store::ReadingStore;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Probability that a synthetic reading falls outside the normal range
const RISKY_CHANCE: f64 = 0.2;
/// Share of risky readings that are tachycardic rather than bradycardic
const HIGH_SHARE: f64 = 0.8;
/// Centre of the normal synthetic distribution
const BASE_RATE: f64 = 80.0;
/// Full spread of the normal synthetic distribution
const VARIANCE: f64 = 30.0;

/// Draw a synthetic pulse in BPM
pub fn generate_pulse<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    if rng.gen::<f64>() < RISKY_CHANCE {
        if rng.gen::<f64>() < HIGH_SHARE {
            rng.gen_range(110..160)
        } else {
            rng.gen_range(40..60)
        }
    } else {
        let normal = BASE_RATE + (rng.gen::<f64>() - 0.5) * VARIANCE;
        (normal.floor() as u16).clamp(60, 100)
    }
}

/// Draw a synthetic oxygen saturation in percent
pub fn generate_spo2<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(94_u8..=99))
}

/// Synthetic reading generator bound to a store
pub struct Simulator {
    store: Arc<ReadingStore>,
    config: SimulationConfig,
    rng: StdRng,
}

impl Simulator {
    pub fn new(store: Arc<ReadingStore>, config: SimulationConfig) -> Self {
        Self {
            store,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed (tests)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Append one synthetic reading stamped now
    pub async fn tick(&mut self) -> Result<()> {
        let pulse = generate_pulse(&mut self.rng);
        let spo2 = generate_spo2(&mut self.rng);
        let reading = self.store.append(pulse, Some(spo2)).await?;
        info!(
            "Generated new reading: {} BPM at {} (id {})",
            reading.pulse, reading.hour, reading.id
        );
        Ok(())
    }

    /// Seed history oldest first, the last reading stamped now
    ///
    /// Timestamps strictly increase with id; settings that cannot
    /// guarantee that are rejected before anything is written.
    pub async fn backfill(&mut self) -> Result<usize> {
        self.config.validate()?;
        let count = self.config.initial_readings;
        let spacing = self.config.backfill_spacing_minutes;
        let now = Utc::now();

        info!("Generating {} initial heart rate readings", count);
        for i in (0..count).rev() {
            let timestamp = i64::try_from(i)
                .ok()
                .and_then(|steps| steps.checked_mul(spacing))
                .and_then(Duration::try_minutes)
                .and_then(|offset| now.checked_sub_signed(offset))
                .ok_or_else(|| {
                    SinmamError::Other(format!(
                        "Backfill offset out of range: {} x {} minutes",
                        i, spacing
                    ))
                })?;
            let pulse = generate_pulse(&mut self.rng);
            let spo2 = generate_spo2(&mut self.rng);
            self.store.append_at(pulse, Some(spo2), timestamp).await?;
        }
        Ok(count)
    }

    /// Backfill, then generate until `shutdown` fires
    pub fn spawn(mut self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.config.validate() {
                error!("Demo generator not started: {}", e);
                return;
            }
            if let Err(e) = self.backfill().await {
                error!("Error backfilling readings: {}", e);
            }

            let period = std::time::Duration::from_secs(self.config.interval_secs);
            info!(
                "Starting automatic data generation every {} seconds",
                period.as_secs()
            );
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately; backfill already covered "now"
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.tick().await {
                            error!("Error generating new reading: {}", e);
                        }
                    }
                    _ = shutdown.recv() => {
                        debug!("Simulator received shutdown signal");
                        break;
                    }
                }
            }
            info!("Stopped automatic data generation");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;

    fn store(max_history: usize) -> Arc<ReadingStore> {
        Arc::new(
            ReadingStore::new(MonitorConfig {
                max_history,
                ..Default::default()
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_generated_values_stay_in_domain() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let pulse = generate_pulse(&mut rng);
            assert!((40..160).contains(&pulse), "pulse {} out of range", pulse);
            let spo2 = generate_spo2(&mut rng);
            assert!((94.0..=99.0).contains(&spo2));
        }
    }

    #[test]
    fn test_generated_mix_contains_risky_and_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let pulses: Vec<u16> = (0..1000).map(|_| generate_pulse(&mut rng)).collect();
        assert!(pulses.iter().any(|p| *p > 100));
        assert!(pulses.iter().any(|p| (60..=100).contains(p)));
    }

    #[tokio::test]
    async fn test_backfill_spacing() {
        let store = store(50);
        let config = SimulationConfig {
            enabled: true,
            initial_readings: 4,
            backfill_spacing_minutes: 15,
            ..Default::default()
        };
        let mut simulator = Simulator::new(Arc::clone(&store), config).with_seed(1);

        assert_eq!(simulator.backfill().await.unwrap(), 4);

        let readings = store.read_all().await;
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].id, 1);
        for pair in readings.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(15));
        }
        assert!(readings.iter().all(|r| r.spo2.is_some()));
    }

    #[tokio::test]
    async fn test_backfill_rejects_unordered_spacing() {
        let store = store(50);
        let config = SimulationConfig {
            enabled: true,
            initial_readings: 3,
            backfill_spacing_minutes: -15,
            ..Default::default()
        };
        let mut simulator = Simulator::new(Arc::clone(&store), config).with_seed(1);

        assert!(simulator.backfill().await.is_err());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_backfill_newest_reading_is_last() {
        let store = store(50);
        let config = SimulationConfig {
            enabled: true,
            initial_readings: 3,
            backfill_spacing_minutes: 1,
            ..Default::default()
        };
        let mut simulator = Simulator::new(Arc::clone(&store), config).with_seed(5);
        simulator.backfill().await.unwrap();

        let readings = store.read_all().await;
        let newest = crate::aggregation::filtered_readings(&readings, 1, None);
        assert_eq!(newest[0].id, 3);
        assert_eq!(crate::aggregation::current_value(&readings), Some(newest[0].pulse));
        assert!(readings.iter().all(|r| r.timestamp <= Utc::now()));
    }

    #[tokio::test]
    async fn test_spawn_with_invalid_config_writes_nothing() {
        let store = store(50);
        let config = SimulationConfig {
            enabled: true,
            interval_secs: 0,
            ..Default::default()
        };
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = Simulator::new(Arc::clone(&store), config).spawn(shutdown_rx);

        handle.await.unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_generator_stops_on_shutdown() {
        let store = store(50);
        let config = SimulationConfig {
            enabled: true,
            interval_secs: 15,
            initial_readings: 3,
            backfill_spacing_minutes: 15,
        };
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = Simulator::new(Arc::clone(&store), config)
            .with_seed(3)
            .spawn(shutdown_rx);

        tokio::time::sleep(std::time::Duration::from_secs(31)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let count = store.count().await;
        assert!(count >= 4, "expected backfill plus generated readings, got {}", count);

        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        assert_eq!(store.count().await, count);
    }
}
