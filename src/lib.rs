//! SINMAM - Heart Rate Monitoring Service
//!
//! An in-memory service that ingests heart rate readings (optionally with
//! blood oxygen saturation) and serves derived statistics:
//! - Bounded reading history with FIFO eviction and sequential ids
//! - Rolling 5/15/30 minute averages, current value, risky/normal tallies
//! - HTTP API on axum
//!
//! # Architecture
//!
//! - **Types**: `Reading`, `RiskThresholds`, input validation
//! - **Store**: the single owner of the bounded reading log
//! - **Aggregation**: pure statistics over a store snapshot
//! - **API**: HTTP handlers that call into the store and aggregation
//!
//! # Example
//!
//! ```ignore
//! use sinmam_core::{aggregation, MonitorConfig, ReadingStore};
//!
//! #[tokio::main]
//! async fn main() -> sinmam_core::Result<()> {
//!     let store = ReadingStore::new(MonitorConfig::default())?;
//!     store.append(72, Some(98.0)).await?;
//!
//!     let snapshot = store.read_all().await;
//!     let stats = aggregation::stats_summary(&snapshot, chrono::Utc::now());
//!     assert_eq!(stats.current, Some(72));
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod api;
pub mod config;
pub mod error;
pub mod simulator;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use aggregation::{CategoryBreakdown, CategoryTally, Spo2Summary, StatsSummary};
pub use crate::config::{MonitorConfig, ServerSettings, Settings, SimulationConfig};
pub use error::{Result, SinmamError};
pub use store::ReadingStore;
pub use types::{HeartRateCategory, Metric, Reading, ReadingId, RiskThresholds};
