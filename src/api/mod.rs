//! HTTP API for heart rate monitoring
//!
//! Provides:
//! - Reading ingestion (`POST /api/heart-rate/reading`)
//! - Rolling statistics, current value and reading listings
//! - Risky/normal tallies for the detailed statistics view
//! - Health check

pub mod server;
pub mod validation;

pub use server::{build_router, ApiError, ApiServer, ApiServerConfig, AppState};
pub use validation::{validate_limit, validate_since, validate_submission, ReadingSubmission};
