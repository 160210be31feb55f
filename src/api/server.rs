//! HTTP API server for heart rate ingestion and statistics

use super::validation::{validate_limit, validate_since, validate_submission};
use crate::aggregation::{
    category_breakdown, category_tally, current_value, filtered_readings, last_updated,
    stats_summary, CategoryBreakdown, CategoryTally, StatsSummary,
};
use crate::config::SimulationConfig;
use crate::error::SinmamError;
use crate::simulator::Simulator;
use crate::store::ReadingStore;
use crate::types::Reading;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
    /// Demo-mode generator settings (only used when `enabled`)
    pub simulation: SimulationConfig,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Reading store
    store: Arc<ReadingStore>,
    /// Instance ID
    instance_id: String,
    /// Whether the demo generator is writing readings
    simulation: bool,
}

impl AppState {
    pub fn new(store: Arc<ReadingStore>) -> Self {
        Self {
            store,
            instance_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            simulation: false,
        }
    }

    /// Mark the state as fed by the demo generator
    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Ingestion
        .route("/api/heart-rate/reading", post(submit_reading_handler))
        // Queries
        .route("/api/heart-rate/stats", get(stats_handler))
        .route("/api/heart-rate/readings", get(readings_handler))
        .route("/api/heart-rate/current", get(current_handler))
        .route("/api/heart-rate/statistics", get(statistics_handler))
        // Health check
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        // State
        .with_state(state)
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    store: Arc<ReadingStore>,
    /// Shutdown signal for background tasks
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
    /// Simulator task handle for cleanup
    simulator_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ApiServer {
    /// Create new API server around an existing store
    pub fn new(config: ApiServerConfig, store: Arc<ReadingStore>) -> Self {
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
        Self {
            config,
            store,
            shutdown_tx,
            simulator_handle: None,
        }
    }

    /// Serve until Ctrl-C
    pub async fn serve(mut self) -> anyhow::Result<()> {
        let simulation = self.config.simulation.enabled;
        let state = AppState::new(self.store.clone()).with_simulation(simulation);
        let instance_id = state.instance_id.clone();
        let router = build_router(state);

        if simulation {
            warn!("Demo mode: synthetic readings will be generated");
            let simulator = Simulator::new(self.store.clone(), self.config.simulation.clone());
            self.simulator_handle = Some(simulator.spawn(self.shutdown_tx.subscribe()));
        }

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!(
            "SINMAM API server [{}] listening on http://{}",
            instance_id, self.config.addr
        );
        info!(
            "Ready to receive heart rate data via POST http://{}/api/heart-rate/reading",
            self.config.addr
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Received shutdown signal, stopping API server gracefully...");
            })
            .await?;

        info!("API server shut down complete");
        Ok(())
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        // Send shutdown signal to background tasks
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.simulator_handle.take() {
            handle.abort();
            debug!("ApiServer dropped - simulator task aborted");
        }
    }
}

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    /// Map a core error, titling client errors with `title`
    fn from_core(title: &'static str, err: SinmamError) -> Self {
        if err.is_client_error() {
            let message = match err {
                SinmamError::InvalidReading(msg) | SinmamError::InvalidQuery(msg) => msg,
                other => other.to_string(),
            };
            return Self::new(StatusCode::BAD_REQUEST, title, message);
        }

        error!("Server error: {}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "Something went wrong",
        )
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Submission response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReadingResponse {
    success: bool,
    message: String,
    reading: Reading,
    stats: StatsSummary,
}

async fn submit_reading_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitReadingResponse>), ApiError> {
    const TITLE: &str = "Invalid heart rate data";

    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected reading payload: {}", rejection.body_text());
        ApiError::new(
            StatusCode::BAD_REQUEST,
            TITLE,
            "Request body must be a JSON object",
        )
    })?;

    let submission = validate_submission(&body).map_err(|e| {
        warn!("Rejected reading: {}", e);
        ApiError::from_core(TITLE, e)
    })?;

    let reading = state
        .store
        .append(submission.pulse, submission.spo2)
        .await
        .map_err(|e| ApiError::from_core(TITLE, e))?;

    if reading.is_risky {
        warn!(
            "Risky heart rate received: {} BPM (id {})",
            reading.pulse, reading.id
        );
    } else {
        info!(
            "Heart rate reading received: {} BPM (id {})",
            reading.pulse, reading.id
        );
    }

    let snapshot = state.store.read_all().await;
    let stats = stats_summary(&snapshot, Utc::now());

    Ok((
        StatusCode::CREATED,
        Json(SubmitReadingResponse {
            success: true,
            message: "Heart rate reading added successfully".to_string(),
            reading,
            stats,
        }),
    ))
}

/// Stats handler
async fn stats_handler(State(state): State<AppState>) -> Json<StatsSummary> {
    debug!("Heart rate stats requested");
    let snapshot = state.store.read_all().await;
    Json(stats_summary(&snapshot, Utc::now()))
}

/// Readings listing query string
#[derive(Debug, Default, Deserialize)]
struct ReadingsQuery {
    limit: Option<String>,
    since: Option<String>,
}

async fn readings_handler(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let limit = validate_limit(query.limit.as_deref())
        .map_err(|e| ApiError::from_core("Invalid limit parameter", e))?;
    let since = validate_since(query.since.as_deref())
        .map_err(|e| ApiError::from_core("Invalid since parameter", e))?;

    debug!(
        "Heart rate readings requested (limit: {}, since: {})",
        limit,
        query.since.as_deref().unwrap_or("not specified")
    );

    let snapshot = state.store.read_all().await;
    Ok(Json(filtered_readings(&snapshot, limit, since)))
}

/// Current reading response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentResponse {
    current: Option<u16>,
    last_updated: Option<String>,
    timestamp: DateTime<Utc>,
}

async fn current_handler(State(state): State<AppState>) -> Json<CurrentResponse> {
    debug!("Current heart rate requested");
    let snapshot = state.store.read_all().await;
    Json(CurrentResponse {
        current: current_value(&snapshot),
        last_updated: last_updated(&snapshot),
        timestamp: Utc::now(),
    })
}

/// Detailed statistics response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsResponse {
    reading_count: CategoryTally,
    categories: CategoryBreakdown,
    stats: StatsSummary,
}

async fn statistics_handler(State(state): State<AppState>) -> Json<StatisticsResponse> {
    debug!("Detailed heart rate statistics requested");
    let snapshot = state.store.read_all().await;
    Json(StatisticsResponse {
        reading_count: category_tally(&snapshot),
        categories: category_breakdown(&snapshot),
        stats: stats_summary(&snapshot, Utc::now()),
    })
}

/// Health check handler
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    version: String,
    instance_id: String,
    simulation: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
        simulation: state.simulation,
    })
}

async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "Endpoint not found",
        format!("The endpoint {} does not exist", uri.path()),
    )
}
