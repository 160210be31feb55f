//! HTTP API server command

use sinmam_core::{
    api::{ApiServer, ApiServerConfig},
    error::Result,
    ReadingStore, Settings,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Handle API server startup command
pub async fn handle(mut settings: Settings, addr: Option<String>, simulate: bool) -> Result<()> {
    debug!("Starting HTTP API server...");

    if let Some(addr) = addr {
        settings.server.addr = addr;
    }
    if simulate {
        settings.simulation.enabled = true;
    }

    let socket_addr: SocketAddr = settings
        .server
        .addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", settings.server.addr, e))?;

    let store = Arc::new(ReadingStore::new(settings.monitor.clone())?);
    let config = ApiServerConfig {
        addr: socket_addr,
        simulation: settings.simulation.clone(),
    };

    let thresholds = settings.monitor.thresholds;
    println!();
    println!("SINMAM API Server");
    println!("   Heart rate ingestion and rolling statistics");
    println!();
    println!("   Address: http://{}", socket_addr);
    println!("   History: last {} readings", store.capacity());
    println!(
        "   Normal range: {}-{} BPM",
        thresholds.lower, thresholds.upper
    );
    if settings.simulation.enabled {
        println!(
            "   DEMO MODE: synthetic reading every {}s",
            settings.simulation.interval_secs
        );
    }
    println!();
    println!("   Endpoints:");
    println!("   - POST /api/heart-rate/reading - Submit a reading");
    println!("   - GET  /api/heart-rate/stats - Rolling averages");
    println!("   - GET  /api/heart-rate/readings - Recent readings");
    println!("   - GET  /api/heart-rate/current - Current heart rate");
    println!("   - GET  /api/heart-rate/statistics - Risky/normal tallies");
    println!("   - GET  /health - Health check");
    println!();

    let server = ApiServer::new(config, store);
    server.serve().await?;

    Ok(())
}
