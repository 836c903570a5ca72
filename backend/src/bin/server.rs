//! Roster HTTP Server Binary
//!
//! Serves the shift solver and generation jobs over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin roster-server
//!
//! ROSTER_CONFIG=./roster.toml PORT=9000 cargo run --bin roster-server
//! ```
//!
//! # Environment Variables
//!
//! - `ROSTER_CONFIG`: Path to a TOML config file (default: search for `roster.toml`)
//! - `HOST`: Server host (overrides `[server] host`)
//! - `PORT`: Server port (overrides `[server] port`)
//! - `RUST_LOG`: Log filter directives, e.g. `helpdesk_roster=debug` (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use helpdesk_roster::config::RosterConfig;
use helpdesk_roster::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(log_filter())
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting roster HTTP server");

    let mut config = load_config()?;
    if let Ok(host) = env::var("HOST") {
        config.server.host = host;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|s| s.parse().ok()) {
        config.server.port = port;
    }
    info!(
        "Solver fill policy: {:?}, job delays: {}ms / {}ms",
        config.solver.fill_policy, config.jobs.pickup_delay_ms, config.jobs.completion_delay_ms
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(AppState::new(config));

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// An explicit `ROSTER_CONFIG` must load; otherwise fall back to defaults when no
/// `roster.toml` is found.
fn load_config() -> anyhow::Result<RosterConfig> {
    if let Ok(path) = env::var("ROSTER_CONFIG") {
        info!("Loading configuration from {}", path);
        return Ok(RosterConfig::from_file(&path)?);
    }
    match RosterConfig::from_default_location() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{}; using defaults", e);
            Ok(RosterConfig::default())
        }
    }
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
