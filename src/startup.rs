//! Application startup and server initialization.
//!
//! This module builds the shared state (credential providers, session
//! provider, route guard) and serves the router on the configured address.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(&config);
    if state.providers.is_empty() {
        warn!("No credential providers configured; nobody will be able to log in");
    }

    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| format!("Could not bind to {}: {}", config.bind_address, e))?;

    axum::serve(listener, app).await?;
    Ok(())
}
