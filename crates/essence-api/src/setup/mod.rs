//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use essence_core::Config;
use essence_infra::{init_telemetry, TelemetryConfig};

use crate::state::AppState;
pub use services::Services;

/// Initialize tracing, external clients and routes.
pub async fn initialize_app(config: &Config) -> Result<(Services, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    init_telemetry(&TelemetryConfig {
        service_name: "essence-api".to_string(),
        environment: config.environment.clone(),
        log_level: config.log_level.clone(),
        json: config.json_logs(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        archived_event_types = %config.archived_event_types,
        "Configuration loaded and validated successfully"
    );
    if config.is_production() && !config.json_logs() {
        tracing::warn!("LOG_FORMAT=pretty in production, log shippers expect JSON");
    }

    let services = services::initialize_services(config)?;
    let state = Arc::new(AppState::new(
        config.archived_event_types.clone(),
        services.job_queue.clone(),
    ));
    let router = routes::setup_routes(state, config.max_body_bytes);

    Ok((services, router))
}
