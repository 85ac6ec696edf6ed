use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Settings for the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub environment: String,
    /// Default level for this service's crates when `RUST_LOG` is unset.
    pub log_level: String,
    pub json: bool,
}

impl TelemetryConfig {
    fn default_filter(&self) -> String {
        format!("essence={level},tower_http=info", level = self.log_level)
    }
}

/// Initialize tracing with an env filter and a JSON or pretty fmt layer.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.default_filter().into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!(
        service_name = %config.service_name,
        environment = %config.environment,
        json = config.json,
        "Tracing initialized"
    );
    Ok(())
}
