use conversion_service::config::ConverterConfig;
use conversion_service::converter::CommandConverter;
use conversion_service::services::init_metrics;
use conversion_service::startup::Application;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    if let Err(e) = init_metrics() {
        eprintln!("Failed to install Prometheus recorder: {}", e);
    }

    let config = ConverterConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "conversion-service",
        "info",
        config.otlp_endpoint.as_deref(),
    );

    let converter = Arc::new(CommandConverter::new(config.conversion.program.clone()));
    tracing::info!(program = %converter.program(), "Using command converter");

    let app = Application::build(config, converter).await.map_err(|e| {
        tracing::error!("Failed to start application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!("Server running at http://localhost:{}", app.port());

    app.run_until_stopped().await
}
