use crate::config::ConverterConfig;
use crate::converter::Converter;
use crate::handlers;
use crate::services::{ConversionLifecycle, StoragePaths, UploadReceiver};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, tracing::make_request_span,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: ConverterConfig,
    pub storage: StoragePaths,
    pub lifecycle: ConversionLifecycle,
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD_BYTES;
    let output_dir = state.storage.output.base_path().to_path_buf();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/upload",
            post(handlers::upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download/:filename", get(handlers::download_file))
        .nest_service("/output", ServeDir::new(output_dir))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>),
        )
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(
        config: ConverterConfig,
        converter: Arc<dyn Converter>,
    ) -> Result<Self, AppError> {
        let storage = StoragePaths::init(&config.storage).await.map_err(|e| {
            tracing::error!(
                uploads = %config.storage.uploads_dir.display(),
                output = %config.storage.output_dir.display(),
                "Failed to initialize storage directories: {}",
                e
            );
            AppError::from(e)
        })?;

        let receiver = UploadReceiver::new(storage.uploads.clone(), config.upload.max_bytes);
        let lifecycle = ConversionLifecycle::new(
            receiver,
            converter,
            storage.output.clone(),
            config.conversion.timeout(),
        );

        let state = AppState {
            config: config.clone(),
            storage,
            lifecycle,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            uploads = %state.storage.uploads.base_path().display(),
            output = %state.storage.output.base_path().display(),
            "Listening"
        );

        let app = build_router(state);
        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
