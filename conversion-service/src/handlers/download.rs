use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// `GET /download/:filename`: stream a converted file as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state
        .storage
        .output
        .find(&filename)
        .await?
        .ok_or_else(not_found)?;

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let size = file.metadata().await?.len();

    tracing::info!(
        filename = %filename,
        size = size,
        "Serving download"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, detect_content_type(&filename).to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("File not found"))
}

fn detect_content_type(filename: &str) -> &'static str {
    if filename.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}
