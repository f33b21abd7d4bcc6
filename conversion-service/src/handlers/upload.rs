use crate::dtos::UploadResponse;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use service_core::error::AppError;

/// `POST /upload`: convert the `file` field to PDF and return where to fetch it.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    tracing::info!("Received upload request");

    let response = state.lifecycle.process(&mut multipart).await?;

    Ok(Json(response))
}
