//! Upload lifecycle: receive → convert → respond → cleanup.
//!
//! Every request owns exactly one [`UploadedFile`]. Whatever the conversion
//! outcome, that file is removed from the uploads directory before the
//! response is produced. Removal failures are logged and counted, never
//! returned to the caller.

use crate::converter::Converter;
use crate::dtos::UploadResponse;
use crate::error::ConversionError;
use crate::models::{ConversionResult, UploadedFile};
use crate::services::receiver::UploadReceiver;
use crate::services::storage::LocalStorage;
use axum::extract::Multipart;
use chrono::Utc;
use metrics::{counter, histogram};
use service_core::error::AppError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Received,
    Converting,
    Completed,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Received => "received",
            LifecycleState::Converting => "converting",
            LifecycleState::Completed => "completed",
            LifecycleState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Clone)]
pub struct ConversionLifecycle {
    receiver: UploadReceiver,
    converter: Arc<dyn Converter>,
    output: LocalStorage,
    timeout: Option<Duration>,
}

impl ConversionLifecycle {
    pub fn new(
        receiver: UploadReceiver,
        converter: Arc<dyn Converter>,
        output: LocalStorage,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            receiver,
            converter,
            output,
            timeout,
        }
    }

    /// Handles one `POST /upload` end to end.
    pub async fn process(&self, multipart: &mut Multipart) -> Result<UploadResponse, AppError> {
        let file = self.receiver.receive(multipart).await.map_err(|e| {
            tracing::warn!(reason = e.reason(), error = %e, "Upload rejected");
            counter!("upload_rejections_total", "reason" => e.reason()).increment(1);
            e
        })?;

        Ok(self.run(file).await?)
    }

    /// Drives a persisted upload to a terminal state. Consumes the upload:
    /// it no longer exists on disk once this returns.
    pub async fn run(&self, file: UploadedFile) -> Result<UploadResponse, ConversionError> {
        self.transition(&file, LifecycleState::Received);

        let output_filename = file.output_filename();
        let output_path = self.output.base_path().join(&output_filename);

        self.transition(&file, LifecycleState::Converting);
        let started = Instant::now();
        let outcome = self.convert(&file, &output_path).await;
        let converted_at = Utc::now();
        histogram!("conversion_duration_seconds").record(started.elapsed().as_secs_f64());

        self.cleanup(&file).await;

        match outcome {
            Ok(()) => {
                self.transition(&file, LifecycleState::Completed);
                counter!("conversions_total", "outcome" => "completed").increment(1);

                let result = ConversionResult {
                    output_path,
                    output_filename,
                };
                let response = UploadResponse::new(&file, &result, converted_at);

                tracing::info!(
                    output_path = %result.output_path.display(),
                    pdf_url = %response.pdf_url,
                    file_url = %response.file_url,
                    "Conversion completed"
                );
                Ok(response)
            }
            Err(err) => {
                self.transition(&file, LifecycleState::Failed);
                counter!("conversions_total", "outcome" => "failed").increment(1);
                tracing::error!(
                    generated_name = %file.generated_name,
                    error = %err,
                    "Conversion failed"
                );
                Err(err)
            }
        }
    }

    async fn convert(
        &self,
        file: &UploadedFile,
        output_path: &std::path::Path,
    ) -> Result<(), ConversionError> {
        let conversion = self.converter.convert(&file.storage_path, output_path);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, conversion)
                .await
                .map_err(|_| {
                    ConversionError::new(format!(
                        "Conversion timed out after {} seconds",
                        limit.as_secs()
                    ))
                })?,
            None => conversion.await,
        }
    }

    async fn cleanup(&self, file: &UploadedFile) {
        match self.receiver.storage().delete(&file.storage_path).await {
            Ok(()) => tracing::debug!(
                path = %file.storage_path.display(),
                "Cleaned up uploaded file"
            ),
            Err(e) => {
                counter!("cleanup_failures_total").increment(1);
                tracing::error!(
                    path = %file.storage_path.display(),
                    error = %e,
                    "Failed to delete uploaded file"
                );
            }
        }
    }

    fn transition(&self, file: &UploadedFile, state: LifecycleState) {
        tracing::debug!(
            generated_name = %file.generated_name,
            state = %state,
            "Lifecycle transition"
        );
    }
}
