use crate::error::UploadError;
use crate::models::UploadedFile;
use crate::services::storage::LocalStorage;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use rand::Rng;
use std::path::Path;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

pub const ALLOWED_MIME_TYPES: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub fn is_allowed_mime(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Validates the `file` field of an upload and writes it to the uploads directory.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    storage: LocalStorage,
    max_bytes: usize,
}

impl UploadReceiver {
    pub fn new(storage: LocalStorage, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Accepts exactly one file part, under the `file` field. Text fields are
    /// ignored; any other file part rejects the whole request.
    pub async fn receive(&self, multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
        let mut uploaded = None;

        match self.collect(multipart, &mut uploaded).await {
            Ok(()) => uploaded.ok_or(UploadError::NoFileUploaded),
            Err(err) => {
                if let Some(file) = uploaded {
                    self.discard(&file).await;
                }
                drain(multipart).await;
                Err(err)
            }
        }
    }

    async fn collect(
        &self,
        multipart: &mut Multipart,
        uploaded: &mut Option<UploadedFile>,
    ) -> Result<(), UploadError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_error(e))?
        {
            if field.file_name().is_none() {
                continue;
            }

            let name = field.name().unwrap_or_default().to_string();
            if name != FILE_FIELD || uploaded.is_some() {
                return Err(UploadError::UnexpectedField(name));
            }

            *uploaded = Some(self.store(field).await?);
        }

        Ok(())
    }

    async fn discard(&self, file: &UploadedFile) {
        if let Err(e) = self.storage.delete(&file.storage_path).await {
            tracing::error!(
                path = %file.storage_path.display(),
                error = %e,
                "Failed to delete rejected upload"
            );
        }
    }

    async fn store(&self, mut field: Field<'_>) -> Result<UploadedFile, UploadError> {
        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        tracing::info!(
            original_name = %original_name,
            mime_type = %mime_type,
            "Received file"
        );

        if !is_allowed_mime(&mime_type) {
            return Err(UploadError::InvalidFileType(mime_type));
        }

        // Buffer the whole body before touching disk so a rejected upload leaves nothing behind.
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| self.multipart_error(e))? {
            if data.len() + chunk.len() > self.max_bytes {
                return Err(UploadError::FileTooLarge {
                    limit: self.max_bytes,
                });
            }
            data.extend_from_slice(&chunk);
        }

        let generated_name = generate_name(FILE_FIELD, &original_name);
        let storage_path = self.storage.write(&generated_name, &data).await?;

        tracing::info!(
            generated_name = %generated_name,
            size = data.len(),
            "Stored upload"
        );

        Ok(UploadedFile {
            generated_name,
            original_name,
            mime_type,
            size: data.len(),
            storage_path,
        })
    }

    fn multipart_error(&self, err: MultipartError) -> UploadError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::FileTooLarge {
                limit: self.max_bytes,
            }
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

// Consume what is left of the request so the client gets to read the error response.
async fn drain(multipart: &mut Multipart) {
    while let Ok(Some(_)) = multipart.next_field().await {}
}

/// `<field>-<unix millis>-<random>` plus the original extension.
pub fn generate_name(field: &str, original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    format!(
        "{}-{}-{}{}",
        field,
        Utc::now().timestamp_millis(),
        suffix,
        extension
    )
}
