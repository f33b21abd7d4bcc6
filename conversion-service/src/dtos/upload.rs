use crate::models::{ConversionResult, UploadedFile};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub upload_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub metadata: FileMetadata,
    pub pdf_url: String,
    pub file_url: String,
}

impl UploadResponse {
    pub fn new(file: &UploadedFile, result: &ConversionResult, upload_time: DateTime<Utc>) -> Self {
        Self {
            metadata: FileMetadata {
                name: file.original_name.clone(),
                size: file.size,
                mime_type: file.mime_type.clone(),
                upload_time: upload_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            pdf_url: result.download_url(),
            file_url: result.file_url(),
        }
    }
}
