#![allow(dead_code)]

use async_trait::async_trait;
use conversion_service::config::{
    ConversionConfig, ConverterConfig, StorageConfig, UploadConfig, DEFAULT_MAX_UPLOAD_BYTES,
};
use conversion_service::converter::Converter;
use conversion_service::error::ConversionError;
use conversion_service::startup::Application;
use reqwest::multipart;
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME: &str = "application/msword";

/// Writes a fake PDF that embeds the input file name.
pub struct PdfStub;

#[async_trait]
impl Converter for PdfStub {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let name = input.file_name().unwrap().to_string_lossy().to_string();
        tokio::fs::write(output, format!("%PDF-1.4 converted from {}", name))
            .await
            .map_err(|e| ConversionError::new(e.to_string()))
    }
}

/// Always fails with the given message, like a tool that rejects its input.
pub struct FailingStub(pub &'static str);

#[async_trait]
impl Converter for FailingStub {
    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ConversionError> {
        Err(ConversionError::new(self.0))
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub output_dir: PathBuf,
    pub client: reqwest::Client,
    _root: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(PdfStub), DEFAULT_MAX_UPLOAD_BYTES).await
    }

    pub async fn spawn_with(converter: Arc<dyn Converter>, max_bytes: usize) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let uploads_dir = root.path().join("uploads");
        let output_dir = root.path().join("output");

        let config = ConverterConfig {
            common: CoreConfig { port: 0 }, // Random port for testing
            storage: StorageConfig {
                uploads_dir: uploads_dir.clone(),
                output_dir: output_dir.clone(),
            },
            upload: UploadConfig { max_bytes },
            conversion: ConversionConfig {
                program: "soffice".to_string(),
                timeout_secs: None,
            },
            otlp_endpoint: None,
        };

        let app = Application::build(config, converter)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            uploads_dir,
            output_dir,
            client,
            _root: root,
        }
    }

    pub async fn upload(
        &self,
        filename: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> reqwest::Response {
        let form = multipart::Form::new().part("file", file_part(filename, mime_type, data));
        self.post_form(form).await
    }

    pub async fn post_form(&self, form: multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/upload", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn uploads_count(&self) -> usize {
        std::fs::read_dir(&self.uploads_dir)
            .expect("uploads dir missing")
            .count()
    }
}

pub fn file_part(filename: &str, mime_type: &str, data: Vec<u8>) -> multipart::Part {
    multipart::Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(mime_type)
        .unwrap()
}
