use std::path::{Path, PathBuf};

/// A Word document persisted to the uploads directory for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Collision-resistant name under which the file was stored.
    pub generated_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: usize,
    pub storage_path: PathBuf,
}

impl UploadedFile {
    /// Output file name: the generated name with its extension replaced by `.pdf`.
    pub fn output_filename(&self) -> String {
        let stem = Path::new(&self.generated_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.generated_name);
        format!("{}.pdf", stem)
    }
}

/// A PDF produced in the output directory. Never deleted by the service.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub output_path: PathBuf,
    pub output_filename: String,
}

impl ConversionResult {
    pub fn download_url(&self) -> String {
        format!("/download/{}", self.output_filename)
    }

    pub fn file_url(&self) -> String {
        format!("/output/{}", self.output_filename)
    }
}
