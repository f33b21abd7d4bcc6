pub mod upload;

pub use upload::{FileMetadata, UploadResponse};
