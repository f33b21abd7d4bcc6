pub mod download;
pub mod health;
pub mod upload;

pub use download::download_file;
pub use health::{health_check, metrics};
pub use upload::upload_document;
