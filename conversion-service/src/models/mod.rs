pub mod upload;

pub use upload::{ConversionResult, UploadedFile};
