//! The external Word-to-PDF conversion capability, presented as a single
//! awaitable operation.

mod command;

pub use command::CommandConverter;

use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait Converter: Send + Sync {
    /// Converts the document at `input` into a PDF written to `output`.
    ///
    /// Resolves exactly once. On failure the error carries the tool's own message.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;
}
