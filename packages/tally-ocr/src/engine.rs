use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::Document;

#[derive(Debug, Clone)]
pub enum OcrInput {
    FilePath(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("payload has no full text annotation")]
    MissingAnnotation,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a normalized [`Document`] from some OCR input.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load(&self, input: &OcrInput) -> Result<Document, DocumentError>;
}

/// Reads text-detection responses serialized as JSON.
pub struct VisionJsonSource;

impl VisionJsonSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VisionJsonSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for VisionJsonSource {
    async fn load(&self, input: &OcrInput) -> Result<Document, DocumentError> {
        match input {
            OcrInput::FilePath(path) => {
                let bytes = tokio::fs::read(path).await?;
                Document::from_json_slice(&bytes)
            }
            OcrInput::Bytes(data) => {
                if data.is_empty() {
                    return Err(DocumentError::InvalidInput("empty payload".to_string()));
                }
                Document::from_json_slice(data)
            }
        }
    }
}
