use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tally_ocr::{DocumentSource, OcrInput, VisionJsonSource};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::receipt_extractor::{ReceiptExtraction, ReceiptExtractor};

/// Options for a batch extraction run
pub struct BatchOptions {
    pub inputs: Vec<PathBuf>,
    pub config: ExtractionConfig,
    /// Maximum number of payload files processed concurrently
    pub max_concurrent_files: usize,
    pub reference_date: Option<NaiveDate>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            config: ExtractionConfig::default(),
            max_concurrent_files: 4,
            reference_date: None,
        }
    }
}

/// Outcome for a single payload file. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ReceiptExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

/// Extracts many payload files concurrently; per-file failures never abort the run.
pub struct BatchRunner {
    options: BatchOptions,
    extractor: Arc<ReceiptExtractor>,
}

impl BatchRunner {
    pub fn new(options: BatchOptions) -> Result<Self> {
        let mut extractor = ReceiptExtractor::new(options.config.clone())?;
        if let Some(date) = options.reference_date {
            extractor = extractor.with_reference_date(date);
        }

        Ok(Self {
            options,
            extractor: Arc::new(extractor),
        })
    }

    pub async fn run(&self) -> Result<BatchResult> {
        let total_files = self.options.inputs.len();
        info!(
            files = total_files,
            max_concurrent = self.options.max_concurrent_files,
            "starting batch extraction"
        );

        // Create a semaphore to limit concurrent file processing
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_files.max(1)));
        let mut tasks = Vec::new();

        for (file_idx, path) in self.options.inputs.iter().enumerate() {
            let path = path.clone();
            let semaphore = semaphore.clone();
            let extractor = self.extractor.clone();

            let task = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                info!("Processing file {}/{}: {}", file_idx + 1, total_files, path.display());
                Self::process_file(&path, extractor).await
            });

            tasks.push(task);
        }

        let mut entries = Vec::with_capacity(total_files);
        for (task, path) in tasks.into_iter().zip(self.options.inputs.iter()) {
            let path_str = path.display().to_string();
            let entry = match task.await {
                Ok(Ok(result)) => BatchEntry {
                    path: path_str,
                    result: Some(result),
                    error: None,
                },
                Ok(Err(e)) => {
                    warn!("Error processing file {}: {}", path_str, e);
                    BatchEntry {
                        path: path_str,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
                Err(e) => {
                    warn!("Task join error for {}: {}", path_str, e);
                    BatchEntry {
                        path: path_str,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            entries.push(entry);
        }

        let succeeded = entries.iter().filter(|e| e.result.is_some()).count();
        let failed = entries.len() - succeeded;
        info!(succeeded, failed, "batch extraction finished");

        Ok(BatchResult {
            succeeded,
            failed,
            entries,
        })
    }

    /// Loads one payload and runs the synchronous pipeline off the async workers.
    async fn process_file(path: &std::path::Path, extractor: Arc<ReceiptExtractor>) -> Result<ReceiptExtraction> {
        let source = VisionJsonSource::new();
        let document = source.load(&OcrInput::FilePath(path.to_path_buf())).await?;
        let result = tokio::task::spawn_blocking(move || extractor.extract(&document)).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PAYLOAD: &str = r#"{"responses":[{"fullTextAnnotation":{"pages":[{"height":800,"blocks":[{"paragraphs":[{"words":[
        {"confidence":0.9,"boundingBox":{"vertices":[{"x":20,"y":300},{"x":80,"y":300},{"x":80,"y":316},{"x":20,"y":316}]},"symbols":[{"text":"TOTAL"}]},
        {"confidence":0.9,"boundingBox":{"vertices":[{"x":300,"y":300},{"x":360,"y":300},{"x":360,"y":316},{"x":300,"y":316}]},"symbols":[{"text":"$9.99"}]}
    ]}]}]}]}}]}"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_batch_mixes_success_and_failure() {
        let good = write_temp(PAYLOAD);
        let missing_root = write_temp(r#"{"responses":[{}]}"#);

        let options = BatchOptions {
            inputs: vec![
                good.path().to_path_buf(),
                missing_root.path().to_path_buf(),
                PathBuf::from("no/such/receipt.json"),
            ],
            max_concurrent_files: 2,
            ..Default::default()
        };
        let result = BatchRunner::new(options).unwrap().run().await.unwrap();

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 2);
        let first = result.entries[0].result.as_ref().unwrap();
        assert_eq!(first.total, 9.99);
        assert!(result.entries[1]
            .error
            .as_ref()
            .unwrap()
            .contains("full text annotation"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let result = BatchRunner::new(BatchOptions::default()).unwrap().run().await.unwrap();
        assert_eq!(result.succeeded, 0);
        assert!(result.entries.is_empty());
    }
}
