//! The end-to-end pipeline from a normalized document to a receipt record.
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tally_ocr::{Document, DocumentError, Word};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, ExtractionConfig, ExtractionMode};
use crate::date_extractor::extract_date;
use crate::line_grouper::filter_by_confidence;
use crate::line_item_extractor::{extract_line_items, LineItem};
use crate::merchant_extractor::extract_merchant;
use crate::table_detector::{detect_columns, TableColumn};
use crate::total_extractor::extract_total;
use crate::validator::{overall_confidence, validate, ValidationReport};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Structured receipt with an independent confidence per field.
///
/// A confidence of zero marks a placeholder value: empty merchant, zero total,
/// or the reference date standing in for a missing one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptExtraction {
    pub merchant: String,
    pub merchant_confidence: f32,
    pub total: f64,
    pub total_confidence: f32,
    pub date: NaiveDate,
    pub date_confidence: f32,
    pub line_items: Vec<LineItem>,
    pub line_items_confidence: f32,
    pub overall_confidence: f32,
    pub mathematical_consistency: bool,
    pub spatial_validation: bool,
    pub table_structure: Vec<TableColumn>,
    pub validation: ValidationReport,
}

/// Runs the four field extractors and the validators over one document.
#[derive(Debug, Clone, Default)]
pub struct ReceiptExtractor {
    config: ExtractionConfig,
    reference_date: Option<NaiveDate>,
}

impl ReceiptExtractor {
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        config.validate()?;
        Ok(Self {
            config,
            reference_date: None,
        })
    }

    /// Date reported when no receipt date is found. Defaults to today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Normalizes a raw JSON payload and extracts it.
    pub fn extract_json(&self, json: &str) -> Result<ReceiptExtraction, ExtractionError> {
        let document = Document::from_json_str(json)?;
        Ok(self.extract(&document))
    }

    pub fn extract(&self, document: &Document) -> ReceiptExtraction {
        let config = &self.config;
        let today = self.reference_date.unwrap_or_else(|| Local::now().date_naive());
        let words: Vec<&Word> = document.words().collect();

        let merchant = extract_merchant(document, &config.merchant);
        let total = extract_total(&words, &config.spatial, &config.total);
        let date = extract_date(&words, &config.date, today);
        let line_items = extract_line_items(&words, &config.line_items, config.spatial.line_item_tolerance);
        let table_structure = detect_columns(
            filter_by_confidence(words.iter().copied(), config.line_items.min_word_confidence),
            &config.table,
        );

        let report = validate(&line_items.items, total.value, &config.validation);
        let spatial_validation = match config.mode {
            ExtractionMode::Standard => report.mathematical_consistency,
            ExtractionMode::TableAware => report.table_consistent(),
        };

        let overall = overall_confidence(
            &config.weights,
            merchant.confidence,
            total.confidence,
            date.confidence,
            line_items.confidence,
        );

        debug!(
            merchant = %merchant.value,
            total = total.value,
            date = %date.value,
            items = line_items.items.len(),
            overall,
            spatial_validation,
            "receipt extracted"
        );

        ReceiptExtraction {
            merchant: merchant.value,
            merchant_confidence: merchant.confidence,
            total: total.value,
            total_confidence: total.confidence,
            date: date.value,
            date_confidence: date.confidence,
            line_items: line_items.items,
            line_items_confidence: line_items.confidence,
            overall_confidence: overall,
            mathematical_consistency: report.mathematical_consistency,
            spatial_validation,
            table_structure,
            validation: report,
        }
    }
}

/// Extracts with the default configuration.
pub fn extract_receipt(document: &Document) -> ReceiptExtraction {
    ReceiptExtractor::default().extract(document)
}
