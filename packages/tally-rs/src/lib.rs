//! # tally-rs
//!
//! Deterministic extraction of structured receipt data from OCR text-detection output.
//!
//! Given the words, polygons and confidences produced by an OCR provider, tally reasons about
//! page geometry to recover the merchant, the transaction date, the total and the itemized
//! lines. Every field carries its own confidence and the line items are cross-checked against
//! the total. No models are involved; every rule is a fixed, explainable heuristic.
//!
//! ## Features
//!
//! - **Document normalization**: raw nested payloads become a uniform page/block/paragraph/word tree
//! - **Line grouping**: tokens clustered into reading lines by vertical center
//! - **Column detection**: x-position bands labelled as description, quantity or price columns
//! - **Field extraction**: merchant, total, date and line items, each with a confidence score
//! - **Validation**: line-item sum versus total, plus optional column alignment checks
//! - **Batch mode**: many payloads processed concurrently from the `tally` CLI
//!
//! ## Quick Start
//!
//! ```ignore
//! use tally_rs::prelude::*;
//!
//! let extractor = ReceiptExtractor::new(ExtractionConfig::default())?;
//! let record = extractor.extract_json(&std::fs::read_to_string("receipt.json")?)?;
//! println!("{} {:.2} ({:.2})", record.merchant, record.total, record.overall_confidence);
//!
//! if record.total_confidence == 0.0 {
//!     println!("no total found, ask for review");
//! }
//! ```

pub mod batch;
pub mod config;
pub mod date_extractor;
pub mod field;
pub mod line_grouper;
pub mod line_item_extractor;
pub mod merchant_extractor;
pub mod patterns;
pub mod receipt_extractor;
pub mod spatial;
pub mod table_detector;
pub mod total_extractor;
pub mod validator;

// Re-export commonly used types at the root level
pub use batch::{BatchEntry, BatchOptions, BatchResult, BatchRunner};
pub use config::{load_config, save_config, ConfigError, ExtractionConfig, ExtractionMode};
pub use date_extractor::extract_date;
pub use field::Field;
pub use line_grouper::{filter_by_confidence, group_into_lines, TextLine};
pub use line_item_extractor::{extract_line_items, LineItem, LineItemExtraction};
pub use merchant_extractor::extract_merchant;
pub use receipt_extractor::{extract_receipt, ExtractionError, ReceiptExtraction, ReceiptExtractor};
pub use spatial::Point;
pub use table_detector::{detect_columns, ColumnType, TableColumn};
pub use total_extractor::extract_total;
pub use validator::{overall_confidence, ValidationReport};

pub use tally_ocr::{
    BoundingPolygon, Document, DocumentError, DocumentSource, OcrInput, Vertex, VisionJsonSource, Word,
};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use tally_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        detect_columns, extract_date, extract_line_items, extract_merchant, extract_receipt, extract_total,
        filter_by_confidence, group_into_lines, load_config, overall_confidence, save_config, BatchEntry,
        BatchOptions, BatchResult, BatchRunner, BoundingPolygon, ColumnType, ConfigError, Document, DocumentError,
        DocumentSource, ExtractionConfig, ExtractionError, ExtractionMode, Field, LineItem, LineItemExtraction,
        OcrInput, Point, ReceiptExtraction, ReceiptExtractor, TableColumn, TextLine, ValidationReport, Vertex,
        VisionJsonSource, Word,
    };
}
