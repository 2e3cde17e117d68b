//! Tunable constants for every extraction stage, stored as TOML.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A configuration value the extractors cannot work with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("confidence weights must sum to 1, got {0}")]
    WeightSum(f32),
    #[error("confidence weights must be non-negative")]
    NegativeWeight,
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} must be within [0, 1]")]
    OutOfRange(&'static str),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Which validator decides `spatial_validation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Sum-versus-total check only.
    #[default]
    Standard,
    /// Sum check plus price column alignment and reading order.
    TableAware,
}

/// Complete extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    pub spatial: SpatialConfig,
    pub merchant: MerchantConfig,
    pub total: TotalConfig,
    pub date: DateConfig,
    pub line_items: LineItemConfig,
    pub table: TableConfig,
    pub weights: ConfidenceWeights,
    pub validation: ValidationConfig,
}

/// Pixel tolerances for the same-line test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Used by the total extractor
    pub same_line_tolerance: f64,
    /// Used when grouping line-item rows
    pub line_item_tolerance: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            same_line_tolerance: 10.0,
            line_item_tolerance: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    /// Fraction of the page height, from the top, searched for the merchant block
    pub top_region_ratio: f64,
    pub confidence_factor: f32,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            top_region_ratio: 0.2,
            confidence_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalConfig {
    pub keywords: Vec<String>,
    pub keyword_boost: f32,
    pub confidence_cap: f32,
    /// Applied to the largest price when no keyword exists
    pub fallback_factor: f32,
    /// Applied on top of `fallback_factor` when a keyword had no price beside it
    pub failed_keyword_factor: f32,
}

impl Default for TotalConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(&["TOTAL", "GRAND TOTAL", "AMOUNT DUE", "BALANCE", "CHARGE"]),
            keyword_boost: 1.2,
            confidence_cap: 0.95,
            fallback_factor: 0.7,
            failed_keyword_factor: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub keywords: Vec<String>,
    pub exclusion_keywords: Vec<String>,
    pub keyword_radius: f64,
    pub exclusion_radius: f64,
    pub keyword_factor: f32,
    pub fallback_factor: f32,
    /// Longest run of consecutive words searched for a single date
    pub max_window: usize,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(&["DATE", "ISSUED", "PURCHASE"]),
            exclusion_keywords: to_strings(&["RETURN", "EXPIRE", "VALID"]),
            keyword_radius: 150.0,
            exclusion_radius: 100.0,
            keyword_factor: 0.9,
            fallback_factor: 0.7,
            max_window: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemConfig {
    pub min_word_confidence: f32,
    pub header_keywords: Vec<String>,
    pub totals_keywords: Vec<String>,
    /// Bare integers below this are quantity candidates
    pub small_integer_limit: u32,
    pub description_boost: f32,
    pub quantity_boost: f32,
    pub confidence_cap: f32,
}

impl Default for LineItemConfig {
    fn default() -> Self {
        Self {
            min_word_confidence: 0.4,
            header_keywords: to_strings(&["DESCRIPTION", "ITEM", "QTY", "PRICE"]),
            totals_keywords: to_strings(&["TOTAL", "SUBTOTAL", "TAX", "AMOUNT DUE"]),
            small_integer_limit: 100,
            description_boost: 1.2,
            quantity_boost: 1.1,
            confidence_cap: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Column bucket width in pixels
    pub grid: i32,
    pub sample_size: usize,
    pub min_confidence: f32,
    pub total_price_min_x: i32,
    pub quantity_max_x: i32,
    pub range_before: i32,
    pub range_after: i32,
    pub small_integer_limit: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            grid: 20,
            sample_size: 10,
            min_confidence: 0.3,
            total_price_min_x: 300,
            quantity_max_x: 200,
            range_before: 20,
            range_after: 100,
            small_integer_limit: 100,
        }
    }
}

/// Weights of the overall confidence; they must sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub merchant: f32,
    pub total: f32,
    pub date: f32,
    pub line_items: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            merchant: 0.25,
            total: 0.35,
            date: 0.15,
            line_items: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed sum/total difference as a fraction of the total
    pub relative_tolerance: f64,
    /// Floor for the allowed difference
    pub absolute_tolerance: f64,
    pub price_alignment_tolerance: f64,
    pub ordering_jitter: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: 0.10,
            absolute_tolerance: 5.00,
            price_alignment_tolerance: 50.0,
            ordering_jitter: 10.0,
        }
    }
}

impl ExtractionConfig {
    /// Checks the invariants the extractors rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        let sum = w.merchant + w.total + w.date + w.line_items;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::WeightSum(sum));
        }
        if [w.merchant, w.total, w.date, w.line_items].iter().any(|v| *v < 0.0) {
            return Err(ConfigError::NegativeWeight);
        }

        let tolerances = [
            ("spatial.same_line_tolerance", self.spatial.same_line_tolerance),
            ("spatial.line_item_tolerance", self.spatial.line_item_tolerance),
            ("date.keyword_radius", self.date.keyword_radius),
            ("date.exclusion_radius", self.date.exclusion_radius),
            ("validation.absolute_tolerance", self.validation.absolute_tolerance),
            ("validation.price_alignment_tolerance", self.validation.price_alignment_tolerance),
            ("validation.ordering_jitter", self.validation.ordering_jitter),
        ];
        if let Some((name, _)) = tolerances.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::Negative(*name));
        }

        let ratios = [
            ("merchant.top_region_ratio", self.merchant.top_region_ratio),
            ("validation.relative_tolerance", self.validation.relative_tolerance),
            ("line_items.min_word_confidence", self.line_items.min_word_confidence as f64),
            ("line_items.confidence_cap", self.line_items.confidence_cap as f64),
            ("total.confidence_cap", self.total.confidence_cap as f64),
            ("table.min_confidence", self.table.min_confidence as f64),
        ];
        if let Some((name, _)) = ratios.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(ConfigError::OutOfRange(*name));
        }

        if self.table.grid <= 0 {
            return Err(ConfigError::NotPositive("table.grid"));
        }
        if self.date.max_window == 0 {
            return Err(ConfigError::NotPositive("date.max_window"));
        }

        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ExtractionConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ExtractionConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &ExtractionConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
