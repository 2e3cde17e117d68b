//! Overall confidence and the line-item versus total cross-checks.
use serde::{Deserialize, Serialize};

use crate::config::{ConfidenceWeights, ValidationConfig};
use crate::line_item_extractor::LineItem;

/// Why the consistency checks passed or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub line_item_sum: f64,
    pub difference: f64,
    /// Largest allowed `difference`
    pub tolerance: f64,
    pub mathematical_consistency: bool,
    /// Largest distance of a price token's x from the mean price x
    pub max_price_deviation: f64,
    pub price_alignment: bool,
    pub reading_order: bool,
}

impl ValidationReport {
    /// Outcome of the table-aware check.
    pub fn table_consistent(&self) -> bool {
        self.mathematical_consistency && self.price_alignment && self.reading_order
    }
}

/// Fixed-weight blend of the four field confidences, kept within `[0, 1]`.
pub fn overall_confidence(
    weights: &ConfidenceWeights,
    merchant: f32,
    total: f32,
    date: f32,
    line_items: f32,
) -> f32 {
    let combined = weights.merchant * merchant
        + weights.total * total
        + weights.date * date
        + weights.line_items * line_items;
    combined.clamp(0.0, 1.0)
}

/// Runs every check against the extracted items and total.
pub fn validate(items: &[LineItem], total: f64, config: &ValidationConfig) -> ValidationReport {
    let line_item_sum: f64 = items.iter().map(|i| i.total_price).sum();
    let difference = (line_item_sum - total).abs();
    let tolerance = (config.relative_tolerance * total).max(config.absolute_tolerance);
    let max_price_deviation = max_price_deviation(items);

    ValidationReport {
        line_item_sum,
        difference,
        tolerance,
        mathematical_consistency: !items.is_empty() && difference <= tolerance,
        max_price_deviation,
        price_alignment: !items.is_empty() && max_price_deviation < config.price_alignment_tolerance,
        reading_order: is_reading_order(items, config.ordering_jitter),
    }
}

fn max_price_deviation(items: &[LineItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let mean = items.iter().map(|i| i.price_position.x).sum::<f64>() / items.len() as f64;
    items
        .iter()
        .map(|i| (i.price_position.x - mean).abs())
        .fold(0.0, f64::max)
}

/// Items must not move up the page by more than `jitter` pixels.
fn is_reading_order(items: &[LineItem], jitter: f64) -> bool {
    items
        .windows(2)
        .all(|pair| pair[1].position.y >= pair[0].position.y - jitter)
}
