//! Itemized rows: reading lines that carry a price and a description.
use serde::{Deserialize, Serialize};
use tally_ocr::Word;
use tracing::debug;

use crate::config::LineItemConfig;
use crate::line_grouper::{filter_by_confidence, group_into_lines, TextLine};
use crate::patterns::{contains_keyword, is_price, parse_price, parse_small_integer};
use crate::spatial::{centroid, Point};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub total_price: f64,
    pub confidence: f32,
    /// Centroid of the whole line
    pub position: Point,
    /// Centroid of the total price token
    pub price_position: Point,
    pub raw_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineItemExtraction {
    pub items: Vec<LineItem>,
    /// Mean item confidence, zero when nothing was extracted
    pub confidence: f32,
}

pub fn extract_line_items(words: &[&Word], config: &LineItemConfig, tolerance: f64) -> LineItemExtraction {
    let confident = filter_by_confidence(words.iter().copied(), config.min_word_confidence);
    let lines = group_into_lines(confident, tolerance);

    let items: Vec<LineItem> = lines
        .iter()
        .filter(|line| line.words.len() >= 2)
        .filter(|line| !is_header_or_totals(line, config))
        .filter_map(|line| parse_line(line, config))
        .collect();

    let confidence = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.confidence).sum::<f32>() / items.len() as f32
    };

    debug!(lines = lines.len(), items = items.len(), confidence, "line items extracted");
    LineItemExtraction { items, confidence }
}

fn is_header_or_totals(line: &TextLine, config: &LineItemConfig) -> bool {
    let text = line.text();
    contains_keyword(&text, &config.header_keywords) || contains_keyword(&text, &config.totals_keywords)
}

/// Turns one reading line into an item, or `None` when it has no price or
/// nothing left over to describe.
fn parse_line(line: &TextLine, config: &LineItemConfig) -> Option<LineItem> {
    let prices: Vec<(f64, &Word)> = line
        .words
        .iter()
        .filter_map(|w| parse_price(&w.text).map(|p| (p, *w)))
        .collect();
    let (total_price, price_word) = *prices.last()?;
    let unit_price = prices.len().checked_sub(2).map(|i| prices[i].0);

    // Only the first small integer is a quantity candidate; every one is
    // removed from the description.
    let mut first_integer = None;
    let mut description_parts = Vec::new();
    for word in &line.words {
        if is_price(&word.text) {
            continue;
        }
        match parse_small_integer(&word.text, config.small_integer_limit) {
            Some(value) => {
                first_integer.get_or_insert(value);
            }
            None => description_parts.push(word.text.as_str()),
        }
    }
    let quantity = first_integer.filter(|v| *v > 0);

    if description_parts.is_empty() {
        debug!(line = %line.text(), "priced line without description");
        return None;
    }
    let description = description_parts.join(" ");

    let mut confidence = line.min_confidence();
    if description.chars().count() > 3 && total_price > 0.0 {
        confidence *= config.description_boost;
    }
    if quantity.is_some() {
        confidence *= config.quantity_boost;
    }
    let confidence = confidence.min(config.confidence_cap);

    Some(LineItem {
        description,
        quantity,
        unit_price,
        total_price,
        confidence,
        position: line.centroid(),
        price_position: centroid(&price_word.bounding_box),
        raw_text: line.text(),
    })
}
