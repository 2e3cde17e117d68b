//! Merchant name from the tallest text block near the top of page one.
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use tally_ocr::{Block, Document, Page};
use tracing::debug;

use crate::config::MerchantConfig;
use crate::field::Field;
use crate::spatial::{font_size, top_y};

/// Patterns stripped from the merchant line (phone numbers, street addresses)
static NOISE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn get_noise_patterns() -> &'static Vec<Regex> {
    NOISE_PATTERNS.get_or_init(|| {
        [
            r"\d{10,}",
            r"\(?\b\d{3}\)?[\s.-]?\d{3}[\s.-]\d{4}\b",
            r"\s+\d+\s+\w+(?:\s+\w+)*?\s+(?:st|street|ave|avenue|rd|road|blvd|boulevard|dr|drive|ln|lane|way|ct|court|pl|place|hwy|highway|pkwy)\b\.?.*$",
        ]
        .iter()
        .filter_map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build().ok())
        .collect()
    })
}

pub fn extract_merchant(document: &Document, config: &MerchantConfig) -> Field<String> {
    let Some(page) = document.first_page() else {
        return Field::missing(String::new());
    };

    let Some(block) = select_merchant_block(page, config) else {
        debug!("no merchant block in the top region");
        return Field::missing(String::new());
    };

    let name = clean_merchant_name(&block.text);
    if name.is_empty() {
        return Field::missing(name);
    }

    debug!(merchant = %name, block_confidence = block.confidence, "merchant selected");
    Field::new(name, block.confidence * config.confidence_factor)
}

/// Tallest block starting in the top region; ties keep the earliest block.
fn select_merchant_block<'a>(page: &'a Page, config: &MerchantConfig) -> Option<&'a Block> {
    let height = page_height(page);
    if height <= 0.0 {
        return None;
    }
    let limit = height * config.top_region_ratio;

    page.blocks
        .iter()
        .filter(|b| !b.text.trim().is_empty())
        .filter(|b| top_y(&b.bounding_box) as f64 <= limit)
        .fold(None, |best: Option<&Block>, block| match best {
            Some(current) if font_size(&current.bounding_box) >= font_size(&block.bounding_box) => {
                Some(current)
            }
            _ => Some(block),
        })
}

/// Provider height, or the lowest block edge when the provider omitted it.
fn page_height(page: &Page) -> f64 {
    if page.height > 0 {
        return page.height as f64;
    }
    page.blocks
        .iter()
        .map(|b| b.bounding_box.max_y())
        .max()
        .unwrap_or(0) as f64
}

/// First line of the block with phone numbers and address suffixes removed.
pub fn clean_merchant_name(text: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");

    let mut result = first_line.to_string();
    for re in get_noise_patterns() {
        result = re.replace_all(&result, "").to_string();
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
