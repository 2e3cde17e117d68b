//! Column-band inference from token x-positions.
//!
//! The detected columns are advisory context returned with the extraction;
//! they never gate line-item acceptance.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_ocr::Word;
use tracing::debug;

use crate::config::TableConfig;
use crate::patterns::{is_price, is_text_token, parse_small_integer};
use crate::spatial::leftmost_x;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Description,
    Quantity,
    UnitPrice,
    TotalPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Inclusive `[min, max]` pixel range
    pub x_range: [i32; 2],
    pub confidence: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ContentRatios {
    price: f32,
    integer: f32,
    text: f32,
}

/// Buckets words by their left edge on a fixed grid and labels each bucket.
pub fn detect_columns<'a, I>(words: I, config: &TableConfig) -> Vec<TableColumn>
where
    I: IntoIterator<Item = &'a Word>,
{
    let grid = config.grid.max(1);
    let mut buckets: BTreeMap<i32, Vec<&Word>> = BTreeMap::new();
    for word in words {
        let x = leftmost_x(&word.bounding_box);
        let bucket_x = ((x as f64 / grid as f64).round() as i32).saturating_mul(grid);
        buckets.entry(bucket_x).or_default().push(word);
    }

    buckets
        .into_iter()
        .filter_map(|(bucket_x, members)| {
            let ratios = content_ratios(&members, config);
            let confidence = ratios.price.max(ratios.integer).max(ratios.text);
            if confidence <= config.min_confidence {
                return None;
            }
            let column_type = classify(bucket_x, &ratios, config);
            debug!(bucket_x, ?column_type, confidence, "detected column band");
            Some(TableColumn {
                column_type,
                x_range: [
                    bucket_x.saturating_sub(config.range_before),
                    bucket_x.saturating_add(config.range_after),
                ],
                confidence,
            })
        })
        .collect()
}

fn content_ratios(members: &[&Word], config: &TableConfig) -> ContentRatios {
    let sample: Vec<&Word> = members.iter().take(config.sample_size).copied().collect();
    if sample.is_empty() {
        return ContentRatios::default();
    }

    ContentRatios {
        price: ratio(&sample, is_price),
        integer: ratio(&sample, |t| parse_small_integer(t, config.small_integer_limit).is_some()),
        text: ratio(&sample, is_text_token),
    }
}

fn ratio<F>(sample: &[&Word], pred: F) -> f32
where
    F: Fn(&str) -> bool,
{
    sample.iter().filter(|w| pred(&w.text)).count() as f32 / sample.len() as f32
}

fn classify(bucket_x: i32, ratios: &ContentRatios, config: &TableConfig) -> ColumnType {
    if ratios.text > ratios.price && ratios.text > ratios.integer {
        ColumnType::Description
    } else if ratios.price > 0.0 && bucket_x > config.total_price_min_x {
        ColumnType::TotalPrice
    } else if ratios.integer > 0.0 && bucket_x < config.quantity_max_x {
        ColumnType::Quantity
    } else {
        ColumnType::UnitPrice
    }
}
