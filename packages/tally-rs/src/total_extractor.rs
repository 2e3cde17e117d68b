//! Receipt total: keyword-anchored price with a largest-amount fallback.
use tally_ocr::Word;
use tracing::debug;

use crate::config::{SpatialConfig, TotalConfig};
use crate::field::Field;
use crate::patterns::{contains_keyword, parse_price};
use crate::spatial::{rightmost_x, same_line};

/// How the total was located, mostly useful in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    Keyword,
    LargestAmount,
    LargestAmountAfterKeyword,
    NotFound,
}

/// Extracts the total from words in document order.
///
/// The first keyword hit wins even when it is a substring match such as
/// `SUBTOTAL`; totals-line exclusion only happens in line-item extraction.
pub fn extract_total(words: &[&Word], spatial: &SpatialConfig, config: &TotalConfig) -> Field<f64> {
    extract_total_with_source(words, spatial, config).0
}

pub fn extract_total_with_source(
    words: &[&Word],
    spatial: &SpatialConfig,
    config: &TotalConfig,
) -> (Field<f64>, TotalSource) {
    let Some(keyword) = find_keyword(words, &config.keywords) else {
        debug!("no total keyword, falling back to largest amount");
        return match largest_amount(words) {
            Some((amount, word)) => (
                Field::new(amount, word.confidence * config.fallback_factor),
                TotalSource::LargestAmount,
            ),
            None => (Field::missing(0.0), TotalSource::NotFound),
        };
    };

    if let Some((amount, price)) = rightmost_price_on_line(words, keyword, spatial.same_line_tolerance) {
        let confidence = (keyword.confidence.min(price.confidence) * config.keyword_boost).min(config.confidence_cap);
        debug!(keyword = %keyword.text, amount, confidence, "total found beside keyword");
        return (Field::new(amount, confidence), TotalSource::Keyword);
    }

    debug!(keyword = %keyword.text, "no price on keyword line, falling back to largest amount");
    match largest_amount(words) {
        Some((amount, word)) => (
            Field::new(
                amount,
                word.confidence * config.fallback_factor * config.failed_keyword_factor,
            ),
            TotalSource::LargestAmountAfterKeyword,
        ),
        None => (Field::missing(0.0), TotalSource::NotFound),
    }
}

/// First word in document order matching a keyword. Multi-word keywords are
/// also tried against the word joined with its successor.
fn find_keyword<'a>(words: &[&'a Word], keywords: &[String]) -> Option<&'a Word> {
    let phrases: Vec<&String> = keywords.iter().filter(|k| k.contains(char::is_whitespace)).collect();

    words.iter().enumerate().find_map(|(i, word)| {
        if contains_keyword(&word.text, keywords) {
            return Some(*word);
        }
        let next = words.get(i + 1)?;
        let joined = format!("{} {}", word.text, next.text);
        contains_keyword(&joined, &phrases).then_some(*word)
    })
}

fn rightmost_price_on_line<'a>(words: &[&'a Word], keyword: &Word, tolerance: f64) -> Option<(f64, &'a Word)> {
    words
        .iter()
        .filter(|w| same_line(&w.bounding_box, &keyword.bounding_box, tolerance))
        .filter_map(|w| parse_price(&w.text).map(|amount| (amount, *w)))
        .fold(None, |best: Option<(f64, &Word)>, candidate| match best {
            Some(current) if rightmost_x(&current.1.bounding_box) >= rightmost_x(&candidate.1.bounding_box) => {
                Some(current)
            }
            _ => Some(candidate),
        })
}

/// Largest price on the page; ties keep the earliest word.
fn largest_amount<'a>(words: &[&'a Word]) -> Option<(f64, &'a Word)> {
    words
        .iter()
        .filter_map(|w| parse_price(&w.text).map(|amount| (amount, *w)))
        .fold(None, |best: Option<(f64, &Word)>, candidate| match best {
            Some(current) if current.0 >= candidate.0 => Some(current),
            _ => Some(candidate),
        })
}
