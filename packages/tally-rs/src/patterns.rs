//! Token classification shared by the extractors.
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

static PRICE: OnceLock<Option<Regex>> = OnceLock::new();
static SMALL_INTEGER: OnceLock<Option<Regex>> = OnceLock::new();
static DATE_PATTERNS: OnceLock<Vec<(DateFormat, Regex)>> = OnceLock::new();

/// Shape of a recognized date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `01/15/2024`, `1-15-2024` or `2024-01-15`
    Numeric,
    /// `Jan 15, 2024`
    MonthName,
    /// `01/15/24`
    ShortYear,
}

fn price_regex() -> Option<&'static Regex> {
    PRICE
        .get_or_init(|| Regex::new(r"\$?((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})").ok())
        .as_ref()
}

fn small_integer_regex() -> Option<&'static Regex> {
    SMALL_INTEGER.get_or_init(|| Regex::new(r"^\d+$").ok()).as_ref()
}

fn date_patterns() -> &'static Vec<(DateFormat, Regex)> {
    DATE_PATTERNS.get_or_init(|| {
        vec![
            (
                DateFormat::Numeric,
                r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{4}|\d{4}[/-]\d{1,2}[/-]\d{1,2})\b",
            ),
            (
                DateFormat::MonthName,
                r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b",
            ),
            (DateFormat::ShortYear, r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2}\b"),
        ]
        .into_iter()
        .filter_map(|(format, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (format, re))
        })
        .collect()
    })
}

/// Returns the dollar value of the first price-shaped substring, e.g. `$1,234.56`.
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = price_regex()?.captures(text)?;
    caps.get(1)?.as_str().replace(',', "").parse().ok()
}

pub fn is_price(text: &str) -> bool {
    price_regex().is_some_and(|re| re.is_match(text))
}

/// A bare integer token strictly below `limit`, the shape of a quantity.
pub fn parse_small_integer(text: &str, limit: u32) -> Option<u32> {
    let trimmed = text.trim();
    if !small_integer_regex()?.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|v| *v < limit)
}

/// Purely alphabetic token longer than two characters.
pub fn is_text_token(text: &str) -> bool {
    text.chars().count() > 2 && text.chars().all(char::is_alphabetic)
}

/// A date-shaped substring and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch<'t> {
    pub format: DateFormat,
    pub start: usize,
    pub text: &'t str,
}

/// First date-shaped substring, tried in pattern order.
pub fn find_date(text: &str) -> Option<DateMatch<'_>> {
    date_patterns().iter().find_map(|(format, re)| {
        re.find(text).map(|m| DateMatch {
            format: *format,
            start: m.start(),
            text: m.as_str(),
        })
    })
}

/// Case-insensitive substring match against any keyword.
pub fn contains_keyword<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let upper = text.to_uppercase();
    keywords
        .iter()
        .any(|k| upper.contains(&k.as_ref().to_uppercase()))
}
