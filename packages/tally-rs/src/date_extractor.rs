//! Transaction date from keyword proximity, with an exclusion-aware fallback.
use chrono::NaiveDate;
use tally_ocr::{BoundingPolygon, Word};
use tracing::debug;

use crate::config::DateConfig;
use crate::field::Field;
use crate::patterns::{contains_keyword, find_date, DateFormat};
use crate::spatial::centroid_distance;

/// A date-shaped string found in a short run of consecutive words.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCandidate {
    pub text: String,
    pub format: DateFormat,
    pub bounding_box: BoundingPolygon,
    pub confidence: f32,
}

/// Extracts the receipt date. When nothing usable is found the result is
/// `today` with confidence zero, which callers must read as "no date".
pub fn extract_date(words: &[&Word], config: &DateConfig, today: NaiveDate) -> Field<NaiveDate> {
    let candidates = collect_candidates(words, config.max_window);
    if candidates.is_empty() {
        debug!("no date-shaped text");
        return Field::missing(today);
    }

    let selected = keyword_match(words, &candidates, config)
        .map(|c| (c, config.keyword_factor))
        .or_else(|| fallback_match(words, &candidates, config).map(|c| (c, config.fallback_factor)));

    let Some((candidate, factor)) = selected else {
        debug!("every date candidate is near an exclusion keyword");
        return Field::missing(today);
    };

    match parse_date(candidate.format, &candidate.text) {
        Some(date) => {
            debug!(text = %candidate.text, %date, "date selected");
            Field::new(date, candidate.confidence * factor)
        }
        None => {
            debug!(text = %candidate.text, "selected date text is not a calendar date");
            Field::missing(today)
        }
    }
}

/// Scans words in document order, joining up to `max_window` consecutive
/// words. A candidate is anchored at the word where its match begins, so
/// `Date: 01/15/2024` yields one candidate, not two.
pub fn collect_candidates(words: &[&Word], max_window: usize) -> Vec<DateCandidate> {
    let mut candidates = Vec::new();

    for i in 0..words.len() {
        for len in 1..=max_window.min(words.len() - i) {
            let window = &words[i..i + len];
            let text = window.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
            let Some(found) = find_date(&text) else {
                continue;
            };
            if found.start >= window[0].text.len() {
                continue;
            }
            candidates.push(DateCandidate {
                text: found.text.to_string(),
                format: found.format,
                bounding_box: window_bounds(window),
                confidence: window.iter().map(|w| w.confidence).fold(1.0, f32::min),
            });
            break;
        }
    }

    candidates
}

fn window_bounds(window: &[&Word]) -> BoundingPolygon {
    let min_x = window.iter().map(|w| w.bounding_box.min_x()).min().unwrap_or(0);
    let max_x = window.iter().map(|w| w.bounding_box.max_x()).max().unwrap_or(0);
    let min_y = window.iter().map(|w| w.bounding_box.min_y()).min().unwrap_or(0);
    let max_y = window.iter().map(|w| w.bounding_box.max_y()).max().unwrap_or(0);
    BoundingPolygon::from_corners(min_x, min_y, max_x, max_y)
}

fn keyword_match<'c>(words: &[&Word], candidates: &'c [DateCandidate], config: &DateConfig) -> Option<&'c DateCandidate> {
    words
        .iter()
        .filter(|w| contains_keyword(&w.text, &config.keywords))
        .find_map(|keyword| {
            candidates
                .iter()
                .find(|c| centroid_distance(&keyword.bounding_box, &c.bounding_box) <= config.keyword_radius)
        })
}

fn fallback_match<'c>(words: &[&Word], candidates: &'c [DateCandidate], config: &DateConfig) -> Option<&'c DateCandidate> {
    let exclusions: Vec<&Word> = words
        .iter()
        .filter(|w| contains_keyword(&w.text, &config.exclusion_keywords))
        .copied()
        .collect();

    candidates.iter().find(|c| {
        exclusions
            .iter()
            .all(|e| centroid_distance(&e.bounding_box, &c.bounding_box) > config.exclusion_radius)
    })
}

/// Parses a matched date string. Numeric dates are read month first.
pub fn parse_date(format: DateFormat, text: &str) -> Option<NaiveDate> {
    match format {
        DateFormat::Numeric => {
            let normalized = text.replace('-', "/");
            let pattern = if normalized.split('/').next().is_some_and(|p| p.len() == 4) {
                "%Y/%m/%d"
            } else {
                "%m/%d/%Y"
            };
            NaiveDate::parse_from_str(&normalized, pattern).ok()
        }
        DateFormat::ShortYear => NaiveDate::parse_from_str(&text.replace('-', "/"), "%m/%d/%y").ok(),
        DateFormat::MonthName => {
            let cleaned = text.replace([',', '.'], " ");
            let parts: Vec<&str> = cleaned.split_whitespace().collect();
            let [month, day, year] = parts.as_slice() else {
                return None;
            };
            let month: String = month.chars().take(3).collect();
            NaiveDate::parse_from_str(&format!("{} {} {}", month, day, year), "%b %d %Y").ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: i32, y: i32, confidence: f32) -> Word {
        Word::new(text, BoundingPolygon::from_rect(x, y, 60, 16), confidence)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn run(words: &[Word]) -> Field<NaiveDate> {
        let refs: Vec<&Word> = words.iter().collect();
        extract_date(&refs, &DateConfig::default(), today())
    }

    #[test]
    fn test_keyword_proximity() {
        let words = vec![
            word("Return", 50, 600, 0.9),
            word("by", 120, 600, 0.9),
            word("02/14/2024", 170, 600, 0.9),
            word("Date:", 50, 100, 0.9),
            word("01/15/2024", 130, 100, 0.8),
        ];
        let date = run(&words);
        assert_eq!(date.value, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!((date.confidence - 0.72).abs() < 1e-5);
    }

    #[test]
    fn test_keyword_outside_radius_uses_fallback() {
        // centroids 300px apart
        let words = vec![word("DATE", 50, 100, 0.9), word("01/15/2024", 50, 400, 0.9)];
        let date = run(&words);
        assert_eq!(date.value, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!((date.confidence - 0.63).abs() < 1e-5);
    }

    #[test]
    fn test_keyword_radius_boundary() {
        // 140px: inside the radius
        let words = vec![word("DATE", 50, 100, 0.9), word("01/15/2024", 50, 240, 0.9)];
        assert!((run(&words).confidence - 0.81).abs() < 1e-5);

        // exactly 150px still counts as near the keyword
        let words = vec![word("DATE", 50, 100, 0.9), word("01/15/2024", 50, 250, 0.9)];
        assert!((run(&words).confidence - 0.81).abs() < 1e-5);

        let words = vec![word("DATE", 50, 100, 0.9), word("01/15/2024", 50, 251, 0.9)];
        assert!((run(&words).confidence - 0.63).abs() < 1e-5);
    }

    #[test]
    fn test_window_length_is_configurable() {
        let words = vec![word("Jan", 50, 100, 0.9), word("15,", 100, 100, 0.9), word("2024", 150, 100, 0.9)];
        let refs: Vec<&Word> = words.iter().collect();
        assert_eq!(collect_candidates(&refs, 3).len(), 1);
        assert!(collect_candidates(&refs, 2).is_empty());
    }

    #[test]
    fn test_fallback_skips_excluded_dates() {
        let words = vec![
            word("Valid", 50, 100, 0.9),
            word("thru", 100, 100, 0.9),
            word("12/31/2025", 130, 100, 0.9),
            word("03/02/2024", 50, 400, 0.8),
        ];
        let date = run(&words);
        assert_eq!(date.value, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!((date.confidence - 0.56).abs() < 1e-5);
    }

    #[test]
    fn test_month_name_across_words() {
        let words = vec![
            word("Jan", 50, 100, 0.95),
            word("15,", 100, 100, 0.7),
            word("2024", 150, 100, 0.9),
        ];
        let date = run(&words);
        assert_eq!(date.value, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!((date.confidence - 0.49).abs() < 1e-5);
    }

    #[test]
    fn test_short_year_and_iso() {
        assert_eq!(
            parse_date(DateFormat::ShortYear, "3/7/24"),
            NaiveDate::from_ymd_opt(2024, 3, 7)
        );
        assert_eq!(
            parse_date(DateFormat::Numeric, "2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date(DateFormat::MonthName, "September 9, 2023"),
            NaiveDate::from_ymd_opt(2023, 9, 9)
        );
    }

    #[test]
    fn test_unparsable_date_yields_today() {
        let words = vec![word("DATE", 50, 100, 0.9), word("13/45/2024", 130, 100, 0.9)];
        let date = run(&words);
        assert_eq!(date.value, today());
        assert_eq!(date.confidence, 0.0);
    }

    #[test]
    fn test_no_date_yields_today() {
        let words = vec![word("TOTAL", 50, 100, 0.9), word("4.00", 130, 100, 0.9)];
        let date = run(&words);
        assert_eq!(date.value, today());
        assert!(!date.is_found());
    }

    #[test]
    fn test_single_candidate_for_prefixed_word() {
        let words = vec![word("Date:", 50, 100, 0.9), word("01/15/2024", 130, 100, 0.9)];
        let refs: Vec<&Word> = words.iter().collect();
        let candidates = collect_candidates(&refs, 3);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "01/15/2024");
    }
}
