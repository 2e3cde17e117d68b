use serde::Serialize;
use tally_ocr::Word;

use crate::spatial::{centroid, leftmost_x, same_line, top_y, Point};

/// A horizontal reading line, words ordered left to right.
#[derive(Debug, Clone, Serialize)]
pub struct TextLine<'a> {
    pub words: Vec<&'a Word>,
}

impl<'a> TextLine<'a> {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Mean of the word centroids.
    pub fn centroid(&self) -> Point {
        if self.words.is_empty() {
            return Point::default();
        }
        let n = self.words.len() as f64;
        let (sx, sy) = self.words.iter().fold((0.0, 0.0), |(sx, sy), w| {
            let c = centroid(&w.bounding_box);
            (sx + c.x, sy + c.y)
        });
        Point { x: sx / n, y: sy / n }
    }

    pub fn min_confidence(&self) -> f32 {
        self.words
            .iter()
            .map(|w| w.confidence)
            .fold(f32::INFINITY, f32::min)
            .min(1.0)
    }
}

/// Groups words into reading lines.
///
/// Words are visited top to bottom and join the first line whose anchor
/// (the line's first word) is within `tolerance` of their vertical center.
/// Membership is tested against the anchor only, never a running extent.
pub fn group_into_lines<'a, I>(words: I, tolerance: f64) -> Vec<TextLine<'a>>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut sorted: Vec<&Word> = words.into_iter().collect();
    sorted.sort_by_key(|w| top_y(&w.bounding_box));

    let mut lines: Vec<TextLine> = Vec::new();
    for word in sorted {
        match lines
            .iter_mut()
            .find(|line| same_line(&line.words[0].bounding_box, &word.bounding_box, tolerance))
        {
            Some(line) => line.words.push(word),
            None => lines.push(TextLine { words: vec![word] }),
        }
    }

    for line in &mut lines {
        line.words.sort_by_key(|w| leftmost_x(&w.bounding_box));
    }

    lines
}

/// Words at or above `min_confidence`, in their original order.
pub fn filter_by_confidence<'a, I>(words: I, min_confidence: f32) -> Vec<&'a Word>
where
    I: IntoIterator<Item = &'a Word>,
{
    words
        .into_iter()
        .filter(|w| w.confidence >= min_confidence)
        .collect()
}
