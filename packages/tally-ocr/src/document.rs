//! Uniform `Document -> Page -> Block -> Paragraph -> Word` tree.
//!
//! Normalization guarantees that every [`Word`] carries non-empty text, a
//! four-point polygon and a confidence in `[0, 1]`. Container confidences are
//! the provider's own scalars and are never recomputed from their children.
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::DocumentError;
use crate::payload::{RawAnnotation, RawBoundingPoly, RawPayload, RawWord};
use crate::region::{BoundingPolygon, Vertex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub bounding_box: BoundingPolygon,
    pub confidence: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, bounding_box: BoundingPolygon, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: clamp_confidence(confidence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub bounding_box: BoundingPolygon,
    pub confidence: f32,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub text: String,
    pub bounding_box: BoundingPolygon,
    pub block_type: String,
    pub confidence: f32,
    pub paragraphs: Vec<Paragraph>,
}

impl Block {
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.paragraphs.iter().flat_map(|p| p.words.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.blocks.iter().flat_map(|b| b.words())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub text: String,
    pub pages: Vec<Page>,
}

impl Document {
    /// All words across all pages in document order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.pages.iter().flat_map(|p| p.words())
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// Parses and normalizes a raw JSON payload.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let payload: RawPayload = serde_json::from_str(json)?;
        normalize(&payload)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let payload: RawPayload = serde_json::from_slice(bytes)?;
        normalize(&payload)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let payload: RawPayload = serde_json::from_value(value)?;
        normalize(&payload)
    }
}

/// Converts the raw payload into a [`Document`].
///
/// Fails only when the first response carries no `fullTextAnnotation`.
pub fn normalize(payload: &RawPayload) -> Result<Document, DocumentError> {
    let annotation = payload
        .responses
        .first()
        .and_then(|r| r.full_text_annotation.as_ref())
        .ok_or(DocumentError::MissingAnnotation)?;

    Ok(normalize_annotation(annotation))
}

fn normalize_annotation(annotation: &RawAnnotation) -> Document {
    let pages: Vec<Page> = annotation
        .pages
        .iter()
        .map(|raw_page| {
            let width = raw_page.width.unwrap_or(0);
            let height = raw_page.height.unwrap_or(0);

            let blocks = raw_page
                .blocks
                .iter()
                .map(|raw_block| {
                    let paragraphs: Vec<Paragraph> = raw_block
                        .paragraphs
                        .iter()
                        .map(|raw_paragraph| {
                            let words: Vec<Word> = raw_paragraph
                                .words
                                .iter()
                                .filter_map(|w| normalize_word(w, width, height))
                                .collect();
                            let text = words
                                .iter()
                                .map(|w| w.text.as_str())
                                .collect::<Vec<_>>()
                                .join(" ");
                            Paragraph {
                                text,
                                bounding_box: normalize_polygon(
                                    raw_paragraph.bounding_box.as_ref(),
                                    width,
                                    height,
                                ),
                                confidence: clamp_confidence(raw_paragraph.confidence.unwrap_or(0.0)),
                                words,
                            }
                        })
                        .collect();

                    let text = paragraphs
                        .iter()
                        .map(|p| p.text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n");

                    Block {
                        text,
                        bounding_box: normalize_polygon(raw_block.bounding_box.as_ref(), width, height),
                        block_type: raw_block.block_type.clone().unwrap_or_else(|| "TEXT".to_string()),
                        confidence: clamp_confidence(raw_block.confidence.unwrap_or(0.0)),
                        paragraphs,
                    }
                })
                .collect();

            Page {
                width,
                height,
                confidence: clamp_confidence(raw_page.confidence.unwrap_or(0.0)),
                blocks,
            }
        })
        .collect();

    let document = Document {
        text: annotation.text.clone().unwrap_or_default(),
        pages,
    };
    debug!(
        pages = document.pages.len(),
        words = document.words().count(),
        "normalized OCR payload"
    );
    document
}

fn normalize_word(raw: &RawWord, page_width: u32, page_height: u32) -> Option<Word> {
    let text: String = raw.symbols.iter().map(|s| s.text.as_str()).collect();
    if text.trim().is_empty() {
        return None;
    }

    Some(Word {
        text,
        bounding_box: normalize_polygon(raw.bounding_box.as_ref(), page_width, page_height),
        confidence: clamp_confidence(raw.confidence.unwrap_or(0.0)),
    })
}

fn normalize_polygon(raw: Option<&RawBoundingPoly>, page_width: u32, page_height: u32) -> BoundingPolygon {
    let Some(raw) = raw else {
        return BoundingPolygon::degenerate();
    };

    let points: Vec<Vertex> = if !raw.vertices.is_empty() {
        raw.vertices.iter().map(|v| Vertex::new(v.x, v.y)).collect()
    } else if page_width > 0 && page_height > 0 {
        raw.normalized_vertices
            .iter()
            .map(|v| {
                Vertex::new(
                    (v.x * page_width as f32).round() as i32,
                    (v.y * page_height as f32).round() as i32,
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    if !points.is_empty() && points.len() != 4 {
        warn!(count = points.len(), "polygon without four vertices, using its bounding rectangle");
    }

    BoundingPolygon::from_points(&points).unwrap_or_else(BoundingPolygon::degenerate)
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "responses": [{
                "fullTextAnnotation": {
                    "text": "ACME HARDWARE\n123 Main St",
                    "pages": [{
                        "width": 400,
                        "height": 800,
                        "confidence": 0.97,
                        "blocks": [{
                            "boundingBox": {"vertices": [{"x": 10, "y": 10}, {"x": 200, "y": 10}, {"x": 200, "y": 60}, {"x": 10, "y": 60}]},
                            "blockType": "TEXT",
                            "confidence": 0.95,
                            "paragraphs": [
                                {
                                    "confidence": 0.94,
                                    "words": [
                                        {
                                            "boundingBox": {"vertices": [{"x": 10, "y": 10}, {"x": 80, "y": 10}, {"x": 80, "y": 30}, {"x": 10, "y": 30}]},
                                            "confidence": 0.99,
                                            "symbols": [{"text": "A"}, {"text": "C"}, {"text": "M"}, {"text": "E"}]
                                        },
                                        {
                                            "boundingBox": {"vertices": [{"x": 90, "y": 10}, {"x": 200, "y": 10}, {"x": 200, "y": 30}, {"x": 90, "y": 30}]},
                                            "symbols": [{"text": "HARDWARE"}]
                                        }
                                    ]
                                },
                                {
                                    "words": [
                                        {"symbols": [{"text": "123"}]},
                                        {"symbols": [{"text": ""}]},
                                        {"symbols": [{"text": "Main"}]}
                                    ]
                                }
                            ]
                        }]
                    }]
                }
            }]
        })
    }

    #[test]
    fn test_text_reconstruction() {
        let doc = Document::from_json_value(sample_payload()).unwrap();
        let block = &doc.pages[0].blocks[0];
        assert_eq!(block.paragraphs[0].text, "ACME HARDWARE");
        assert_eq!(block.paragraphs[1].text, "123 Main");
        assert_eq!(block.text, "ACME HARDWARE\n123 Main");
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc = Document::from_json_value(sample_payload()).unwrap();
        let words: Vec<&Word> = doc.words().collect();
        // the empty-symbol word is dropped
        assert_eq!(words.len(), 4);
        assert_eq!(words[1].confidence, 0.0);
        assert!(words[2].bounding_box.is_degenerate());
        assert_eq!(doc.pages[0].blocks[0].paragraphs[1].confidence, 0.0);
    }

    #[test]
    fn test_missing_annotation_is_an_error() {
        let err = Document::from_json_value(json!({"responses": [{}]})).unwrap_err();
        assert!(matches!(err, DocumentError::MissingAnnotation));

        let err = Document::from_json_value(json!({})).unwrap_err();
        assert!(matches!(err, DocumentError::MissingAnnotation));
    }

    #[test]
    fn test_empty_annotation_is_valid() {
        let doc = Document::from_json_value(json!({"responses": [{"fullTextAnnotation": {}}]})).unwrap();
        assert!(doc.pages.is_empty());
        assert_eq!(doc.words().count(), 0);
    }

    #[test]
    fn test_normalized_vertices_are_scaled() {
        let payload = json!({
            "responses": [{
                "fullTextAnnotation": {
                    "pages": [{
                        "width": 200,
                        "height": 100,
                        "blocks": [{"paragraphs": [{"words": [{
                            "boundingBox": {"normalizedVertices": [{"x": 0.1, "y": 0.2}, {"x": 0.5, "y": 0.2}, {"x": 0.5, "y": 0.4}, {"x": 0.1, "y": 0.4}]},
                            "confidence": 1.7,
                            "symbols": [{"text": "X"}]
                        }]}]}]
                    }]
                }
            }]
        });
        let doc = Document::from_json_value(payload).unwrap();
        let word = doc.words().next().unwrap();
        assert_eq!(word.bounding_box, BoundingPolygon::from_rect(20, 20, 80, 20));
        assert_eq!(word.confidence, 1.0);
    }
}
