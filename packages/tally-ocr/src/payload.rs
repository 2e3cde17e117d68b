//! Raw text-detection payload as returned by the OCR provider.
//!
//! Every field below `fullTextAnnotation` is optional; the normalizer in
//! [`crate::document`] supplies the defaults.
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayload {
    pub responses: Vec<RawResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawResponse {
    pub full_text_annotation: Option<RawAnnotation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAnnotation {
    pub text: Option<String>,
    pub pages: Vec<RawPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPage {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub confidence: Option<f32>,
    pub blocks: Vec<RawBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBlock {
    pub bounding_box: Option<RawBoundingPoly>,
    pub block_type: Option<String>,
    pub confidence: Option<f32>,
    pub paragraphs: Vec<RawParagraph>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParagraph {
    pub bounding_box: Option<RawBoundingPoly>,
    pub confidence: Option<f32>,
    pub words: Vec<RawWord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWord {
    pub bounding_box: Option<RawBoundingPoly>,
    pub confidence: Option<f32>,
    pub symbols: Vec<RawSymbol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSymbol {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBoundingPoly {
    pub vertices: Vec<RawVertex>,
    pub normalized_vertices: Vec<RawNormalizedVertex>,
}

/// The provider omits zero-valued coordinates, hence the defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RawVertex {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RawNormalizedVertex {
    pub x: f32,
    pub y: f32,
}
