pub mod document;
pub mod engine;
pub mod payload;
pub mod region;

pub use document::{normalize, Block, Document, Page, Paragraph, Word};
pub use engine::{DocumentError, DocumentSource, OcrInput, VisionJsonSource};
pub use region::{BoundingPolygon, Vertex};
