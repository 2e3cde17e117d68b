use serde::Serialize;

/// An extracted value paired with how much it can be trusted.
///
/// A confidence of zero means nothing was found and `value` is a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<T> {
    pub value: T,
    pub confidence: f32,
}

impl<T> Field<T> {
    pub fn new(value: T, confidence: f32) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn missing(value: T) -> Self {
        Self {
            value,
            confidence: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.confidence > 0.0
    }
}
