//! Text extraction from invoice images.

mod extractor;
#[cfg(feature = "native")]
mod pure_engine;

pub use extractor::{ENGINE_UNAVAILABLE_TEXT, IMAGE_MISSING_TEXT, OcrTextExtractor};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A recognized piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// An OCR engine: image file in, fragments out in detection order.
pub trait OcrBackend {
    /// Recognize all text fragments in the image at `image`.
    fn recognize(&self, image: &Path) -> Result<Vec<TextFragment>, OcrError>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}

/// Converts an image location into raw text.
///
/// An empty string means extraction failed; fallbacks are returned as text.
pub trait TextExtractor {
    fn extract_text(&self, image: &Path) -> String;
}

/// Join fragments with line breaks, keeping detection order.
pub fn join_fragments(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
