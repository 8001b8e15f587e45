//! Text extraction adapter with a mock fallback when OCR is unavailable.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::config::OcrConfig;

use super::{OcrBackend, TextExtractor, join_fragments};

/// Returned when no OCR engine could be initialized.
pub const ENGINE_UNAVAILABLE_TEXT: &str = "\
FORNECEDOR: Soluções em Automação Inteligente S.A.
INVOICE NO. ABC-123-DE
DATA: 01/11/2025
DETALHES: Serviços de Consultoria em TI
VALOR TOTAL: R$ 4.500,00";

/// Returned when the image file does not exist.
pub const IMAGE_MISSING_TEXT: &str = "\
FORNECEDOR: Logística Rápida Ltda.
INVOICE NO. 9999
DATA: 01/12/2025
DETALHES: Serviços de Frete
VALOR TOTAL: R$ 5.000,01";

/// Text extraction adapter around an optional OCR engine.
pub struct OcrTextExtractor {
    engine: Option<Box<dyn OcrBackend>>,
    min_confidence: f32,
    fallback_enabled: bool,
}

impl OcrTextExtractor {
    /// Wrap an already constructed engine.
    pub fn new(engine: Box<dyn OcrBackend>) -> Self {
        Self {
            engine: Some(engine),
            min_confidence: 0.0,
            fallback_enabled: true,
        }
    }

    /// An extractor without engine; every call takes the fallback path.
    pub fn without_engine() -> Self {
        Self {
            engine: None,
            min_confidence: 0.0,
            fallback_enabled: true,
        }
    }

    /// Load the native engine from the configured model directory.
    ///
    /// A loading failure is logged and leaves the extractor without engine.
    #[cfg(feature = "native")]
    pub fn from_config(config: &OcrConfig) -> Self {
        let engine: Option<Box<dyn OcrBackend>> = match super::PureOcrEngine::from_config(config) {
            Ok(engine) => {
                info!("OCR engine loaded from {}", config.model_dir.display());
                Some(Box::new(engine))
            }
            Err(e) => {
                warn!("OCR engine unavailable: {}", e);
                None
            }
        };

        Self {
            engine,
            ..Self::without_engine()
        }
        .with_config(config)
    }

    #[cfg(not(feature = "native"))]
    pub fn from_config(config: &OcrConfig) -> Self {
        warn!("Built without the native OCR engine");
        Self::without_engine().with_config(config)
    }

    /// Apply confidence and fallback settings.
    pub fn with_config(mut self, config: &OcrConfig) -> Self {
        self.min_confidence = config.min_confidence;
        self.fallback_enabled = config.fallback_enabled;
        self
    }

    /// Whether an engine is loaded.
    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    fn fallback(&self, text: &'static str) -> String {
        if self.fallback_enabled {
            text.to_string()
        } else {
            String::new()
        }
    }
}

impl TextExtractor for OcrTextExtractor {
    fn extract_text(&self, image: &Path) -> String {
        info!("Extracting text from {}", image.display());

        let Some(engine) = &self.engine else {
            warn!("OCR engine not initialized, returning mock invoice text");
            return self.fallback(ENGINE_UNAVAILABLE_TEXT);
        };

        if !image.exists() {
            warn!(
                "Image not found at {}, returning mock invoice text",
                image.display()
            );
            return self.fallback(IMAGE_MISSING_TEXT);
        }

        let start = Instant::now();
        match engine.recognize(image) {
            Ok(fragments) => {
                let total = fragments.len();
                let kept: Vec<_> = fragments
                    .into_iter()
                    .filter(|f| f.confidence >= self.min_confidence)
                    .collect();
                debug!(
                    "{} kept {} of {} fragments in {}ms",
                    engine.name(),
                    kept.len(),
                    total,
                    start.elapsed().as_millis()
                );
                join_fragments(&kept)
            }
            Err(e) => {
                warn!("OCR failed for {}: {}", image.display(), e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::ocr::TextFragment;
    use pretty_assertions::assert_eq;

    struct FixedEngine(Vec<TextFragment>);

    impl OcrBackend for FixedEngine {
        fn recognize(&self, _image: &Path) -> Result<Vec<TextFragment>, OcrError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct BrokenEngine;

    impl OcrBackend for BrokenEngine {
        fn recognize(&self, _image: &Path) -> Result<Vec<TextFragment>, OcrError> {
            Err(OcrError::Recognition("model crashed".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn existing_image() -> tempfile::NamedTempFile {
        tempfile::Builder::new().suffix(".jpg").tempfile().unwrap()
    }

    #[test]
    fn test_joins_fragments_in_detection_order() {
        let image = existing_image();
        let extractor = OcrTextExtractor::new(Box::new(FixedEngine(vec![
            TextFragment::new("INVOICE", 0.9),
            TextFragment::new("Fornecedor: ACME", 0.8),
            TextFragment::new("Total: R$ 10,00", 0.7),
        ])));

        assert_eq!(
            extractor.extract_text(image.path()),
            "INVOICE\nFornecedor: ACME\nTotal: R$ 10,00"
        );
    }

    #[test]
    fn test_drops_low_confidence_fragments() {
        let image = existing_image();
        let config = OcrConfig {
            min_confidence: 0.5,
            ..OcrConfig::default()
        };
        let extractor = OcrTextExtractor::new(Box::new(FixedEngine(vec![
            TextFragment::new("keep", 0.9),
            TextFragment::new("noise", 0.1),
        ])))
        .with_config(&config);

        assert_eq!(extractor.extract_text(image.path()), "keep");
    }

    #[test]
    fn test_engine_unavailable_returns_mock_text() {
        let extractor = OcrTextExtractor::without_engine();
        assert_eq!(
            extractor.extract_text(Path::new("does-not-matter.jpg")),
            ENGINE_UNAVAILABLE_TEXT
        );
    }

    #[test]
    fn test_missing_image_returns_mock_text() {
        let extractor = OcrTextExtractor::new(Box::new(FixedEngine(vec![])));
        assert_eq!(
            extractor.extract_text(Path::new("/nonexistent/invoice.jpg")),
            IMAGE_MISSING_TEXT
        );
    }

    #[test]
    fn test_disabled_fallback_returns_empty() {
        let config = OcrConfig {
            fallback_enabled: false,
            ..OcrConfig::default()
        };
        let extractor = OcrTextExtractor::without_engine().with_config(&config);
        assert_eq!(extractor.extract_text(Path::new("x.jpg")), "");
    }

    #[test]
    fn test_engine_error_returns_empty() {
        let image = existing_image();
        let extractor = OcrTextExtractor::new(Box::new(BrokenEngine));
        assert_eq!(extractor.extract_text(image.path()), "");
    }

    #[test]
    fn test_missing_models_fall_back() {
        let config = OcrConfig {
            model_dir: "/nonexistent/models".into(),
            ..OcrConfig::default()
        };
        let extractor = OcrTextExtractor::from_config(&config);
        assert!(!extractor.has_engine());
        assert_eq!(
            extractor.extract_text(Path::new("invoice.jpg")),
            ENGINE_UNAVAILABLE_TEXT
        );
    }
}
