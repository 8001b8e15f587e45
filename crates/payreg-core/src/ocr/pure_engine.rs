//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;

use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrBackend, TextFragment};

/// OCR engine backed by `pure-onnx-ocr` (PaddleOCR models, no external runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the config.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }
}

impl OcrBackend for PureOcrEngine {
    fn recognize(&self, image: &Path) -> Result<Vec<TextFragment>, OcrError> {
        let decoded = image::open(image).map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let results = self
            .engine
            .run_from_image(&decoded)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        Ok(results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextFragment::new(text.trim(), r.confidence)
            })
            .filter(|f| !f.text.is_empty())
            .collect())
    }

    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }
}
