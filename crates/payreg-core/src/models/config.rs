//! Configuration structures for the payment registration pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PayregError, Result};

/// Environment variable consulted when `llm.api_key` is not set.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration for the payreg pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayregConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Language model configuration.
    pub llm: LlmConfig,

    /// Approval policy.
    pub policy: PolicyConfig,

    /// Browser form submission configuration.
    pub form: FormConfig,

    /// Fixed pipeline inputs.
    pub pipeline: PipelineConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Fragments below this confidence are dropped (0.0 keeps everything).
    pub min_confidence: f32,

    /// Keep `[UNK]` tokens instead of replacing them with spaces.
    pub keep_unk: bool,

    /// Return a mock invoice body when the engine or the image is unavailable.
    pub fallback_enabled: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            min_confidence: 0.0,
            keep_unk: false,
            fallback_enabled: true,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}

/// Language model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier.
    pub model: String,

    /// Base URL of the generative language API.
    pub base_url: String,

    /// API key. Falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature. Zero keeps extraction deterministic.
    pub temperature: f32,

    /// Request timeout in seconds (client default when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the config or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(usable))
    }
}

/// Approval policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Highest total amount that is approved (inclusive).
    #[serde(with = "rust_decimal::serde::float")]
    pub ceiling: Decimal,

    /// Currency prefix used in messages and form values.
    pub currency_symbol: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            ceiling: Decimal::new(5000, 0),
            currency_symbol: "R$".to_string(),
        }
    }
}

/// Browser automation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// WebDriver endpoint (chromedriver, geckodriver, ...).
    pub webdriver_url: String,

    /// Run the browser without a window.
    pub headless: bool,

    /// Wait after navigating to the form, in milliseconds.
    pub page_load_wait_ms: u64,

    /// Wait between filling the fields and clicking submit, in milliseconds.
    pub field_wait_ms: u64,

    /// Wait after clicking submit before closing the session, in milliseconds.
    pub after_submit_wait_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            page_load_wait_ms: 2000,
            field_wait_ms: 1000,
            after_submit_wait_ms: 3000,
        }
    }
}

/// Fixed on-disk inputs of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Invoice image handed to OCR.
    pub invoice_image: PathBuf,

    /// HTML form driven by the browser.
    pub form_html: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            invoice_image: PathBuf::from("invoice_sample.jpg"),
            form_html: PathBuf::from("payment_form.html"),
        }
    }
}

impl PayregConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PayregError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| PayregError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: PayregConfig =
            serde_json::from_str(r#"{ "policy": { "ceiling": 10000.0 } }"#).unwrap();

        assert_eq!(config.policy.ceiling, Decimal::new(10000, 0));
        assert_eq!(config.policy.currency_symbol, "R$");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.pipeline.form_html, PathBuf::from("payment_form.html"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PayregConfig::default();
        config.form.headless = true;
        config.save(&path).unwrap();

        let loaded = PayregConfig::from_file(&path).unwrap();
        assert!(loaded.form.headless);
        assert_eq!(loaded.policy.ceiling, config.policy.ceiling);
        assert!(loaded.llm.api_key.is_none());
    }

    #[test]
    fn test_load_errors_are_classified() {
        let dir = tempfile::tempdir().unwrap();

        let missing = PayregConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(PayregError::Io(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"policy\": ").unwrap();
        match PayregConfig::from_file(&path) {
            Err(PayregError::Config(message)) => assert!(message.contains("broken.json")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        // Falls through to the environment, which may or may not be set.
        assert_ne!(config.resolve_api_key().as_deref(), Some("   "));
    }
}
