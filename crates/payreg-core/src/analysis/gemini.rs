//! Gemini `generateContent` client for invoice extraction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::models::config::{API_KEY_ENV, LlmConfig};
use crate::models::record::{InvoiceRecord, RecordStatus};

use super::policy::ApprovalPolicy;
use super::prompt::{parse_reply, response_schema, system_instruction, user_prompt};
use super::InvoiceAnalyzer;

/// Language model analyzer backed by the Gemini REST API.
pub struct GeminiAnalyzer {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
    policy: ApprovalPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiAnalyzer {
    /// Create a new analyzer.
    ///
    /// A missing API key is not an error here: it surfaces on the first call as
    /// a failed record, so the pipeline reports it like any other service failure.
    pub fn new(config: LlmConfig, policy: ApprovalPolicy) -> Result<Self, AnalysisError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::Request(format!("failed to create HTTP client: {}", e)))?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!("No API key configured for {}", config.model);
        }

        Ok(Self {
            client,
            config,
            api_key,
            policy,
        })
    }

    fn build_request(&self, raw_text: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction(&self.policy),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_prompt(raw_text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json",
                response_schema: response_schema(&self.policy),
            },
        }
    }

    async fn request(&self, raw_text: &str) -> Result<InvoiceRecord, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AnalysisError::MissingApiKey(API_KEY_ENV))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(raw_text))
            .send()
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Request(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let reply_text = extract_reply_text(&body)?;
        parse_reply(&reply_text)
    }
}

/// Pull the generated text out of a `generateContent` response body.
fn extract_reply_text(body: &str) -> Result<String, AnalysisError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(AnalysisError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl InvoiceAnalyzer for GeminiAnalyzer {
    async fn analyze_invoice(&self, raw_text: &str) -> InvoiceRecord {
        info!("Analyzing invoice with {}", self.config.model);

        let record = match self.request(raw_text).await {
            Ok(record) => self.policy.apply(record),
            Err(e) => {
                warn!("Invoice analysis failed: {}", e);
                return InvoiceRecord::failed(e.to_string());
            }
        };

        info!(
            "Extracted supplier={:?} invoice={:?} total={}",
            record.supplier, record.invoice_number, record.total_amount
        );
        match record.status() {
            RecordStatus::Approved => info!("Invoice approved"),
            RecordStatus::Rejected(reason) => info!("Invoice rejected: {}", reason),
            RecordStatus::Failed(_) => {}
        }

        record
    }
}
