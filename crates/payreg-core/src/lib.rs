//! Core library for invoice payment registration.
//!
//! This crate provides:
//! - Text extraction from invoice images (PaddleOCR models via `pure-onnx-ocr`)
//! - Invoice extraction and validation through a hosted language model
//! - A local amount ceiling policy
//! - Payment form submission over WebDriver
//! - The pipeline orchestrating the three steps

pub mod amounts;
pub mod analysis;
pub mod error;
pub mod form;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use analysis::{ApprovalPolicy, GeminiAnalyzer, InvoiceAnalyzer, PolicyDecision};
pub use error::{AnalysisError, OcrError, PayregError, Result, SubmissionError};
pub use form::{FormSubmitter, SubmissionPayload, SubmissionReport, WebDriverSubmitter};
pub use models::config::PayregConfig;
pub use models::record::{InvoiceRecord, RecordStatus};
pub use ocr::{OcrBackend, OcrTextExtractor, TextExtractor, TextFragment};
pub use pipeline::{AbortReason, Pipeline, PipelineOutcome, PipelineReport, PipelineStage};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;

/// Build the production pipeline from configuration.
pub fn pipeline_from_config(
    config: &PayregConfig,
) -> Result<Pipeline<OcrTextExtractor, GeminiAnalyzer, WebDriverSubmitter>> {
    let policy = ApprovalPolicy::from_config(&config.policy);
    let extractor = OcrTextExtractor::from_config(&config.ocr);
    let analyzer = GeminiAnalyzer::new(config.llm.clone(), policy.clone())?;
    let submitter =
        WebDriverSubmitter::new(config.form.clone(), config.policy.currency_symbol.clone());

    Ok(Pipeline::new(extractor, analyzer, submitter)
        .with_policy(policy)
        .with_inputs(config.pipeline.clone()))
}
