//! Invoice extraction and validation through a hosted language model.

mod gemini;
pub mod policy;
pub mod prompt;

pub use gemini::GeminiAnalyzer;
pub use policy::{ApprovalPolicy, PolicyDecision};

use async_trait::async_trait;

use crate::models::record::InvoiceRecord;

/// Turns raw invoice text into a validated record.
///
/// Implementations never fail: problems are reported through
/// [`InvoiceRecord::error`].
#[async_trait]
pub trait InvoiceAnalyzer: Send + Sync {
    /// Extract and validate the invoice described by `raw_text`.
    async fn analyze_invoice(&self, raw_text: &str) -> InvoiceRecord;
}
