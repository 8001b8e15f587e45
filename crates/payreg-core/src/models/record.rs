//! The structured invoice record produced by extraction and validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel used when a text field could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Result of extracting and validating one invoice.
///
/// `rejection_reason` is non-empty exactly when the invoice is not approved and
/// no `error` is set. A record with `error` carries default values everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Supplier name.
    pub supplier: String,

    /// Invoice number or reference.
    pub invoice_number: String,

    /// Total amount due.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Whether the amount passed the approval policy.
    pub is_approved: bool,

    /// Why the invoice was rejected (empty when approved).
    pub rejection_reason: String,

    /// Set when the extraction step itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a record says about the extraction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus<'a> {
    /// Extraction succeeded and the policy approved the invoice.
    Approved,
    /// Extraction succeeded and the policy rejected the invoice.
    Rejected(&'a str),
    /// Extraction or validation failed.
    Failed(&'a str),
}

impl InvoiceRecord {
    /// Create a record from extracted fields, not yet approved.
    ///
    /// Blank text fields are replaced by the `N/A` sentinel.
    pub fn extracted(
        supplier: impl Into<String>,
        invoice_number: impl Into<String>,
        total_amount: Decimal,
    ) -> Self {
        Self {
            supplier: or_sentinel(supplier.into()),
            invoice_number: or_sentinel(invoice_number.into()),
            total_amount,
            is_approved: false,
            rejection_reason: String::new(),
            error: None,
        }
    }

    /// Create a record describing a failed extraction.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            supplier: NOT_AVAILABLE.to_string(),
            invoice_number: NOT_AVAILABLE.to_string(),
            total_amount: Decimal::ZERO,
            is_approved: false,
            rejection_reason: String::new(),
            error: Some(error.into()),
        }
    }

    /// Mark the record approved, clearing any previous reason.
    pub fn approve(mut self) -> Self {
        self.is_approved = true;
        self.rejection_reason.clear();
        self
    }

    /// Mark the record rejected with a reason.
    pub fn reject(mut self, reason: impl Into<String>) -> Self {
        self.is_approved = false;
        self.rejection_reason = reason.into();
        self
    }

    /// Classify the record.
    pub fn status(&self) -> RecordStatus<'_> {
        match (&self.error, self.is_approved) {
            (Some(error), _) => RecordStatus::Failed(error),
            (None, true) => RecordStatus::Approved,
            (None, false) => RecordStatus::Rejected(&self.rejection_reason),
        }
    }

    /// Check the reason/approval/error invariant.
    pub fn is_consistent(&self) -> bool {
        match &self.error {
            Some(_) => !self.is_approved && self.rejection_reason.is_empty(),
            None => self.is_approved == self.rejection_reason.is_empty(),
        }
    }
}

fn or_sentinel(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}
