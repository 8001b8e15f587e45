//! Payment form submission through browser automation.

mod webdriver;

pub use webdriver::WebDriverSubmitter;

use std::path::Path;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amounts::format_currency;
use crate::error::SubmissionError;
use crate::models::record::InvoiceRecord;

/// Element ids of the payment form.
pub mod fields {
    pub const SUPPLIER: &str = "supplierName";
    pub const INVOICE_NUMBER: &str = "invoiceNumber";
    pub const TOTAL_VALUE: &str = "totalValue";
    pub const SUBMIT: &str = "submitButton";
}

/// Minimal data typed into the payment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub supplier: String,
    pub invoice_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl SubmissionPayload {
    pub fn new(
        supplier: impl Into<String>,
        invoice_number: impl Into<String>,
        total_amount: Decimal,
    ) -> Self {
        Self {
            supplier: supplier.into(),
            invoice_number: invoice_number.into(),
            total_amount,
        }
    }

    /// Value typed into the total field ("R$ 1250,75").
    pub fn total_value_text(&self, currency_symbol: &str) -> String {
        format_currency(currency_symbol, self.total_amount)
    }
}

impl From<&InvoiceRecord> for SubmissionPayload {
    fn from(record: &InvoiceRecord) -> Self {
        Self::new(
            record.supplier.clone(),
            record.invoice_number.clone(),
            record.total_amount,
        )
    }
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    /// URL the browser was pointed at.
    pub form_url: String,
    /// Exact text typed into the total field.
    pub total_value: String,
}

/// Fills and submits the payment form.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    /// Submit `payload` into the form document at `form`.
    ///
    /// Returns [`SubmissionError::FormNotFound`] without touching the browser
    /// when the document does not exist.
    async fn submit_form(
        &self,
        payload: &SubmissionPayload,
        form: &Path,
    ) -> Result<SubmissionReport, SubmissionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_payload_from_record() {
        let record = InvoiceRecord::extracted(
            "Teste RPA Simples",
            "TEST0001",
            Decimal::from_str("1250.50").unwrap(),
        )
        .approve();

        let payload = SubmissionPayload::from(&record);
        assert_eq!(payload.supplier, "Teste RPA Simples");
        assert_eq!(payload.invoice_number, "TEST0001");
        assert_eq!(payload.total_value_text("R$"), "R$ 1250,50");
    }
}
