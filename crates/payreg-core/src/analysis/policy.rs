//! Local approval policy: an invoice is approved when its total does not exceed
//! the configured ceiling.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::amounts::format_currency;
use crate::models::config::PolicyConfig;
use crate::models::record::InvoiceRecord;

/// Outcome of evaluating the policy on one amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Approved,
    Rejected { reason: String },
}

/// Amount ceiling policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalPolicy {
    ceiling: Decimal,
    currency_symbol: String,
}

impl ApprovalPolicy {
    pub fn new(ceiling: Decimal, currency_symbol: impl Into<String>) -> Self {
        Self {
            ceiling,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.ceiling, config.currency_symbol.clone())
    }

    pub fn ceiling(&self) -> Decimal {
        self.ceiling
    }

    /// Ceiling rendered for people ("R$ 5000,00").
    pub fn ceiling_display(&self) -> String {
        format_currency(&self.currency_symbol, self.ceiling)
    }

    /// Reason attached to rejected invoices.
    pub fn rejection_reason(&self) -> String {
        format!("Valor acima do limite de {}", self.ceiling_display())
    }

    pub fn evaluate(&self, amount: Decimal) -> PolicyDecision {
        if amount <= self.ceiling {
            PolicyDecision::Approved
        } else {
            PolicyDecision::Rejected {
                reason: self.rejection_reason(),
            }
        }
    }

    /// Re-decide a record locally. Failed records pass through untouched, and the
    /// decision already on the record is only compared against, never trusted.
    pub fn apply(&self, record: InvoiceRecord) -> InvoiceRecord {
        if record.error.is_some() {
            return record;
        }

        let claimed = record.is_approved;
        let decided = match self.evaluate(record.total_amount) {
            PolicyDecision::Approved => record.approve(),
            PolicyDecision::Rejected { reason } => record.reject(reason),
        };

        if claimed != decided.is_approved {
            warn!(
                "Model claimed approved={} for amount {}, policy decided approved={}",
                claimed, decided.total_amount, decided.is_approved
            );
        } else {
            debug!("Policy agrees with model: approved={}", decided.is_approved);
        }

        decided
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}
