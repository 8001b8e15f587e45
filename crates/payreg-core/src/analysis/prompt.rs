//! Fixed instruction, output schema and reply parsing for invoice extraction.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;

use crate::amounts::parse_amount;
use crate::error::AnalysisError;
use crate::models::record::InvoiceRecord;

use super::policy::ApprovalPolicy;

/// Output fields in the order the model must produce them.
pub const FIELD_ORDER: [&str; 5] = [
    "supplier",
    "invoiceNumber",
    "totalAmount",
    "isApproved",
    "rejectionReason",
];

/// System instruction with the policy ceiling embedded.
pub fn system_instruction(policy: &ApprovalPolicy) -> String {
    let limit = policy.ceiling_display();
    format!(
        "You extract and validate invoice data. Your task is:\n\
         1. Analyze the raw invoice text you are given\n\
         2. Extract: supplier, invoiceNumber and totalAmount\n\
         3. Validate whether totalAmount is less than or equal to {limit}\n\
         4. Return isApproved=true when approved (amount <= {ceiling}), false when rejected (amount > {ceiling})\n\
         5. When rejected, set rejectionReason to \"{reason}\"\n\
         6. When approved, leave rejectionReason as an empty string\n\n\
         Return only the structured JSON, with no additional text.",
        limit = limit,
        ceiling = policy.ceiling(),
        reason = policy.rejection_reason(),
    )
}

/// User turn wrapping the raw text.
pub fn user_prompt(raw_text: &str) -> String {
    format!("Extract and validate the data of this invoice:\n\n{}", raw_text)
}

/// Response schema in the OpenAPI subset accepted by `responseSchema`.
pub fn response_schema(policy: &ApprovalPolicy) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "supplier": {
                "type": "STRING",
                "description": "Full name of the supplier."
            },
            "invoiceNumber": {
                "type": "STRING",
                "description": "Invoice number or reference."
            },
            "totalAmount": {
                "type": "NUMBER",
                "description": "Invoice total as a number."
            },
            "isApproved": {
                "type": "BOOLEAN",
                "description": format!(
                    "True when the invoice is within policy (amount <= {}), false otherwise.",
                    policy.ceiling()
                )
            },
            "rejectionReason": {
                "type": "STRING",
                "description": "Rejection reason when isApproved is false, empty string when approved."
            }
        },
        "required": FIELD_ORDER,
        "propertyOrdering": FIELD_ORDER,
    })
}

/// Structured reply as produced by the model. Every field is optional so that a
/// partial answer degrades to sentinels instead of failing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    supplier: Option<String>,
    invoice_number: Option<Value>,
    total_amount: Option<Value>,
    #[serde(default)]
    is_approved: bool,
    #[serde(default)]
    rejection_reason: String,
}

/// Parse the JSON body produced by the model into a record carrying the
/// model's own approval claim.
pub fn parse_reply(text: &str) -> Result<InvoiceRecord, AnalysisError> {
    let body = strip_code_fence(text);
    let reply: ModelReply =
        serde_json::from_str(body).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let total = match reply.total_amount {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(value) => amount_from_value(&value)
            .ok_or_else(|| AnalysisError::Parse(format!("invalid totalAmount: {}", value)))?,
    };

    let invoice_number = match reply.invoice_number {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let record = InvoiceRecord::extracted(reply.supplier.unwrap_or_default(), invoice_number, total);
    Ok(if reply.is_approved {
        record.approve()
    } else {
        record.reject(reply.rejection_reason)
    })
}

fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                // Go through the shortest decimal rendering so 1250.75 stays exact
                n.as_f64().and_then(|f| {
                    Decimal::from_str(&f.to_string())
                        .ok()
                        .or_else(|| Decimal::from_f64(f))
                })
            }
        }
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::RecordStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_lists_fields_in_order() {
        let schema = response_schema(&ApprovalPolicy::default());
        let ordering: Vec<&str> = schema["propertyOrdering"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(ordering, FIELD_ORDER);
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(schema["properties"]["totalAmount"]["type"], "NUMBER");
    }

    #[test]
    fn test_instruction_embeds_ceiling() {
        let instruction = system_instruction(&ApprovalPolicy::default());
        assert!(instruction.contains("R$ 5000,00"));
        assert!(instruction.contains("Valor acima do limite de R$ 5000,00"));
    }

    #[test]
    fn test_parse_approved_reply() {
        let record = parse_reply(
            r#"{"supplier": "Soluções Digitais Ltda.", "invoiceNumber": "INV-2025-4590",
                "totalAmount": 1250.75, "isApproved": true, "rejectionReason": ""}"#,
        )
        .unwrap();

        assert_eq!(record.supplier, "Soluções Digitais Ltda.");
        assert_eq!(record.invoice_number, "INV-2025-4590");
        assert_eq!(record.total_amount, Decimal::from_str("1250.75").unwrap());
        assert_eq!(record.status(), RecordStatus::Approved);
    }

    #[test]
    fn test_parse_rejected_reply_with_string_amount() {
        let record = parse_reply(
            r#"```json
            {"supplier": "Tech Solutions Corp.", "invoiceNumber": 20259876,
             "totalAmount": "R$ 7.500,00", "isApproved": false,
             "rejectionReason": "Valor acima do limite de R$ 5000,00"}
            ```"#,
        )
        .unwrap();

        assert_eq!(record.invoice_number, "20259876");
        assert_eq!(record.total_amount, Decimal::from_str("7500").unwrap());
        assert_eq!(
            record.status(),
            RecordStatus::Rejected("Valor acima do limite de R$ 5000,00")
        );
    }

    #[test]
    fn test_thousands_only_amount_keeps_rejection() {
        let reply = parse_reply(
            r#"{"supplier": "Tech Solutions Corp.", "invoiceNumber": "2025-9876",
                "totalAmount": "R$ 7.500", "isApproved": false,
                "rejectionReason": "Valor acima do limite de R$ 5000,00"}"#,
        )
        .unwrap();
        assert_eq!(reply.total_amount, Decimal::from(7500));

        let record = ApprovalPolicy::default().apply(reply);
        assert!(!record.is_approved);
        assert_eq!(
            record.status(),
            RecordStatus::Rejected("Valor acima do limite de R$ 5000,00")
        );
    }

    #[test]
    fn test_numeric_amount_keeps_three_decimals() {
        let record = parse_reply(r#"{"totalAmount": 1250.125, "isApproved": true}"#).unwrap();
        assert_eq!(record.total_amount, Decimal::from_str("1250.125").unwrap());
    }

    #[test]
    fn test_parse_partial_reply_uses_sentinels() {
        let record = parse_reply(r#"{"isApproved": true}"#).unwrap();
        assert_eq!(record.supplier, "N/A");
        assert_eq!(record.invoice_number, "N/A");
        assert_eq!(record.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_parse_invalid_reply() {
        assert!(matches!(
            parse_reply("The invoice total is R$ 100"),
            Err(AnalysisError::Parse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"totalAmount": "unknown"}"#),
            Err(AnalysisError::Parse(_))
        ));
    }
}
