//! Analyze command - extract and validate invoice fields from raw text.

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use payreg_core::amounts::format_currency;
use payreg_core::{ApprovalPolicy, GeminiAnalyzer, InvoiceAnalyzer, InvoiceRecord, RecordStatus};

use super::load_config;

const SAMPLE_APPROVED: &str = "\
Detalhes da Transação
Empresa: Soluções Digitais Ltda.
Referência da Fatura: INV-2025-4590
Data: 12/11/2025
Total Devido: R$ 1250.75";

const SAMPLE_REJECTED: &str = "\
Nota Fiscal
Fornecedor: Tech Solutions Corp.
NF: 2025-9876
Valor Total: R$ 7.500,00";

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// File with raw invoice text
    #[arg(long, conflicts_with_all = ["text", "sample"])]
    file: Option<PathBuf>,

    /// Raw invoice text given inline
    #[arg(short, long, conflicts_with = "sample")]
    text: Option<String>,

    /// Built-in sample text (used when no input is given)
    #[arg(short, long, value_enum)]
    sample: Option<Sample>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Sample {
    /// Invoice below the ceiling
    Approved,
    /// Invoice above the ceiling
    Rejected,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let raw_text = match (&args.file, args.text, args.sample) {
        (Some(path), _, _) => fs::read_to_string(path)?,
        (None, Some(text), _) => text,
        (None, None, Some(Sample::Rejected)) => SAMPLE_REJECTED.to_string(),
        (None, None, _) => SAMPLE_APPROVED.to_string(),
    };

    let policy = ApprovalPolicy::from_config(&config.policy);
    let analyzer = GeminiAnalyzer::new(config.llm.clone(), policy)?;
    let record = analyzer.analyze_invoice(&raw_text).await;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_text(&record, &config.policy.currency_symbol),
    };
    println!("{}", output);

    Ok(())
}

fn format_text(record: &InvoiceRecord, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier:       {}\n", record.supplier));
    output.push_str(&format!("Invoice number: {}\n", record.invoice_number));
    output.push_str(&format!(
        "Total:          {}\n",
        format_currency(currency_symbol, record.total_amount)
    ));

    let status = match record.status() {
        RecordStatus::Approved => "APPROVED".to_string(),
        RecordStatus::Rejected(reason) => format!("REJECTED ({})", reason),
        RecordStatus::Failed(error) => format!("ERROR ({})", error),
    };
    output.push_str(&format!("Status:         {}", status));

    output
}
