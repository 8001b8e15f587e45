//! Run command - the full extract → validate → submit pipeline.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use payreg_core::amounts::format_currency;
use payreg_core::{InvoiceRecord, PipelineOutcome, PipelineReport};

use super::load_config;

/// Run the pipeline once. An aborted or rejected run still exits successfully.
pub async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "=".repeat(60));
    println!("{}", style("  INVOICE PAYMENT REGISTRATION PIPELINE").bold());
    println!("  OCR + LLM + browser automation");
    println!("{}", "=".repeat(60));

    let pipeline = payreg_core::pipeline_from_config(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!(
        "Processing {}...",
        pipeline.image_path().display()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = pipeline.run().await;

    pb.finish_and_clear();
    print_report(&report, &config.policy.currency_symbol);

    Ok(())
}

fn print_report(report: &PipelineReport, currency_symbol: &str) {
    let trail = report
        .stages
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" → ");
    println!("Stages: {}", style(trail).dim());

    if let Some(record) = report.outcome.record() {
        print_record(record, currency_symbol);
    }

    println!();
    match &report.outcome {
        PipelineOutcome::Completed { report, .. } => {
            println!("{} Invoice approved and registered", style("✓").green());
            println!("  Form: {}", report.form_url);
            println!("  Total typed: {}", report.total_value);
        }
        PipelineOutcome::Rejected { reason, .. } => {
            println!("{}", "#".repeat(60));
            println!("{} Invoice rejected", style("✗").red());
            println!("  Reason: {}", reason);
            println!("  The form will not be filled.");
            println!("{}", "#".repeat(60));
        }
        PipelineOutcome::Aborted { stage, reason, .. } => {
            println!(
                "{} Flow interrupted while {}: {}",
                style("!").yellow(),
                stage,
                reason
            );
        }
    }
}

fn print_record(record: &InvoiceRecord, currency_symbol: &str) {
    println!();
    println!("  Supplier:       {}", record.supplier);
    println!("  Invoice number: {}", record.invoice_number);
    println!(
        "  Total:          {}",
        format_currency(currency_symbol, record.total_amount)
    );
}
