//! Submit command - drive the payment form with the given data.

use std::path::PathBuf;

use clap::Args;
use console::style;

use payreg_core::amounts::parse_amount;
use payreg_core::{FormSubmitter, SubmissionPayload, WebDriverSubmitter};

use super::load_config;

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Form document (defaults to the configured pipeline form)
    form: Option<PathBuf>,

    /// Supplier name
    #[arg(long, default_value = "Teste RPA Simples")]
    supplier: String,

    /// Invoice number
    #[arg(long, default_value = "TEST0001")]
    invoice_number: String,

    /// Total amount ("1250.50" or "1.250,50")
    #[arg(long, default_value = "1250.50")]
    total: String,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,
}

pub async fn run(args: SubmitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.headless {
        config.form.headless = true;
    }

    let total = parse_amount(&args.total)
        .ok_or_else(|| anyhow::anyhow!("Invalid total amount: {}", args.total))?;
    let payload = SubmissionPayload::new(args.supplier, args.invoice_number, total);
    let form = args.form.unwrap_or(config.pipeline.form_html);

    let submitter = WebDriverSubmitter::new(config.form, config.policy.currency_symbol);
    let report = submitter.submit_form(&payload, &form).await?;

    println!(
        "{} Submitted {} to {}",
        style("✓").green(),
        report.total_value,
        report.form_url
    );

    Ok(())
}
