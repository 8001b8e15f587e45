//! OCR command - extract raw text from an invoice image.

use std::path::PathBuf;

use clap::Args;
use console::style;

use payreg_core::{OcrTextExtractor, TextExtractor};

use super::load_config;

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Invoice image (defaults to the configured pipeline image)
    image: Option<PathBuf>,
}

pub fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let image = args.image.unwrap_or(config.pipeline.invoice_image);

    let extractor = OcrTextExtractor::from_config(&config.ocr);
    if !extractor.has_engine() {
        eprintln!(
            "{} OCR models not found in {}; using mock invoice text.",
            style("ℹ").blue(),
            config.ocr.model_dir.display()
        );
    }

    let text = extractor.extract_text(&image);
    if text.is_empty() {
        eprintln!("{} OCR failed completely.", style("✗").red());
        return Ok(());
    }

    println!("{}", text);
    eprintln!(
        "{} Extracted {} characters.",
        style("✓").green(),
        text.chars().count()
    );

    Ok(())
}
