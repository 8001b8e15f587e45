//! CLI application for invoice payment registration.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, config, ocr, run, submit};

/// Invoice payment registration - OCR, LLM validation and form submission
#[derive(Parser)]
#[command(name = "payreg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Runs the full pipeline when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extract → validate → submit pipeline
    Run,

    /// Extract raw text from an invoice image
    Ocr(ocr::OcrArgs),

    /// Extract and validate invoice data from raw text
    Analyze(analyze::AnalyzeArgs),

    /// Fill and submit the payment form with sample or given data
    Submit(submit::SubmitArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; the API key may come from the config or the shell
    dotenvy::dotenv().ok();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run(config_path).await,
        Commands::Ocr(args) => ocr::run(args, config_path),
        Commands::Analyze(args) => analyze::run(args, config_path).await,
        Commands::Submit(args) => submit::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path),
    }
}
