use crate::commands::{run_check, run_submit, CheckArgs, SubmitArgs};
use clap::{Parser, Subcommand};
use doc_intake::config::AppConfig;
use doc_intake::error::AppError;
use doc_intake::telemetry;
use doc_intake::workflows::intake::DocumentSelection;

#[derive(Parser, Debug)]
#[command(
    name = "doc-intake",
    about = "Validate and submit a professional's invoices and certificates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a batch manifest without sending anything
    Check(CheckArgs),
    /// Submit a batch manifest to the intake endpoint
    Submit(SubmitArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Check(args) => run_check(args),
        Command::Submit(args) => run_submit(args, &config),
    }
}

pub(crate) fn parse_selection(value: &str) -> Result<DocumentSelection, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "invoices" => Ok(DocumentSelection::Invoices),
        "certificates" => Ok(DocumentSelection::Certificates),
        "both" => Ok(DocumentSelection::Both),
        other => Err(format!(
            "unknown document selection '{other}', expected invoices, certificates or both"
        )),
    }
}
