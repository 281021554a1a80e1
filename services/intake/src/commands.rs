use crate::cli::parse_selection;
use crate::manifest::{LoadedDraft, Manifest};
use clap::Args;
use doc_intake::config::{AppConfig, IntakeConfig};
use doc_intake::error::AppError;
use doc_intake::workflows::intake::{
    DocumentSelection, EntryValidator, HttpSubmissionGateway, SessionController, SessionError,
    SubmissionOutcome, SubmissionReceipt, ValidationErrors,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Batch manifest (JSON) listing the professional and the files to attach
    #[arg(long)]
    pub(crate) manifest: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Batch manifest (JSON) listing the professional and the files to attach
    #[arg(long)]
    pub(crate) manifest: PathBuf,
    /// Which list to send: invoices, certificates or both
    #[arg(long, value_parser = parse_selection, default_value = "both")]
    pub(crate) documents: DocumentSelection,
    /// Override the configured intake endpoint
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let manifest = Manifest::load(&args.manifest)?;
    let validator = EntryValidator::default();
    let mut rejected = 0;

    println!("Batch check: {}", args.manifest.display());
    match validator.validate_identity(&manifest.professional) {
        Ok(identity) => println!("  professional: {} ({})", identity.name, identity.phone),
        Err(errors) => {
            rejected += 1;
            println!("  professional: rejected");
            render_field_errors(&errors);
        }
    }

    for LoadedDraft {
        kind,
        position,
        draft,
    } in manifest.drafts(validator.file_policy().max_bytes())?
    {
        match draft.and_then(|draft| validator.validate(draft)) {
            Ok(entry) => println!("  {kind}[{position}]: ok ({})", entry.file().file_name),
            Err(errors) => {
                rejected += 1;
                println!("  {kind}[{position}]: rejected");
                render_field_errors(&errors);
            }
        }
    }

    if rejected > 0 {
        return Err(AppError::Rejected { count: rejected });
    }
    println!("All entries are ready to submit.");
    Ok(())
}

pub(crate) fn run_submit(args: SubmitArgs, config: &AppConfig) -> Result<(), AppError> {
    let SubmitArgs {
        manifest: manifest_path,
        documents,
        endpoint,
    } = args;

    let intake = match endpoint {
        Some(endpoint) => IntakeConfig::new(endpoint)?,
        None => config.intake.clone(),
    };
    let manifest = Manifest::load(&manifest_path)?;
    let gateway = HttpSubmissionGateway::from_config(&intake)?;

    let mut session = SessionController::default();
    let max_bytes = session.validator().file_policy().max_bytes();
    for LoadedDraft {
        kind,
        position,
        draft,
    } in manifest.drafts(max_bytes)?
    {
        let admitted = draft
            .map_err(SessionError::Validation)
            .and_then(|draft| session.add_entry(draft));
        if let Err(err) = admitted {
            if let SessionError::Validation(errors) = &err {
                eprintln!("{kind}[{position}] rejected");
                render_field_errors(errors);
            }
            return Err(err.into());
        }
    }

    info!(endpoint = gateway.endpoint(), selection = %documents, "submitting batch");
    let receipt = match session.submit(&manifest.professional, documents, &gateway) {
        Ok(receipt) => receipt,
        Err(SessionError::Validation(errors)) => {
            eprintln!("professional rejected");
            render_field_errors(&errors);
            return Err(SessionError::Validation(errors).into());
        }
        Err(err) => return Err(err.into()),
    };

    match receipt.outcome {
        SubmissionOutcome::Success => {
            println!("{}", confirmation(&receipt));
            Ok(())
        }
        SubmissionOutcome::Failure(err) => Err(err.into()),
    }
}

fn render_field_errors(errors: &ValidationErrors) {
    for (field, error) in errors.iter() {
        eprintln!("    {field}: {error}");
    }
}

fn confirmation(receipt: &SubmissionReceipt) -> String {
    let kinds: Vec<&str> = receipt.kinds.iter().map(|kind| kind.label()).collect();
    format!(
        "Documents sent: {} ({} entries). Thank you!",
        kinds.join(" and "),
        receipt.entry_count
    )
}
