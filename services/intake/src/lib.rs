mod cli;
mod commands;
mod manifest;

use doc_intake::error::AppError;

/// Runs the gateway on its own runtime, so this stays synchronous.
pub fn run() -> Result<(), AppError> {
    cli::run()
}
