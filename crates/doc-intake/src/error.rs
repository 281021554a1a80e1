use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::intake::{GatewayInitError, SessionError, TransportError};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Gateway(GatewayInitError),
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
    Session(SessionError),
    Rejected {
        count: usize,
    },
    Delivery(TransportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Gateway(err) => write!(f, "gateway error: {}", err),
            AppError::Manifest { path, source } => {
                write!(f, "invalid manifest {}: {}", path.display(), source)
            }
            AppError::Attachment { path, source } => {
                write!(f, "unable to read attachment {}: {}", path.display(), source)
            }
            AppError::Session(err) => write!(f, "{}", err),
            AppError::Rejected { count } => write!(f, "{} manifest entries were rejected", count),
            AppError::Delivery(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Gateway(err) => Some(err),
            AppError::Manifest { source, .. } => Some(source),
            AppError::Attachment { source, .. } => Some(source),
            AppError::Session(err) => Some(err),
            AppError::Rejected { .. } => None,
            AppError::Delivery(err) => Some(err),
        }
    }
}

impl AppError {
    /// Validation problems the user can fix by editing the batch.
    pub fn is_user_input(&self) -> bool {
        match self {
            AppError::Session(err) => err.is_validation(),
            AppError::Manifest { .. } | AppError::Attachment { .. } | AppError::Rejected { .. } => {
                true
            }
            _ => false,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<GatewayInitError> for AppError {
    fn from(value: GatewayInitError) -> Self {
        Self::Gateway(value)
    }
}

impl From<TransportError> for AppError {
    fn from(value: TransportError) -> Self {
        Self::Delivery(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::{DocumentSelection, FieldError, ValidationErrors};

    #[test]
    fn session_validation_errors_count_as_user_input() {
        let err = AppError::from(SessionError::NoEntries {
            selection: DocumentSelection::Invoices,
        });
        assert!(err.is_user_input());
        assert_eq!(err.to_string(), "no entries to submit (invoices)");

        let err = AppError::from(SessionError::Validation(ValidationErrors::single(
            "professionalPhone",
            FieldError::InvalidPhone,
        )));
        assert!(err.is_user_input());
        assert!(err.to_string().starts_with("professionalPhone: "));
    }

    #[test]
    fn io_errors_are_not_user_input() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!err.is_user_input());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn delivery_failure_keeps_the_generic_message() {
        let err = AppError::from(TransportError);
        assert!(!err.is_user_input());
        assert_eq!(
            err.to_string(),
            "the documents could not be sent, please try again later"
        );
    }
}
