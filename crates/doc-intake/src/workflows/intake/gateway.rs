use std::fmt::Debug;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use super::encoder::SubmissionPayload;
use crate::config::IntakeConfig;

/// Generic reason surfaced for every delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the documents could not be sent, please try again later")]
pub struct TransportError;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure(TransportError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }
}

/// Delivers a payload to the intake endpoint: one attempt, one outcome.
pub trait SubmissionGateway: Debug {
    fn send(&self, payload: &SubmissionPayload) -> SubmissionOutcome;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayInitError {
    #[error("http client unavailable: {0}")]
    Client(#[from] reqwest::Error),
    #[error("gateway runtime unavailable: {0}")]
    Runtime(#[from] std::io::Error),
}

/// `reqwest` client posting `multipart/form-data`, blocking on its own runtime
/// so the session can stay synchronous. Must not be called from inside
/// another tokio runtime.
pub struct HttpSubmissionGateway {
    client: reqwest::Client,
    endpoint: String,
    runtime: Runtime,
}

impl HttpSubmissionGateway {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, runtime: Runtime) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            runtime,
        }
    }

    pub fn from_config(config: &IntakeConfig) -> Result<Self, GatewayInitError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("doc-intake/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let runtime = Runtime::new()?;
        Ok(Self::new(client, config.endpoint(), runtime))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Debug for HttpSubmissionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSubmissionGateway")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SubmissionGateway for HttpSubmissionGateway {
    fn send(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        let files = payload.total_files();
        let form = match payload.to_form() {
            Ok(form) => form,
            Err(err) => {
                warn!(error = %err, "unable to build multipart form");
                return SubmissionOutcome::Failure(TransportError);
            }
        };

        let result = self.runtime.block_on(async {
            self.client
                .post(&self.endpoint)
                .multipart(form)
                .send()
                .await
        });

        match result {
            Ok(response) if response.status().is_success() => {
                info!(status = %response.status(), files, "intake endpoint accepted submission");
                SubmissionOutcome::Success
            }
            Ok(response) => {
                warn!(status = %response.status(), "intake endpoint rejected submission");
                SubmissionOutcome::Failure(TransportError)
            }
            Err(err) => {
                warn!(error = %err, "intake endpoint unreachable");
                SubmissionOutcome::Failure(TransportError)
            }
        }
    }
}
