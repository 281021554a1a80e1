//! Professional document intake.
//!
//! A session collects invoice and certificate entries, each validated before it
//! is admitted to its kind's list, then submits a selected list (or both) as a
//! single multipart request. Lists are cleared only after the intake endpoint
//! accepts the batch.

pub mod domain;
pub mod encoder;
pub mod gateway;
pub mod session;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Attachment, CertificateDraft, CertificateEntry, DocumentKind, DocumentSelection, Entry,
    EntryDraft, IdentityDraft, InvoiceDraft, InvoiceEntry, ProfessionalIdentity,
    SubmissionState,
};
pub use encoder::{
    EncodeError, FilePart, PayloadPart, SubmissionBatch, SubmissionEncoder, SubmissionPayload,
    TextPart,
};
pub use gateway::{
    GatewayInitError, HttpSubmissionGateway, SubmissionGateway, SubmissionOutcome,
    TransportError,
};
pub use session::{PendingSubmission, SessionController, SessionError, SubmissionReceipt};
pub use store::{EntryList, StoreError};
pub use validation::{EntryValidator, FieldError, FilePolicy, ValidationErrors};
