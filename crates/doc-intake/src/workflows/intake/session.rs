use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use super::domain::{
    CertificateEntry, DocumentKind, DocumentSelection, Entry, EntryDraft, IdentityDraft,
    InvoiceEntry, SubmissionState,
};
use super::encoder::{EncodeError, SubmissionBatch, SubmissionEncoder, SubmissionPayload};
use super::gateway::{SubmissionGateway, SubmissionOutcome};
use super::store::{EntryList, StoreError};
use super::validation::{EntryValidator, ValidationErrors};

/// Error raised by the session controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("no entries to submit ({selection})")]
    NoEntries { selection: DocumentSelection },
    #[error("{kind} are being submitted, wait for the result")]
    SubmissionInFlight { kind: DocumentKind },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Handed back so it can still be completed on the session that began it.
    #[error("the pending submission belongs to another session")]
    ForeignSubmission(Box<PendingSubmission>),
}

impl SessionError {
    /// Whether the error belongs on the field/notice surface rather than
    /// being an internal fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_) | SessionError::NoEntries { .. }
        )
    }
}

/// Snapshot handed out between `begin_submission` and `complete`. The kinds
/// it covers stay `Submitting` until it is completed.
#[derive(Debug)]
#[must_use = "a pending submission keeps its kinds locked until completed"]
pub struct PendingSubmission {
    session_id: u64,
    kinds: Vec<DocumentKind>,
    entry_count: usize,
    payload: SubmissionPayload,
}

impl PendingSubmission {
    pub fn kinds(&self) -> &[DocumentKind] {
        &self.kinds
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }
}

/// What the notification and confirmation surfaces render after settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub kinds: Vec<DocumentKind>,
    pub entry_count: usize,
    pub outcome: SubmissionOutcome,
}

fn next_session_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Owns both entry lists and their submit state machines.
#[derive(Debug)]
pub struct SessionController {
    id: u64,
    validator: EntryValidator,
    encoder: SubmissionEncoder,
    invoices: EntryList<InvoiceEntry>,
    certificates: EntryList<CertificateEntry>,
    invoice_state: SubmissionState,
    certificate_state: SubmissionState,
}

impl Default for SessionController {
    fn default() -> Self {
        Self {
            id: next_session_id(),
            validator: EntryValidator::default(),
            encoder: SubmissionEncoder,
            invoices: EntryList::default(),
            certificates: EntryList::default(),
            invoice_state: SubmissionState::default(),
            certificate_state: SubmissionState::default(),
        }
    }
}

impl SessionController {
    pub fn new(validator: EntryValidator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    pub fn validator(&self) -> &EntryValidator {
        &self.validator
    }

    pub fn invoices(&self) -> &EntryList<InvoiceEntry> {
        &self.invoices
    }

    pub fn certificates(&self) -> &EntryList<CertificateEntry> {
        &self.certificates
    }

    pub fn len(&self, kind: DocumentKind) -> usize {
        match kind {
            DocumentKind::Invoices => self.invoices.len(),
            DocumentKind::Certificates => self.certificates.len(),
        }
    }

    pub fn state(&self, kind: DocumentKind) -> SubmissionState {
        match kind {
            DocumentKind::Invoices => self.invoice_state,
            DocumentKind::Certificates => self.certificate_state,
        }
    }

    fn set_state(&mut self, kind: DocumentKind, state: SubmissionState) {
        match kind {
            DocumentKind::Invoices => self.invoice_state = state,
            DocumentKind::Certificates => self.certificate_state = state,
        }
    }

    fn ensure_editable(&self, kind: DocumentKind) -> Result<(), SessionError> {
        if self.state(kind) == SubmissionState::Submitting {
            return Err(SessionError::SubmissionInFlight { kind });
        }
        Ok(())
    }

    /// Validates the draft and appends it to its kind's list, returning the
    /// new entry's index.
    pub fn add_entry(&mut self, draft: EntryDraft) -> Result<usize, SessionError> {
        let kind = draft.kind();
        self.ensure_editable(kind)?;

        let index = match self.validator.validate(draft)? {
            Entry::Invoice(entry) => self.invoices.append(entry),
            Entry::Certificate(entry) => self.certificates.append(entry),
        };

        debug!(%kind, index, "entry accepted");
        Ok(index)
    }

    pub fn remove_entry(&mut self, kind: DocumentKind, index: usize) -> Result<Entry, SessionError> {
        self.ensure_editable(kind)?;

        let removed = match kind {
            DocumentKind::Invoices => self.invoices.remove_at(index).map(Entry::Invoice)?,
            DocumentKind::Certificates => {
                self.certificates.remove_at(index).map(Entry::Certificate)?
            }
        };

        debug!(%kind, index, remaining = self.len(kind), "entry removed");
        Ok(removed)
    }

    /// Validates the identity, snapshots the selected non-empty lists and
    /// moves their kinds to `Submitting`.
    pub fn begin_submission(
        &mut self,
        identity: &IdentityDraft,
        selection: DocumentSelection,
    ) -> Result<PendingSubmission, SessionError> {
        for &kind in selection.kinds() {
            self.ensure_editable(kind)?;
        }

        let identity = self.validator.validate_identity(identity)?;

        let kinds: Vec<DocumentKind> = selection
            .kinds()
            .iter()
            .copied()
            .filter(|kind| self.len(*kind) > 0)
            .collect();
        if kinds.is_empty() {
            debug!(%selection, "submit refused, nothing to send");
            return Err(SessionError::NoEntries { selection });
        }

        let batch = SubmissionBatch {
            invoices: kinds
                .contains(&DocumentKind::Invoices)
                .then(|| self.invoices.as_slice()),
            certificates: kinds
                .contains(&DocumentKind::Certificates)
                .then(|| self.certificates.as_slice()),
        };
        let payload = self.encoder.encode(&identity, batch)?;
        let entry_count = kinds.iter().map(|kind| self.len(*kind)).sum();

        for &kind in &kinds {
            self.set_state(kind, SubmissionState::Submitting);
        }

        info!(
            document_type = payload.document_type().unwrap_or_default(),
            entry_count,
            "submission started"
        );

        Ok(PendingSubmission {
            session_id: self.id,
            kinds,
            entry_count,
            payload,
        })
    }

    /// Settles a pending submission. Success clears the submitted lists;
    /// failure leaves them for a manual retry. A submission begun on another
    /// session is refused and returned untouched.
    pub fn complete(
        &mut self,
        pending: PendingSubmission,
        outcome: SubmissionOutcome,
    ) -> Result<SubmissionReceipt, SessionError> {
        if pending.session_id != self.id {
            warn!(
                session = self.id,
                origin = pending.session_id,
                "refused to settle a foreign submission"
            );
            return Err(SessionError::ForeignSubmission(Box::new(pending)));
        }

        let PendingSubmission {
            kinds, entry_count, ..
        } = pending;

        for &kind in &kinds {
            match outcome {
                SubmissionOutcome::Success => {
                    match kind {
                        DocumentKind::Invoices => self.invoices.clear(),
                        DocumentKind::Certificates => self.certificates.clear(),
                    }
                    self.set_state(kind, SubmissionState::Success);
                }
                SubmissionOutcome::Failure(_) => {
                    self.set_state(kind, SubmissionState::Error);
                }
            }
        }

        info!(
            success = outcome.is_success(),
            entry_count,
            "submission settled"
        );

        Ok(SubmissionReceipt {
            kinds,
            entry_count,
            outcome,
        })
    }

    /// Begin, one delivery attempt, complete.
    pub fn submit<G>(
        &mut self,
        identity: &IdentityDraft,
        selection: DocumentSelection,
        gateway: &G,
    ) -> Result<SubmissionReceipt, SessionError>
    where
        G: SubmissionGateway + ?Sized,
    {
        let pending = self.begin_submission(identity, selection)?;
        let outcome = gateway.send(pending.payload());
        self.complete(pending, outcome)
    }

    /// The presentation layer dismissed the confirmation or failure notice.
    pub fn acknowledge(&mut self, kind: DocumentKind) {
        if matches!(
            self.state(kind),
            SubmissionState::Success | SubmissionState::Error
        ) {
            self.set_state(kind, SubmissionState::Idle);
        }
    }
}
