use std::sync::Mutex;

use crate::workflows::intake::domain::{
    Attachment, CertificateDraft, CertificateEntry, EntryDraft, IdentityDraft, InvoiceDraft,
    InvoiceEntry,
};
use crate::workflows::intake::encoder::SubmissionPayload;
use crate::workflows::intake::gateway::{SubmissionGateway, SubmissionOutcome, TransportError};

pub(super) const MB: usize = 1024 * 1024;

pub(super) fn pdf(name: &str, size: usize) -> Attachment {
    Attachment::new(name, "application/pdf", vec![b'%'; size])
}

pub(super) fn png(name: &str) -> Attachment {
    Attachment::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

pub(super) fn identity() -> IdentityDraft {
    IdentityDraft {
        name: "Dana Levi".to_string(),
        phone: "0501234567".to_string(),
    }
}

pub(super) fn invoice_draft(client: &str, file_name: &str) -> InvoiceDraft {
    InvoiceDraft {
        client_name: client.to_string(),
        client_phone: "035551234".to_string(),
        file: Some(pdf(file_name, 2048)),
    }
}

pub(super) fn certificate_draft(name: &str, file_name: &str) -> CertificateDraft {
    CertificateDraft {
        certificate_name: name.to_string(),
        issue_date: "2023-06-01".to_string(),
        file: Some(png(file_name)),
    }
}

pub(super) fn invoice(client: &str, file_name: &str) -> InvoiceEntry {
    InvoiceEntry {
        client_name: Some(client.to_string()),
        client_phone: None,
        file: pdf(file_name, 64),
    }
}

pub(super) fn certificate(name: &str, file_name: &str) -> CertificateEntry {
    CertificateEntry {
        certificate_name: name.to_string(),
        issue_date: None,
        file: png(file_name),
    }
}

pub(super) fn invoice_drafts(count: usize) -> Vec<EntryDraft> {
    (0..count)
        .map(|i| EntryDraft::Invoice(invoice_draft(&format!("Client {i}"), &format!("inv-{i}.pdf"))))
        .collect()
}

/// Gateway returning a fixed outcome and recording every payload it was given.
#[derive(Debug)]
pub(super) struct StubGateway {
    outcome: SubmissionOutcome,
    sent: Mutex<Vec<SubmissionPayload>>,
}

impl StubGateway {
    pub(super) fn succeeding() -> Self {
        Self {
            outcome: SubmissionOutcome::Success,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            outcome: SubmissionOutcome::Failure(TransportError),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn sent(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

impl SubmissionGateway for StubGateway {
    fn send(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(payload.clone());
        self.outcome.clone()
    }
}
