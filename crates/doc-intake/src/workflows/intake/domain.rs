use std::fmt;

use serde::{Deserialize, Serialize};

/// The two document lists a professional can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoices,
    Certificates,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Invoices, DocumentKind::Certificates];

    /// Wire label, also the shared multipart field name of the kind's files.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoices => "invoices",
            DocumentKind::Certificates => "certificates",
        }
    }

    /// Multipart field carrying the kind's JSON metadata array.
    pub fn metadata_field(self) -> &'static str {
        match self {
            DocumentKind::Invoices => "clientsData",
            DocumentKind::Certificates => "certificatesData",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which list(s) a submit action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSelection {
    Invoices,
    Certificates,
    Both,
}

impl DocumentSelection {
    pub fn kinds(self) -> &'static [DocumentKind] {
        match self {
            DocumentSelection::Invoices => &[DocumentKind::Invoices],
            DocumentSelection::Certificates => &[DocumentKind::Certificates],
            DocumentSelection::Both => &DocumentKind::ALL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentSelection::Invoices => "invoices",
            DocumentSelection::Certificates => "certificates",
            DocumentSelection::Both => "both",
        }
    }
}

impl fmt::Display for DocumentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<DocumentKind> for DocumentSelection {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Invoices => DocumentSelection::Invoices,
            DocumentKind::Certificates => DocumentSelection::Certificates,
        }
    }
}

/// A file picked by the user, held in memory for the session.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Identity of the professional sending the batch, validated at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionalIdentity {
    pub name: String,
    pub phone: String,
}

/// Raw identity values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityDraft {
    pub name: String,
    pub phone: String,
}

/// An accepted client invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceEntry {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub file: Attachment,
}

/// An accepted professional certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEntry {
    pub certificate_name: String,
    pub issue_date: Option<String>,
    pub file: Attachment,
}

/// Accepted entry of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Invoice(InvoiceEntry),
    Certificate(CertificateEntry),
}

impl Entry {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Entry::Invoice(_) => DocumentKind::Invoices,
            Entry::Certificate(_) => DocumentKind::Certificates,
        }
    }

    pub fn file(&self) -> &Attachment {
        match self {
            Entry::Invoice(entry) => &entry.file,
            Entry::Certificate(entry) => &entry.file,
        }
    }
}

/// Raw invoice values before validation. Empty strings mean "not filled".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub client_name: String,
    pub client_phone: String,
    pub file: Option<Attachment>,
}

/// Raw certificate values before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateDraft {
    pub certificate_name: String,
    pub issue_date: String,
    pub file: Option<Attachment>,
}

/// Candidate entry of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryDraft {
    Invoice(InvoiceDraft),
    Certificate(CertificateDraft),
}

impl EntryDraft {
    pub fn kind(&self) -> DocumentKind {
        match self {
            EntryDraft::Invoice(_) => DocumentKind::Invoices,
            EntryDraft::Certificate(_) => DocumentKind::Certificates,
        }
    }
}

/// Per-kind lifecycle of the submit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionState {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success => "success",
            SubmissionState::Error => "error",
        }
    }
}
