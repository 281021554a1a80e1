//! Multipart encoding of a submission.
//!
//! Each list becomes one JSON metadata array followed by one file part per
//! entry under the kind's shared field name. The transmitted file name of
//! entry `i` is prefixed with `i_`, and metadata record `i` carries both
//! `index: i` and that file name, so the receiver can pair records with files
//! either by order or by name.

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::domain::{
    Attachment, CertificateEntry, DocumentKind, InvoiceEntry, ProfessionalIdentity,
};

pub const PROFESSIONAL_NAME_FIELD: &str = "professionalName";
pub const PROFESSIONAL_PHONE_FIELD: &str = "professionalPhone";
pub const DOCUMENT_TYPE_FIELD: &str = "documentType";
pub const BOTH_DOCUMENT_TYPES: &str = "both";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no document list selected for encoding")]
    NothingSelected,
    #[error("unable to serialize entry metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    pub name: &'static str,
    pub value: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadPart {
    Text(TextPart),
    File(FilePart),
}

/// Transport-ready submission, kept inspectable until it reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    kinds: Vec<DocumentKind>,
    parts: Vec<PayloadPart>,
}

impl SubmissionPayload {
    /// Kinds carried, invoices first.
    pub fn kinds(&self) -> &[DocumentKind] {
        &self.kinds
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn document_type(&self) -> Option<&str> {
        self.text(DOCUMENT_TYPE_FIELD)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            PayloadPart::Text(text) if text.name == name => Some(text.value.as_str()),
            _ => None,
        })
    }

    /// File parts of one kind in transmission order.
    pub fn files(&self, kind: DocumentKind) -> Vec<&FilePart> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                PayloadPart::File(file) if file.name == kind.label() => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Decoded metadata records of one kind; empty when the kind is absent.
    pub fn metadata(&self, kind: DocumentKind) -> Result<Vec<serde_json::Value>, serde_json::Error> {
        match self.text(kind.metadata_field()) {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn total_files(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, PayloadPart::File(_)))
            .count()
    }

    /// Builds a multipart form, preserving part order.
    pub fn to_form(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                PayloadPart::Text(text) => form.text(text.name, text.value.clone()),
                PayloadPart::File(file) => {
                    let part = Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)?;
                    form.part(file.name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Entries the encoder knows how to describe.
pub trait EncodableEntry {
    const KIND: DocumentKind;
    type Record: Serialize;

    fn attachment(&self) -> &Attachment;
    fn record(&self, index: usize, file_name: String) -> Self::Record;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub index: usize,
    pub client_name: String,
    pub client_phone: String,
    pub file_name: String,
}

impl EncodableEntry for InvoiceEntry {
    const KIND: DocumentKind = DocumentKind::Invoices;
    type Record = InvoiceRecord;

    fn attachment(&self) -> &Attachment {
        &self.file
    }

    fn record(&self, index: usize, file_name: String) -> InvoiceRecord {
        InvoiceRecord {
            index,
            client_name: self.client_name.clone().unwrap_or_default(),
            client_phone: self.client_phone.clone().unwrap_or_default(),
            file_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub index: usize,
    pub certificate_name: String,
    pub issue_date: String,
    pub file_name: String,
}

impl EncodableEntry for CertificateEntry {
    const KIND: DocumentKind = DocumentKind::Certificates;
    type Record = CertificateRecord;

    fn attachment(&self) -> &Attachment {
        &self.file
    }

    fn record(&self, index: usize, file_name: String) -> CertificateRecord {
        CertificateRecord {
            index,
            certificate_name: self.certificate_name.clone(),
            issue_date: self.issue_date.clone().unwrap_or_default(),
            file_name,
        }
    }
}

/// Lists selected for one submission. `None` leaves a kind out entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionBatch<'a> {
    pub invoices: Option<&'a [InvoiceEntry]>,
    pub certificates: Option<&'a [CertificateEntry]>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionEncoder;

impl SubmissionEncoder {
    pub fn encode(
        &self,
        identity: &ProfessionalIdentity,
        batch: SubmissionBatch<'_>,
    ) -> Result<SubmissionPayload, EncodeError> {
        let mut kinds = Vec::with_capacity(2);
        if batch.invoices.is_some() {
            kinds.push(DocumentKind::Invoices);
        }
        if batch.certificates.is_some() {
            kinds.push(DocumentKind::Certificates);
        }

        let document_type = match kinds.as_slice() {
            [] => return Err(EncodeError::NothingSelected),
            [single] => single.label(),
            _ => BOTH_DOCUMENT_TYPES,
        };

        let mut parts = vec![
            text_part(PROFESSIONAL_NAME_FIELD, &identity.name),
            text_part(PROFESSIONAL_PHONE_FIELD, &identity.phone),
            text_part(DOCUMENT_TYPE_FIELD, document_type),
        ];

        if let Some(invoices) = batch.invoices {
            push_list(&mut parts, invoices)?;
        }
        if let Some(certificates) = batch.certificates {
            push_list(&mut parts, certificates)?;
        }

        Ok(SubmissionPayload { kinds, parts })
    }
}

fn text_part(name: &'static str, value: &str) -> PayloadPart {
    PayloadPart::Text(TextPart {
        name,
        value: value.to_string(),
    })
}

fn push_list<E: EncodableEntry>(
    parts: &mut Vec<PayloadPart>,
    entries: &[E],
) -> Result<(), EncodeError> {
    let mut records = Vec::with_capacity(entries.len());
    let mut files = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let attachment = entry.attachment();
        let file_name = transmitted_file_name(index, &attachment.file_name);
        records.push(entry.record(index, file_name.clone()));
        files.push(PayloadPart::File(FilePart {
            name: E::KIND.label(),
            file_name,
            content_type: attachment.content_type.clone(),
            bytes: attachment.bytes.clone(),
        }));
    }

    parts.push(PayloadPart::Text(TextPart {
        name: E::KIND.metadata_field(),
        value: serde_json::to_string(&records)?,
    }));
    parts.extend(files);
    Ok(())
}

/// `"{index}_{name}"`, with path separators in the original name flattened.
pub fn transmitted_file_name(index: usize, original: &str) -> String {
    let flattened: String = original
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{index}_{flattened}")
}
