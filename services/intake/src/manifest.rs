use doc_intake::error::AppError;
use doc_intake::workflows::intake::validation::{CERTIFICATE_FILE_FIELD, INVOICE_FILE_FIELD};
use doc_intake::workflows::intake::{
    Attachment, CertificateDraft, DocumentKind, EntryDraft, FieldError, IdentityDraft,
    InvoiceDraft, ValidationErrors,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A batch described on disk: who is sending and which files to attach.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Manifest {
    #[serde(default)]
    pub(crate) professional: IdentityDraft,
    #[serde(default)]
    pub(crate) invoices: Vec<InvoiceItem>,
    #[serde(default)]
    pub(crate) certificates: Vec<CertificateItem>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceItem {
    #[serde(default)]
    pub(crate) client_name: String,
    #[serde(default)]
    pub(crate) client_phone: String,
    pub(crate) file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CertificateItem {
    #[serde(default)]
    pub(crate) certificate_name: String,
    #[serde(default)]
    pub(crate) issue_date: String,
    pub(crate) file: PathBuf,
}

/// One manifest item turned into a draft, with its position for reporting.
/// An oversized file is refused before it is read, so `draft` then carries
/// the file error instead.
#[derive(Debug)]
pub(crate) struct LoadedDraft {
    pub(crate) kind: DocumentKind,
    pub(crate) position: usize,
    pub(crate) draft: Result<EntryDraft, ValidationErrors>,
}

impl Manifest {
    /// Relative file paths resolve against the manifest's directory.
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let mut manifest: Manifest =
            serde_json::from_str(&raw).map_err(|source| AppError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Reads every referenced file no larger than `max_bytes`, invoices
    /// first, in manifest order.
    pub(crate) fn drafts(&self, max_bytes: u64) -> Result<Vec<LoadedDraft>, AppError> {
        let mut drafts = Vec::with_capacity(self.invoices.len() + self.certificates.len());

        for (position, item) in self.invoices.iter().enumerate() {
            let draft = self
                .read_attachment(&item.file, max_bytes)?
                .map(|file| {
                    EntryDraft::Invoice(InvoiceDraft {
                        client_name: item.client_name.clone(),
                        client_phone: item.client_phone.clone(),
                        file: Some(file),
                    })
                })
                .map_err(|error| ValidationErrors::single(INVOICE_FILE_FIELD, error));
            drafts.push(LoadedDraft {
                kind: DocumentKind::Invoices,
                position,
                draft,
            });
        }

        for (position, item) in self.certificates.iter().enumerate() {
            let draft = self
                .read_attachment(&item.file, max_bytes)?
                .map(|file| {
                    EntryDraft::Certificate(CertificateDraft {
                        certificate_name: item.certificate_name.clone(),
                        issue_date: item.issue_date.clone(),
                        file: Some(file),
                    })
                })
                .map_err(|error| ValidationErrors::single(CERTIFICATE_FILE_FIELD, error));
            drafts.push(LoadedDraft {
                kind: DocumentKind::Certificates,
                position,
                draft,
            });
        }

        Ok(drafts)
    }

    /// The outer error is an unreadable path, the inner one a file the
    /// validator would refuse anyway.
    fn read_attachment(
        &self,
        file: &Path,
        max_bytes: u64,
    ) -> Result<Result<Attachment, FieldError>, AppError> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        };
        let unreadable = |source| AppError::Attachment {
            path: path.clone(),
            source,
        };

        let size = fs::metadata(&path).map_err(unreadable)?.len();
        if size > max_bytes {
            return Ok(Err(FieldError::FileTooLarge {
                size,
                max: max_bytes,
            }));
        }

        let bytes = fs::read(&path).map_err(unreadable)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(&path).first_or_octet_stream();

        Ok(Ok(Attachment::new(
            file_name,
            content_type.essence_str(),
            bytes,
        )))
    }
}
