use std::fmt;
use std::sync::OnceLock;

use mime::Mime;
use regex::Regex;

use super::domain::{
    Attachment, CertificateDraft, CertificateEntry, Entry, EntryDraft, IdentityDraft,
    InvoiceDraft, InvoiceEntry, ProfessionalIdentity,
};

/// Largest attachment accepted, inclusive.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

pub const INVOICE_FILE_FIELD: &str = "invoice";
pub const CERTIFICATE_FILE_FIELD: &str = "certificate";

/// ASCII digits only; `\d` would also admit other Unicode decimal digits.
const ISRAELI_PHONE_PATTERN: &str = r"^0[2-9][0-9]{7,8}$";

fn israeli_phone() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ISRAELI_PHONE_PATTERN).expect("phone pattern compiles"))
}

/// Single field-scoped violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("this field is required")]
    Missing,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be a valid Israeli phone number (0, then 2-9, then 7-8 more digits)")]
    InvalidPhone,
    #[error("a file must be attached")]
    FileMissing,
    #[error("file is {size} bytes, the limit is {max} bytes (5MB)")]
    FileTooLarge { size: u64, max: u64 },
    #[error("only PDF, JPG or PNG files are accepted (got '{content_type}')")]
    UnsupportedFileType { content_type: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    FreeText,
    IsraeliPhone,
}

/// One row of a record's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub presence: Presence,
    pub min_chars: Option<usize>,
    pub format: FieldFormat,
}

impl FieldRule {
    const fn new(
        field: &'static str,
        presence: Presence,
        min_chars: Option<usize>,
        format: FieldFormat,
    ) -> Self {
        Self {
            field,
            presence,
            min_chars,
            format,
        }
    }

    /// Returns the value to keep, `None` for an optional field left empty.
    pub fn check<'a>(&self, raw: &'a str) -> Result<Option<&'a str>, FieldError> {
        if raw.is_empty() {
            return match self.presence {
                Presence::Required => Err(FieldError::Missing),
                Presence::Optional => Ok(None),
            };
        }

        if let Some(min) = self.min_chars {
            if raw.chars().count() < min {
                return Err(FieldError::TooShort { min });
            }
        }

        match self.format {
            FieldFormat::FreeText => {}
            FieldFormat::IsraeliPhone => {
                if !israeli_phone().is_match(raw) {
                    return Err(FieldError::InvalidPhone);
                }
            }
        }

        Ok(Some(raw))
    }
}

pub const IDENTITY_RULES: [FieldRule; 2] = [
    FieldRule::new(
        "professionalName",
        Presence::Required,
        Some(2),
        FieldFormat::FreeText,
    ),
    FieldRule::new(
        "professionalPhone",
        Presence::Required,
        None,
        FieldFormat::IsraeliPhone,
    ),
];

pub const INVOICE_RULES: [FieldRule; 2] = [
    FieldRule::new("clientName", Presence::Optional, None, FieldFormat::FreeText),
    FieldRule::new(
        "clientPhone",
        Presence::Optional,
        None,
        FieldFormat::IsraeliPhone,
    ),
];

pub const CERTIFICATE_RULES: [FieldRule; 2] = [
    FieldRule::new(
        "certificateName",
        Presence::Required,
        Some(2),
        FieldFormat::FreeText,
    ),
    FieldRule::new("issueDate", Presence::Optional, None, FieldFormat::FreeText),
];

/// Every violation found in one candidate, keyed by field name in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, FieldError)>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, error: FieldError) -> Self {
        Self {
            errors: vec![(field, error)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, error)| error)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.errors.iter().map(|(name, error)| (*name, error))
    }

    fn capture<T>(&mut self, field: &'static str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push((field, error));
                None
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, (field, error)) in self.errors.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Size and type limits applied to every attachment.
#[derive(Debug, Clone)]
pub struct FilePolicy {
    max_bytes: u64,
    accepted: Vec<Mime>,
}

impl FilePolicy {
    pub fn new(max_bytes: u64, accepted: Vec<Mime>) -> Self {
        Self {
            max_bytes,
            accepted,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn accepts(&self, content_type: &str) -> bool {
        content_type
            .parse::<Mime>()
            .map(|parsed| {
                self.accepted
                    .iter()
                    .any(|allowed| allowed.essence_str() == parsed.essence_str())
            })
            .unwrap_or(false)
    }

    pub fn check(&self, file: Option<Attachment>) -> Result<Attachment, FieldError> {
        let file = file.ok_or(FieldError::FileMissing)?;

        if file.size() > self.max_bytes {
            return Err(FieldError::FileTooLarge {
                size: file.size(),
                max: self.max_bytes,
            });
        }

        if !self.accepts(&file.content_type) {
            return Err(FieldError::UnsupportedFileType {
                content_type: file.content_type.clone(),
            });
        }

        Ok(file)
    }
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self::new(
            MAX_FILE_BYTES,
            vec![mime::APPLICATION_PDF, mime::IMAGE_JPEG, mime::IMAGE_PNG],
        )
    }
}

/// Admits candidate entries and identities. Pure: no state beyond its policy.
#[derive(Debug, Clone, Default)]
pub struct EntryValidator {
    files: FilePolicy,
}

impl EntryValidator {
    pub fn with_policy(files: FilePolicy) -> Self {
        Self { files }
    }

    pub fn file_policy(&self) -> &FilePolicy {
        &self.files
    }

    pub fn validate(&self, draft: EntryDraft) -> Result<Entry, ValidationErrors> {
        match draft {
            EntryDraft::Invoice(draft) => self.validate_invoice(draft).map(Entry::Invoice),
            EntryDraft::Certificate(draft) => {
                self.validate_certificate(draft).map(Entry::Certificate)
            }
        }
    }

    pub fn validate_invoice(&self, draft: InvoiceDraft) -> Result<InvoiceEntry, ValidationErrors> {
        let [name_rule, phone_rule] = &INVOICE_RULES;
        let mut errors = ValidationErrors::default();

        let client_name = errors.capture(name_rule.field, name_rule.check(&draft.client_name));
        let client_phone = errors.capture(phone_rule.field, phone_rule.check(&draft.client_phone));
        let file = errors.capture(INVOICE_FILE_FIELD, self.files.check(draft.file));

        match (client_name, client_phone, file) {
            (Some(client_name), Some(client_phone), Some(file)) if errors.is_empty() => {
                Ok(InvoiceEntry {
                    client_name: client_name.map(str::to_string),
                    client_phone: client_phone.map(str::to_string),
                    file,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_certificate(
        &self,
        draft: CertificateDraft,
    ) -> Result<CertificateEntry, ValidationErrors> {
        let [name_rule, date_rule] = &CERTIFICATE_RULES;
        let mut errors = ValidationErrors::default();

        let certificate_name =
            errors.capture(name_rule.field, name_rule.check(&draft.certificate_name));
        let issue_date = errors.capture(date_rule.field, date_rule.check(&draft.issue_date));
        let file = errors.capture(CERTIFICATE_FILE_FIELD, self.files.check(draft.file));

        match (certificate_name, issue_date, file) {
            (Some(Some(certificate_name)), Some(issue_date), Some(file)) if errors.is_empty() => {
                Ok(CertificateEntry {
                    certificate_name: certificate_name.to_string(),
                    issue_date: issue_date.map(str::to_string),
                    file,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_identity(
        &self,
        draft: &IdentityDraft,
    ) -> Result<ProfessionalIdentity, ValidationErrors> {
        let [name_rule, phone_rule] = &IDENTITY_RULES;
        let mut errors = ValidationErrors::default();

        let name = errors.capture(name_rule.field, name_rule.check(&draft.name));
        let phone = errors.capture(phone_rule.field, phone_rule.check(&draft.phone));

        match (name, phone) {
            (Some(Some(name)), Some(Some(phone))) if errors.is_empty() => {
                Ok(ProfessionalIdentity {
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}
