//! Attachment policy - the single source of truth for document limits.
//!
//! Every flow that accepts documents shares these limits: at most four documents
//! per parent record, at most 10 MB per file, and only office documents, plain
//! text and common image formats. The values can be overridden from the
//! `[attachments]` section of `config.toml`.

use serde::Deserialize;

/// Maximum number of documents attached to one parent record
pub const MAX_ATTACHMENTS: usize = 4;

/// Maximum size of a single document in bytes (10 MB)
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted for upload, paired with the file extensions they cover.
pub const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    ("application/pdf", &["pdf"]),
    ("application/msword", &["doc"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    ("application/vnd.ms-excel", &["xls"]),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &["xlsx"],
    ),
    ("text/plain", &["txt"]),
    ("image/jpeg", &["jpeg", "jpg"]),
    ("image/jpg", &["jpg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
];

/// Limits applied by the attachment staging area.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttachmentPolicy {
    /// Cap on staged documents (new + existing)
    pub max_files: usize,
    /// Cap on a single file's size in bytes
    pub max_file_bytes: u64,
    /// Accepted MIME types (compared case-insensitively)
    pub allowed_mime_types: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_files: MAX_ATTACHMENTS,
            max_file_bytes: MAX_ATTACHMENT_BYTES,
            allowed_mime_types: ALLOWED_TYPES
                .iter()
                .map(|(mime, _)| (*mime).to_string())
                .collect(),
        }
    }
}

impl AttachmentPolicy {
    /// Checks a file's declared MIME type against the allow-list.
    ///
    /// Browsers and file pickers sometimes report an empty or generic
    /// `application/octet-stream` type; in that case the file name's extension
    /// decides.
    #[must_use]
    pub fn is_allowed_type(&self, file_name: &str, mime_type: &str) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.is_empty() || mime == "application/octet-stream" {
            return mime_for_file_name(file_name).is_some_and(|guessed| {
                self.allowed_mime_types
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(guessed))
            });
        }
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&mime))
    }

    /// Human-readable megabyte limit used in messages.
    #[must_use]
    pub const fn max_file_megabytes(&self) -> u64 {
        self.max_file_bytes / (1024 * 1024)
    }
}

/// Infers the MIME type from a file name's extension, if it is one we accept.
#[must_use]
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(mime, _)| *mime)
}
