//! Documents attached to a parent record.

use crate::entities::kind::EntityKind;
use crate::entities::persisted::EntityId;
use serde::{Deserialize, Serialize};

/// Attachment metadata as the document service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    /// Server-assigned id
    pub id: EntityId,
    /// Original file name
    #[serde(alias = "fileName")]
    pub name: String,
    /// Size in bytes
    #[serde(default, alias = "fileSize")]
    pub size: u64,
    /// Declared MIME type
    #[serde(default, alias = "contentType")]
    pub mime_type: String,
    /// Parent record id
    #[serde(default)]
    pub reference_id: Option<EntityId>,
    /// Parent level tag (`PO`, `MILESTONE`, ...)
    #[serde(default)]
    pub level: Option<String>,
    /// Free-form description sent with the upload
    #[serde(default)]
    pub description: Option<String>,
}

/// A file picked by the user but not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// File name
    pub name: String,
    /// Declared MIME type (may be empty)
    pub mime_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl PendingFile {
    /// Creates a pending file.
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One upload call: a file tagged with its parent record.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentUpload<'a> {
    /// Parent kind (decides the `level` tag)
    pub kind: EntityKind,
    /// Parent id as returned by the create/update call
    pub parent_id: &'a EntityId,
    /// Reference/description field sent alongside the file
    pub description: &'a str,
    /// The file
    pub file: &'a PendingFile,
}
