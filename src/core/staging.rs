//! Attachment staging area - documents picked for a record before it is saved.
//!
//! The staging area holds an ordered list of new files and references to
//! documents that already exist on the server, capped by the
//! [`AttachmentPolicy`]. Nothing here touches the network: the orchestrator
//! reads [`AttachmentStaging::diff`] at submit time to decide which uploads and
//! deletions to issue.

use crate::config::policy::AttachmentPolicy;
use crate::entities::{AttachmentMeta, EntityId, PendingFile};
use crate::errors::{Error, GuardRejection, Result};

/// One staged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedAttachment {
    /// Picked locally, not uploaded yet
    New(PendingFile),
    /// Already stored on the server
    Existing(AttachmentMeta),
}

impl StagedAttachment {
    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::New(file) => &file.name,
            Self::Existing(meta) => &meta.name,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::New(file) => file.size(),
            Self::Existing(meta) => meta.size,
        }
    }

    /// Server id, for existing documents.
    #[must_use]
    pub const fn server_id(&self) -> Option<&EntityId> {
        match self {
            Self::New(_) => None,
            Self::Existing(meta) => Some(&meta.id),
        }
    }
}

/// Result of a successful [`AttachmentStaging::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Files appended
    pub added: usize,
    /// One message per skipped file
    pub skipped: Vec<String>,
}

/// What has to happen on the server to make it match the staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDiff<'a> {
    /// Originally persisted documents no longer staged
    pub removed: Vec<&'a AttachmentMeta>,
    /// New files to upload
    pub added: Vec<&'a PendingFile>,
    original_count: usize,
    current_count: usize,
}

impl AttachmentDiff<'_> {
    /// True when the diff would delete every original document and leave the
    /// record with none at all.
    #[must_use]
    pub const fn is_mass_deletion(&self) -> bool {
        self.original_count > 0
            && self.removed.len() == self.original_count
            && self.current_count == 0
    }

    /// Refuses mass deletions.
    ///
    /// # Errors
    /// Returns [`GuardRejection::MassDeletion`] when [`Self::is_mass_deletion`].
    pub const fn check_deletions(&self) -> std::result::Result<(), GuardRejection> {
        if self.is_mass_deletion() {
            Err(GuardRejection::MassDeletion {
                count: self.original_count,
            })
        } else {
            Ok(())
        }
    }

    /// Whether nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// The staging area of one form.
#[derive(Debug, Clone)]
pub struct AttachmentStaging {
    policy: AttachmentPolicy,
    reject_duplicate_names: bool,
    original: Vec<AttachmentMeta>,
    items: Vec<StagedAttachment>,
}

impl AttachmentStaging {
    /// An empty staging area.
    #[must_use]
    pub const fn new(policy: AttachmentPolicy) -> Self {
        Self {
            policy,
            reject_duplicate_names: false,
            original: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Turns on case-insensitive duplicate name rejection.
    #[must_use]
    pub const fn with_duplicate_name_check(mut self, enabled: bool) -> Self {
        self.reject_duplicate_names = enabled;
        self
    }

    /// Seeds the staging area with the record's persisted documents and
    /// remembers them as the original snapshot for diffing.
    pub fn load_existing(&mut self, existing: Vec<AttachmentMeta>) {
        if existing.len() > self.policy.max_files {
            tracing::warn!(
                "Record already has {} documents, above the cap of {}",
                existing.len(),
                self.policy.max_files
            );
        }
        self.items = existing
            .iter()
            .cloned()
            .map(StagedAttachment::Existing)
            .collect();
        self.original = existing;
    }

    /// Stages a batch of files.
    ///
    /// The whole batch is refused if it would push the count past the cap.
    /// Otherwise each file is checked on its own (size, type and, when enabled,
    /// duplicate name) and either appended or skipped with a message.
    ///
    /// # Errors
    /// Returns [`GuardRejection::TooManyFiles`]; the staged set is unchanged.
    pub fn add(&mut self, files: Vec<PendingFile>) -> Result<AddReport> {
        if self.items.len() + files.len() > self.policy.max_files {
            tracing::debug!(
                "Rejecting batch of {} with {} already staged",
                files.len(),
                self.items.len()
            );
            return Err(GuardRejection::TooManyFiles {
                max: self.policy.max_files,
            }
            .into());
        }

        let mut report = AddReport::default();
        for file in files {
            if let Some(reason) = self.rejection_reason(&file) {
                tracing::debug!("Skipping '{}': {}", file.name, reason);
                report.skipped.push(reason);
                continue;
            }
            self.items.push(StagedAttachment::New(file));
            report.added += 1;
        }
        Ok(report)
    }

    fn rejection_reason(&self, file: &PendingFile) -> Option<String> {
        if file.size() > self.policy.max_file_bytes {
            return Some(format!(
                "{} exceeds the {} MB limit",
                file.name,
                self.policy.max_file_megabytes()
            ));
        }
        if !self.policy.is_allowed_type(&file.name, &file.mime_type) {
            return Some(format!("{} is not an allowed file type", file.name));
        }
        if self.reject_duplicate_names {
            let taken = self
                .items
                .iter()
                .map(StagedAttachment::name)
                .chain(self.original.iter().map(|meta| meta.name.as_str()))
                .any(|name| name.eq_ignore_ascii_case(&file.name));
            if taken {
                return Some(format!("{} is already attached", file.name));
            }
        }
        None
    }

    /// Unstages the document at `index`. Existing documents are only deleted
    /// on the server when the form is submitted (or by an immediate-delete
    /// flow, see [`crate::core::form::EntityForm::remove_attachment`]).
    ///
    /// # Errors
    /// Returns [`Error::AttachmentIndex`] when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<StagedAttachment> {
        if index >= self.items.len() {
            return Err(Error::AttachmentIndex { index });
        }
        Ok(self.items.remove(index))
    }

    /// Puts a document back at `index` (used when an immediate delete fails).
    pub fn restore(&mut self, index: usize, item: StagedAttachment) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Drops a document from the original snapshot once it has been deleted
    /// on the server, so the submit-time diff does not delete it again.
    pub fn forget_original(&mut self, id: &EntityId) {
        self.original.retain(|meta| &meta.id != id);
    }

    /// Unstages everything but keeps the original snapshot, so the diff
    /// reports every existing document as removed.
    pub fn unstage_all(&mut self) {
        self.items.clear();
    }

    /// Empties the staging area and the original snapshot.
    pub fn clear(&mut self) {
        self.items.clear();
        self.original.clear();
    }

    /// Staged documents, in order.
    #[must_use]
    pub fn items(&self) -> &[StagedAttachment] {
        &self.items
    }

    /// Number of staged documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Documents that existed when the form opened.
    #[must_use]
    pub fn original(&self) -> &[AttachmentMeta] {
        &self.original
    }

    /// The policy in force.
    #[must_use]
    pub const fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    /// `removed = original - current` by server id, `added` = new files.
    #[must_use]
    pub fn diff(&self) -> AttachmentDiff<'_> {
        let removed = self
            .original
            .iter()
            .filter(|meta| {
                !self
                    .items
                    .iter()
                    .any(|item| item.server_id() == Some(&meta.id))
            })
            .collect();
        let added = self
            .items
            .iter()
            .filter_map(|item| match item {
                StagedAttachment::New(file) => Some(file),
                StagedAttachment::Existing(_) => None,
            })
            .collect();

        AttachmentDiff {
            removed,
            added,
            original_count: self.original.len(),
            current_count: self.items.len(),
        }
    }
}
