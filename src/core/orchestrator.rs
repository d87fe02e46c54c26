//! Submission orchestrator - saves a form's record, then its documents.
//!
//! A submission runs `Validating -> PersistingParent -> ReconcilingAttachments`
//! and always ends back in `Idle`. Validation errors and a failed parent save
//! end it early with an error and leave the form untouched so the user can
//! retry. Once the parent is saved nothing is rolled back: document failures
//! become warnings on a successful [`SubmissionOutcome`].
//!
//! Document calls are only issued after the create/update call has returned,
//! and always against the id that call returned.

use crate::api::ProcurementApi;
use crate::core::form::{EntityForm, FormMode};
use crate::core::notify::{Notification, NotificationSink};
use crate::core::validation::{ValidationContext, validate};
use crate::entities::{AttachmentMeta, AttachmentUpload, EntityId, PersistedEntity};
use crate::errors::{Error, GuardRejection, Result};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Where a submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing running
    Idle,
    /// Checking the draft
    Validating,
    /// Create/update call in flight
    PersistingParent,
    /// Document deletes and uploads in flight
    ReconcilingAttachments,
}

/// A document problem after the parent record was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionWarning {
    /// The deletions were refused locally and skipped
    DeletionsSkipped(GuardRejection),
    /// Deleting an existing document failed
    DeleteFailed {
        /// Document name
        name: String,
        /// Error text
        reason: String,
    },
    /// Uploading a new document failed
    UploadFailed {
        /// Document name
        name: String,
        /// Error text
        reason: String,
    },
}

impl fmt::Display for SubmissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeletionsSkipped(rejection) => write!(f, "{rejection}"),
            Self::DeleteFailed { name, reason } => {
                write!(f, "Could not delete {name}: {reason}")
            }
            Self::UploadFailed { name, reason } => {
                write!(f, "Could not upload {name}: {reason}")
            }
        }
    }
}

/// Result of a submission that saved the parent record.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    /// The saved record, with the id the backend assigned
    pub parent: PersistedEntity,
    /// Documents uploaded
    pub uploaded: Vec<AttachmentMeta>,
    /// Ids of documents deleted
    pub deleted: Vec<EntityId>,
    /// Document problems
    pub warnings: Vec<SubmissionWarning>,
}

impl SubmissionOutcome {
    /// Whether every document call went through.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Runs submissions against one backend, one at a time.
pub struct SubmissionOrchestrator {
    api: Arc<dyn ProcurementApi>,
    sink: Arc<dyn NotificationSink>,
    state: watch::Sender<SubmissionState>,
    submitting: AtomicBool,
}

/// Clears the submitting flag and returns to `Idle` however `submit` exits.
struct SubmittingGuard<'a> {
    orchestrator: &'a SubmissionOrchestrator,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.transition(SubmissionState::Idle);
        self.orchestrator.submitting.store(false, Ordering::Release);
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl SubmissionOrchestrator {
    /// Orchestrator reporting through `sink`.
    #[must_use]
    pub fn new(api: Arc<dyn ProcurementApi>, sink: Arc<dyn NotificationSink>) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            api,
            sink,
            state,
            submitting: AtomicBool::new(false),
        }
    }

    /// Receiver that sees every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    /// Whether a submission is running.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn transition(&self, next: SubmissionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("Submission state {:?} -> {:?}", previous, next);
        }
    }

    fn begin(&self) -> Result<SubmittingGuard<'_>> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Submit ignored, another submission is running");
            return Err(Error::SubmissionInProgress);
        }
        Ok(SubmittingGuard { orchestrator: self })
    }

    /// Validates and saves `form`, then reconciles its documents.
    ///
    /// On success `on_complete` receives the saved record and the form is
    /// reset.
    ///
    /// # Errors
    /// - [`Error::SubmissionInProgress`] if another submission is running
    /// - [`Error::ReadOnly`] for view forms
    /// - [`Error::Validation`] with the field errors (also set on the draft)
    /// - the create/update call's error; the draft is kept
    pub async fn submit<F>(
        &self,
        form: &mut EntityForm,
        ctx: &ValidationContext,
        on_complete: F,
    ) -> Result<SubmissionOutcome>
    where
        F: FnOnce(&PersistedEntity) + Send,
    {
        let _guard = self.begin()?;
        let spec = form.spec();
        let label = spec.kind.label();

        self.transition(SubmissionState::Validating);
        if spec.mode == FormMode::View {
            return Err(Error::ReadOnly {
                target: format!("{} form", form.flow()),
            });
        }
        let errors = validate(form.draft(), ctx);
        if !errors.is_empty() {
            debug!("{} has {} invalid field(s)", label, errors.len());
            form.draft_mut().set_errors(errors.clone());
            self.sink.notify(Notification::error(format!(
                "Please correct the highlighted fields ({})",
                errors.len()
            )));
            return Err(Error::Validation { errors });
        }

        self.transition(SubmissionState::PersistingParent);
        let payload = form.payload();
        let saved = match (spec.mode, form.record_id()) {
            (FormMode::Edit, Some(id)) => self.api.update(spec.kind, id, &payload).await,
            (FormMode::Edit, None) => Err(Error::Config {
                message: format!("{} form was opened without a record", form.flow()),
            }),
            _ => self.api.create(spec.kind, &payload).await,
        };
        let parent = match saved {
            Ok(parent) => parent,
            Err(e) => {
                error!("Failed to save {}: {}", label, e);
                self.sink
                    .notify(Notification::error(format!("Could not save {label}: {e}")));
                return Err(e);
            }
        };
        match form.record_id() {
            Some(previous) if previous != &parent.id => {
                info!("{} {} was stored as {}", label, previous, parent.id);
            }
            _ => info!("Saved {} {}", label, parent.id),
        }

        self.transition(SubmissionState::ReconcilingAttachments);
        let outcome = self.reconcile(form, parent).await;

        on_complete(&outcome.parent);
        form.reset();

        if outcome.is_clean() {
            self.sink
                .notify(Notification::success(format!("{} saved", capitalized(label))));
        } else {
            let details: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
            self.sink.notify(Notification::warning(format!(
                "{} saved, but some documents need attention: {}",
                capitalized(label),
                details.join("; ")
            )));
        }
        Ok(outcome)
    }

    async fn reconcile(&self, form: &EntityForm, parent: PersistedEntity) -> SubmissionOutcome {
        let mut outcome = SubmissionOutcome {
            parent,
            uploaded: Vec::new(),
            deleted: Vec::new(),
            warnings: Vec::new(),
        };
        let Some(staging) = form.staging() else {
            return outcome;
        };
        let diff = staging.diff();
        let api = self.api.as_ref();

        match diff.check_deletions() {
            Err(rejection) => {
                warn!("Skipping document deletions: {}", rejection);
                outcome
                    .warnings
                    .push(SubmissionWarning::DeletionsSkipped(rejection));
            }
            Ok(()) => {
                let results = join_all(diff.removed.iter().map(|meta| async move {
                    (meta, api.delete_attachment(&meta.id).await)
                }))
                .await;
                for (meta, result) in results {
                    match result {
                        Ok(()) => outcome.deleted.push(meta.id.clone()),
                        Err(e) => {
                            warn!("Failed to delete document '{}': {}", meta.name, e);
                            outcome.warnings.push(SubmissionWarning::DeleteFailed {
                                name: meta.name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let description = form.document_description();
        let parent_id = outcome.parent.id.clone();
        let kind = outcome.parent.kind;
        let results = join_all(diff.added.iter().map(|file| {
            let upload = AttachmentUpload {
                kind,
                parent_id: &parent_id,
                description: &description,
                file,
            };
            async move { (file, api.upload_attachment(upload).await) }
        }))
        .await;
        for (file, result) in results {
            match result {
                Ok(meta) => outcome.uploaded.push(meta),
                Err(e) => {
                    warn!("Failed to upload document '{}': {}", file.name, e);
                    outcome.warnings.push(SubmissionWarning::UploadFailed {
                        name: file.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

impl fmt::Debug for SubmissionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionOrchestrator")
            .field("state", &self.state())
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}
