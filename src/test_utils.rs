//! Shared test utilities for the procurement desk.
//!
//! [`FakeApi`] is an in-memory backend that records every call in order and
//! can be told to fail specific calls. Fixtures below build sessions, files
//! and documents with sensible defaults.

#![allow(clippy::unwrap_used, dead_code)]

use crate::api::{Payload, ProcurementApi};
use crate::config::session::{Session, SessionData};
use crate::core::notify::{Notification, NotificationSink};
use crate::entities::{
    AttachmentMeta, AttachmentUpload, EntityId, EntityKind, PendingFile, PersistedEntity,
};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")), // Default to TRACE for tests if RUST_LOG is not set
        )
        .with_test_writer()
        .try_init();
}

/// Fixed "today" for date rules: 2026-10-19.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Active session with token `test-token` in tenant `tenant-1`.
pub fn test_session() -> Session {
    Session::new(SessionData {
        token: "test-token".to_string(),
        tenant_id: "tenant-1".to_string(),
        tenant_name: "Test Tenant".to_string(),
        user_name: "tester".to_string(),
    })
}

/// Small PDF pending upload.
pub fn pdf(name: &str) -> PendingFile {
    PendingFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

/// Metadata of a document already on the server.
pub fn existing_attachment(id: i64, name: &str) -> AttachmentMeta {
    AttachmentMeta {
        id: EntityId::Int(id),
        name: name.to_string(),
        size: 1024,
        mime_type: "application/pdf".to_string(),
        reference_id: None,
        level: None,
        description: None,
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create {
        kind: EntityKind,
        payload: Payload,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        payload: Payload,
    },
    Fetch {
        kind: EntityKind,
        id: EntityId,
    },
    List(EntityKind),
    Delete {
        kind: EntityKind,
        id: EntityId,
    },
    Upload {
        kind: EntityKind,
        parent_id: EntityId,
        name: String,
        description: String,
    },
    DeleteAttachment(EntityId),
    ListAttachments {
        kind: EntityKind,
        parent_id: EntityId,
    },
}

impl ApiCall {
    /// Whether this call touches documents.
    pub const fn is_document_call(&self) -> bool {
        matches!(
            self,
            Self::Upload { .. } | Self::DeleteAttachment(_) | Self::ListAttachments { .. }
        )
    }
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: i64,
    records: Vec<PersistedEntity>,
    attachments: Vec<AttachmentMeta>,
    calls: Vec<ApiCall>,
    failing_saves: Option<u16>,
    mint_ids_on_update: bool,
    failing_uploads: Vec<String>,
    failing_deletes: Vec<EntityId>,
}

impl FakeState {
    fn mint_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::Int(self.next_id)
    }

    fn position(&self, kind: EntityKind, id: &EntityId) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.kind == kind && record.id.same_as(id))
    }
}

fn not_found(what: impl std::fmt::Display) -> Error {
    Error::Api {
        status: 404,
        body: format!("{what} not found"),
    }
}

fn injected(status: u16) -> Error {
    Error::Api {
        status,
        body: "injected failure".to_string(),
    }
}

/// In-memory backend.
#[derive(Debug)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    create_gate: Mutex<Option<Arc<Notify>>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeApi {
    /// Empty backend. Minted ids start at 101.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
            create_gate: Mutex::new(None),
        }
    }

    /// Stores a record directly (not logged as a call).
    pub fn seed(&self, kind: EntityKind, body: Value) -> PersistedEntity {
        let record = PersistedEntity::from_json(kind, body).unwrap();
        self.state.lock().unwrap().records.push(record.clone());
        record
    }

    /// Stores a document for a parent record (not logged as a call).
    pub fn seed_attachment(&self, kind: EntityKind, parent_id: EntityId, id: i64, name: &str) -> AttachmentMeta {
        let meta = AttachmentMeta {
            reference_id: Some(parent_id),
            level: kind.attachment_level().map(str::to_string),
            ..existing_attachment(id, name)
        };
        self.state.lock().unwrap().attachments.push(meta.clone());
        meta
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Stored documents of a parent, without logging a call.
    pub fn stored_attachments(&self, kind: EntityKind, parent_id: &EntityId) -> Vec<AttachmentMeta> {
        let level = kind.attachment_level().map(str::to_string);
        self.state
            .lock()
            .unwrap()
            .attachments
            .iter()
            .filter(|meta| {
                meta.level == level
                    && meta.reference_id.as_ref().is_some_and(|r| r.same_as(parent_id))
            })
            .cloned()
            .collect()
    }

    /// Create and update calls fail with `status`.
    pub fn fail_saves_with(&self, status: u16) {
        self.state.lock().unwrap().failing_saves = Some(status);
    }

    /// Updates store the record under a fresh id and drop the old one.
    pub fn mint_new_ids_on_update(&self) {
        self.state.lock().unwrap().mint_ids_on_update = true;
    }

    /// Uploads of a file with this name fail.
    pub fn fail_upload_of(&self, name: &str) {
        self.state.lock().unwrap().failing_uploads.push(name.to_string());
    }

    /// Deleting this document fails.
    pub fn fail_delete_of(&self, id: EntityId) {
        self.state.lock().unwrap().failing_deletes.push(id);
    }

    /// Create calls wait until the returned handle is notified.
    pub fn hold_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn save(&self, kind: EntityKind, id: EntityId, payload: &Payload) -> PersistedEntity {
        let mut body = payload.clone();
        body.insert("id".to_string(), id.to_json());
        PersistedEntity {
            kind,
            id,
            body: Value::Object(body),
        }
    }
}

#[async_trait]
impl ProcurementApi for FakeApi {
    async fn create(&self, kind: EntityKind, payload: &Payload) -> Result<PersistedEntity> {
        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::Create {
            kind,
            payload: payload.clone(),
        });
        if let Some(status) = state.failing_saves {
            return Err(injected(status));
        }
        let id = state.mint_id();
        let record = self.save(kind, id, payload);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        payload: &Payload,
    ) -> Result<PersistedEntity> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::Update {
            kind,
            id: id.clone(),
            payload: payload.clone(),
        });
        if let Some(status) = state.failing_saves {
            return Err(injected(status));
        }
        let index = state.position(kind, id).ok_or_else(|| not_found(id))?;
        let stored_id = if state.mint_ids_on_update {
            state.mint_id()
        } else {
            id.clone()
        };
        let record = self.save(kind, stored_id, payload);
        state.records[index] = record.clone();
        Ok(record)
    }

    async fn fetch(&self, kind: EntityKind, id: &EntityId) -> Result<PersistedEntity> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::Fetch {
            kind,
            id: id.clone(),
        });
        let index = state.position(kind, id).ok_or_else(|| not_found(id))?;
        Ok(state.records[index].clone())
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<PersistedEntity>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::List(kind));
        Ok(state
            .records
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::Delete {
            kind,
            id: id.clone(),
        });
        let index = state.position(kind, id).ok_or_else(|| not_found(id))?;
        state.records.remove(index);
        Ok(())
    }

    async fn upload_attachment(&self, upload: AttachmentUpload<'_>) -> Result<AttachmentMeta> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::Upload {
            kind: upload.kind,
            parent_id: upload.parent_id.clone(),
            name: upload.file.name.clone(),
            description: upload.description.to_string(),
        });
        if state.failing_uploads.contains(&upload.file.name) {
            return Err(injected(500));
        }
        let id = state.mint_id();
        let meta = AttachmentMeta {
            id,
            name: upload.file.name.clone(),
            size: upload.file.size(),
            mime_type: upload.file.mime_type.clone(),
            reference_id: Some(upload.parent_id.clone()),
            level: upload.kind.attachment_level().map(str::to_string),
            description: Some(upload.description.to_string()),
        };
        state.attachments.push(meta.clone());
        Ok(meta)
    }

    async fn delete_attachment(&self, id: &EntityId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ApiCall::DeleteAttachment(id.clone()));
        if state.failing_deletes.contains(id) {
            return Err(injected(500));
        }
        let index = state
            .attachments
            .iter()
            .position(|meta| meta.id.same_as(id))
            .ok_or_else(|| not_found(id))?;
        state.attachments.remove(index);
        Ok(())
    }

    async fn list_attachments(
        &self,
        kind: EntityKind,
        parent_id: &EntityId,
    ) -> Result<Vec<AttachmentMeta>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(ApiCall::ListAttachments {
                kind,
                parent_id: parent_id.clone(),
            });
        Ok(self.stored_attachments(kind, parent_id))
    }
}

/// Sink that keeps every notification.
#[derive(Debug, Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    /// Drains the notifications received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}
