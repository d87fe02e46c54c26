//! Backend collaborator.
//!
//! Every network effect of the desk goes through [`ProcurementApi`]. The
//! production implementation is [`http::HttpApi`]; tests use an in-memory fake.

pub mod http;
pub mod routes;

use crate::entities::{AttachmentMeta, AttachmentUpload, EntityId, EntityKind, PersistedEntity};
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// JSON body of a create or update call.
pub type Payload = Map<String, Value>;

/// REST operations the procurement backend exposes.
///
/// Implementations must be safe to share across tasks: the orchestrator fans
/// attachment calls out concurrently against one instance.
#[async_trait]
pub trait ProcurementApi: Send + Sync {
    /// Creates a record and returns it with its server-assigned id.
    async fn create(&self, kind: EntityKind, payload: &Payload) -> Result<PersistedEntity>;

    /// Updates a record. The returned record may carry a different id than
    /// `id`; callers must use the returned one from then on.
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        payload: &Payload,
    ) -> Result<PersistedEntity>;

    /// Fetches one record.
    async fn fetch(&self, kind: EntityKind, id: &EntityId) -> Result<PersistedEntity>;

    /// Lists every record of a kind.
    async fn list(&self, kind: EntityKind) -> Result<Vec<PersistedEntity>>;

    /// Deletes one record.
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()>;

    /// Uploads one document for a parent record.
    async fn upload_attachment(&self, upload: AttachmentUpload<'_>) -> Result<AttachmentMeta>;

    /// Deletes one document.
    async fn delete_attachment(&self, id: &EntityId) -> Result<()>;

    /// Lists the documents of a parent record.
    async fn list_attachments(
        &self,
        kind: EntityKind,
        parent_id: &EntityId,
    ) -> Result<Vec<AttachmentMeta>>;
}

/// Records of `kind` whose `parent_key` reference points at `parent_id`.
pub async fn list_children(
    api: &dyn ProcurementApi,
    kind: EntityKind,
    parent_id: &EntityId,
) -> Result<Vec<PersistedEntity>> {
    let Some(key) = kind.parent_key() else {
        return Ok(Vec::new());
    };
    let records = api.list(kind).await?;
    Ok(records
        .into_iter()
        .filter(|record| {
            record
                .reference(key)
                .is_some_and(|reference| reference.same_as(parent_id))
        })
        .collect())
}
