//! [`ProcurementApi`] over HTTP.
//!
//! Every request carries the session's bearer token and tenant id. A logged-out
//! session fails the call before anything is sent. Non-2xx answers become
//! [`Error::Api`] with the raw body; there is no retry and no token refresh.

use super::{Payload, ProcurementApi, routes};
use crate::config::policy::mime_for_file_name;
use crate::config::session::Session;
use crate::entities::{AttachmentMeta, AttachmentUpload, EntityId, EntityKind, PersistedEntity};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the tenant id.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// HTTP client for the procurement backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpApi {
    /// Client for `base_url` (no trailing slash) acting for `session`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Same as [`Self::new`], reusing an existing connection pool.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    /// The session requests are made for.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn request(&self, method: Method, url: String) -> Result<reqwest::RequestBuilder> {
        let credentials = self.session.credentials()?;
        let authorization = self.session.authorization()?;
        debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .header(TENANT_HEADER, &credentials.tenant_id))
    }

    // ---- private helpers ----

    /// Returns the response unchanged on 2xx, otherwise [`Error::Api`] with
    /// the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            debug!("Backend answered {}: {}", status, body);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_json(response: reqwest::Response) -> Result<Value> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Strips a `{"data": ...}` envelope if the backend wrapped its answer.
#[must_use]
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if !map.contains_key("id") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Reads one record from a response body.
pub fn entity_from_response(kind: EntityKind, body: Value) -> Result<PersistedEntity> {
    PersistedEntity::from_json(kind, unwrap_data(body))
}

/// Reads a record list from a response body.
pub fn entities_from_response(kind: EntityKind, body: Value) -> Result<Vec<PersistedEntity>> {
    match unwrap_data(body) {
        Value::Array(items) => items
            .into_iter()
            .map(|item| PersistedEntity::from_json(kind, item))
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::InvalidResponse {
            message: format!("expected a list of {}, got {other}", kind.resource()),
        }),
    }
}

/// Reads one document's metadata from an upload response.
pub fn attachment_from_response(body: Value) -> Result<AttachmentMeta> {
    Ok(serde_json::from_value(unwrap_data(body))?)
}

/// Reads a document list from a filter response.
pub fn attachments_from_response(body: Value) -> Result<Vec<AttachmentMeta>> {
    match unwrap_data(body) {
        Value::Null => Ok(Vec::new()),
        list @ Value::Array(_) => Ok(serde_json::from_value(list)?),
        other => Err(Error::InvalidResponse {
            message: format!("expected a list of documents, got {other}"),
        }),
    }
}

fn upload_form(upload: AttachmentUpload<'_>, level: &str) -> Result<Form> {
    let file = upload.file;
    let mime = if file.mime_type.trim().is_empty() {
        mime_for_file_name(&file.name).unwrap_or("application/octet-stream")
    } else {
        file.mime_type.as_str()
    };
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(mime)?;

    Ok(Form::new()
        .part("file", part)
        .text("level", level.to_string())
        .text("referenceId", upload.parent_id.to_string())
        .text("description", upload.description.to_string()))
}

#[async_trait]
impl ProcurementApi for HttpApi {
    async fn create(&self, kind: EntityKind, payload: &Payload) -> Result<PersistedEntity> {
        let response = self
            .request(Method::POST, routes::create(&self.base_url, kind))?
            .json(payload)
            .send()
            .await?;
        entity_from_response(kind, Self::parse_json(response).await?)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        payload: &Payload,
    ) -> Result<PersistedEntity> {
        let response = self
            .request(Method::PUT, routes::update(&self.base_url, kind, id))?
            .json(payload)
            .send()
            .await?;
        entity_from_response(kind, Self::parse_json(response).await?)
    }

    async fn fetch(&self, kind: EntityKind, id: &EntityId) -> Result<PersistedEntity> {
        let response = self
            .request(Method::GET, routes::item(&self.base_url, kind, id))?
            .send()
            .await?;
        entity_from_response(kind, Self::parse_json(response).await?)
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<PersistedEntity>> {
        let response = self
            .request(Method::GET, routes::collection(&self.base_url, kind))?
            .send()
            .await?;
        entities_from_response(kind, Self::parse_json(response).await?)
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()> {
        let response = self
            .request(Method::DELETE, routes::item(&self.base_url, kind, id))?
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn upload_attachment(&self, upload: AttachmentUpload<'_>) -> Result<AttachmentMeta> {
        let level = upload
            .kind
            .attachment_level()
            .ok_or_else(|| Error::ReadOnly {
                target: format!("{} documents", upload.kind.label()),
            })?;
        let form = upload_form(upload, level)?;
        let response = self
            .request(Method::POST, routes::upload(&self.base_url))?
            .multipart(form)
            .send()
            .await?;
        attachment_from_response(Self::parse_json(response).await?)
    }

    async fn delete_attachment(&self, id: &EntityId) -> Result<()> {
        let response = self
            .request(Method::DELETE, routes::attachment(&self.base_url, id))?
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn list_attachments(
        &self,
        kind: EntityKind,
        parent_id: &EntityId,
    ) -> Result<Vec<AttachmentMeta>> {
        let Some(level) = kind.attachment_level() else {
            return Ok(Vec::new());
        };
        let response = self
            .request(Method::GET, routes::attachment_filter(&self.base_url))?
            .query(&[("level", level.to_string()), ("referenceId", parent_id.to_string())])
            .send()
            .await?;
        attachments_from_response(Self::parse_json(response).await?)
    }
}
